use crate::cli::{
    print_entry_table, truncate, EntryCommands, EntryCreateArgs, EntryDeleteArgs, EntryGetArgs,
    EntryListArgs,
};
use anyhow::{Context, Result};
use carnet_client::CarnetClient;
use carnet_core::{EntryBody, EntryRef, EntryVariant, ViewOrigin};
use std::io::Read;

pub async fn run(cmd: EntryCommands, client: &CarnetClient) -> Result<()> {
    match cmd {
        EntryCommands::List(args) => list(args, client).await,
        EntryCommands::Get(args) => get(args, client).await,
        EntryCommands::Create(args) => create(args, client).await,
        EntryCommands::Delete(args) => delete(args, client).await,
    }
}

pub(crate) fn parse_entry(s: &str) -> Result<EntryRef> {
    s.parse::<EntryRef>().map_err(|e| anyhow::anyhow!(e))
}

async fn list(args: EntryListArgs, client: &CarnetClient) -> Result<()> {
    let variant = args
        .variant
        .as_deref()
        .map(str::parse::<EntryVariant>)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;
    let entries = client.list_entries(variant).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print_entry_table(&entries);
    }
    Ok(())
}

async fn get(args: EntryGetArgs, client: &CarnetClient) -> Result<()> {
    let entry = parse_entry(&args.entry)?;
    let origin = args
        .from
        .parse::<ViewOrigin>()
        .map_err(|e| anyhow::anyhow!(e))?;
    let detail = client.get_entry(entry, origin).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let e = &detail.entry;
    println!("{} {} · {}", e.variant().label(), e.id, e.body.date());
    println!("  {}", e.short_text());
    if let Some(location) = e.location() {
        println!("  📍 {}", location);
    }
    if !e.body.tags().is_empty() {
        println!("  tags: {}", e.body.tags().join(", "));
    }
    println!();
    if detail.links.is_empty() {
        println!("(no links)");
    } else {
        println!("Links:");
        for linked in &detail.links {
            println!("  {}", truncate(&linked.label, 100));
        }
    }
    println!();
    println!("Back: {}", detail.back);
    Ok(())
}

async fn create(args: EntryCreateArgs, client: &CarnetClient) -> Result<()> {
    let raw = if args.file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?
    };
    let body: EntryBody = serde_json::from_str(&raw).context("Invalid entry JSON")?;
    let entry = client.create_entry(&body).await?;
    println!("Created {}", entry.entry_ref());
    Ok(())
}

async fn delete(args: EntryDeleteArgs, client: &CarnetClient) -> Result<()> {
    let entry = parse_entry(&args.entry)?;
    let removed = client.delete_entry(entry).await?;
    println!("Deleted {} ({} links removed)", entry, removed);
    Ok(())
}
