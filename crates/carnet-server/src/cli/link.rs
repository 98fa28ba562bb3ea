use crate::cli::entry::parse_entry;
use crate::cli::{
    print_link_table, LinkCommands, LinkCreateArgs, LinkDeleteArgs, LinkForArgs, LinkListArgs,
};
use anyhow::Result;
use carnet_client::{CarnetClient, CreateLinkRequest};
use carnet_core::LinkKind;

pub async fn run(cmd: LinkCommands, client: &CarnetClient) -> Result<()> {
    match cmd {
        LinkCommands::List(args) => list(args, client).await,
        LinkCommands::Create(args) => create(args, client).await,
        LinkCommands::Delete(args) => delete(args, client).await,
        LinkCommands::For(args) => for_entry(args, client).await,
        LinkCommands::Prune => prune(client).await,
    }
}

async fn list(args: LinkListArgs, client: &CarnetClient) -> Result<()> {
    let links = client.list_links().await?;
    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else {
        print_link_table(&links);
    }
    Ok(())
}

async fn create(args: LinkCreateArgs, client: &CarnetClient) -> Result<()> {
    let kind = args
        .kind
        .parse::<LinkKind>()
        .map_err(|e| anyhow::anyhow!(e))?;
    let req = CreateLinkRequest::new(
        parse_entry(&args.source)?,
        parse_entry(&args.target)?,
        kind,
        args.description,
    );
    let link = client.create_link(&req).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&link)?);
    } else {
        println!("Created link {}", link.id);
        println!(
            "  {} --[{} {}]--> {}",
            link.source(),
            link.kind.icon(),
            link.kind.label(),
            link.target()
        );
    }
    Ok(())
}

async fn delete(args: LinkDeleteArgs, client: &CarnetClient) -> Result<()> {
    client.delete_link(args.id).await?;
    println!("Deleted link {}", args.id);
    Ok(())
}

async fn for_entry(args: LinkForArgs, client: &CarnetClient) -> Result<()> {
    let entry = parse_entry(&args.entry)?;
    let links = client.entry_links(entry).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else if links.is_empty() {
        println!("(no links)");
    } else {
        for linked in &links {
            println!("{}  {}", linked.link.id, linked.label);
        }
    }
    Ok(())
}

async fn prune(client: &CarnetClient) -> Result<()> {
    let removed = client.prune_links().await?;
    println!("Removed {} dangling links", removed);
    Ok(())
}
