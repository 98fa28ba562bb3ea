pub mod config_cmd;
pub mod entry;
pub mod graph;
pub mod link;

use carnet_client::CarnetClient;
use carnet_core::{EntrySummary, SpiritualLink};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "carnet")]
#[command(version, about = "Spiritual journal with typed links and a relationship graph")]
pub struct Cli {
    /// Path to carnet.toml
    #[arg(
        long,
        global = true,
        env = "CARNET_CONFIG",
        default_value = "carnet.toml"
    )]
    pub config: PathBuf,

    /// Path to data directory (overrides config file)
    #[arg(long, global = true, env = "CARNET_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Carnet server address for client commands
    #[arg(
        long,
        global = true,
        env = "CARNET_ADDR",
        default_value = "http://localhost:9091"
    )]
    pub server: String,

    /// Acting user id for client commands
    #[arg(long, global = true, env = "CARNET_USER")]
    pub user: Option<Uuid>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Client for the given server acting as `user`.
pub fn connect(server: &str, user: Option<Uuid>) -> anyhow::Result<CarnetClient> {
    let user =
        user.ok_or_else(|| anyhow::anyhow!("No user given. Pass --user or set CARNET_USER."))?;
    Ok(CarnetClient::new(server, user))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve,
    /// Entry operations
    #[command(subcommand)]
    Entry(EntryCommands),
    /// Link operations
    #[command(subcommand)]
    Link(LinkCommands),
    /// Relationship graph
    #[command(subcommand)]
    Graph(GraphCommands),
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum EntryCommands {
    List(EntryListArgs),
    Get(EntryGetArgs),
    /// Create an entry from a JSON body, e.g. {"grace": {...}}
    Create(EntryCreateArgs),
    Delete(EntryDeleteArgs),
}

#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    List(LinkListArgs),
    Create(LinkCreateArgs),
    Delete(LinkDeleteArgs),
    /// Links touching one entry, as seen from that entry
    For(LinkForArgs),
    /// Remove links whose entries no longer exist
    Prune,
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Render the graph as SVG
    Svg(GraphSvgArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Validate,
    Show,
}

#[derive(Args, Debug)]
pub struct EntryListArgs {
    /// Only this entry type (grace, priere, ecriture, parole, rencontre)
    #[arg(long)]
    pub variant: Option<String>,
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct EntryGetArgs {
    /// Entry as <variant>:<id>
    pub entry: String,
    /// Where the detail was opened from (list or graph)
    #[arg(long, default_value = "list")]
    pub from: String,
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct EntryCreateArgs {
    /// JSON file with the entry body; "-" reads stdin
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct EntryDeleteArgs {
    /// Entry as <variant>:<id>
    pub entry: String,
}

#[derive(Args, Debug)]
pub struct LinkListArgs {
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct LinkCreateArgs {
    /// Source entry as <variant>:<id>
    pub source: String,
    /// Target entry as <variant>:<id>
    pub target: String,
    /// exauce, accomplit, decoule, eclaire or echo
    #[arg(long)]
    pub kind: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct LinkDeleteArgs {
    pub id: Uuid,
}

#[derive(Args, Debug)]
pub struct LinkForArgs {
    /// Entry as <variant>:<id>
    pub entry: String,
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct GraphSvgArgs {
    #[arg(long)]
    pub width: Option<f64>,
    #[arg(long)]
    pub height: Option<f64>,
    /// Entry to draw hovered, as <variant>:<id>
    #[arg(long)]
    pub hover: Option<String>,
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn print_entry_table(entries: &[EntrySummary]) {
    if entries.is_empty() {
        println!("(no entries)");
        return;
    }
    println!(
        "{:<10}  {:<10}  {:<36}  {:<5}  {}",
        "TYPE", "DATE", "ID", "LINKS", "TEXT"
    );
    println!("{}", "─".repeat(100));
    for s in entries {
        println!(
            "{:<10}  {:<10}  {:<36}  {:<5}  {}",
            s.entry.variant().as_str(),
            s.entry.body.date().to_string(),
            s.entry.id,
            s.links_count,
            truncate(&s.short_text, 40)
        );
    }
}

pub fn print_link_table(links: &[SpiritualLink]) {
    if links.is_empty() {
        println!("(no links)");
        return;
    }
    println!(
        "{:<36}  {:<48}  {:<10}  {}",
        "ID", "FROM", "KIND", "TO"
    );
    println!("{}", "─".repeat(140));
    for l in links {
        println!(
            "{:<36}  {:<48}  {:<10}  {}",
            l.id,
            l.source().to_string(),
            l.kind.as_str(),
            l.target()
        );
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max - 1).collect::<String>())
    }
}
