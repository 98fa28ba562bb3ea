use crate::cli::entry::parse_entry;
use crate::cli::{GraphCommands, GraphSvgArgs};
use anyhow::{Context, Result};
use carnet_client::{CarnetClient, GraphQuery};

pub async fn run(cmd: GraphCommands, client: &CarnetClient) -> Result<()> {
    match cmd {
        GraphCommands::Svg(args) => svg(args, client).await,
    }
}

async fn svg(args: GraphSvgArgs, client: &CarnetClient) -> Result<()> {
    let query = GraphQuery {
        width: args.width,
        height: args.height,
        hover: args.hover.as_deref().map(parse_entry).transpose()?,
    };
    let svg = client.graph_svg(query).await?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}
