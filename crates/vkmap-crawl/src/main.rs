//! CLI entry point for the vkmap crawler.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use vkmap_crawl::config::AppConfig;
use vkmap_crawl::export::{export_profile, ExportOutcome};
use vkmap_crawl::{CrawlOptions, Crawler, HttpTransport, VkFetcher};
use vkmap_graph::GraphClient;

#[derive(Parser)]
#[command(name = "vkmap-crawl")]
#[command(about = "Map a VK user's followers and subscriptions into Neo4j")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: vkmap).
    #[arg(short, long, default_value = "vkmap", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl outward from a seed user and write the graph to Neo4j.
    Crawl {
        /// Seed user handle or numeric id.
        #[arg(short, long, default_value = "olegan_west")]
        user_id: String,

        /// Depth bound (overrides crawl.max_depth).
        #[arg(short, long)]
        depth: Option<u32>,

        /// Expand each user at most once.
        #[arg(long)]
        dedupe: bool,
    },
    /// Export one user's profile, followers and subscriptions to a JSON file.
    Export {
        /// User handle or numeric id.
        #[arg(short, long, default_value = "olegan_west")]
        user_id: String,

        /// Output file.
        #[arg(short, long, default_value = "vk_data.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let transport = HttpTransport::new(&config.vk)?;
    let fetcher = VkFetcher::new(transport).with_page_size(config.vk.effective_page_size());

    match cli.command {
        Command::Crawl {
            ref user_id,
            depth,
            dedupe,
        } => {
            let mut options = CrawlOptions::from(&config.crawl);
            if let Some(depth) = depth {
                options.max_depth = depth;
            }
            options.dedupe |= dedupe;

            let graph = GraphClient::connect(&config.neo4j).await?;
            graph.ensure_schema().await?;

            let crawler = Crawler::new(fetcher, &graph, options);
            let stats = crawler.crawl(user_id).await?;
            println!("{}", serde_json::to_string(&stats)?);
        }
        Command::Export {
            ref user_id,
            ref output,
        } => match export_profile(&fetcher, user_id, output).await? {
            ExportOutcome::Written { .. } => {
                println!("Data saved to {}", output.display());
            }
            ExportOutcome::NoFollowers => {
                println!("User {user_id} has no followers; nothing exported.");
            }
        },
    }

    Ok(())
}
