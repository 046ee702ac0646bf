use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use twitter_scraper::batch::{fetch_conversations, parse_tweet_ids};
use twitter_scraper::{Scraper, ScraperConfig};

#[derive(Parser, Debug)]
#[clap(version)]
struct Cli {
    /// Path to a JSON config file (defaults are used when omitted)
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch conversations and print them as JSON
    Fetch(FetchArgs),
    /// Serve conversations over HTTP at /tweet
    #[cfg(feature = "serve")]
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Tweet id(s) to fetch (comma seperated, at most 50)
    #[clap(short, long)]
    ids: String,
}

#[cfg(feature = "serve")]
#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[clap(short, long, default_value = "127.0.0.1:8080")]
    socket: std::net::SocketAddr,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = main2().await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn main2() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ScraperConfig::load(path).await?,
        None => ScraperConfig::default(),
    };
    let scraper = Scraper::new(config).context("Unable to create scraper")?;

    match cli.command {
        Command::Fetch(args) => {
            let ids = parse_tweet_ids(&args.ids)?;
            let conversation = fetch_conversations(&scraper, &ids)
                .await
                .context("Unable to fetch conversations")?;
            println!("{}", serde_json::to_string_pretty(&conversation)?);
        }
        #[cfg(feature = "serve")]
        Command::Serve(args) => {
            twitter_scraper::serve::serve(std::sync::Arc::new(scraper), args.socket).await?;
        }
    }
    Ok(())
}
