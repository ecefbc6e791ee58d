use anyhow::Result;
use clap::Parser;

use subcombinator::render::OutputFormat;

#[derive(Parser)]
#[command(name = "subcombinator", about = "Combine proxy subscriptions into one output")]
struct Cli {
    /// YAML sources file
    #[arg(default_value = "sources.yaml")]
    sources: String,

    /// Emit a Clash configuration instead of a base64 link list
    #[arg(long)]
    clash: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let sources = subcombinator::config::load_sources(&cli.sources)?;
    let format = if cli.clash {
        OutputFormat::Clash
    } else {
        OutputFormat::RawList
    };

    let output = subcombinator::aggregate_subscriptions(&sources, format).await;
    println!("{}", output);
    Ok(())
}
