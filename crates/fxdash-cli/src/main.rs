mod render;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fxdash-cli")]
#[command(about = "Forex news sentiment from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the news feed, score each article, and print the results
    News {
        /// Print the report as JSON instead of text cards
        #[arg(long)]
        json: bool,

        /// Score at most this many articles (overrides FXDASH_ANNOTATE_LIMIT)
        #[arg(long)]
        limit: Option<usize>,

        /// Fail on the first fetch error instead of retrying with back-off
        #[arg(long)]
        no_retry: bool,
    },
    /// Print the resolved configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut config = fxdash_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match command {
        Commands::News {
            json,
            limit,
            no_retry,
        } => {
            if let Some(limit) = limit {
                config.annotate_limit = limit.max(1);
            }
            if no_retry {
                config.refresh_max_retries = 0;
            }
            run_news(&config, json).await?;
        }
        Commands::Config => println!("{config:#?}"),
    }

    Ok(())
}

/// Logs go to stderr so `news --json` output stays machine-readable.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run_news(config: &fxdash_core::AppConfig, json: bool) -> anyhow::Result<()> {
    let pipeline = fxdash_sentiment::NewsPipeline::from_config(config)?;
    let report = pipeline.run_with_retry().await?;
    tracing::info!(
        items = report.items.len(),
        fallbacks = report.fallback_count(),
        completion = report.completion,
        "news report complete"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::render_report(&report, chrono::Utc::now()));
    }
    Ok(())
}
