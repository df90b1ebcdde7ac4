use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pdftools_cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so extracted text on stdout stays clean
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let written = run(cli).await?;
    tracing::info!(files = written.len(), "done");
    Ok(())
}
