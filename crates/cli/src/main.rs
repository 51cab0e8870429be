use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_app::urls::routes::{process_request, ProcessUrlRequest};
use bookshelf_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Books CRUD and URL processing service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run migrations and serve HTTP (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Normalize a single URL and print the result
    ProcessUrl {
        #[arg(long)]
        url: String,
        /// canonical, redirection, or all
        #[arg(long)]
        operation: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::ProcessUrl { url, operation } => {
            let processed = process_url(url, operation)?;
            println!("{}", processed);
            Ok(())
        }
        Command::Serve => with_runtime(|settings| async move {
            bookshelf_app::app::serve(&settings).await
        }),
        Command::Migrate => with_runtime(|settings| async move {
            let applied = bookshelf_app::app::migrate_only(&settings).await?;
            tracing::info!(applied, "migrate finished");
            Ok(())
        }),
    }
}

/// Offline normalization with the same validation messages as the HTTP endpoint.
fn process_url(url: String, operation: String) -> anyhow::Result<String> {
    let request = ProcessUrlRequest { url, operation };
    process_request(&request)
        .map(|response| response.processed_url)
        .map_err(|e| anyhow::anyhow!(e.message()))
}

fn with_runtime<F, Fut>(command: F) -> anyhow::Result<()>
where
    F: FnOnce(Settings) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, "bookshelf CLI starting");

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(command(settings))
}
