use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{stdin, stdout, AsyncBufRead, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wordcalc::count_words;

mod input;

#[tokio::main]
async fn main() -> Result<()> {
    let (options, other_options) = input::from_cli();

    let default_filter = if other_options.verbose { "wordcalc=debug" } else { "wordcalc=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let reader: Box<dyn AsyncBufRead + Unpin> = match &other_options.input {
        Some(path) => {
            let file = File::open(path).await.with_context(|| format!("cannot open {}", path.display()))?;
            Box::new(BufReader::new(file))
        },
        None => Box::new(BufReader::new(stdin())),
    };

    let (summary, _) = count_words(reader, stdout(), &options).await?;
    info!(total = summary.total, succeeded = summary.succeeded, failed = summary.failed, "done");
    Ok(())
}
