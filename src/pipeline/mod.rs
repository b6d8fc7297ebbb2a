use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::debug;

use crate::fetcher::{Fetcher, Measure};
use crate::Options;

use aggregator::Aggregator;
use dispatcher::Dispatcher;
use worker::Collaborators;

pub use gate::{AdmissionGate, Slot};
pub use coordinator::{ShutdownCoordinator, ShutdownError, State};
pub use types::{Address, Outcome, Processed, Summary};

pub mod coordinator;
pub mod gate;
pub mod types;
mod aggregator;
mod dispatcher;
mod worker;

/// Fetches and measures every line of `input`, writing one report line per item and a final
/// `Total:` line to `out`.
///
/// At most `options.concurrency()` fetches run at once. Reports are written in completion
/// order. The returned `Summary` matches the written total.
pub async fn run<R, W, F, M>(input: R, out: W, fetcher: F, measure: M, options: &Options) -> Result<(Summary, W)>
    where R: AsyncBufRead + Unpin,
          W: AsyncWrite + Unpin + Send + 'static,
          F: Fetcher,
          M: Measure,
{
    let gate = AdmissionGate::new(options.concurrency());
    let collaborators = Arc::new(Collaborators {
        fetcher: Box::new(fetcher),
        measure: Box::new(measure),
        fetch_timeout: options.fetch_timeout(),
    });
    let (tx, rx) = mpsc::unbounded_channel();

    let aggregator = tokio::spawn(Aggregator::new(out).run(rx));

    // The dispatcher's sender is dropped when it returns, workers hold their own
    let dispatched = Dispatcher { gate, tx, collaborators }.run(input).await;

    // Prefer the aggregator error, a dispatcher failure is usually caused by it
    let (summary, out) = aggregator.await.context("aggregator task failed")??;
    let dispatched = dispatched?;
    debug!(dispatched, "all results collected");

    Ok((summary, out))
}
