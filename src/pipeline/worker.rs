use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error};
use url::Url;

use crate::fetcher::{FetchError, Fetcher, Measure};
use crate::utils::panic_message;

use super::gate::Slot;
use super::types::{Address, Event, Outcome, Processed};

/// The collaborators shared by every worker of a run.
pub(crate) struct Collaborators {
    pub fetcher: Box<dyn Fetcher>,
    pub measure: Box<dyn Measure>,
    pub fetch_timeout: Duration,
}

pub(crate) struct WorkerTask {
    pub line: String,
    pub slot: Slot,
    pub tx: UnboundedSender<Event>,
    pub collaborators: Arc<Collaborators>,
}

impl WorkerTask {
    /// Reports exactly one `Processed` per task, then gives the slot back.
    pub fn spawn(self) -> JoinHandle<()> {
        let WorkerTask { line, slot, tx, collaborators } = self;

        tokio::spawn(async move {
            let processed = match Url::parse(&line) {
                Ok(url) => {
                    let outcome = AssertUnwindSafe(process(&url, &collaborators)).catch_unwind().await;
                    match outcome {
                        Ok(outcome) => Processed { address: Address::Parsed(url), outcome },
                        Err(panic) => {
                            let cause = format!("internal fault: {}", panic_message(&*panic));
                            error!(url = %url, "{}", cause);
                            Processed::failed(Address::Parsed(url), cause)
                        },
                    }
                },
                Err(parse_err) => {
                    debug!(line = %line, error = %parse_err, "cannot parse address");
                    Processed::failed(Address::Raw(line), parse_err.to_string())
                },
            };

            if tx.send(Event::Processed(processed)).is_err() {
                error!("Couldn't send result to the aggregator!");
            }

            // Release the slot only once the result is handed off
            slot.release();
        })
    }
}

async fn process(url: &Url, collaborators: &Collaborators) -> Outcome {
    let fetched = timeout(collaborators.fetch_timeout, collaborators.fetcher.fetch(url))
    .await
    .unwrap_or(Err(FetchError::TimedOut(collaborators.fetch_timeout)));

    match fetched {
        Ok(content) => {
            let count = collaborators.measure.measure(&content);
            debug!(url = %url, count, "measured");
            Outcome::Count(count)
        },
        Err(fetch_err) => {
            debug!(url = %url, error = %fetch_err, "cannot fetch");
            Outcome::Failed(fetch_err.to_string())
        },
    }
}
