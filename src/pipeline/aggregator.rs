use anyhow::{Context, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error};

use crate::utils::write_line;

use super::coordinator::ShutdownCoordinator;
use super::types::{Event, Processed, Summary};

/// The only consumer of results and the only owner of the running total.
pub(crate) struct Aggregator<W> {
    out: W,
    coordinator: ShutdownCoordinator,
    summary: Summary,
}

impl<W: AsyncWrite + Unpin> Aggregator<W> {
    #[inline]
    pub fn new(out: W) -> Aggregator<W> {
        Aggregator {
            out,
            coordinator: ShutdownCoordinator::new(),
            summary: Summary::default(),
        }
    }

    /// Reports every result as it arrives, then the total once nothing else can arrive.
    pub async fn run(mut self, mut rx: UnboundedReceiver<Event>) -> Result<(Summary, W)> {
        while !self.coordinator.is_done() {
            let event = match rx.recv().await {
                Some(event) => event,
                None => break,
            };

            match event {
                Event::Dispatched => self.coordinator.dispatched()?,
                Event::Processed(processed) => {
                    self.record(processed).await?;
                    self.coordinator.resolved()?;
                },
                Event::InputExhausted => {
                    self.coordinator.input_exhausted()?;
                },
            }
        }

        if let Err(shutdown_err) = self.coordinator.stream_closed() {
            error!(error = %shutdown_err, "results were lost");
            return Err(shutdown_err.into());
        }

        write_line(&mut self.out, format!("Total: {}", self.summary.total)).await?;
        self.out.flush().await.context("cannot flush output")?;
        debug!(summary = ?self.summary, "finished");
        Ok((self.summary, self.out))
    }

    async fn record(&mut self, processed: Processed) -> Result<()> {
        match processed.count() {
            Some(count) => {
                self.summary.succeeded += 1;
                self.summary.total += count;
            },
            None => self.summary.failed += 1,
        }
        write_line(&mut self.out, &processed).await
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use url::Url;

    use crate::pipeline::coordinator::{ShutdownError, State};
    use crate::pipeline::types::Address;

    use super::*;

    fn counted(url: &str, count: usize) -> Event {
        Event::Processed(Processed::counted(Address::Parsed(Url::parse(url).unwrap()), count))
    }

    #[tokio::test]
    async fn totals_successes_and_reports_failures() {
        let (tx, rx) = mpsc::unbounded_channel();
        for _ in 0..3 {
            tx.send(Event::Dispatched).unwrap();
        }
        tx.send(counted("https://a.example/", 2)).unwrap();
        tx.send(Event::Processed(Processed::failed(Address::Raw("nope".to_string()), "bad"))).unwrap();
        tx.send(Event::InputExhausted).unwrap();
        tx.send(counted("https://c.example/", 5)).unwrap();

        let (summary, out) = Aggregator::new(Vec::new()).run(rx).await.unwrap();
        assert_eq!(summary, Summary { total: 7, succeeded: 2, failed: 1 });
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Count for https://a.example/: 2\nError for nope: bad\nCount for https://c.example/: 5\nTotal: 7\n"
        );
    }

    #[tokio::test]
    async fn finishes_without_waiting_for_senders() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Event::InputExhausted).unwrap();

        // `tx` is still alive, the coordinator alone decides when to finish
        let (summary, out) = Aggregator::new(Vec::new()).run(rx).await.unwrap();
        assert_eq!(summary, Summary::default());
        assert_eq!(out, b"Total: 0\n");
        drop(tx);
    }

    #[tokio::test]
    async fn closed_stream_with_outstanding_work_fails() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Event::Dispatched).unwrap();
        tx.send(Event::InputExhausted).unwrap();
        drop(tx);

        let err = Aggregator::new(Vec::new()).run(rx).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ShutdownError>(),
            Some(&ShutdownError::Abandoned { state: State::Draining, outstanding: 1 })
        );
    }
}
