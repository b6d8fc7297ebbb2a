use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::gate::AdmissionGate;
use super::types::Event;
use super::worker::{Collaborators, WorkerTask};

pub(crate) struct Dispatcher {
    pub gate: AdmissionGate,
    pub tx: UnboundedSender<Event>,
    pub collaborators: Arc<Collaborators>,
}

impl Dispatcher {
    /// Spawns one worker per input line and returns how many were spawned.
    ///
    /// Only waits on the admission gate, never on the spawned workers.
    pub async fn run<R: AsyncBufRead + Unpin>(self, input: R) -> Result<usize> {
        let mut lines = input.lines();
        let mut dispatched = 0;

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(read_err) => {
                    warn!(error = %read_err, "cannot read input, treating it as exhausted");
                    break;
                },
            };

            let slot = self.gate.acquire().await?;
            self.send(Event::Dispatched)?;
            debug!(line = %line, in_use = self.gate.in_use(), "dispatching");

            WorkerTask {
                line,
                slot,
                tx: self.tx.clone(),
                collaborators: self.collaborators.clone(),
            }.spawn();
            dispatched += 1;
        }

        self.send(Event::InputExhausted)?;
        Ok(dispatched)
    }

    fn send(&self, event: Event) -> Result<()> {
        self.tx.send(event).map_err(|_| anyhow!("aggregator stopped before the input was exhausted"))
    }
}
