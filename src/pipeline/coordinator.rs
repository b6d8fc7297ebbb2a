//! Two-phase shutdown: stop producing, then wait for every dispatched item to report.
//!
//! The coordinator holds no locks. It is owned by the aggregator task and only changes
//! through the events that task receives, so the outstanding count is never shared.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Work may still be dispatched
    Running,
    /// Input is exhausted, some items may still be outstanding
    Draining,
    /// Every dispatched item reported back
    Done,
}

impl Default for State {
    #[inline]
    fn default() -> Self {
        State::Running
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShutdownError {
    #[error("work dispatched while {0:?}")]
    DispatchedAfterInput(State),
    #[error("input reported as exhausted while {0:?}")]
    InputExhaustedTwice(State),
    #[error("result received with nothing outstanding")]
    UnexpectedResult,
    #[error("result stream closed while {state:?} with {outstanding} item(s) outstanding")]
    Abandoned { state: State, outstanding: usize },
}

#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    state: State,
    outstanding: usize,
}

impl ShutdownCoordinator {
    #[inline]
    pub fn new() -> ShutdownCoordinator {
        Default::default()
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    pub fn dispatched(&mut self) -> Result<(), ShutdownError> {
        if self.state != State::Running {
            return Err(ShutdownError::DispatchedAfterInput(self.state));
        }
        self.outstanding += 1;
        Ok(())
    }

    pub fn resolved(&mut self) -> Result<State, ShutdownError> {
        if self.outstanding == 0 {
            return Err(ShutdownError::UnexpectedResult);
        }
        self.outstanding -= 1;
        Ok(self.settle())
    }

    pub fn input_exhausted(&mut self) -> Result<State, ShutdownError> {
        if self.state != State::Running {
            return Err(ShutdownError::InputExhaustedTwice(self.state));
        }
        self.state = State::Draining;
        Ok(self.settle())
    }

    /// Checks that closing the result stream now loses nothing.
    pub fn stream_closed(&self) -> Result<(), ShutdownError> {
        match self.state {
            State::Done => Ok(()),
            state => Err(ShutdownError::Abandoned { state, outstanding: self.outstanding }),
        }
    }

    fn settle(&mut self) -> State {
        if self.state == State::Draining && self.outstanding == 0 {
            self.state = State::Done;
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn starts_running() {
        let coordinator = ShutdownCoordinator::new();
        assert_eq!(coordinator.state(), State::Running);
        assert_eq!(coordinator.outstanding(), 0);
        assert!(!coordinator.is_done());
    }

    #[test]
    fn empty_input_is_done_immediately() {
        let mut coordinator = ShutdownCoordinator::new();
        assert_eq!(coordinator.input_exhausted(), Ok(State::Done));
        assert_eq!(coordinator.stream_closed(), Ok(()));
    }

    #[test]
    fn drains_before_done() {
        let mut coordinator = ShutdownCoordinator::new();
        coordinator.dispatched().unwrap();
        coordinator.dispatched().unwrap();
        assert_eq!(coordinator.resolved(), Ok(State::Running));

        assert_eq!(coordinator.input_exhausted(), Ok(State::Draining));
        assert_eq!(coordinator.outstanding(), 1);
        assert_eq!(
            coordinator.stream_closed(),
            Err(ShutdownError::Abandoned { state: State::Draining, outstanding: 1 })
        );

        assert_eq!(coordinator.resolved(), Ok(State::Done));
        assert_eq!(coordinator.stream_closed(), Ok(()));
    }

    #[test]
    fn running_never_finishes_on_zero_outstanding() {
        let mut coordinator = ShutdownCoordinator::new();
        coordinator.dispatched().unwrap();
        assert_eq!(coordinator.resolved(), Ok(State::Running));
        assert!(coordinator.stream_closed().is_err());
    }

    #[test]
    fn rejects_out_of_protocol_events() {
        let mut coordinator = ShutdownCoordinator::new();
        assert_eq!(coordinator.resolved(), Err(ShutdownError::UnexpectedResult));

        coordinator.dispatched().unwrap();
        coordinator.input_exhausted().unwrap();
        assert_eq!(coordinator.dispatched(), Err(ShutdownError::DispatchedAfterInput(State::Draining)));
        assert_eq!(coordinator.input_exhausted(), Err(ShutdownError::InputExhaustedTwice(State::Draining)));

        coordinator.resolved().unwrap();
        assert_eq!(coordinator.resolved(), Err(ShutdownError::UnexpectedResult));
        assert_eq!(coordinator.dispatched(), Err(ShutdownError::DispatchedAfterInput(State::Done)));
    }

    #[derive(Debug)]
    enum Message {
        Dispatched,
        Resolved,
        Exhausted,
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn done_only_after_every_task_reports() {
        const TASKS: u64 = 200;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let producer = {
            let tx = tx.clone();
            tokio::spawn(async move {
                for i in 0..TASKS {
                    tx.send(Message::Dispatched).unwrap();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_micros(i * 37 % 500)).await;
                        tx.send(Message::Resolved).unwrap();
                    });
                }
                tx.send(Message::Exhausted).unwrap();
            })
        };
        drop(tx);

        let mut coordinator = ShutdownCoordinator::new();
        let mut resolved = 0;
        while let Some(message) = rx.recv().await {
            match message {
                Message::Dispatched => coordinator.dispatched().unwrap(),
                Message::Resolved => {
                    resolved += 1;
                    coordinator.resolved().unwrap();
                },
                Message::Exhausted => {
                    coordinator.input_exhausted().unwrap();
                },
            }
            if coordinator.is_done() {
                break;
            }
        }

        producer.await.unwrap();
        assert!(coordinator.is_done());
        assert_eq!(resolved, TASKS);
        assert_eq!(coordinator.outstanding(), 0);
    }
}
