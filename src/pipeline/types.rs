use std::fmt::{Display, Formatter};

use url::Url;

/// What a processed line is reported as.
///
/// Lines that could not be parsed keep their raw text so the failure can still name them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Parsed(Url),
    Raw(String),
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::Parsed(url) => write!(f, "{}", url),
            Address::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Count(usize),
    Failed(String),
}

/// The single outcome of one dispatched line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub address: Address,
    pub outcome: Outcome,
}

impl Processed {
    #[inline]
    pub fn counted(address: Address, count: usize) -> Processed {
        Processed { address, outcome: Outcome::Count(count) }
    }

    #[inline]
    pub fn failed(address: Address, cause: impl Into<String>) -> Processed {
        Processed { address, outcome: Outcome::Failed(cause.into()) }
    }

    #[inline]
    pub fn count(&self) -> Option<usize> {
        match self.outcome {
            Outcome::Count(count) => Some(count),
            Outcome::Failed(_) => None,
        }
    }
}

impl Display for Processed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            Outcome::Count(count) => write!(f, "Count for {}: {}", self.address, count),
            Outcome::Failed(cause) => write!(f, "Error for {}: {}", self.address, cause),
        }
    }
}

/// Messages received by the aggregator task.
#[derive(Debug)]
pub(crate) enum Event {
    /// A slot was taken and a worker is about to be spawned
    Dispatched,
    Processed(Processed),
    /// Sent once, after the last `Dispatched`
    InputExhausted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    #[inline]
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}
