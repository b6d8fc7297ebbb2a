#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncWrite};

pub use crate::fetcher::{FetchError, Fetcher, HttpFetcher, Measure, WordCounter};
pub use crate::options::*;
pub use crate::pipeline::{run, Address, Outcome, Processed, Summary};

pub mod fetcher;
pub mod pipeline;
pub(crate) mod options;
pub(crate) mod utils;

/// Counts `options.word()` in every page listed in `input`, fetching pages over HTTP.
pub async fn count_words<R, W>(input: R, out: W, options: &Options) -> Result<(Summary, W)>
    where R: AsyncBufRead + Unpin,
          W: AsyncWrite + Unpin + Send + 'static,
{
    let fetcher = HttpFetcher::new().context("cannot build the HTTP client")?;
    run(input, out, fetcher, WordCounter::new(options.word()), options).await
}
