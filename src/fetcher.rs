use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use thiserror::Error;
use url::Url;

const APP_USER_AGENT: &str = concat!(
env!("CARGO_PKG_NAME"),
"/",
env!("CARGO_PKG_VERSION"),
);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL protocol {0}")]
    UnsupportedScheme(String),
    #[error("cannot make request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Retrieves the content behind an address.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>>;
}

impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    #[inline]
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>> {
        (**self).fetch(url)
    }
}

/// Derives a metric from fetched content. Must not fail.
pub trait Measure: Send + Sync + 'static {
    fn measure(&self, content: &str) -> usize;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<HttpFetcher, FetchError> {
        let client = Client::builder()
        .user_agent(APP_USER_AGENT)
        .build()?;
        Ok(HttpFetcher { client })
    }

    #[inline]
    pub fn with_client(client: Client) -> HttpFetcher {
        HttpFetcher { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            match url.scheme() {
                "http" | "https" => (),
                other => return Err(FetchError::UnsupportedScheme(other.to_string())),
            }

            let response = self.client.get(url.clone()).send().await?.error_for_status()?;
            Ok(response.text().await?)
        }.boxed()
    }
}

/// Counts the non-overlapping occurrences of a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCounter {
    word: String,
}

impl WordCounter {
    #[inline]
    pub fn new(word: impl Into<String>) -> WordCounter {
        WordCounter { word: word.into() }
    }
}

impl Measure for WordCounter {
    #[inline]
    fn measure(&self, content: &str) -> usize {
        if self.word.is_empty() {
            return 0;
        }
        content.matches(self.word.as_str()).count()
    }
}
