use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_WORD: &str = "go";

#[derive(Debug, Clone)]
pub struct Options {
    concurrency: usize,
    fetch_timeout: Duration,
    word: String,
}

impl Options {
    #[inline]
    pub fn new(concurrency: usize, fetch_timeout: Duration, word: impl Into<String>) -> Options {
        OptionsBuilder::new()
        .set_concurrency(concurrency)
        .set_fetch_timeout(fetch_timeout)
        .set_word(word)
        .build()
    }

    #[inline]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }

    /// Max number of pages fetched at the same time
    #[inline]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[inline]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// The substring counted in every fetched page
    #[inline]
    pub fn word(&self) -> &str {
        &self.word
    }
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        OptionsBuilder::default().build()
    }
}

#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    concurrency: usize,
    fetch_timeout: Duration,
    word: String,
}

impl OptionsBuilder {
    #[inline]
    pub fn new() -> OptionsBuilder {
        Default::default()
    }

    #[inline]
    pub fn build(self) -> Options {
        Options {
            concurrency: self.concurrency,
            fetch_timeout: self.fetch_timeout,
            word: self.word,
        }
    }

    /// Zero is raised to one, a gate without slots would never admit anything.
    #[inline]
    pub fn set_concurrency(mut self, concurrency: usize) -> OptionsBuilder {
        self.concurrency = concurrency.max(1);
        self
    }

    #[inline]
    pub fn set_fetch_timeout(mut self, fetch_timeout: Duration) -> OptionsBuilder {
        self.fetch_timeout = fetch_timeout;
        self
    }

    #[inline]
    pub fn set_word(mut self, word: impl Into<String>) -> OptionsBuilder {
        self.word = word.into();
        self
    }

    #[inline]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[inline]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    #[inline]
    pub fn word(&self) -> &str {
        &self.word
    }
}

impl Default for OptionsBuilder {
    #[inline]
    fn default() -> Self {
        OptionsBuilder {
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            word: DEFAULT_WORD.to_string(),
        }
    }
}
