use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, ErrorKind, Parser};

use wordcalc::{Options, DEFAULT_CONCURRENCY, DEFAULT_WORD};

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Input {
    /// File listing the pages to analyze, one URL per line. Reads stdin when omitted
    input: Option<PathBuf>,
    #[clap(short = 'c', long, env = "WORDCALC_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    /// Max number of pages fetched simultaneously
    concurrency: usize,
    #[clap(short = 't', long, env = "WORDCALC_TIMEOUT", default_value_t = 30)]
    /// Seconds to wait for a page before reporting it as failed
    timeout: u64,
    #[clap(short, long, default_value = DEFAULT_WORD)]
    /// Word to count in every page
    word: String,
    #[clap(short, long)]
    verbose: bool,
}

pub(super) struct OtherOptions {
    pub(super) input: Option<PathBuf>,
    pub(super) verbose: bool,
}

#[inline]
pub(super) fn from_cli() -> (Options, OtherOptions) {
    Input::parse().into()
}

impl From<Input> for (Options, OtherOptions) {
    fn from(input: Input) -> Self {
        if input.concurrency == 0 {
            error("Concurrency must be greater than zero.".to_string());
        }
        if input.timeout == 0 {
            error("Timeout must be greater than zero.".to_string());
        }
        if input.word.is_empty() {
            error("The word to count cannot be empty.".to_string());
        }

        let options = Options::builder()
        .set_concurrency(input.concurrency)
        .set_fetch_timeout(Duration::from_secs(input.timeout))
        .set_word(input.word)
        .build();
        let other_options = OtherOptions {
            input: input.input,
            verbose: input.verbose,
        };
        (options, other_options)
    }
}

#[inline]
fn error(error: String) -> ! {
    Input::command().error(
        ErrorKind::InvalidValue,
        error,
    ).exit()
}

#[test]
fn verify_app() {
    Input::command().debug_assert();
}

#[test]
fn parses_flags() {
    let input = Input::try_parse_from(["wordcalc", "-c", "8", "-t", "5", "-w", "rust", "-v", "urls.txt"]).unwrap();
    let (options, other): (Options, OtherOptions) = input.into();
    assert_eq!(options.concurrency(), 8);
    assert_eq!(options.fetch_timeout(), Duration::from_secs(5));
    assert_eq!(options.word(), "rust");
    assert_eq!(other.input, Some(PathBuf::from("urls.txt")));
    assert!(other.verbose);
}
