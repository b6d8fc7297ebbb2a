use std::any::Any;
use std::fmt::Display;

use anyhow::{Context, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes `line` followed by a newline.
pub(crate) async fn write_line<W, D>(out: &mut W, line: D) -> Result<()>
    where W: AsyncWrite + Unpin,
          D: Display,
{
    let line = format!("{line}\n");
    out.write_all(line.as_bytes()).await.context("cannot write to output")
}

/// Best effort text of a caught panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
