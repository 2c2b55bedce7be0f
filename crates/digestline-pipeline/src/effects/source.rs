use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::data::IndexedItem;
use crate::error::{PipelineError, Result};

/// Feed every line of `reader` into `intake`, tagged with its zero-based line number.
///
/// Line terminators (`\n` or `\r\n`) are stripped. The intake queue is closed
/// when this returns, because `intake` is dropped. Returns the number of items produced.
///
/// A read failure, including a line that is not valid UTF-8, is fatal: the
/// caller gets [`PipelineError::InputRead`] and no later line is sent.
pub async fn feed_lines<R>(
    reader: R,
    intake: mpsc::Sender<IndexedItem<String>>,
    cancel: CancellationToken,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut index = 0u64;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(source) => return Err(PipelineError::InputRead { line: index, source }),
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            sent = intake.send(IndexedItem::new(index, line)) => {
                if sent.is_err() {
                    return Err(PipelineError::Cancelled);
                }
            }
        }
        index += 1;
    }

    debug!(items = index, "input exhausted, closing intake");
    Ok(index)
}
