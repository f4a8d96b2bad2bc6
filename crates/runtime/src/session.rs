//! Line-oriented session loop.

use crate::Dispatcher;
use sbcore::model::Model;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Feed lines from `input` to the dispatcher until end of input, writing
/// each reply to `output`.
///
/// Writes `prompt` before every read. Blank lines are handled like any
/// other utterance, and invalid UTF-8 is replaced rather than ending the
/// session. Ctrl+C while a turn is running abandons that turn and
/// the loop moves on to the next line. Returns the number of lines read.
pub async fn run<M, R, W>(
    dispatcher: &mut Dispatcher<M>,
    mut input: R,
    mut output: W,
    prompt: &str,
) -> std::io::Result<usize>
where
    M: Model,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut handled = 0;
    loop {
        output.write_all(prompt.as_bytes()).await?;
        output.flush().await?;

        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = decode_line(&buf);
        handled += 1;

        tokio::select! {
            reply = dispatcher.handle(&line) => {
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!(agent = %dispatcher.active(), "turn cancelled");
                output.write_all(b"\n").await?;
            }
        }
    }

    output.flush().await?;
    Ok(handled)
}

/// Decode one raw line, dropping the trailing `\n` or `\r\n`.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
