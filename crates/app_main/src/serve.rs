//! JSON-lines bridge for a presentation layer running in another process

use app_core::{AppError, CommandDispatcher, SessionContext};
use ipc_proto::{decode_request, encode_line, ResponseEnvelope};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// Best-effort id of a line that failed to decode, so the client can still correlate
fn salvage_id(line: &str) -> Uuid {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|value| value.get("id")?.as_str()?.parse().ok())
        .unwrap_or_default()
}

/// Answer one request per input line until EOF; returns the number of lines handled.
///
/// Requests are handled in arrival order so the session stays consistent.
pub async fn serve<R, W>(dispatcher: &CommandDispatcher, reader: R, mut writer: W) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut session = SessionContext::new();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let envelope = match decode_request(&line) {
            Ok(envelope) => {
                let (next, response) = dispatcher.handle(session, envelope.request).await;
                session = next;
                ResponseEnvelope {
                    id: envelope.id,
                    response,
                }
            }
            Err(e) => ResponseEnvelope {
                id: salvage_id(&line),
                response: AppError::BadRequest(e.to_string()).to_response(),
            },
        };

        let mut out = encode_line(&envelope)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    tracing::info!(handled, "Input closed");
    Ok(handled)
}
