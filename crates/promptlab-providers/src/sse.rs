//! Re-emission of normalized events as server-sent events

use futures::{Stream, StreamExt};
use serde_json::json;

use promptlab_core::{Error, StreamEvent, TextStream};

/// Encode one event as an SSE frame: `data: {"text":"..."}` or `data: [DONE]`
pub fn encode_event(event: &StreamEvent) -> String {
    match event {
        StreamEvent::Delta(text) => format!("data: {}\n\n", json!({ "text": text })),
        StreamEvent::Done => "data: [DONE]\n\n".to_string(),
    }
}

/// Encode a relay failure as a named `error` frame
pub fn encode_error(error: &Error) -> String {
    format!("event: error\ndata: {}\n\n", json!({ "error": error.to_string() }))
}

/// Map a provider stream to SSE frames. A failure becomes a final error frame.
pub fn to_sse_frames(events: TextStream) -> impl Stream<Item = String> + Send {
    events.map(|event| match event {
        Ok(event) => encode_event(&event),
        Err(error) => {
            tracing::warn!("Provider stream failed: {}", error);
            encode_error(&error)
        }
    })
}
