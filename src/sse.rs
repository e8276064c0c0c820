//! Incremental parsing of the streamed chat-completion response body.
//!
//! The body is a sequence of byte chunks, each carrying zero or more
//! newline-delimited protocol lines. Lines prefixed with `data: ` hold a JSON
//! chunk with a text delta; the literal `data: [DONE]` marks the end of the
//! completion; other lines may carry an out-of-band `{"error": {...}}`
//! payload. Chunk boundaries are arbitrary, so a partial line is buffered
//! until its newline arrives.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{ChatChunk, StreamError};

/// One decoded frame of the streamed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// A parsed `data:` chunk, possibly carrying a text delta and/or an
    /// in-band error.
    Delta(ChatChunk),

    /// The `data: [DONE]` terminal marker.
    Done,

    /// An error payload reported outside the `data:` framing.
    OutOfBand(StreamError),
}

/// Process a stream of bytes into a stream of protocol frames.
///
/// Malformed `data:` lines surface as recoverable errors
/// ([`Error::is_recoverable_stream_error`]); callers log and skip them.
/// Non-`data:` lines that are not an out-of-band error payload are dropped
/// silently. Transport-level failures surface as [`Error::Streaming`] items.
pub fn frames<S>(byte_stream: S) -> impl Stream<Item = Result<StreamFrame>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Use a state machine to process the chunked line protocol
    stream::unfold(
        (stream, String::new(), false),
        move |(mut stream, mut buffer, mut ended)| async move {
            loop {
                // First drain any complete line already in the buffer
                if let Some(idx) = buffer.find('\n') {
                    let line: String = buffer.drain(..=idx).collect();
                    if let Some(item) = classify_line(&line) {
                        return Some((item, (stream, buffer, ended)));
                    }
                    continue;
                }

                if ended {
                    // Flush a trailing line that never got its newline
                    if buffer.is_empty() {
                        return None;
                    }
                    let line = std::mem::take(&mut buffer);
                    if let Some(item) = classify_line(&line) {
                        return Some((item, (stream, buffer, ended)));
                    }
                    return None;
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {e}"),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer, ended),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, buffer, ended)));
                    }
                    None => {
                        ended = true;
                    }
                }
            }
        },
    )
}

/// Classify a single protocol line; `None` means the line carries nothing.
fn classify_line(line: &str) -> Option<Result<StreamFrame>> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return None;
    }

    if line.trim() == "data: [DONE]" {
        return Some(Ok(StreamFrame::Done));
    }

    if let Some(payload) = line.strip_prefix("data: ") {
        return match serde_json::from_str::<ChatChunk>(payload) {
            Ok(chunk) => Some(Ok(StreamFrame::Delta(chunk))),
            Err(e) => Some(Err(Error::serialization(
                format!("Failed to parse stream chunk: {e}"),
                Some(Box::new(e)),
            ))),
        };
    }

    // Non-data lines are only interesting if they carry an error report.
    #[derive(Deserialize)]
    struct OutOfBand {
        #[serde(default)]
        error: Option<StreamError>,
    }

    match serde_json::from_str::<OutOfBand>(line) {
        Ok(OutOfBand { error: Some(error) }) => Some(Ok(StreamFrame::OutOfBand(error))),
        _ => None,
    }
}
