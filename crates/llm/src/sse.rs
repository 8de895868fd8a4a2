//! Server-sent event decoding shared by the HTTP backends.
//!
//! Both backends stream `data: <json>` lines. Network chunks can split a
//! line (or a UTF-8 sequence) anywhere, so bytes are buffered until a full
//! line is available.

use crate::client::{LlmStream, LlmStreamChunk};
use futures::StreamExt;
use localqa_core::{AppError, AppResult};

/// Incremental decoder turning raw bytes into `data:` payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed bytes and return every complete `data:` payload they finish.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(&['\r', '\n'][..]);

            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }

        payloads
    }
}

/// Wrap an HTTP response body as an [`LlmStream`].
///
/// `parse` maps one `data:` payload to a chunk; returning `None` skips it.
pub(crate) fn event_stream<F>(response: reqwest::Response, mut parse: F) -> LlmStream
where
    F: FnMut(&str) -> Option<AppResult<LlmStreamChunk>> + Send + 'static,
{
    let mut decoder = SseDecoder::default();

    let stream = response.bytes_stream().flat_map(move |result| {
        let items: Vec<AppResult<LlmStreamChunk>> = match result {
            Ok(bytes) => decoder
                .push(&bytes)
                .iter()
                .filter_map(|data| parse(data))
                .collect(),
            Err(e) => vec![Err(AppError::Llm(format!("Stream error: {}", e)))],
        };
        futures::stream::iter(items)
    });

    Box::pin(stream)
}
