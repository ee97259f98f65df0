use serde::Deserialize;

use crate::errors::ProviderError;
use crate::provider::{ProviderId, ToolCallDelta, UpstreamDelta};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..idx + delim_len);
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// One `chat.completion.chunk` payload, reduced to the fields the relay
/// consumes.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChunkToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChunkToolCall {
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<ChunkToolCallFunction>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkToolCallFunction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: String,
}

/// Maps one decoded SSE frame to zero or more normalized deltas.
///
/// `[DONE]`, role-only, finish-reason-only, and usage chunks carry nothing
/// the relay consumes and map to an empty list.
pub(crate) fn map_chunk_frame_to_deltas(
    provider: &ProviderId,
    frame: &SseFrame,
) -> Result<Vec<UpstreamDelta>, ProviderError> {
    let data = frame.data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(Vec::new());
    }
    let chunk: ChatChunk = serde_json::from_str(data).map_err(|e| {
        ProviderError::protocol(
            provider.clone(),
            format!("invalid chat completion chunk: {e}"),
        )
    })?;
    if let Some(error) = chunk.error {
        return Err(ProviderError::provider(
            provider.clone(),
            error.message,
            None,
        ));
    }

    let mut deltas = Vec::new();
    for choice in chunk.choices {
        if let Some(content) = choice.delta.content {
            deltas.push(UpstreamDelta::Text { text: content });
        }
        if let Some(tool_calls) = choice.delta.tool_calls {
            for call in tool_calls {
                let function = call.function.unwrap_or_default();
                deltas.push(UpstreamDelta::ToolCall {
                    delta: ToolCallDelta {
                        slot: call.index,
                        id: call.id,
                        name: function.name,
                        arguments: function.arguments,
                    },
                });
            }
        }
    }
    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(data: impl ToString) -> SseFrame {
        SseFrame {
            event: None,
            data: data.to_string(),
        }
    }

    #[test]
    fn sse_decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        let part1 = b"data: {\"choices\":[{\"delta\":{\"content\":\"hel";
        let part2 = b"lo\"}}]}\n\n";
        let frames1 = decoder.push_chunk(part1);
        assert!(frames1.is_empty());
        let frames2 = decoder.push_chunk(part2);
        assert_eq!(frames2.len(), 1);
        assert!(frames2[0].data.contains("hello"));
    }

    #[test]
    fn sse_decoder_accepts_crlf_delimiters() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"data: [DONE]\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "[DONE]");
    }

    #[test]
    fn content_chunk_maps_to_a_text_delta() {
        let provider = ProviderId::new("openai");
        let chunk = json!({"choices": [{"delta": {"content": "Hi"}}]});
        let deltas = map_chunk_frame_to_deltas(&provider, &frame(chunk)).expect("map");
        assert_eq!(deltas, vec![UpstreamDelta::Text { text: "Hi".into() }]);
    }

    #[test]
    fn tool_call_chunk_maps_slot_id_name_and_arguments() {
        let provider = ProviderId::new("openai");
        let chunk = json!({"choices": [{"delta": {"tool_calls": [{
            "index": 0,
            "id": "call_1",
            "function": {"name": "generate_ui", "arguments": ""}
        }]}}]});
        let deltas = map_chunk_frame_to_deltas(&provider, &frame(chunk)).expect("map");
        assert_eq!(
            deltas,
            vec![UpstreamDelta::ToolCall {
                delta: ToolCallDelta {
                    slot: 0,
                    id: Some("call_1".into()),
                    name: Some("generate_ui".into()),
                    arguments: Some(String::new()),
                },
            }]
        );
    }

    #[test]
    fn argument_continuation_chunk_carries_only_the_fragment() {
        let provider = ProviderId::new("openai");
        let chunk = json!({"choices": [{"delta": {"tool_calls": [{
            "index": 0,
            "function": {"arguments": "{\"component\":"}
        }]}}]});
        let deltas = map_chunk_frame_to_deltas(&provider, &frame(chunk)).expect("map");
        assert_eq!(
            deltas,
            vec![UpstreamDelta::ToolCall {
                delta: ToolCallDelta {
                    slot: 0,
                    id: None,
                    name: None,
                    arguments: Some("{\"component\":".into()),
                },
            }]
        );
    }

    #[test]
    fn done_and_bookkeeping_chunks_map_to_nothing() {
        let provider = ProviderId::new("openai");
        for data in [
            "[DONE]".to_string(),
            json!({"choices": [{"delta": {"role": "assistant"}}]}).to_string(),
            json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]}).to_string(),
            json!({"choices": [], "usage": {"total_tokens": 12}}).to_string(),
        ] {
            let deltas = map_chunk_frame_to_deltas(&provider, &frame(&data)).expect("map");
            assert!(deltas.is_empty(), "expected no deltas for {data}");
        }
    }

    #[test]
    fn in_stream_error_frame_becomes_a_provider_error() {
        let provider = ProviderId::new("openai");
        let chunk = json!({"error": {"message": "quota exceeded"}});
        let err = map_chunk_frame_to_deltas(&provider, &frame(chunk)).expect_err("should fail");
        assert!(matches!(err, ProviderError::Provider { .. }));
        assert_eq!(err.message(), "quota exceeded");
    }

    #[test]
    fn undecodable_frame_is_a_protocol_error() {
        let provider = ProviderId::new("openai");
        let err = map_chunk_frame_to_deltas(&provider, &frame("{not json")).expect_err("fail");
        assert!(matches!(err, ProviderError::Protocol { .. }));
    }
}
