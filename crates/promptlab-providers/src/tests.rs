//! Snapshot tests for the streaming relay

#[cfg(test)]
mod snapshot_tests {
    use futures::{stream, StreamExt};
    use insta::assert_snapshot;

    use crate::sse::to_sse_frames;
    use crate::{collect_text, relay_events, Error, ProviderKind, Result, StreamEvent};

    fn payloads(items: &[&str]) -> impl futures::Stream<Item = Result<String>> + Send + 'static {
        let items: Vec<Result<String>> = items.iter().map(|s| Ok(s.to_string())).collect();
        stream::iter(items)
    }

    #[tokio::test]
    async fn test_openai_relay_frames() {
        let events = relay_events(
            ProviderKind::OpenAI,
            payloads(&[
                r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
                r#"{"choices":[{"delta":{"content":"Hello"}}]}"#,
                r#"{"choices":[{"delta":{"content":", world"}}]}"#,
                "[DONE]",
                r#"{"choices":[{"delta":{"content":"ignored"}}]}"#,
            ]),
        );

        let frames: Vec<String> = to_sse_frames(events).collect().await;
        assert_snapshot!(frames.concat().trim_end(), @r###"
        data: {"text":"Hello"}

        data: {"text":", world"}

        data: [DONE]
        "###);
    }

    #[tokio::test]
    async fn test_anthropic_relay_ends_once() {
        let events = relay_events(
            ProviderKind::Anthropic,
            payloads(&[
                r#"{"type":"message_start","message":{"id":"msg_1"}}"#,
                r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":"Hi"}}"#,
                r#"{"type":"message_stop"}"#,
            ]),
        );

        let collected: Vec<StreamEvent> = events.map(|e| e.unwrap()).collect().await;
        assert_eq!(
            collected,
            vec![StreamEvent::Delta("Hi".to_string()), StreamEvent::Done]
        );
    }

    #[tokio::test]
    async fn test_google_relay_appends_done_at_end_of_stream() {
        let events = relay_events(
            ProviderKind::Google,
            payloads(&[
                r#"{"candidates":[{"content":{"parts":[{"text":"One "}]}}]}"#,
                r#"{"candidates":[{"content":{"parts":[{"text":"two"}]}}]}"#,
            ]),
        );

        assert_eq!(collect_text(events).await.unwrap(), "One two");
    }

    #[tokio::test]
    async fn test_relay_stops_after_error() {
        let items: Vec<Result<String>> = vec![
            Ok(r#"{"choices":[{"delta":{"content":"partial"}}]}"#.to_string()),
            Err(Error::Network("connection reset".to_string())),
            Ok("[DONE]".to_string()),
        ];
        let events = relay_events(ProviderKind::OpenAI, stream::iter(items));

        let collected: Vec<Result<StreamEvent>> = events.collect().await;
        assert_eq!(collected.len(), 2);
        assert!(matches!(collected[1], Err(Error::Network(_))));
    }
}
