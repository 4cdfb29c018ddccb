//! Integration tests for the netdoctor library.
//! The scripted tests run offline; the live test needs NETDOCTOR_LIVE_ENDPOINT.

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::Instant;
    use url::Url;

    use netdoctor::ingest::FILE_START_MARKER;
    use netdoctor::{
        AssistantConfig, ChatController, Error, HttpResponse, LocalFile, RequestOptions, Result,
        RetryPolicy, Role, SubmitOutcome, Transport, Turn,
    };

    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<HttpResponse>>>,
        calls: Mutex<Vec<Instant>>,
        bodies: Mutex<Vec<serde_json::Value>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<HttpResponse>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
                bodies: Mutex::new(Vec::new()),
            })
        }

        fn gaps(&self) -> Vec<Duration> {
            let calls = self.calls.lock().unwrap();
            calls.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, _: &Url, options: &RequestOptions) -> Result<HttpResponse> {
            self.calls.lock().unwrap().push(Instant::now());
            self.bodies
                .lock()
                .unwrap()
                .push(serde_json::from_slice(&options.body).unwrap());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::connection("script exhausted", None)))
        }
    }

    fn config(retry: RetryPolicy) -> Arc<AssistantConfig> {
        Arc::new(
            AssistantConfig::new(Url::parse("http://127.0.0.1:8787/").unwrap())
                .with_system_instruction("Eres un Net-Troubleshooter.")
                .with_greeting("Hola, describe el problema.")
                .with_retry(retry),
        )
    }

    fn candidate(text: &str) -> Result<HttpResponse> {
        let body = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        });
        Ok(HttpResponse::from_status_code(200, body.to_string()))
    }

    fn rate_limited() -> Result<HttpResponse> {
        Ok(HttpResponse::from_status_code(429, "Too Many Requests"))
    }

    fn assert_close(actual: Duration, expected: Duration) {
        let slack = Duration::from_millis(5);
        assert!(
            actual >= expected && actual <= expected + slack,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn controller_rides_out_rate_limiting() {
        let transport = ScriptedTransport::new(vec![
            rate_limited(),
            rate_limited(),
            candidate("Revisa la puerta de enlace."),
        ]);
        let mut chat =
            ChatController::with_transport(config(RetryPolicy::default()), Arc::clone(&transport));

        let outcome = chat.submit_text("No tengo salida a Internet").await;
        let SubmitOutcome::Replied(turn) = outcome else {
            panic!("expected a reply, got {outcome:?}");
        };
        assert_eq!(turn.text(), "Revisa la puerta de enlace.");
        assert_eq!(chat.turns().len(), 3);
        assert!(chat.phase().is_idle());

        let gaps = transport.gaps();
        assert_eq!(gaps.len(), 2);
        assert_close(gaps[0], Duration::from_millis(1000));
        assert_close(gaps[1], Duration::from_millis(2000));

        // Every attempt carries the same conversation.
        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 3);
        assert!(bodies.iter().all(|b| b == &bodies[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn controller_reports_exhausted_retries() {
        let transport = ScriptedTransport::new(vec![
            rate_limited(),
            rate_limited(),
            rate_limited(),
            rate_limited(),
        ]);
        let mut chat =
            ChatController::with_transport(config(RetryPolicy::default()), Arc::clone(&transport));

        let outcome = chat.submit_text("ping falla").await;
        let SubmitOutcome::Failed(err) = outcome else {
            panic!("expected a failure, got {outcome:?}");
        };
        assert!(err.is_rate_limit());
        assert_eq!(transport.calls.lock().unwrap().len(), 4);
        assert_eq!(chat.turns().len(), 2);
        assert_eq!(chat.turns()[1], Turn::user("ping falla"));
        let banner = chat.last_error().unwrap();
        assert!(banner.starts_with("Error al contactar al asistente."));
        assert!(banner.contains("429"));
    }

    #[tokio::test(start_paused = true)]
    async fn uploaded_file_reaches_the_assistant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.conf");
        std::fs::write(&path, "interface Gi0/1\n shutdown\n").unwrap();

        let transport = ScriptedTransport::new(vec![candidate("La interfaz está apagada.")]);
        let mut chat =
            ChatController::with_transport(config(RetryPolicy::no_retries()), Arc::clone(&transport));

        chat.set_input("Revisa esta configuración");
        chat.ingest(LocalFile::new(&path)).unwrap();
        assert!(chat.on_enter(false).await.is_replied());

        let sent = chat.turns()[1].clone();
        assert_eq!(sent.role, Role::User);
        assert!(sent.text().starts_with("Revisa esta configuración"));
        assert!(sent.text().contains(FILE_START_MARKER));
        assert!(sent.text().contains("(router.conf)"));
        assert!(sent.text().contains(" shutdown"));
        assert!(chat.input().is_empty());

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies[0]["contents"].as_array().unwrap().len(), 2);
        assert_eq!(
            bodies[0]["systemInstruction"]["parts"][0]["text"],
            "Eres un Net-Troubleshooter."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_upload_leaves_conversation_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.pcap");
        std::fs::write(&path, [0xd4, 0xc3, 0xb2, 0xa1]).unwrap();

        let transport = ScriptedTransport::new(vec![]);
        let mut chat =
            ChatController::with_transport(config(RetryPolicy::no_retries()), Arc::clone(&transport));
        chat.set_input("borrador");

        let err = chat.ingest(LocalFile::new(&path)).unwrap_err();
        assert!(err.is_unsupported_file_type());
        assert_eq!(chat.input(), "borrador");
        assert_eq!(chat.turns().len(), 1);
        assert!(chat.last_error().is_some());
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn live_endpoint_answers() {
        let Ok(endpoint) = std::env::var("NETDOCTOR_LIVE_ENDPOINT") else {
            eprintln!("Skipping test: NETDOCTOR_LIVE_ENDPOINT not set");
            return;
        };
        let config = AssistantConfig::from_defaults()
            .unwrap()
            .with_endpoint(Url::parse(&endpoint).unwrap());
        let mut chat = ChatController::new(Arc::new(config)).unwrap();
        let outcome = chat.submit_text("Responde solo con la palabra: listo").await;
        assert!(outcome.is_replied(), "live request failed: {outcome:?}");
    }
}
