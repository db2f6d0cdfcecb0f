//! 编排器集成测试：重试、工具调度与并发上限

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chat_core::core::{FixedClock, WorkerPool, INVALID_RESPONSE_MARKER};
    use chat_core::llm::{Agent, ScriptedAgent};
    use chat_core::react::PARSE_FAILURE_APOLOGY;
    use chat_core::tools::Tool;
    use chat_core::{Orchestrator, OrchestratorBuilder, FALLBACK_MESSAGE};
    use chrono::NaiveDate;

    /// 记录每次输入的工具
    struct RecordingTool {
        name: &'static str,
        output: Result<String, String>,
        inputs: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingTool {
        fn new(name: &'static str, output: Result<&str, &str>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let inputs = Arc::new(Mutex::new(Vec::new()));
            let tool = Self {
                name,
                output: output.map(str::to_string).map_err(str::to_string),
                inputs: inputs.clone(),
            };
            (tool, inputs)
        }
    }

    impl Tool for RecordingTool {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&self, input: &str) -> Result<String, String> {
            self.inputs.lock().unwrap().push(input.to_string());
            self.output.clone()
        }
    }

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        ))
    }

    fn orchestrator(agent: Arc<dyn Agent>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(agent).with_clock(fixed_clock())
    }

    fn invalid(text: &str) -> String {
        format!("{} {}", INVALID_RESPONSE_MARKER, text)
    }

    #[tokio::test]
    async fn test_valid_reply_on_first_attempt() {
        let agent = Arc::new(ScriptedAgent::replies(["Hello\nworld"]));
        let o = orchestrator(agent.clone()).build();

        assert_eq!(o.get_response("hi").await, "Hello\\nworld");
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_timestamp() {
        let agent = Arc::new(ScriptedAgent::new(vec![
            Ok(invalid("1")),
            Ok("fine".to_string()),
        ]));
        let o = orchestrator(agent.clone()).build();

        assert_eq!(o.get_response("what day is it").await, "fine");
        let expected = "what day is it (Current time: 2025-06-01 09:00:00)";
        assert_eq!(agent.prompts(), vec![expected, expected]);
    }

    #[tokio::test]
    async fn test_recovers_on_third_attempt() {
        let agent = Arc::new(ScriptedAgent::new(vec![
            Ok(invalid("first")),
            Ok(invalid("second")),
            Ok("third time lucky".to_string()),
        ]));
        let o = orchestrator(agent.clone()).build();

        assert_eq!(o.get_response("hi").await, "third time lucky");
        assert_eq!(agent.calls(), 3);
    }

    #[tokio::test]
    async fn test_fallback_after_exhausting_attempts() {
        let agent = Arc::new(ScriptedAgent::replies([invalid("always")]));
        let o = orchestrator(agent.clone()).build();

        assert_eq!(
            o.get_response("hi").await,
            "Sorry, I couldn't generate a valid response. Please try again."
        );
        assert_eq!(o.get_response("hi").await, FALLBACK_MESSAGE);
        assert_eq!(agent.calls(), 6);
    }

    #[tokio::test]
    async fn test_agent_errors_and_empty_replies_are_retried() {
        let agent = Arc::new(ScriptedAgent::new(vec![
            Err("connection reset".to_string()),
            Ok(String::new()),
            Ok("recovered".to_string()),
        ]));
        let o = orchestrator(agent.clone()).build();

        assert_eq!(o.get_response("hi").await, "recovered");
        assert_eq!(agent.calls(), 3);
    }

    #[tokio::test]
    async fn test_configured_attempt_budget() {
        let agent = Arc::new(ScriptedAgent::replies([""]));
        let o = orchestrator(agent.clone()).with_max_attempts(5).build();

        assert_eq!(o.get_response("hi").await, FALLBACK_MESSAGE);
        assert_eq!(agent.calls(), 5);
    }

    #[tokio::test]
    async fn test_tool_instruction_is_dispatched() {
        let agent = Arc::new(ScriptedAgent::replies([
            r#"Here: {"action": "search", "action_input": "weather"}"#,
        ]));
        let (search, inputs) = RecordingTool::new("search", Ok("sunny"));
        let o = orchestrator(agent.clone()).with_tool(search).build();

        assert_eq!(o.get_response("weather?").await, "✅ Tool executed: sunny");
        assert_eq!(*inputs.lock().unwrap(), vec!["weather".to_string()]);
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_tool_result_bypasses_validity_check() {
        let agent = Arc::new(ScriptedAgent::replies([
            r#"{"action": "table", "action_input": "q1"}"#,
        ]));
        let (table, _) = RecordingTool::new("table", Ok(INVALID_RESPONSE_MARKER));
        let o = orchestrator(agent.clone()).with_tool(table).build();

        assert_eq!(
            o.get_response("numbers").await,
            format!("✅ Tool executed: {}", INVALID_RESPONSE_MARKER)
        );
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_falls_through_to_agent_text() {
        let reply = r#"Calling {"action": "unknown_tool", "action_input": "x"}"#;
        let agent = Arc::new(ScriptedAgent::replies([reply]));
        let (search, inputs) = RecordingTool::new("search", Ok("sunny"));
        let o = orchestrator(agent.clone()).with_tool(search).build();

        assert_eq!(o.get_response("hi").await, reply);
        assert!(inputs.lock().unwrap().is_empty());
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_tool_falls_through_to_agent_text() {
        let reply = r#"{"action": "gmail", "action_input": "inbox"}"#;
        let agent = Arc::new(ScriptedAgent::replies([reply]));
        let (gmail, inputs) = RecordingTool::new("gmail", Err("oauth token expired"));
        let o = orchestrator(agent.clone()).with_tool(gmail).build();

        assert_eq!(o.get_response("check mail").await, reply);
        assert_eq!(inputs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unbalanced_braces_skip_dispatch() {
        let reply = r#"Trying {"action": "search", "action_input": "weather""#;
        let agent = Arc::new(ScriptedAgent::replies([reply]));
        let (search, inputs) = RecordingTool::new("search", Ok("sunny"));
        let o = orchestrator(agent.clone()).with_tool(search).build();

        assert_eq!(o.get_response("hi").await, reply);
        assert!(inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multiline_instruction_is_not_dispatched_after_escaping() {
        // 换行先被转义为字面量 \n，花括号片段不再是合法 JSON
        let reply = "{\"action\": \"search\",\n\"action_input\": \"weather\"}";
        let agent = Arc::new(ScriptedAgent::replies([reply]));
        let (search, inputs) = RecordingTool::new("search", Ok("sunny"));
        let o = orchestrator(agent.clone()).with_tool(search).build();

        assert_eq!(
            o.get_response("hi").await,
            "{\"action\": \"search\",\\n\"action_input\": \"weather\"}"
        );
        assert!(inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_marker_yields_apology() {
        let agent = Arc::new(ScriptedAgent::replies([
            "Thought: I should email\nObservation: Invalid Format",
        ]));
        let o = orchestrator(agent.clone()).build();

        assert_eq!(o.get_response("send mail").await, PARSE_FAILURE_APOLOGY);
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_panicking_agent_resolves_to_text() {
        let agent = |_: &str| -> Result<String, String> { panic!("segfault in model runtime") };
        let o = orchestrator(Arc::new(agent)).build();

        assert_eq!(o.get_response("hi").await, FALLBACK_MESSAGE);
    }

    /// 统计同时执行的调用数峰值
    struct SlowAgent {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Agent for SlowAgent {
        fn run(&self, prompt: &str) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("done: {}", prompt))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_respect_pool_capacity() {
        let agent = Arc::new(SlowAgent {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        });
        let pool = Arc::new(WorkerPool::new(5, None));
        let o: Arc<Orchestrator> = Arc::new(
            orchestrator(agent.clone())
                .with_pool(pool.clone())
                .build(),
        );

        let mut handles = Vec::new();
        for i in 0..10 {
            let o = o.clone();
            handles.push(tokio::spawn(async move {
                o.get_response(&format!("message {}", i)).await
            }));
        }
        for h in handles {
            let reply = h.await.unwrap();
            assert!(reply.starts_with("done: message "));
        }

        assert_eq!(agent.calls.load(Ordering::SeqCst), 10);
        assert!(agent.peak.load(Ordering::SeqCst) <= 5);
        assert_eq!(pool.in_flight(), 0);
    }

    /// 只在前一次调用结束后才会被再次调用时 peak 为 1
    struct HungAgent {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl HungAgent {
        fn new() -> Self {
            Self {
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Agent for HungAgent {
        fn run(&self, _prompt: &str) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(400));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok("too late".to_string())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_agent_call_is_not_retried() {
        let agent = Arc::new(HungAgent::new());
        let pool = Arc::new(WorkerPool::new(5, Some(Duration::from_millis(30))));
        let o = orchestrator(agent.clone()).with_pool(pool.clone()).build();

        assert_eq!(o.get_response("hi").await, FALLBACK_MESSAGE);
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
        assert_eq!(agent.peak.load(Ordering::SeqCst), 1);
        assert!(pool.in_flight() <= 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(pool.in_flight(), 0);
    }

    struct HungTool;

    impl Tool for HungTool {
        fn name(&self) -> &str {
            "calendar"
        }

        fn run(&self, _input: &str) -> Result<String, String> {
            std::thread::sleep(Duration::from_millis(400));
            Ok("busy".to_string())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_tool_with_invalid_text_is_not_retried() {
        let reply = format!(
            r#"{{"action": "calendar", "action_input": "{}"}}"#,
            INVALID_RESPONSE_MARKER
        );
        let agent = Arc::new(ScriptedAgent::replies([reply]));
        let pool = Arc::new(WorkerPool::new(5, Some(Duration::from_millis(30))));
        let o = orchestrator(agent.clone())
            .with_pool(pool)
            .with_tool(HungTool)
            .build();

        assert_eq!(o.get_response("meetings").await, FALLBACK_MESSAGE);
        assert_eq!(agent.calls(), 1);
    }

    /// 收集日志输出
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_retry_warning_only_when_another_attempt_follows() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let agent = Arc::new(ScriptedAgent::replies([invalid("always")]));
        let o = orchestrator(agent.clone()).build();
        assert_eq!(o.get_response("hi").await, FALLBACK_MESSAGE);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("retrying (1/3)"));
        assert!(output.contains("retrying (2/3)"));
        assert!(!output.contains("retrying (3/3)"));
        assert_eq!(output.matches("Retry budget exhausted").count(), 1);
    }
}
