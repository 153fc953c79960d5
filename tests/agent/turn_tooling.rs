//! Turn loop with the real tools: weather against a mock HTTP server,
//! shell against real processes.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stepchain::agent::history::{History, Role};
use stepchain::agent::protocol::{StepKind, parse_step};
use stepchain::agent::turn::{SilentObserver, TurnParams, TurnRunner, TurnStopReason};
use stepchain::tools::{ExecMode, ExecPolicy, ShellTool, ToolRegistry, WeatherTool};

use crate::support::MockProvider;

fn runner(registry: ToolRegistry) -> TurnRunner {
    TurnRunner::new(Arc::new(registry), 32, "gpt-4o-mini".into(), 1.0)
}

fn observation(history: &History) -> stepchain::agent::protocol::Step {
    let developer = history
        .messages()
        .iter()
        .find(|m| m.role == Role::Developer)
        .expect("no developer observation in transcript");
    parse_step(&developer.content).unwrap()
}

#[tokio::test]
async fn weather_tool_feeds_wrapped_report_to_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/delhi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Sunny +30°C"))
        .mount(&server)
        .await;

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WeatherTool::new(&server.uri()).unwrap()));

    let provider = MockProvider::new(vec![
        r#"{"step":"TOOL","tool":"get_weather","input":"Delhi"}"#,
        r#"{"step":"OUTPUT","content":"The current weather in Delhi is: Sunny +30°C"}"#,
    ]);
    let mut history = History::new("sys", 0);
    let outcome = runner(registry)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "What is the weather in Delhi?",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, TurnStopReason::Completed);
    let record = observation(&history);
    assert_eq!(record.step, StepKind::Observe);
    assert_eq!(record.tool.as_deref(), Some("get_weather"));
    assert_eq!(
        record.content.as_deref(),
        Some("The current weather in Delhi is: Sunny +30°C")
    );
}

#[tokio::test]
async fn weather_failure_reports_fixed_sentence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WeatherTool::new(&server.uri()).unwrap()));

    let provider = MockProvider::new(vec![
        r#"{"step":"TOOL","tool":"get_weather","input":"Atlantis"}"#,
        r#"{"step":"OUTPUT","content":"no data"}"#,
    ]);
    let mut history = History::new("sys", 0);
    runner(registry)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "weather in Atlantis",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    let record = observation(&history);
    assert_eq!(
        record.content.as_deref(),
        Some("Sorry, I couldn't retrieve the weather information right now.")
    );
}

#[tokio::test]
async fn shell_tool_reports_exit_code_and_output() {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ShellTool::new(ExecPolicy::allow_all())));

    let provider = MockProvider::new(vec![
        r#"{"step":"TOOL","tool":"run_cmd","input":"echo hi"}"#,
        r#"{"step":"OUTPUT","content":"printed hi"}"#,
    ]);
    let mut history = History::new("sys", 0);
    let outcome = runner(registry)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "run echo hi",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.tool_calls, 1);
    let record = observation(&history);
    assert_eq!(record.content.as_deref(), Some("Exit code: 0\nOutput: hi\n"));
}

#[tokio::test]
async fn denied_shell_command_never_spawns() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let command = format!("touch {}", marker.display());

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ShellTool::new(ExecPolicy {
        mode: ExecMode::Deny,
        ..Default::default()
    })));

    let tool_step = format!(r#"{{"step":"TOOL","tool":"run_cmd","input":"{command}"}}"#);
    let provider = MockProvider::new(vec![
        tool_step.as_str(),
        r#"{"step":"OUTPUT","content":"could not run it"}"#,
    ]);
    let mut history = History::new("sys", 0);
    runner(registry)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "touch a file",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    let record = observation(&history);
    assert!(record
        .content
        .as_deref()
        .unwrap()
        .starts_with("Command blocked by execution policy:"));
    assert!(!marker.exists(), "blocked command still ran");
}

#[tokio::test]
async fn allowlist_gates_shell_commands() {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ShellTool::new(ExecPolicy {
        mode: ExecMode::Allow,
        allowed_commands: vec!["echo".into()],
    })));

    let blocked = registry.execute("run_cmd", "rm -rf /tmp/nope").await.unwrap();
    assert!(blocked.starts_with("Command blocked by execution policy:"));
    assert!(blocked.contains("not in allowlist"));

    let allowed = registry.execute("run_cmd", "echo ok").await.unwrap();
    assert_eq!(allowed, "Exit code: 0\nOutput: ok\n");
}
