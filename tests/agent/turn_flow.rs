//! Turn loop behavior against a scripted provider.

use std::sync::Arc;

use stepchain::agent::history::{History, Role};
use stepchain::agent::protocol::{StepKind, parse_step};
use stepchain::agent::turn::{
    SilentObserver, TurnParams, TurnRunner, TurnStopReason,
};
use stepchain::tools::ToolRegistry;

use crate::support::{EchoTool, MockProvider, RecordingObserver};

fn runner_with_echo(max_steps: u32) -> TurnRunner {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    TurnRunner::new(Arc::new(registry), max_steps, "gpt-4o-mini".into(), 1.0)
}

fn runner_without_tools(max_steps: u32) -> TurnRunner {
    TurnRunner::new(Arc::new(ToolRegistry::new()), max_steps, "gpt-4o-mini".into(), 1.0)
}

#[tokio::test]
async fn direct_output_completes_in_one_step() {
    let provider = MockProvider::new(vec![r#"{"step":"OUTPUT","content":"42"}"#]);
    let mut history = History::new("sys", 0);
    let outcome = runner_without_tools(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "what is 6*7?",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, TurnStopReason::Completed);
    assert_eq!(outcome.final_text.as_deref(), Some("42"));
    assert_eq!(outcome.steps, 1);
    assert_eq!(outcome.tool_calls, 0);
    // system + user + assistant OUTPUT
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn start_plan_output_sequence_is_transcribed() {
    let provider = MockProvider::new(vec![
        r#"{"step":"START","content":"thinking about the question"}"#,
        r#"{"step":"PLAN","content":"first piece"}"#,
        r#"{"step":"PLAN","content":"second piece"}"#,
        r#"{"step":"OUTPUT","content":"done"}"#,
    ]);
    let mut history = History::new("sys", 0);
    let outcome = runner_without_tools(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "question",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.steps, 4);
    assert_eq!(outcome.final_text.as_deref(), Some("done"));

    let assistant_entries: Vec<&str> = history
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(assistant_entries.len(), 4);
    assert!(assistant_entries[0].contains(r#""step":"START""#));
    assert!(assistant_entries[1].contains(r#""step":"PLAN""#));
    assert!(assistant_entries[3].contains(r#""step":"OUTPUT""#));
}

#[tokio::test]
async fn tool_step_appends_developer_observation() {
    let provider = MockProvider::new(vec![
        r#"{"step":"TOOL","tool":"echo","input":"hi"}"#,
        r#"{"step":"OUTPUT","content":"said hi"}"#,
    ]);
    let mut history = History::new("sys", 0);
    let outcome = runner_with_echo(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "say hi",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.tool_calls, 1);
    let roles: Vec<Role> = history.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        [Role::System, Role::User, Role::Assistant, Role::Developer, Role::Assistant]
    );

    let developer = &history.messages()[3];
    let record = parse_step(&developer.content).unwrap();
    assert_eq!(record.step, StepKind::Observe);
    assert_eq!(record.tool.as_deref(), Some("echo"));
    assert_eq!(record.content.as_deref(), Some("echo: hi"));

    // The second request carried the observation back to the model.
    let second_request = provider.request(1);
    assert!(second_request.iter().any(|m| m.role == Role::Developer));
}

#[tokio::test]
async fn unknown_tool_becomes_observable_error() {
    let provider = MockProvider::new(vec![
        r#"{"step":"TOOL","tool":"nope","input":"x"}"#,
        r#"{"step":"OUTPUT","content":"recovered"}"#,
    ]);
    let mut history = History::new("sys", 0);
    let outcome = runner_with_echo(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "use a bad tool",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, TurnStopReason::Completed);
    let developer = history
        .messages()
        .iter()
        .find(|m| m.role == Role::Developer)
        .unwrap();
    let record = parse_step(&developer.content).unwrap();
    assert_eq!(record.content.as_deref(), Some("Tool not found: nope"));
}

#[tokio::test]
async fn step_limit_gives_up_with_diagnostic() {
    let provider = MockProvider::new(vec![
        r#"{"step":"PLAN","content":"still thinking"}"#,
        r#"{"step":"PLAN","content":"still thinking"}"#,
        r#"{"step":"PLAN","content":"still thinking"}"#,
    ]);
    let mut history = History::new("sys", 0);
    let outcome = runner_without_tools(3)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "loop forever",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, TurnStopReason::StepLimit);
    assert_eq!(outcome.steps, 3);
    assert!(outcome.final_text.is_none());
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn malformed_response_aborts_turn_but_not_session() {
    let provider = MockProvider::new(vec!["this is not json"]);
    let mut history = History::new("sys", 0);
    let outcome = runner_without_tools(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "hello",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    let TurnStopReason::Protocol(reason) = &outcome.stop_reason else {
        panic!("expected protocol stop, got {:?}", outcome.stop_reason);
    };
    assert!(!reason.is_empty());
    // The unparseable response is not transcribed.
    assert_eq!(history.len(), 2);

    // The same history carries a follow-up turn to completion.
    let retry = MockProvider::new(vec![r#"{"step":"OUTPUT","content":"better"}"#]);
    let outcome = runner_without_tools(32)
        .run(TurnParams {
            provider: &retry,
            history: &mut history,
            user_message: "try again",
            observer: &SilentObserver,
        })
        .await
        .unwrap();
    assert_eq!(outcome.final_text.as_deref(), Some("better"));
}

#[tokio::test]
async fn tool_step_without_input_is_a_protocol_stop() {
    let provider = MockProvider::new(vec![r#"{"step":"TOOL","tool":"echo"}"#]);
    let mut history = History::new("sys", 0);
    let outcome = runner_with_echo(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "bad tool call",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    let TurnStopReason::Protocol(reason) = &outcome.stop_reason else {
        panic!("expected protocol stop, got {:?}", outcome.stop_reason);
    };
    assert!(reason.contains("missing required field"));
    assert_eq!(outcome.tool_calls, 0);
}

#[tokio::test]
async fn every_request_carries_the_full_transcript() {
    let provider = MockProvider::new(vec![
        r#"{"step":"PLAN","content":"a"}"#,
        r#"{"step":"OUTPUT","content":"b"}"#,
    ]);
    let mut history = History::new("the system prompt", 0);
    runner_without_tools(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "question",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    let first = provider.request(0);
    assert_eq!(first[0].role, Role::System);
    assert_eq!(first[0].content, "the system prompt");
    assert_eq!(first[1].role, Role::User);

    let second = provider.request(1);
    assert_eq!(second.len(), 3);
    assert_eq!(second[2].role, Role::Assistant);
    assert!(second[2].content.contains(r#""step":"PLAN""#));
}

#[tokio::test]
async fn bounded_history_keeps_system_prompt() {
    let provider = MockProvider::new(vec![
        r#"{"step":"START","content":"1"}"#,
        r#"{"step":"PLAN","content":"2"}"#,
        r#"{"step":"PLAN","content":"3"}"#,
        r#"{"step":"PLAN","content":"4"}"#,
        r#"{"step":"PLAN","content":"5"}"#,
        r#"{"step":"PLAN","content":"6"}"#,
        r#"{"step":"OUTPUT","content":"7"}"#,
    ]);
    let mut history = History::new("sys", 8);
    let outcome = runner_without_tools(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "talk a lot",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, TurnStopReason::Completed);
    assert_eq!(history.len(), 8);
    assert_eq!(history.messages()[0].role, Role::System);
    assert_eq!(history.messages()[0].content, "sys");
}

#[tokio::test]
async fn model_emitted_observe_is_transcribed_and_skipped() {
    let provider = MockProvider::new(vec![
        r#"{"step":"OBSERVE","tool":"echo","content":"freelancing"}"#,
        r#"{"step":"OUTPUT","content":"ok"}"#,
    ]);
    let mut history = History::new("sys", 0);
    let outcome = runner_with_echo(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "odd model",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, TurnStopReason::Completed);
    assert_eq!(outcome.steps, 2);
    assert_eq!(outcome.tool_calls, 0);
    let assistant_observe = history
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .any(|m| m.content.contains(r#""step":"OBSERVE""#));
    assert!(assistant_observe);
}

#[tokio::test]
async fn output_without_content_completes_with_empty_text() {
    let provider = MockProvider::new(vec![r#"{"step":"OUTPUT"}"#]);
    let mut history = History::new("sys", 0);
    let outcome = runner_without_tools(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "silent finish",
            observer: &SilentObserver,
        })
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, TurnStopReason::Completed);
    assert_eq!(outcome.final_text.as_deref(), Some(""));
}

#[tokio::test]
async fn observer_sees_steps_and_tool_results_in_order() {
    let provider = MockProvider::new(vec![
        r#"{"step":"START","content":"s"}"#,
        r#"{"step":"TOOL","tool":"echo","input":"x"}"#,
        r#"{"step":"OUTPUT","content":"o"}"#,
    ]);
    let observer = RecordingObserver::default();
    let mut history = History::new("sys", 0);
    runner_with_echo(32)
        .run(TurnParams {
            provider: &provider,
            history: &mut history,
            user_message: "go",
            observer: &observer,
        })
        .await
        .unwrap();

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(
        events,
        ["step:START", "step:TOOL", "result:echo", "step:OUTPUT"]
    );
}
