#![cfg(unix)]

use commando::config::{Settings, StatusTimings};
use commando::host::{HeadlessHost, Host};
use commando::pipeline::{
    Args, DispatchOutcome, Engine, Origin, PipelineContext, Step, StepDomain, StepError, StepName,
    StepOutcome, StepRegistry, Value,
};
use commando::shared::WindowId;
use serde_json::json;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

const WAIT: Duration = Duration::from_secs(20);

fn window() -> Origin {
    Origin::in_window(WindowId::new(1))
}

fn sh(script: &str) -> Step {
    Step::new("run-process").arg("cmd", json!(["/bin/sh", "-c", script]))
}

fn run(engine: &mut Engine<HeadlessHost>, steps: Vec<Step>) -> DispatchOutcome {
    let outcome = engine.start(window(), steps).expect("dispatch");
    assert!(engine.run_until_idle(WAIT), "pipeline did not settle");
    outcome
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize")
}

#[test]
fn process_output_feeds_the_next_step() {
    let mut engine = Engine::new(HeadlessHost::new(), Settings::default());
    let outcome = run(
        &mut engine,
        vec![sh("echo hello; echo warn >&2"), Step::new("show-panel")],
    );
    assert!(matches!(outcome, DispatchOutcome::Suspended(_)));
    assert_eq!(engine.host().panels(), vec!["hello\nwarn\n"]);
    assert!(engine.host().errors().is_empty());
    assert_eq!(engine.parked_count(), 0);
}

#[test]
fn pipeline_input_becomes_process_stdin() {
    let mut engine = Engine::new(HeadlessHost::new(), Settings::default());
    let mut context = engine.context(
        window(),
        vec![
            Step::new("run-process").arg("cmd", json!(["tr", "a-z", "A-Z"])),
            Step::new("show-panel"),
        ],
    );
    context.input = Value::list(["one", "two"]);
    engine.dispatch(context).expect("dispatch");
    assert!(engine.run_until_idle(WAIT));
    assert_eq!(engine.host().panels(), vec!["ONE\nTWO"]);
}

#[test]
fn nonzero_exit_reports_stderr_and_stops() {
    let mut engine = Engine::new(HeadlessHost::new(), Settings::default());
    run(
        &mut engine,
        vec![sh("echo partial; echo boom >&2; exit 2"), Step::new("show-panel")],
    );
    assert_eq!(engine.host().errors(), vec!["Error (2): boom\n"]);
    assert!(engine.host().panels().is_empty());
    assert!(engine.is_idle());
}

fn probe(
    engine: &mut Engine<HeadlessHost>,
    _context: &mut PipelineContext,
    input: Value,
    _args: &Args,
) -> Result<StepOutcome, StepError> {
    let json = input.to_json().to_string();
    engine.host_mut().show_panel(WindowId::new(1), "probe", &json);
    Ok(StepOutcome::Continue(input))
}

#[test]
fn keep_status_passes_the_exit_code_along() {
    let mut registry = StepRegistry::builtin();
    registry.register(StepName::Chain, StepDomain::Global, probe);
    let mut engine = Engine::with_registry(HeadlessHost::new(), Settings::default(), registry);
    run(
        &mut engine,
        vec![
            sh("echo out; exit 4").arg("keep_status", true),
            Step::new("chain"),
        ],
    );
    let recorded: serde_json::Value =
        serde_json::from_str(engine.host().panels()[0]).expect("probe json");
    assert_eq!(recorded, json!({"exit_code": 4, "content": "out\n"}));
    assert!(engine.host().errors().is_empty());
}

#[test]
fn spawn_failure_is_reported_as_exit_one() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("not-a-program");
    let mut engine = Engine::new(HeadlessHost::new(), Settings::default());
    let outcome = engine
        .start(
            window(),
            vec![
                Step::new("run-process").arg("cmd", missing.display().to_string()),
                Step::new("show-panel"),
            ],
        )
        .expect("dispatch");
    assert_eq!(
        outcome,
        DispatchOutcome::Halted {
            step: "run-process".to_string()
        }
    );
    let errors = engine.host().errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error (1): "));
    assert!(engine.is_idle());
}

#[test]
fn killing_the_batch_drops_waiting_pipelines() {
    let mut engine = Engine::new(HeadlessHost::new(), Settings::default());
    engine
        .start(
            window(),
            vec![
                Step::new("run-process").arg("cmd", json!(["sleep", "5"])),
                Step::new("show-panel").arg("input", "never"),
            ],
        )
        .expect("dispatch");
    assert!(!engine.run_until_idle(Duration::from_millis(100)));
    assert_eq!(engine.parked_count(), 1);

    let outcome = engine
        .start(window(), vec![Step::new("run-process").arg("kill", true)])
        .expect("kill");
    assert_eq!(
        outcome,
        DispatchOutcome::Halted {
            step: "run-process".to_string()
        }
    );
    assert_eq!(engine.parked_count(), 0);
    assert!(engine.run_until_idle(WAIT));

    assert!(engine.host().statuses().contains(&"sleep 5: Killed!"));
    // the killed child's exit event arrives later and must be ignored
    std::thread::sleep(Duration::from_millis(300));
    engine.process_pending();
    assert!(engine.host().panels().is_empty());
}

#[test]
fn kill_then_immediate_relaunch_still_reports_killed_and_clears() {
    let settings = Settings {
        status: StatusTimings {
            initial_delay_ms: 100,
            tick_interval_ms: 50,
            clear_after_ms: 100,
        },
        ..Settings::default()
    };
    let mut engine = Engine::new(HeadlessHost::new(), settings);
    engine
        .start(window(), vec![Step::new("run-process").arg("cmd", json!(["sleep", "5"]))])
        .expect("dispatch");
    assert!(!engine.run_until_idle(Duration::from_millis(300)));
    assert!(engine
        .host()
        .statuses()
        .iter()
        .all(|text| text.starts_with("running[sleep 5]")));

    engine
        .start(window(), vec![Step::new("run-process").arg("kill", true)])
        .expect("kill");
    engine
        .start(window(), vec![Step::new("run-process").arg("cmd", json!(["true"]))])
        .expect("relaunch");
    assert!(engine.run_until_idle(WAIT));
    for _ in 0..4 {
        engine.pump(Duration::from_millis(100));
    }

    let statuses = engine.host().statuses();
    assert!(statuses.contains(&"sleep 5: Killed!"), "{statuses:?}");
    assert_eq!(statuses.last(), Some(&""), "{statuses:?}");
}

#[test]
fn kill_without_running_processes_is_a_no_op() {
    let mut engine = Engine::new(HeadlessHost::new(), Settings::default());
    assert_eq!(engine.kill_processes(), 0);
    engine
        .start(window(), vec![Step::new("run-process").arg("kill", true)])
        .expect("kill");
    assert!(engine.run_until_idle(Duration::from_millis(200)));
    assert!(engine.host().statuses().is_empty());
}

#[test]
fn looped_processes_keep_their_own_cwd_and_env() {
    let first = tempdir().expect("first");
    let second = tempdir().expect("second");
    let mut engine = Engine::new(HeadlessHost::new(), Settings::default());
    let mut context = engine.context(
        window(),
        vec![Step::new("loop").arg(
            "commands",
            json!([
                ["run-process", {
                    "cmd": ["/bin/sh", "-c", "printf '%s|%s' \"$TAG\" \"$(pwd -P)\""],
                    "working_dir": "$input",
                    "env": {"TAG": "$input"}
                }],
                "show-panel"
            ]),
        )],
    );
    context.input = Value::list([
        first.path().display().to_string(),
        second.path().display().to_string(),
    ]);
    engine.dispatch(context).expect("dispatch");
    assert!(engine.run_until_idle(WAIT));

    let seen: BTreeSet<(PathBuf, PathBuf)> = engine
        .host()
        .panels()
        .iter()
        .map(|panel| {
            let (tag, cwd) = panel.split_once('|').expect("tag|cwd");
            (canonical(Path::new(tag)), canonical(Path::new(cwd)))
        })
        .collect();
    let expected: BTreeSet<(PathBuf, PathBuf)> = [first.path(), second.path()]
        .into_iter()
        .map(|dir| (canonical(dir), canonical(dir)))
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn processes_default_to_the_window_folder() {
    let folder = tempdir().expect("folder");
    let host = HeadlessHost::new().with_window(WindowId::new(1), vec![folder.path().to_path_buf()]);
    let mut engine = Engine::new(host, Settings::default());
    run(&mut engine, vec![sh("pwd -P"), Step::new("show-panel")]);
    let reported = engine.host().panels()[0].trim().to_string();
    assert_eq!(canonical(Path::new(&reported)), canonical(folder.path()));
}

#[test]
fn settings_env_applies_and_step_env_wins() {
    let mut settings = Settings::default();
    settings
        .env
        .insert("COMMANDO_FLAVOR".to_string(), "salt".to_string());
    let mut engine = Engine::new(HeadlessHost::new(), settings);
    run(
        &mut engine,
        vec![sh("printf '%s' \"$COMMANDO_FLAVOR\""), Step::new("show-panel")],
    );
    run(
        &mut engine,
        vec![
            sh("printf '%s' \"$COMMANDO_FLAVOR\"").arg("env", json!({"COMMANDO_FLAVOR": "pepper"})),
            Step::new("show-panel"),
        ],
    );
    assert_eq!(engine.host().panels(), vec!["salt", "pepper"]);
}

#[test]
fn long_running_batch_animates_and_reports_done() {
    let settings = Settings {
        status: StatusTimings {
            initial_delay_ms: 0,
            tick_interval_ms: 20,
            clear_after_ms: 50,
        },
        ..Settings::default()
    };
    let mut engine = Engine::new(HeadlessHost::new(), settings);
    run(&mut engine, vec![Step::new("run-process").arg("cmd", json!(["sleep", "0.3"]))]);

    let statuses = engine.host().statuses();
    assert!(statuses
        .iter()
        .any(|text| text.starts_with("running[sleep 0.3]")));
    assert!(statuses.contains(&"sleep 0.3: Done!"));
    assert!(!statuses.contains(&"sleep 0.3: Killed!"));
}

#[test]
fn active_origin_comes_from_the_host() {
    let host = HeadlessHost::new();
    let origin = host.active_origin();
    let mut engine = Engine::new(host, Settings::default());
    let context = engine.active_context(vec![sh("echo active"), Step::new("show-panel")]);
    assert_eq!(context.origin, origin);
    engine.dispatch(context).expect("dispatch");
    assert!(engine.run_until_idle(WAIT));
    assert_eq!(engine.host().panels(), vec!["active\n"]);
}
