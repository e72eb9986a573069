#![cfg(unix)]

use commando::config::StatusTimings;
use commando::process::ProcessRequest;
use commando::runtime::{ExitDisposition, ProcessSupervisor, StatusUpdate, UiEvent};
use commando::shared::{ContinuationId, ProcessId};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

fn wait_exit(rx: &Receiver<UiEvent>) -> ProcessId {
    match rx.recv_timeout(Duration::from_secs(20)).expect("exit event") {
        UiEvent::ProcessExited { process, .. } => process,
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn idle_supervisor_has_nothing_to_kill_or_report() {
    let mut supervisor = ProcessSupervisor::new(StatusTimings::default());
    assert!(supervisor.kill_all().is_empty());
    assert_eq!(supervisor.tick(Instant::now()), None);
    assert_eq!(supervisor.next_deadline(), None);
    assert!(supervisor.is_idle());
}

#[test]
fn long_batch_animates_then_reports_killed_then_clears() {
    let (tx, rx) = mpsc::channel();
    let mut supervisor = ProcessSupervisor::new(StatusTimings::default());
    let now = Instant::now();
    let continuation = ContinuationId::new(4);
    supervisor
        .launch(
            ProcessId::new(1),
            continuation,
            &ProcessRequest::new(["sleep", "5"]),
            &tx,
            now,
        )
        .expect("launch");

    assert_eq!(supervisor.next_deadline(), Some(now + Duration::from_millis(500)));
    assert_eq!(supervisor.tick(now), None);
    assert_eq!(
        supervisor.tick(now + Duration::from_millis(600)),
        Some(StatusUpdate::Running("running[sleep 5].  ".to_string()))
    );
    assert_eq!(supervisor.tick(now + Duration::from_millis(650)), None);
    assert_eq!(
        supervisor.tick(now + Duration::from_millis(800)),
        Some(StatusUpdate::Running("running[sleep 5].. ".to_string()))
    );

    assert_eq!(supervisor.kill_all(), vec![continuation]);
    assert!(supervisor.batch_killed());
    assert!(supervisor.is_idle());

    let finished_at = now + Duration::from_millis(900);
    assert_eq!(
        supervisor.tick(finished_at),
        Some(StatusUpdate::Finished("sleep 5: Killed!".to_string()))
    );
    assert_eq!(supervisor.tick(finished_at + Duration::from_millis(2999)), None);
    assert_eq!(
        supervisor.tick(finished_at + Duration::from_millis(3000)),
        Some(StatusUpdate::Clear)
    );

    let exited = wait_exit(&rx);
    assert_ne!(supervisor.finish(exited), ExitDisposition::Completed);
}

#[test]
fn killed_status_survives_an_immediate_new_batch() {
    let (tx, rx) = mpsc::channel();
    let mut supervisor = ProcessSupervisor::new(StatusTimings::default());
    let now = Instant::now();
    supervisor
        .launch(
            ProcessId::new(1),
            ContinuationId::new(1),
            &ProcessRequest::new(["sleep", "5"]),
            &tx,
            now,
        )
        .expect("launch");
    assert!(matches!(
        supervisor.tick(now + Duration::from_millis(600)),
        Some(StatusUpdate::Running(_))
    ));

    assert_eq!(supervisor.kill_all(), vec![ContinuationId::new(1)]);
    supervisor
        .launch(
            ProcessId::new(2),
            ContinuationId::new(2),
            &ProcessRequest::new(["true"]),
            &tx,
            now + Duration::from_millis(650),
        )
        .expect("launch");
    assert!(!supervisor.batch_killed());

    let flushed_at = now + Duration::from_millis(700);
    assert_eq!(
        supervisor.tick(flushed_at),
        Some(StatusUpdate::Finished("sleep 5: Killed!".to_string()))
    );

    for _ in 0..2 {
        let exited = wait_exit(&rx);
        supervisor.finish(exited);
    }
    assert_eq!(supervisor.tick(flushed_at + Duration::from_millis(100)), None);
    assert_eq!(
        supervisor.tick(flushed_at + Duration::from_millis(3000)),
        Some(StatusUpdate::Clear)
    );
    assert_eq!(supervisor.next_deadline(), None);
}

#[test]
fn done_status_is_kept_when_the_next_batch_starts_before_a_tick() {
    let (tx, rx) = mpsc::channel();
    let timings = StatusTimings {
        initial_delay_ms: 0,
        tick_interval_ms: 10,
        clear_after_ms: 100,
    };
    let mut supervisor = ProcessSupervisor::new(timings);
    let now = Instant::now();
    supervisor
        .launch(
            ProcessId::new(1),
            ContinuationId::new(1),
            &ProcessRequest::new(["true"]),
            &tx,
            now,
        )
        .expect("launch");
    assert!(matches!(supervisor.tick(now), Some(StatusUpdate::Running(_))));
    let exited = wait_exit(&rx);
    assert_eq!(supervisor.finish(exited), ExitDisposition::Completed);

    supervisor
        .launch(
            ProcessId::new(2),
            ContinuationId::new(2),
            &ProcessRequest::new(["sleep", "5"]),
            &tx,
            now,
        )
        .expect("launch");
    assert_eq!(
        supervisor.tick(now),
        Some(StatusUpdate::Finished("true: Done!".to_string()))
    );
    assert_eq!(
        supervisor.tick(now + Duration::from_millis(10)),
        Some(StatusUpdate::Running("running[sleep 5].  ".to_string()))
    );
    supervisor.kill_all();
    let exited = wait_exit(&rx);
    assert_ne!(supervisor.finish(exited), ExitDisposition::Completed);
}

#[test]
fn quick_batch_finishes_without_status_text() {
    let (tx, rx) = mpsc::channel();
    let mut supervisor = ProcessSupervisor::new(StatusTimings::default());
    let now = Instant::now();
    supervisor
        .launch(
            ProcessId::new(1),
            ContinuationId::new(1),
            &ProcessRequest::new(["true"]),
            &tx,
            now,
        )
        .expect("launch");

    let exited = wait_exit(&rx);
    assert_eq!(supervisor.finish(exited), ExitDisposition::Completed);
    assert_eq!(supervisor.tick(now), None);
    assert_eq!(supervisor.tick(now + Duration::from_secs(10)), None);
    assert_eq!(supervisor.finish(exited), ExitDisposition::Untracked);
}

#[test]
fn long_batch_that_completes_reports_done() {
    let (tx, rx) = mpsc::channel();
    let timings = StatusTimings {
        initial_delay_ms: 0,
        tick_interval_ms: 10,
        clear_after_ms: 100,
    };
    let mut supervisor = ProcessSupervisor::new(timings);
    let now = Instant::now();
    supervisor
        .launch(
            ProcessId::new(1),
            ContinuationId::new(1),
            &ProcessRequest::new(["true"]),
            &tx,
            now,
        )
        .expect("launch");
    assert!(matches!(supervisor.tick(now), Some(StatusUpdate::Running(_))));

    let exited = wait_exit(&rx);
    assert_eq!(supervisor.finish(exited), ExitDisposition::Completed);
    assert_eq!(
        supervisor.tick(now),
        Some(StatusUpdate::Finished("true: Done!".to_string()))
    );
    assert_eq!(
        supervisor.tick(now + Duration::from_millis(100)),
        Some(StatusUpdate::Clear)
    );
}

#[test]
fn concurrent_processes_share_one_batch() {
    let (tx, rx) = mpsc::channel();
    let mut supervisor = ProcessSupervisor::new(StatusTimings::default());
    let now = Instant::now();
    for raw in 1..=2 {
        supervisor
            .launch(
                ProcessId::new(raw),
                ContinuationId::new(raw),
                &ProcessRequest::new(["sleep", "5"]),
                &tx,
                now,
            )
            .expect("launch");
    }
    assert_eq!(supervisor.running_count(), 2);
    assert_eq!(
        supervisor.tick(now + Duration::from_millis(500)),
        Some(StatusUpdate::Running("running[sleep 5].   (+1)".to_string()))
    );

    let mut killed = supervisor.kill_all();
    killed.sort();
    assert_eq!(killed, vec![ContinuationId::new(1), ContinuationId::new(2)]);
    for _ in 0..2 {
        let exited = wait_exit(&rx);
        assert_ne!(supervisor.finish(exited), ExitDisposition::Completed);
    }
}
