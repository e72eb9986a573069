use crate::config::StatusTimings;
use crate::process::{ExternalProcess, ProcessError, ProcessRequest};
use crate::runtime::UiEvent;
use crate::shared::{ContinuationId, ProcessId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::Sender;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Running(String),
    Finished(String),
    Clear,
}

impl StatusUpdate {
    pub fn text(&self) -> &str {
        match self {
            StatusUpdate::Running(text) | StatusUpdate::Finished(text) => text,
            StatusUpdate::Clear => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDisposition {
    Completed,
    Killed,
    Untracked,
}

#[derive(Debug)]
struct TrackedProcess {
    process: ExternalProcess,
    continuation: ContinuationId,
}

/// Tracks in-flight processes as one batch and produces the status-bar
/// animation for it. All methods run on the engine's thread.
#[derive(Debug)]
pub struct ProcessSupervisor {
    timings: StatusTimings,
    tracked: BTreeMap<ProcessId, TrackedProcess>,
    killed: BTreeSet<ProcessId>,
    batch_open: bool,
    batch_killed: bool,
    longrun: bool,
    label: String,
    spinner: usize,
    finished: Option<String>,
    next_tick_at: Option<Instant>,
    clear_at: Option<Instant>,
}

impl ProcessSupervisor {
    pub fn new(timings: StatusTimings) -> Self {
        Self {
            timings,
            tracked: BTreeMap::new(),
            killed: BTreeSet::new(),
            batch_open: false,
            batch_killed: false,
            longrun: false,
            label: String::new(),
            spinner: 0,
            finished: None,
            next_tick_at: None,
            clear_at: None,
        }
    }

    pub fn launch(
        &mut self,
        id: ProcessId,
        continuation: ContinuationId,
        request: &ProcessRequest,
        events: &Sender<UiEvent>,
        now: Instant,
    ) -> Result<ProcessId, ProcessError> {
        let tx = events.clone();
        let process = ExternalProcess::spawn(request, move |outcome| {
            let _ = tx.send(UiEvent::ProcessExited {
                process: id,
                continuation,
                outcome,
            });
        })?;

        if self.tracked.is_empty() {
            if self.batch_open {
                self.close_batch();
            }
            self.batch_open = true;
            self.batch_killed = false;
            self.longrun = false;
            self.spinner = 0;
            self.next_tick_at = Some(now + self.timings.initial_delay());
        }
        self.label = request.command_line();
        self.tracked.insert(
            id,
            TrackedProcess {
                process,
                continuation,
            },
        );
        Ok(id)
    }

    pub fn finish(&mut self, id: ProcessId) -> ExitDisposition {
        if self.killed.remove(&id) {
            return ExitDisposition::Killed;
        }
        match self.tracked.remove(&id) {
            Some(tracked) if tracked.process.is_killed() => ExitDisposition::Killed,
            Some(_) => ExitDisposition::Completed,
            None => ExitDisposition::Untracked,
        }
    }

    /// Terminates every tracked process and returns the continuations that
    /// must no longer be resumed. The batch closes at once, so its "Killed!"
    /// status is shown on the next tick even if another batch starts first.
    /// With nothing tracked this is a no-op.
    pub fn kill_all(&mut self) -> Vec<ContinuationId> {
        if self.tracked.is_empty() {
            return Vec::new();
        }
        self.batch_killed = true;
        let tracked = std::mem::take(&mut self.tracked);
        let mut continuations = Vec::with_capacity(tracked.len());
        for (id, entry) in tracked {
            entry.process.kill();
            if entry.process.is_running() {
                self.killed.insert(id);
            }
            continuations.push(entry.continuation);
        }
        self.close_batch();
        continuations
    }

    pub fn tick(&mut self, now: Instant) -> Option<StatusUpdate> {
        if self.batch_open && self.tracked.is_empty() {
            self.close_batch();
        }
        if let Some(text) = self.finished.take() {
            self.clear_at = Some(now + self.timings.clear_after());
            return Some(StatusUpdate::Finished(text));
        }

        if !self.tracked.is_empty() {
            let due = self.next_tick_at.map(|at| now >= at).unwrap_or(false);
            if !due {
                return None;
            }
            self.longrun = true;
            self.spinner = (self.spinner + 1) % 4;
            self.clear_at = None;
            self.next_tick_at = Some(now + self.timings.tick_interval());
            return Some(StatusUpdate::Running(self.running_text()));
        }

        if self.clear_at.map(|at| now >= at).unwrap_or(false) {
            self.clear_at = None;
            return Some(StatusUpdate::Clear);
        }
        None
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.finished.is_some() || (self.batch_open && self.tracked.is_empty()) {
            return Some(Instant::now());
        }
        match (self.next_tick_at, self.clear_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.tracked.len()
    }

    pub fn batch_killed(&self) -> bool {
        self.batch_killed
    }

    /// Ends the current batch, staging its terminal status. Quick batches
    /// that were never animated end silently unless killed.
    fn close_batch(&mut self) {
        self.batch_open = false;
        self.next_tick_at = None;
        if self.batch_killed || self.longrun {
            let verdict = if self.batch_killed { "Killed!" } else { "Done!" };
            self.finished = Some(format!("{}: {verdict}", self.label));
        }
    }

    fn running_text(&self) -> String {
        let dots = ".".repeat(self.spinner);
        let pad = " ".repeat(3 - self.spinner);
        let extra = self.tracked.len().saturating_sub(1);
        if extra > 0 {
            format!("running[{}]{dots}{pad} (+{extra})", self.label)
        } else {
            format!("running[{}]{dots}{pad}", self.label)
        }
    }
}
