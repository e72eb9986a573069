use crate::config::Settings;
use crate::host::{CloseResponder, Host, InputResponder, PickerResponder};
use crate::pipeline::continuation::Parked;
use crate::pipeline::substitution::substitute_args;
use crate::pipeline::{
    DispatchOutcome, Origin, PipelineContext, PipelineError, Step, StepDomain, StepOutcome,
    StepRegistry, Suspension, Value,
};
use crate::process::{ProcessError, ProcessOutcome, ProcessRequest};
use crate::runtime::{ExitDisposition, ProcessSupervisor, UiEvent};
use crate::shared::{ContextId, ContinuationId, EngineLog, IdAllocator, ProcessId};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

const IDLE_POLL: Duration = Duration::from_millis(50);

/// Owns the host, the process supervisor and every parked pipeline. All
/// methods run on the host's UI thread; worker threads and host callbacks
/// only talk to it through [`UiEvent`]s.
pub struct Engine<H> {
    host: H,
    settings: Settings,
    registry: StepRegistry<H>,
    supervisor: ProcessSupervisor,
    parked: BTreeMap<ContinuationId, Parked>,
    in_flight: BTreeSet<ContextId>,
    ids: IdAllocator,
    events_tx: Sender<UiEvent>,
    events_rx: Receiver<UiEvent>,
    log: EngineLog,
}

impl<H: Host> Engine<H> {
    pub fn new(host: H, settings: Settings) -> Self {
        Self::with_registry(host, settings, StepRegistry::builtin())
    }

    pub fn with_registry(host: H, settings: Settings, registry: StepRegistry<H>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let log = settings
            .log_file
            .clone()
            .map(EngineLog::to_file)
            .unwrap_or_default();
        Self {
            host,
            supervisor: ProcessSupervisor::new(settings.status),
            settings,
            registry,
            parked: BTreeMap::new(),
            in_flight: BTreeSet::new(),
            ids: IdAllocator::default(),
            events_tx,
            events_rx,
            log,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    pub fn log(&self) -> &EngineLog {
        &self.log
    }

    pub fn context(&mut self, origin: Origin, steps: Vec<Step>) -> PipelineContext {
        PipelineContext::new(self.ids.next(), origin, steps)
    }

    pub fn active_context(&mut self, steps: Vec<Step>) -> PipelineContext {
        let origin = self.host.active_origin();
        self.context(origin, steps)
    }

    pub fn fork(&mut self, parent: &PipelineContext, input: Value, steps: Vec<Step>) -> PipelineContext {
        parent.fork(self.ids.next(), input, steps)
    }

    pub fn start(
        &mut self,
        origin: Origin,
        steps: Vec<Step>,
    ) -> Result<DispatchOutcome, PipelineError> {
        let context = self.context(origin, steps);
        self.log.append(
            "info",
            "pipeline.started",
            &format!("{} with {} step(s)", context.id(), context.steps().len()),
        );
        self.dispatch(context)
    }

    /// Runs steps off the front of the queue until it is empty, a step halts,
    /// or a step parks the context waiting for a host or process event.
    pub fn dispatch(
        &mut self,
        context: PipelineContext,
    ) -> Result<DispatchOutcome, PipelineError> {
        let id = context.id();
        if !self.in_flight.insert(id) {
            let err = PipelineError::Reentrant { context_id: id };
            self.log.append("error", "pipeline.reentrant", &err.to_string());
            return Err(err);
        }
        let result = self.drive(context);
        self.in_flight.remove(&id);
        result
    }

    fn drive(&mut self, mut context: PipelineContext) -> Result<DispatchOutcome, PipelineError> {
        while let Some(step) = context.pop_step() {
            let registration = match self.registry.resolve(&step.name) {
                Ok(registration) => registration,
                Err(err) => {
                    self.log
                        .append("error", "pipeline.unknown_step", &err.to_string());
                    return Err(err);
                }
            };
            if let Err(err) = self.check_domain(&step.name, registration.domain, context.origin) {
                self.log
                    .append("error", "pipeline.context_error", &err.to_string());
                return Err(err);
            }

            let mut merged = context.args.clone();
            merged.extend(step.args.clone());
            let file_name = self.origin_file_name(context.origin);
            let args = substitute_args(&merged, &context.input, file_name.as_deref());
            context.set_declared(&step);
            let input = match args.get("input").filter(|_| context.declares("input")) {
                Some(value) => Value::from_json(value),
                None => std::mem::take(&mut context.input),
            };

            match (registration.handler)(self, &mut context, input, &args) {
                Ok(StepOutcome::Continue(value)) => context.input = value,
                Ok(StepOutcome::Halt) => {
                    self.log.append(
                        "debug",
                        "pipeline.halted",
                        &format!("{} halted at `{}`", context.id(), step.name),
                    );
                    return Ok(DispatchOutcome::Halted { step: step.name });
                }
                Ok(StepOutcome::Suspend(continuation, suspension)) => {
                    self.log.append(
                        "debug",
                        "pipeline.suspended",
                        &format!(
                            "{} parked on {} at `{}` as {continuation}",
                            context.id(),
                            suspension.kind(),
                            step.name
                        ),
                    );
                    self.parked.insert(
                        continuation,
                        Parked {
                            context,
                            suspension,
                        },
                    );
                    return Ok(DispatchOutcome::Suspended(continuation));
                }
                Err(err) => {
                    self.log.append("debug", "step.halted", &err.to_string());
                    return Ok(DispatchOutcome::Halted { step: step.name });
                }
            }
        }
        Ok(DispatchOutcome::Completed(context))
    }

    fn check_domain(
        &self,
        step: &str,
        domain: StepDomain,
        origin: Origin,
    ) -> Result<(), PipelineError> {
        let context_error = |reason: String| PipelineError::Context {
            step: step.to_string(),
            reason,
        };
        if domain == StepDomain::Global {
            return Ok(());
        }
        let Some(window) = origin.window else {
            return Err(context_error("origin has no window".to_string()));
        };
        if !self.host.window_exists(window) {
            return Err(context_error(format!("{window} is not open")));
        }
        if domain == StepDomain::View {
            let Some(view) = origin.view else {
                return Err(context_error("origin has no view".to_string()));
            };
            if !self.host.view_exists(window, view) {
                return Err(context_error(format!("{view} is not open in {window}")));
            }
        }
        Ok(())
    }

    fn origin_file_name(&self, origin: Origin) -> Option<String> {
        let (Some(window), Some(view)) = (origin.window, origin.view) else {
            return None;
        };
        self.host
            .view_file_name(window, view)
            .map(|path| path.to_string_lossy().into_owned())
    }

    /// Directory a process started from `origin` runs in: the window folder
    /// holding the view's file, else the first window folder, else the
    /// file's own directory.
    pub fn working_dir(&self, origin: Origin) -> Option<PathBuf> {
        let window = origin.window?;
        let file = origin
            .view
            .and_then(|view| self.host.view_file_name(window, view));
        let folders = self.host.window_folders(window);
        if let Some(file) = &file {
            if let Some(folder) = folders.iter().find(|folder| file.starts_with(folder)) {
                return Some(folder.clone());
            }
        }
        if let Some(folder) = folders.first() {
            return Some(folder.clone());
        }
        file.and_then(|file| file.parent().map(Path::to_path_buf))
    }

    pub fn next_continuation(&mut self) -> ContinuationId {
        self.ids.next()
    }

    pub fn picker_responder(&self, continuation: ContinuationId) -> PickerResponder {
        PickerResponder::new(continuation, self.events_tx.clone())
    }

    pub fn input_responder(&self, continuation: ContinuationId) -> InputResponder {
        InputResponder::new(continuation, self.events_tx.clone())
    }

    pub fn close_responder(&self, continuation: ContinuationId) -> CloseResponder {
        CloseResponder::new(continuation, self.events_tx.clone())
    }

    pub fn launch_process(
        &mut self,
        continuation: ContinuationId,
        request: &ProcessRequest,
    ) -> Result<ProcessId, ProcessError> {
        let id: ProcessId = self.ids.next();
        self.supervisor
            .launch(id, continuation, request, &self.events_tx, Instant::now())?;
        self.log.append(
            "info",
            "process.spawned",
            &format!("{id} `{}` for {continuation}", request.command_line()),
        );
        Ok(id)
    }

    /// Kills the running batch. Contexts waiting on those processes are
    /// dropped so no continuation runs for them.
    pub fn kill_processes(&mut self) -> usize {
        let continuations = self.supervisor.kill_all();
        for continuation in &continuations {
            self.parked.remove(continuation);
        }
        if !continuations.is_empty() {
            self.log.append(
                "info",
                "process.killed",
                &format!("killed {} process(es)", continuations.len()),
            );
        }
        continuations.len()
    }

    pub fn parked_count(&self) -> usize {
        self.parked.len()
    }

    pub fn is_parked(&self, continuation: ContinuationId) -> bool {
        self.parked.contains_key(&continuation)
    }

    pub fn is_idle(&self) -> bool {
        self.parked.is_empty() && self.supervisor.is_idle()
    }

    /// Handles one marshalled event. Errors are logged and never escape.
    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::ProcessExited {
                process,
                continuation,
                outcome,
            } => self.on_process_exit(process, continuation, outcome),
            UiEvent::PickerDone {
                continuation,
                index,
            } => {
                let Some(Parked {
                    mut context,
                    suspension,
                }) = self.take_parked(continuation)
                else {
                    return;
                };
                let (items, on_done) = match suspension {
                    Suspension::Picker { items, on_done, .. } => (items, on_done),
                    other => {
                        self.log_mismatch(continuation, "picker", &other);
                        return;
                    }
                };
                let Some(item) = index.and_then(|index| items.get(index).cloned()) else {
                    self.log.append(
                        "debug",
                        "picker.dismissed",
                        &format!("{} dropped", context.id()),
                    );
                    return;
                };
                context.input = item;
                context.replace_steps(on_done);
                self.resume(context);
            }
            UiEvent::PickerHighlighted {
                continuation,
                index,
            } => {
                let fork = match self.parked.get(&continuation) {
                    Some(Parked {
                        context,
                        suspension:
                            Suspension::Picker {
                                items,
                                on_highlight: Some(steps),
                                ..
                            },
                    }) => items
                        .get(index)
                        .map(|item| (context.clone(), item.clone(), steps.clone())),
                    _ => None,
                };
                if let Some((parent, item, steps)) = fork {
                    let child = self.fork(&parent, item, steps);
                    self.resume(child);
                }
            }
            UiEvent::InputDone { continuation, text } => {
                let Some(Parked {
                    mut context,
                    suspension,
                }) = self.take_parked(continuation)
                else {
                    return;
                };
                let on_done = match suspension {
                    Suspension::Prompt { on_done, .. } => on_done,
                    other => {
                        self.log_mismatch(continuation, "prompt", &other);
                        return;
                    }
                };
                if text.is_empty() {
                    self.log.append(
                        "debug",
                        "prompt.empty",
                        &format!("{} dropped", context.id()),
                    );
                    return;
                }
                context.input = Value::Text(text);
                context.replace_steps(on_done);
                self.resume(context);
            }
            UiEvent::InputChanged { continuation, text } => {
                if text.is_empty() {
                    return;
                }
                let fork = match self.parked.get(&continuation) {
                    Some(Parked {
                        context,
                        suspension:
                            Suspension::Prompt {
                                on_change: Some(steps),
                                ..
                            },
                    }) => Some((context.clone(), steps.clone())),
                    _ => None,
                };
                if let Some((parent, steps)) = fork {
                    let child = self.fork(&parent, Value::Text(text), steps);
                    self.resume(child);
                }
            }
            UiEvent::InputCancelled { continuation } => {
                let Some(Parked {
                    mut context,
                    suspension,
                }) = self.take_parked(continuation)
                else {
                    return;
                };
                match suspension {
                    Suspension::Prompt {
                        on_cancel: Some(steps),
                        ..
                    } => {
                        context.input = Value::Empty;
                        context.replace_steps(steps);
                        self.resume(context);
                    }
                    Suspension::Prompt { .. } => {}
                    other => self.log_mismatch(continuation, "prompt", &other),
                }
            }
            UiEvent::BufferClosed {
                continuation,
                contents,
            } => {
                let Some(Parked {
                    context,
                    suspension,
                }) = self.take_parked(continuation)
                else {
                    return;
                };
                let on_close = match suspension {
                    Suspension::BufferClose { on_close } => on_close,
                    other => {
                        self.log_mismatch(continuation, "buffer_close", &other);
                        return;
                    }
                };
                let child = self.fork(&context, Value::Text(contents), on_close);
                self.resume(child);
            }
            UiEvent::Released { continuation } => {
                if let Some(parked) = self.parked.remove(&continuation) {
                    self.log.append(
                        "debug",
                        "continuation.released",
                        &format!(
                            "{continuation} released; {} dropped",
                            parked.context.id()
                        ),
                    );
                }
            }
        }
    }

    fn on_process_exit(
        &mut self,
        process: ProcessId,
        continuation: ContinuationId,
        outcome: ProcessOutcome,
    ) {
        for diagnostic in &outcome.diagnostics {
            self.log
                .append("warn", "process.decode_error", &format!("{process}: {diagnostic}"));
        }
        match self.supervisor.finish(process) {
            ExitDisposition::Completed => {}
            ExitDisposition::Killed | ExitDisposition::Untracked => {
                self.parked.remove(&continuation);
                self.log.append(
                    "debug",
                    "process.exit",
                    &format!("{process} exited after kill; {continuation} dropped"),
                );
                return;
            }
        }
        self.log.append(
            "info",
            "process.exit",
            &format!("{process} exited with {}", outcome.exit_code),
        );

        let Some(Parked {
            mut context,
            suspension,
        }) = self.take_parked(continuation)
        else {
            return;
        };
        let keep_status = match suspension {
            Suspension::Process { keep_status } => keep_status,
            other => {
                self.log_mismatch(continuation, "process", &other);
                return;
            }
        };

        if keep_status {
            context.input = Value::ProcessResult {
                exit_code: outcome.exit_code,
                content: outcome.combined_output(),
            };
        } else if outcome.exit_code != 0 {
            let err = ProcessError::NonZeroExit {
                exit_code: outcome.exit_code,
                stderr: outcome.stderr,
            };
            self.log.append("warn", "process.failed", &err.to_string());
            self.host.error_message(&err.to_string());
            return;
        } else {
            context.input = Value::Text(outcome.combined_output());
        }
        self.resume(context);
    }

    fn take_parked(&mut self, continuation: ContinuationId) -> Option<Parked> {
        self.parked.remove(&continuation)
    }

    fn log_mismatch(&self, continuation: ContinuationId, expected: &str, found: &Suspension) {
        self.log.append(
            "warn",
            "continuation.mismatch",
            &format!("{continuation} expected {expected}, parked on {}", found.kind()),
        );
    }

    fn resume(&mut self, context: PipelineContext) {
        // dispatch already logged the failure
        let _ = self.dispatch(context);
    }

    /// Drains every queued event without blocking.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Waits up to `wait` (or the next status deadline) for an event, handles
    /// everything queued, then advances the status animation.
    pub fn pump(&mut self, wait: Duration) -> usize {
        let now = Instant::now();
        let timeout = self
            .supervisor
            .next_deadline()
            .map(|deadline| wait.min(deadline.saturating_duration_since(now)))
            .unwrap_or(wait);

        let mut handled = 0;
        if let Ok(event) = self.events_rx.recv_timeout(timeout) {
            self.handle_event(event);
            handled += 1;
        }
        handled += self.process_pending();
        self.tick_status();
        handled
    }

    /// Pumps until nothing is parked and no process runs. Returns `false` if
    /// `timeout` elapsed first.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            let remaining = deadline.saturating_duration_since(now);
            self.pump(remaining.min(IDLE_POLL));
            if self.is_idle() {
                self.process_pending();
                self.tick_status();
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
        }
    }

    fn tick_status(&mut self) {
        if let Some(update) = self.supervisor.tick(Instant::now()) {
            let key = self.settings.status_key.clone();
            self.host.status_message(&key, update.text());
        }
    }
}
