use crate::pipeline::{PipelineContext, Step, Value};
use crate::shared::ContinuationId;

/// What a step handler asks the engine to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Continue(Value),
    Halt,
    Suspend(ContinuationId, Suspension),
}

/// The event a parked context is waiting for, with the step lists each
/// reply resumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Suspension {
    Process {
        keep_status: bool,
    },
    Picker {
        items: Vec<Value>,
        on_done: Vec<Step>,
        on_highlight: Option<Vec<Step>>,
    },
    Prompt {
        on_done: Vec<Step>,
        on_change: Option<Vec<Step>>,
        on_cancel: Option<Vec<Step>>,
    },
    BufferClose {
        on_close: Vec<Step>,
    },
}

impl Suspension {
    pub fn kind(&self) -> &'static str {
        match self {
            Suspension::Process { .. } => "process",
            Suspension::Picker { .. } => "picker",
            Suspension::Prompt { .. } => "prompt",
            Suspension::BufferClose { .. } => "buffer_close",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Parked {
    pub context: PipelineContext,
    pub suspension: Suspension,
}

/// Result of driving a context until it stops.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Completed(PipelineContext),
    Halted { step: String },
    Suspended(ContinuationId),
}
