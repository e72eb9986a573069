use crate::process::ProcessOutcome;
use crate::shared::{ContinuationId, ProcessId};

/// Everything that resumes a parked pipeline. Events are produced on worker
/// threads or inside host callbacks and consumed on the engine's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ProcessExited {
        process: ProcessId,
        continuation: ContinuationId,
        outcome: ProcessOutcome,
    },
    PickerDone {
        continuation: ContinuationId,
        index: Option<usize>,
    },
    PickerHighlighted {
        continuation: ContinuationId,
        index: usize,
    },
    InputDone {
        continuation: ContinuationId,
        text: String,
    },
    InputChanged {
        continuation: ContinuationId,
        text: String,
    },
    InputCancelled {
        continuation: ContinuationId,
    },
    BufferClosed {
        continuation: ContinuationId,
        contents: String,
    },
    Released {
        continuation: ContinuationId,
    },
}
