use crate::pipeline::StepName;
use crate::shared::ContextId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("unknown step `{name}`")]
    UnknownStep { name: String },
    #[error("step `{step}` cannot resolve its origin: {reason}")]
    Context { step: String, reason: String },
    #[error("context `{context_id}` is already being dispatched")]
    Reentrant { context_id: ContextId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("step `{step}` is missing required argument `{arg}`")]
    MissingRequiredArg { step: StepName, arg: String },
    #[error("invalid argument `{arg}` for `{step}`; expected {expected}")]
    InvalidArg {
        step: StepName,
        arg: String,
        expected: String,
    },
    #[error("step `{step}` cannot handle its input; expected {expected}")]
    UnsupportedInput { step: StepName, expected: String },
}
