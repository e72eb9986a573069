use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, StepError, StepOutcome, Value};
use crate::steps::string_arg;

const DEFAULT_MESSAGE: &str = "Are you sure?";

pub(crate) fn confirm<H: Host>(
    engine: &mut Engine<H>,
    _context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let message = string_arg(args, "msg").unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
    if engine.host_mut().confirm(&message) {
        Ok(StepOutcome::Continue(input))
    } else {
        Ok(StepOutcome::Halt)
    }
}
