use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, StepError, StepName, StepOutcome, Value};
use crate::steps::required_steps;

/// Runs `commands` ahead of whatever is still queued.
pub(crate) fn chain<H: Host>(
    _engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let commands = required_steps(StepName::Chain, args, "commands")?;
    context.prepend_steps(commands);
    Ok(StepOutcome::Continue(input))
}
