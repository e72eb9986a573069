use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, StepError, StepName, StepOutcome, Value};
use crate::steps::steps_arg;

const DEFAULT_CASE: &str = "default";

/// Picks the case whose key equals the trimmed input, else `default`, and
/// queues its steps next. Only cases written on the switch itself count;
/// collected args never select a branch. The input passes through unchanged.
pub(crate) fn switch<H: Host>(
    _engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let rendered = input.render();
    let key = rendered.trim();
    let case = if context.declares(key) {
        key
    } else {
        DEFAULT_CASE
    };
    if !context.declares(case) {
        return Ok(StepOutcome::Continue(input));
    }
    if let Some(steps) = steps_arg(StepName::Switch, args, case)? {
        context.prepend_steps(steps);
    }
    Ok(StepOutcome::Continue(input))
}
