use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, StepError, StepOutcome, Value};

pub(crate) fn insert_text<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    _args: &Args,
) -> Result<StepOutcome, StepError> {
    let (Some(window), Some(view)) = (context.origin.window, context.origin.view) else {
        return Ok(StepOutcome::Halt);
    };
    let text = input.render();
    if !text.is_empty() {
        engine.host_mut().insert_text(window, view, &text);
    }
    Ok(StepOutcome::Continue(input))
}
