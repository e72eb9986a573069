use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, StepError, StepOutcome, Value};
use crate::steps::string_arg;

pub(crate) fn show_panel<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    if input.is_blank() {
        return Ok(StepOutcome::Continue(input));
    }
    let Some(window) = context.origin.window else {
        return Ok(StepOutcome::Halt);
    };
    let name = string_arg(args, "name").unwrap_or_else(|| engine.settings().panel_name.clone());
    let contents = input.render();
    engine.host_mut().show_panel(window, &name, &contents);
    Ok(StepOutcome::Continue(input))
}
