use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, StepError, StepName, StepOutcome, Value};
use crate::steps::{required_steps, unsupported};

/// `loop`: runs `commands` once per list element, each in its own context.
/// Children are not awaited and the current chain always stops.
pub(crate) fn each<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    const STEP: StepName = StepName::Loop;
    let commands = required_steps(STEP, args, "commands")?;
    let Value::List(items) = input else {
        return Err(unsupported(STEP, "a list"));
    };

    for item in items {
        let child = engine.fork(context, item, commands.clone());
        let child_id = child.id();
        if let Err(err) = engine.dispatch(child) {
            engine.log().append(
                "warn",
                "loop.child_failed",
                &format!("{child_id} from {}: {err}", context.id()),
            );
        }
    }
    Ok(StepOutcome::Halt)
}
