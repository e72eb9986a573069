use crate::host::{Host, InputRequest};
use crate::pipeline::{
    Args, Engine, PipelineContext, Step, StepError, StepName, StepOutcome, Suspension, Value,
};
use crate::shared::WindowId;
use crate::steps::{required_string, steps_arg, string_arg};

pub(crate) fn show_prompt<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    _input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    const STEP: StepName = StepName::ShowPrompt;
    let caption = required_string(STEP, args, "caption")?;
    let initial_text = string_arg(args, "initial_text").unwrap_or_default();
    let explicit = steps_arg(STEP, args, "on_done")?;
    let on_change = steps_arg(STEP, args, "on_change")?;
    let on_cancel = steps_arg(STEP, args, "on_cancel")?;
    let Some(window) = context.origin.window else {
        return Ok(StepOutcome::Halt);
    };

    let remaining = context.take_steps();
    let on_done = match explicit {
        Some(steps) => {
            if !remaining.is_empty() {
                engine.log().append(
                    "warn",
                    "prompt.queue_discarded",
                    &format!(
                        "{} dropped {} queued step(s) in favour of on_done",
                        context.id(),
                        remaining.len()
                    ),
                );
            }
            steps
        }
        None => remaining,
    };

    Ok(suspend_on_input(
        engine,
        window,
        InputRequest {
            caption,
            initial_text,
        },
        Suspension::Prompt {
            on_done,
            on_change,
            on_cancel,
        },
    ))
}

/// Asks for a value and stores it under `name` before the rest of the queue
/// runs.
pub(crate) fn arg<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    _input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let name = required_string(StepName::Arg, args, "name")?;
    let initial_text = string_arg(args, "initial_text").unwrap_or_default();
    let Some(window) = context.origin.window else {
        return Ok(StepOutcome::Halt);
    };

    let mut on_done = vec![Step::from(StepName::AddArg).arg("name", name.clone())];
    on_done.extend(context.take_steps());
    Ok(suspend_on_input(
        engine,
        window,
        InputRequest {
            caption: name,
            initial_text,
        },
        Suspension::Prompt {
            on_done,
            on_change: None,
            on_cancel: None,
        },
    ))
}

pub(crate) fn add_arg<H: Host>(
    _engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let name = required_string(StepName::AddArg, args, "name")?;
    context.args.insert(name, input.to_json());
    Ok(StepOutcome::Continue(input))
}

fn suspend_on_input<H: Host>(
    engine: &mut Engine<H>,
    window: WindowId,
    request: InputRequest,
    suspension: Suspension,
) -> StepOutcome {
    let continuation = engine.next_continuation();
    let responder = engine.input_responder(continuation);
    engine.host_mut().show_input(window, request, responder);
    StepOutcome::Suspend(continuation, suspension)
}
