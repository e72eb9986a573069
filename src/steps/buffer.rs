use crate::host::{BufferSpec, Host};
use crate::pipeline::{
    Args, Engine, PipelineContext, Step, StepError, StepName, StepOutcome, Suspension, Value,
};
use crate::steps::{bool_arg, steps_arg, string_arg};
use std::path::PathBuf;

pub(crate) fn new_scratch_file<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let contents = input.render();
    if contents.trim_end().is_empty() {
        return Ok(StepOutcome::Halt);
    }
    let Some(window) = context.origin.window else {
        return Ok(StepOutcome::Halt);
    };
    let spec = BufferSpec {
        name: string_arg(args, "name"),
        scratch: bool_arg(args, "scratch"),
        readonly: bool_arg(args, "readonly"),
        syntax: string_arg(args, "syntax"),
    };

    let on_close = close_steps(StepName::NewScratchFile, context, args)?;
    if on_close.is_empty() {
        engine.host_mut().new_buffer(window, spec, contents.trim_end(), None);
        return Ok(StepOutcome::Halt);
    }
    let continuation = engine.next_continuation();
    let responder = engine.close_responder(continuation);
    match engine
        .host_mut()
        .new_buffer(window, spec, contents.trim_end(), Some(responder))
    {
        Some(_) => Ok(StepOutcome::Suspend(
            continuation,
            Suspension::BufferClose { on_close },
        )),
        None => Ok(StepOutcome::Halt),
    }
}

pub(crate) fn open_file<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let rendered = input.render();
    let target = rendered.trim();
    if target.is_empty() {
        return Ok(StepOutcome::Halt);
    }
    let Some(window) = context.origin.window else {
        return Ok(StepOutcome::Halt);
    };
    let path = PathBuf::from(target);
    if !engine.host().file_exists(&path) {
        engine
            .host_mut()
            .error_message(&format!("File not found: {}", path.display()));
        return Ok(StepOutcome::Halt);
    }

    let on_close = close_steps(StepName::OpenFile, context, args)?;
    if on_close.is_empty() {
        engine.host_mut().open_file(window, &path, None);
        return Ok(StepOutcome::Halt);
    }
    let continuation = engine.next_continuation();
    let responder = engine.close_responder(continuation);
    match engine.host_mut().open_file(window, &path, Some(responder)) {
        Some(_) => Ok(StepOutcome::Suspend(
            continuation,
            Suspension::BufferClose { on_close },
        )),
        None => Ok(StepOutcome::Halt),
    }
}

/// `on_close` when given, otherwise the rest of the queue. Either way the
/// current chain stops here.
fn close_steps(
    step: StepName,
    context: &mut PipelineContext,
    args: &Args,
) -> Result<Vec<Step>, StepError> {
    let explicit = steps_arg(step, args, "on_close")?;
    let remaining = context.take_steps();
    Ok(explicit.unwrap_or(remaining))
}
