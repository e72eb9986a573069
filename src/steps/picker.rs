use crate::host::{Host, PickerItem};
use crate::pipeline::{
    Args, Engine, PipelineContext, StepError, StepName, StepOutcome, Suspension, Value,
};
use crate::steps::{steps_arg, unsupported};

const STEP: StepName = StepName::ShowPicker;

pub(crate) fn show_picker<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let values = picker_values(input)?;
    if values.is_empty() {
        return Ok(StepOutcome::Halt);
    }
    let Some(window) = context.origin.window else {
        return Ok(StepOutcome::Halt);
    };

    let explicit = steps_arg(STEP, args, "on_done")?;
    let on_highlight = steps_arg(STEP, args, "on_highlight")?;
    let remaining = context.take_steps();
    let on_done = explicit.unwrap_or(remaining);

    let items = values.iter().map(picker_item).collect();
    let continuation = engine.next_continuation();
    let responder = engine.picker_responder(continuation);
    engine.host_mut().show_picker(window, items, responder);
    Ok(StepOutcome::Suspend(
        continuation,
        Suspension::Picker {
            items: values,
            on_done,
            on_highlight,
        },
    ))
}

fn picker_values(input: Value) -> Result<Vec<Value>, StepError> {
    let values = match input {
        Value::Empty => Vec::new(),
        Value::List(items) => items,
        Value::Text(text) | Value::ProcessResult { content: text, .. } => text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Value::text)
            .collect(),
    };
    if values.iter().any(|value| matches!(value, Value::Empty)) {
        return Err(unsupported(
            STEP,
            "a list of text items or [title, detail] pairs",
        ));
    }
    Ok(values)
}

fn picker_item(value: &Value) -> PickerItem {
    match value {
        Value::List(pair) => match pair.as_slice() {
            [title, detail] => PickerItem::Pair {
                title: title.render(),
                detail: detail.render(),
            },
            _ => PickerItem::Single(value.render()),
        },
        other => PickerItem::Single(other.render()),
    }
}
