pub mod buffer;
pub mod chain;
pub mod confirm;
pub mod each;
pub mod insert;
pub mod panel;
pub mod picker;
pub mod process;
pub mod prompt;
pub mod split;
pub mod switch;

use crate::host::Host;
use crate::pipeline::{parse_step_list, Args, Step, StepError, StepHandler, StepName};
use std::collections::BTreeMap;

pub fn handler_for<H: Host>(name: StepName) -> StepHandler<H> {
    match name {
        StepName::RunProcess => process::run_process::<H>,
        StepName::ShowPanel => panel::show_panel::<H>,
        StepName::NewScratchFile => buffer::new_scratch_file::<H>,
        StepName::OpenFile => buffer::open_file::<H>,
        StepName::ShowPicker => picker::show_picker::<H>,
        StepName::ShowPrompt => prompt::show_prompt::<H>,
        StepName::Confirm => confirm::confirm::<H>,
        StepName::Switch => switch::switch::<H>,
        StepName::Split => split::split::<H>,
        StepName::Loop => each::each::<H>,
        StepName::Arg => prompt::arg::<H>,
        StepName::AddArg => prompt::add_arg::<H>,
        StepName::Chain => chain::chain::<H>,
        StepName::InsertText => insert::insert_text::<H>,
    }
}

fn is_absent(args: &Args, key: &str) -> bool {
    matches!(args.get(key), None | Some(serde_json::Value::Null))
}

pub(crate) fn string_arg(args: &Args, key: &str) -> Option<String> {
    match args.get(key)? {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub(crate) fn required_string(step: StepName, args: &Args, key: &str) -> Result<String, StepError> {
    if is_absent(args, key) {
        return Err(missing(step, key));
    }
    match string_arg(args, key) {
        Some(text) if text.is_empty() => Err(missing(step, key)),
        Some(text) => Ok(text),
        None => Err(invalid(step, key, "a string")),
    }
}

pub(crate) fn bool_arg(args: &Args, key: &str) -> bool {
    match args.get(key) {
        Some(serde_json::Value::Bool(flag)) => *flag,
        Some(serde_json::Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(serde_json::Value::String(text)) => {
            matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
        }
        _ => false,
    }
}

pub(crate) fn int_arg(step: StepName, args: &Args, key: &str) -> Result<Option<i64>, StepError> {
    match args.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid(step, key, "an integer")),
        Some(serde_json::Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(step, key, "an integer")),
        Some(_) => Err(invalid(step, key, "an integer")),
    }
}

pub(crate) fn steps_arg(step: StepName, args: &Args, key: &str) -> Result<Option<Vec<Step>>, StepError> {
    let Some(value) = args.get(key).filter(|value| !value.is_null()) else {
        return Ok(None);
    };
    parse_step_list(value)
        .map(Some)
        .ok_or_else(|| invalid(step, key, "a step or list of steps"))
}

pub(crate) fn required_steps(step: StepName, args: &Args, key: &str) -> Result<Vec<Step>, StepError> {
    steps_arg(step, args, key)?.ok_or_else(|| missing(step, key))
}

pub(crate) fn string_map_arg(
    step: StepName,
    args: &Args,
    key: &str,
) -> Result<BTreeMap<String, String>, StepError> {
    match args.get(key) {
        None | Some(serde_json::Value::Null) => Ok(BTreeMap::new()),
        Some(serde_json::Value::Object(map)) => map
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| match value {
                serde_json::Value::String(text) => Ok((name.clone(), text.clone())),
                serde_json::Value::Number(_) | serde_json::Value::Bool(_) => {
                    Ok((name.clone(), value.to_string()))
                }
                _ => Err(invalid(step, key, "a mapping of strings")),
            })
            .collect(),
        Some(_) => Err(invalid(step, key, "a mapping of strings")),
    }
}

pub(crate) fn missing(step: StepName, arg: &str) -> StepError {
    StepError::MissingRequiredArg {
        step,
        arg: arg.to_string(),
    }
}

pub(crate) fn invalid(step: StepName, arg: &str, expected: &str) -> StepError {
    StepError::InvalidArg {
        step,
        arg: arg.to_string(),
        expected: expected.to_string(),
    }
}

pub(crate) fn unsupported(step: StepName, expected: &str) -> StepError {
    StepError::UnsupportedInput {
        step,
        expected: expected.to_string(),
    }
}
