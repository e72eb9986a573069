use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, StepError, StepName, StepOutcome, Value};
use crate::steps::{bool_arg, int_arg, invalid, string_arg, unsupported};

const STEP: StepName = StepName::Split;

#[derive(Debug, Clone, PartialEq, Eq)]
struct SplitRule {
    sep: String,
    max_splits: Option<usize>,
    strip: bool,
}

pub(crate) fn split<H: Host>(
    _engine: &mut Engine<H>,
    _context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    let sep = string_arg(args, "sep").unwrap_or_else(|| "\n".to_string());
    if sep.is_empty() {
        return Err(invalid(STEP, "sep", "a non-empty separator"));
    }
    let limit = int_arg(STEP, args, "limit")?.unwrap_or(-1);
    let rule = SplitRule {
        sep,
        max_splits: usize::try_from(limit).ok(),
        strip: bool_arg(args, "strip"),
    };
    split_value(input, &rule).map(StepOutcome::Continue)
}

fn split_value(value: Value, rule: &SplitRule) -> Result<Value, StepError> {
    match value {
        Value::Empty => Err(unsupported(STEP, "text or a list of text")),
        Value::Text(text) | Value::ProcessResult { content: text, .. } => {
            Ok(split_text(&text, rule))
        }
        Value::List(items) => items
            .into_iter()
            .map(|item| split_value(item, rule))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
    }
}

fn split_text(text: &str, rule: &SplitRule) -> Value {
    let text = if rule.strip { text.trim() } else { text };
    let parts: Vec<Value> = match rule.max_splits {
        Some(max) => text.splitn(max + 1, rule.sep.as_str()).map(Value::text).collect(),
        None => text.split(rule.sep.as_str()).map(Value::text).collect(),
    };
    Value::List(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(sep: &str, max_splits: Option<usize>, strip: bool) -> SplitRule {
        SplitRule {
            sep: sep.to_string(),
            max_splits,
            strip,
        }
    }

    #[test]
    fn keeps_empty_fields_between_separators() {
        assert_eq!(
            split_value(Value::text("a,b,,c"), &rule(",", None, false)),
            Ok(Value::list(["a", "b", "", "c"]))
        );
    }

    #[test]
    fn limit_caps_the_number_of_splits() {
        assert_eq!(
            split_value(Value::text("a,b,c"), &rule(",", Some(1), false)),
            Ok(Value::list(["a", "b,c"]))
        );
        assert_eq!(
            split_value(Value::text("a,b"), &rule(",", Some(0), false)),
            Ok(Value::list(["a,b"]))
        );
    }

    #[test]
    fn strip_trims_before_splitting() {
        assert_eq!(
            split_value(Value::text(" x\ny\n"), &rule("\n", None, true)),
            Ok(Value::list(["x", "y"]))
        );
    }

    #[test]
    fn nested_lists_split_each_leaf() {
        let input = Value::List(vec![Value::list(["a,b"]), Value::list(["c"])]);
        assert_eq!(
            split_value(input, &rule(",", None, false)),
            Ok(Value::List(vec![
                Value::List(vec![Value::list(["a", "b"])]),
                Value::List(vec![Value::list(["c"])]),
            ]))
        );
    }

    #[test]
    fn empty_input_is_unsupported() {
        assert!(matches!(
            split_value(Value::Empty, &rule(",", None, false)),
            Err(StepError::UnsupportedInput { .. })
        ));
    }
}
