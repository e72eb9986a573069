use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, StepError, StepName, StepOutcome, Suspension, Value};
use crate::process::{is_supported_encoding, ProcessRequest};
use crate::steps::{bool_arg, invalid, missing, string_arg, string_map_arg};
use std::path::PathBuf;

const STEP: StepName = StepName::RunProcess;

pub(crate) fn run_process<H: Host>(
    engine: &mut Engine<H>,
    context: &mut PipelineContext,
    input: Value,
    args: &Args,
) -> Result<StepOutcome, StepError> {
    if args.contains_key("kill") {
        engine.kill_processes();
        return Ok(StepOutcome::Halt);
    }

    let argv = command_arg(args)?;
    let encoding =
        string_arg(args, "encoding").unwrap_or_else(|| engine.settings().default_encoding.clone());
    if !is_supported_encoding(&encoding) {
        return Err(invalid(STEP, "encoding", "a supported encoding"));
    }

    let mut env = engine.settings().env.clone();
    env.extend(string_map_arg(STEP, args, "env")?);
    let cwd = match string_arg(args, "working_dir") {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => engine.working_dir(context.origin),
    };

    let mut request = ProcessRequest::new(argv).with_encoding(encoding);
    request.env_overlay = env;
    request.cwd = cwd;
    request.stdin_text = stdin_text(input);

    let keep_status = bool_arg(args, "keep_status");
    let continuation = engine.next_continuation();
    match engine.launch_process(continuation, &request) {
        Ok(_) => Ok(StepOutcome::Suspend(
            continuation,
            Suspension::Process { keep_status },
        )),
        Err(err) => {
            engine
                .log()
                .append("warn", "process.spawn_failed", &err.to_string());
            engine
                .host_mut()
                .error_message(&format!("Error (1): {err}"));
            Ok(StepOutcome::Halt)
        }
    }
}

fn command_arg(args: &Args) -> Result<Vec<String>, StepError> {
    let argv: Vec<String> = match args.get("cmd") {
        None | Some(serde_json::Value::Null) => return Err(missing(STEP, "cmd")),
        Some(serde_json::Value::String(program)) => vec![program.clone()],
        Some(serde_json::Value::Array(items)) => items.iter().filter_map(argv_item).collect(),
        Some(_) => {
            return Err(invalid(
                STEP,
                "cmd",
                "a program name or argument list",
            ))
        }
    };
    match argv.first() {
        Some(program) if !program.is_empty() => Ok(argv),
        _ => Err(missing(STEP, "cmd")),
    }
}

fn argv_item(item: &serde_json::Value) -> Option<String> {
    match item {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(Value::from_json(other).render()),
    }
}

fn stdin_text(input: Value) -> Option<String> {
    match input {
        Value::Empty => None,
        Value::Text(text) => Some(text),
        Value::ProcessResult { content, .. } => Some(content),
        list @ Value::List(_) => Some(list.render()),
    }
}
