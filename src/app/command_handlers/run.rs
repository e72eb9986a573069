use crate::app::command_support::{load_cli_settings, option_value};
use crate::host::{HeadlessHost, Host, ScriptedReply};
use crate::pipeline::{DispatchOutcome, Engine, Value};
use crate::shared::{ViewId, WindowId};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const KILL_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub command: String,
    pub config: Option<PathBuf>,
    pub input: Option<String>,
    pub folder: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub replies: Vec<ScriptedReply>,
    pub timeout: Duration,
}

pub fn parse_run_options(args: &[String]) -> Result<RunOptions, String> {
    let Some(command) = args.first() else {
        return Err("usage: commando run <command> [options]".to_string());
    };
    let mut options = RunOptions {
        command: command.clone(),
        config: None,
        input: None,
        folder: None,
        file: None,
        replies: Vec::new(),
        timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
    };

    let mut index = 1;
    while index < args.len() {
        let flag = args[index].as_str();
        let mut consumed = 1;
        match flag {
            "--config" => {
                options.config = Some(PathBuf::from(option_value(args, index, flag)?));
                consumed = 2;
            }
            "--input" => {
                options.input = Some(option_value(args, index, flag)?.to_string());
                consumed = 2;
            }
            "--folder" => {
                options.folder = Some(PathBuf::from(option_value(args, index, flag)?));
                consumed = 2;
            }
            "--file" => {
                options.file = Some(PathBuf::from(option_value(args, index, flag)?));
                consumed = 2;
            }
            "--timeout-ms" => {
                let raw = option_value(args, index, flag)?;
                let millis = raw
                    .parse::<u64>()
                    .map_err(|_| format!("invalid `--timeout-ms` value `{raw}`"))?;
                options.timeout = Duration::from_millis(millis);
                consumed = 2;
            }
            "--pick" => {
                let raw = option_value(args, index, flag)?;
                let pick = raw
                    .parse::<usize>()
                    .map_err(|_| format!("invalid `--pick` value `{raw}`"))?;
                options.replies.push(ScriptedReply::Pick(pick));
                consumed = 2;
            }
            "--text" => {
                let text = option_value(args, index, flag)?;
                options.replies.push(ScriptedReply::Text(text.to_string()));
                consumed = 2;
            }
            "--edit" => {
                let text = option_value(args, index, flag)?;
                options.replies.push(ScriptedReply::Edit(text.to_string()));
                consumed = 2;
            }
            "--dismiss" => options.replies.push(ScriptedReply::Dismiss),
            "--cancel" => options.replies.push(ScriptedReply::Cancel),
            "--yes" => options.replies.push(ScriptedReply::Confirm(true)),
            "--no" => options.replies.push(ScriptedReply::Confirm(false)),
            other => return Err(format!("unexpected argument `{other}`")),
        }
        index += consumed;
    }
    Ok(options)
}

fn build_host(options: &RunOptions) -> HeadlessHost {
    let window = WindowId::new(1);
    let folders = options.folder.iter().cloned().collect();
    let mut host = HeadlessHost::new()
        .with_window(window, folders)
        .auto_close_buffers(true)
        .with_replies(options.replies.iter().cloned());
    if let Some(file) = &options.file {
        host = host.with_view(window, ViewId::new(1), Some(file.clone()));
    }
    host
}

pub fn cmd_run(args: &[String]) -> Result<String, String> {
    let options = parse_run_options(args)?;
    let (_, settings) = load_cli_settings(options.config.as_deref())?;
    let steps = settings
        .command(&options.command)
        .ok_or_else(|| format!("unknown pipeline `{}`", options.command))?
        .to_vec();

    let host = build_host(&options);
    let origin = host.active_origin();
    let mut engine = Engine::new(host, settings);
    let mut context = engine.context(origin, steps);
    if let Some(input) = &options.input {
        context.input = Value::text(input.clone());
    }

    let mut lines = Vec::new();
    match engine.dispatch(context).map_err(|err| err.to_string())? {
        DispatchOutcome::Completed(context) if !context.input.is_blank() => {
            lines.push(format!("result:\n{}", context.input.render()));
        }
        DispatchOutcome::Halted { step } => lines.push(format!("halted at `{step}`")),
        DispatchOutcome::Completed(_) | DispatchOutcome::Suspended(_) => {}
    }

    if !engine.run_until_idle(options.timeout) {
        engine.kill_processes();
        engine.run_until_idle(KILL_GRACE);
        lines.push(format!(
            "timed out after {}ms",
            options.timeout.as_millis()
        ));
    }

    let mut transcript = engine.host().transcript();
    transcript.extend(lines);
    Ok(transcript.join("\n"))
}
