use crate::app::command_support::{load_cli_settings, parse_config_only};

pub fn cmd_list(args: &[String]) -> Result<String, String> {
    let config = parse_config_only(args)?;
    let (_, settings) = load_cli_settings(config.as_deref())?;
    if settings.commands.is_empty() {
        return Ok("no commands configured".to_string());
    }
    let lines: Vec<String> = settings
        .commands
        .iter()
        .map(|(name, steps)| {
            let names: Vec<&str> = steps.iter().map(|step| step.name.as_str()).collect();
            format!("{name}: {}", names.join(" -> "))
        })
        .collect();
    Ok(lines.join("\n"))
}

pub fn cmd_check(args: &[String]) -> Result<String, String> {
    let config = parse_config_only(args)?;
    let (path, settings) = load_cli_settings(config.as_deref())?;
    Ok(format!(
        "settings ok: {} ({} command(s))",
        path.display(),
        settings.commands.len()
    ))
}
