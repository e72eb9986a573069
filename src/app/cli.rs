#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    List,
    Check,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "list" => CliVerb::List,
        "check" => CliVerb::Check,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  run <command> [options]              Run a configured pipeline headlessly".to_string(),
        "  list [--config PATH]                 List configured pipelines".to_string(),
        "  check [--config PATH]                Validate the settings file".to_string(),
        "  help                                 Show this help".to_string(),
        String::new(),
        "Run options:".to_string(),
        "  --config PATH                        Settings file (default ~/.commando/config.yaml)"
            .to_string(),
        "  --input TEXT                         Initial pipeline input".to_string(),
        "  --folder DIR                         Folder open in the origin window".to_string(),
        "  --file PATH                          File shown in the origin view".to_string(),
        "  --timeout-ms N                       Give up waiting after N milliseconds".to_string(),
        String::new(),
        "Scripted replies (consumed in order):".to_string(),
        "  --pick N | --dismiss                 Answer the next picker".to_string(),
        "  --text STR | --edit STR | --cancel   Answer the next prompt".to_string(),
        "  --yes | --no                         Answer the next confirmation".to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}
