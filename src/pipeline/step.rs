use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type Args = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepName {
    RunProcess,
    ShowPanel,
    NewScratchFile,
    OpenFile,
    ShowPicker,
    ShowPrompt,
    Confirm,
    Switch,
    Split,
    Loop,
    Arg,
    AddArg,
    Chain,
    InsertText,
}

impl StepName {
    pub const ALL: [StepName; 14] = [
        StepName::RunProcess,
        StepName::ShowPanel,
        StepName::NewScratchFile,
        StepName::OpenFile,
        StepName::ShowPicker,
        StepName::ShowPrompt,
        StepName::Confirm,
        StepName::Switch,
        StepName::Split,
        StepName::Loop,
        StepName::Arg,
        StepName::AddArg,
        StepName::Chain,
        StepName::InsertText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::RunProcess => "run-process",
            StepName::ShowPanel => "show-panel",
            StepName::NewScratchFile => "new-scratch-file",
            StepName::OpenFile => "open-file",
            StepName::ShowPicker => "show-picker",
            StepName::ShowPrompt => "show-prompt",
            StepName::Confirm => "confirm",
            StepName::Switch => "switch",
            StepName::Split => "split",
            StepName::Loop => "loop",
            StepName::Arg => "arg",
            StepName::AddArg => "add-arg",
            StepName::Chain => "chain",
            StepName::InsertText => "insert-text",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepName {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        StepName::ALL
            .into_iter()
            .find(|name| name.as_str() == normalized)
            .ok_or_else(|| format!("unknown step `{raw}`"))
    }
}

/// A declared pipeline instruction. The name is kept as written so an
/// unregistered name surfaces at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StepDecl")]
pub struct Step {
    pub name: String,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub args: Args,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StepDecl {
    Bare(String),
    Pair(String, Args),
    Full {
        name: String,
        #[serde(default)]
        args: Args,
    },
}

impl From<StepDecl> for Step {
    fn from(value: StepDecl) -> Self {
        match value {
            StepDecl::Bare(name) => Step {
                name,
                args: Args::new(),
            },
            StepDecl::Pair(name, args) | StepDecl::Full { name, args } => Step { name, args },
        }
    }
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Args::new(),
        }
    }

    pub fn with_args(name: impl Into<String>, args: Args) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        if self.args.is_empty() {
            serde_json::Value::String(self.name.clone())
        } else {
            serde_json::json!([self.name, self.args])
        }
    }
}

impl From<StepName> for Step {
    fn from(value: StepName) -> Self {
        Step::new(value.as_str())
    }
}

/// Reads a step list argument: a single bare name or a list of declarations.
pub fn parse_step_list(value: &serde_json::Value) -> Option<Vec<Step>> {
    match value {
        serde_json::Value::String(name) => Some(vec![Step::new(name.clone())]),
        serde_json::Value::Array(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

pub fn steps_to_json(steps: &[Step]) -> serde_json::Value {
    serde_json::Value::Array(steps.iter().map(Step::to_json).collect())
}
