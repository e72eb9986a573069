use crate::host::Host;
use crate::pipeline::{Args, Engine, PipelineContext, PipelineError, StepError, StepName, StepOutcome, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Which live host object a step needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDomain {
    Global,
    Window,
    View,
}

impl StepDomain {
    pub fn of(name: StepName) -> Self {
        match name {
            StepName::RunProcess
            | StepName::Confirm
            | StepName::Switch
            | StepName::Split
            | StepName::Loop
            | StepName::AddArg
            | StepName::Chain => StepDomain::Global,
            StepName::ShowPanel
            | StepName::NewScratchFile
            | StepName::OpenFile
            | StepName::ShowPicker
            | StepName::ShowPrompt
            | StepName::Arg => StepDomain::Window,
            StepName::InsertText => StepDomain::View,
        }
    }
}

pub type StepHandler<H> =
    fn(&mut Engine<H>, &mut PipelineContext, Value, &Args) -> Result<StepOutcome, StepError>;

pub struct Registration<H> {
    pub name: StepName,
    pub domain: StepDomain,
    pub handler: StepHandler<H>,
}

impl<H> Clone for Registration<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Registration<H> {}

/// Static name -> (domain, handler) table consulted on every dispatch.
pub struct StepRegistry<H> {
    entries: BTreeMap<StepName, Registration<H>>,
}

impl<H> StepRegistry<H> {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: StepName, domain: StepDomain, handler: StepHandler<H>) {
        self.entries.insert(
            name,
            Registration {
                name,
                domain,
                handler,
            },
        );
    }

    pub fn resolve(&self, name: &str) -> Result<Registration<H>, PipelineError> {
        let unknown = || PipelineError::UnknownStep {
            name: name.to_string(),
        };
        let step = StepName::from_str(name).map_err(|_| unknown())?;
        self.entries.get(&step).copied().ok_or_else(unknown)
    }

    pub fn domain_of(&self, name: &str) -> Option<StepDomain> {
        self.resolve(name).ok().map(|entry| entry.domain)
    }

    pub fn names(&self) -> Vec<StepName> {
        self.entries.keys().copied().collect()
    }
}

impl<H: Host> StepRegistry<H> {
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for name in StepName::ALL {
            registry.register(name, StepDomain::of(name), crate::steps::handler_for::<H>(name));
        }
        registry
    }
}

impl<H: Host> Default for StepRegistry<H> {
    fn default() -> Self {
        Self::builtin()
    }
}
