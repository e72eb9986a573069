pub mod context;
pub mod continuation;
pub mod error;
pub mod interpreter;
pub mod registry;
pub mod step;
pub mod substitution;
pub mod value;

pub use context::{Origin, PipelineContext};
pub use continuation::{DispatchOutcome, StepOutcome, Suspension};
pub use error::{PipelineError, StepError};
pub use interpreter::Engine;
pub use registry::{Registration, StepDomain, StepHandler, StepRegistry};
pub use step::{parse_step_list, steps_to_json, Args, Step, StepName};
pub use substitution::{substitute_args, FILE_TOKEN, INPUT_TOKEN};
pub use value::Value;
