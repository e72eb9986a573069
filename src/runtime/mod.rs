pub mod events;
pub mod supervisor;

pub use events::UiEvent;
pub use supervisor::{ExitDisposition, ProcessSupervisor, StatusUpdate};
