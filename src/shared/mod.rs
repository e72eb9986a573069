pub mod ids;
pub mod logging;
pub mod time;

pub use ids::{
    validate_identifier_value, ContextId, ContinuationId, IdAllocator, ProcessId, ViewId, WindowId,
};
pub use logging::EngineLog;
pub use time::now_secs;
