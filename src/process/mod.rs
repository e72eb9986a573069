pub mod decode;
pub mod env;
pub mod runner;
pub mod types;

pub use decode::{decode_output, encode_input, is_supported_encoding, normalize_encoding};
pub use env::{expand_vars, merge_environment};
pub use runner::ExternalProcess;
pub use types::{
    DecodeDiagnostic, OutputStream, ProcessError, ProcessOutcome, ProcessRequest,
};
