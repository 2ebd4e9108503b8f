//! Domain model (request markers, dispatch keys, cancellation, errors).

pub mod request;
pub mod key;
pub mod naming;
pub mod cancel;
pub mod errors;

pub use self::request::{CapabilityKind, Command, Query};
pub use self::key::{DispatchKey, RequestType, ResultType, TypeTag};
pub use self::cancel::{CancellationSignal, CancellationSource};
pub use self::errors::{CodecError, HandlerError, MediatorError, ShapeMismatch};
