//! Request-scoped logging for RPC handlers.
//!
//! # Data Flow
//! ```text
//! inbound call (context, /package.Service/Method)
//!     → scope.rs   : branch base logger, bind into derived context,
//!                    set system / span.kind / grpc.service / grpc.method /
//!                    grpc.start_time / grpc.request.deadline
//!     → handler    : runs with the derived context (or LoggedStream)
//!     → scope.rs   : set grpc.code / grpc.time_ms / error
//!     → severity.rs: pick level from the status code
//!     → one "finished <kind> call with code <name>" record
//! ```
//!
//! # Design Decisions
//! - The base logger is only ever branched, never mutated
//! - Handler results pass through untouched
//! - Deadlines are logged, not enforced
//! - Both tower layers and closure-based helpers share `CallScope`

pub mod scope;
pub mod severity;
pub mod stream;
pub mod unary;

pub use scope::{CallKind, CallScope};
pub use severity::{code_from_name, code_name, code_of, level_for_code};
pub use stream::{
    intercept_stream, LoggedStream, ServerStream, StreamCall, StreamLogging, StreamLoggingLayer,
    StreamServerInfo,
};
pub use unary::{intercept_unary, UnaryCall, UnaryLogging, UnaryLoggingLayer, UnaryServerInfo};
