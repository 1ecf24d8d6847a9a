//! Status code names and the code → level policy.

use tonic::{Code, Status};

use crate::logger::Level;

/// Canonical name of a status code, as printed in `grpc.code`.
pub fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "Canceled",
        Code::Unknown => "Unknown",
        Code::InvalidArgument => "InvalidArgument",
        Code::DeadlineExceeded => "DeadlineExceeded",
        Code::NotFound => "NotFound",
        Code::AlreadyExists => "AlreadyExists",
        Code::PermissionDenied => "PermissionDenied",
        Code::ResourceExhausted => "ResourceExhausted",
        Code::FailedPrecondition => "FailedPrecondition",
        Code::Aborted => "Aborted",
        Code::OutOfRange => "OutOfRange",
        Code::Unimplemented => "Unimplemented",
        Code::Internal => "Internal",
        Code::Unavailable => "Unavailable",
        Code::DataLoss => "DataLoss",
        Code::Unauthenticated => "Unauthenticated",
    }
}

/// Inverse of [`code_name`]. `Cancelled` is accepted as well.
pub fn code_from_name(name: &str) -> Option<Code> {
    if name == "Cancelled" {
        return Some(Code::Cancelled);
    }
    (0..=16)
        .map(Code::from_i32)
        .find(|code| code_name(*code) == name)
}

/// Level of the summary record for a call that finished with `code`.
///
/// Client-attributable or expected outcomes are Info, transient or
/// operational ones are Warning, everything else is Error.
pub fn level_for_code(code: Code) -> Level {
    match code {
        Code::Ok
        | Code::Cancelled
        | Code::InvalidArgument
        | Code::NotFound
        | Code::AlreadyExists
        | Code::Unauthenticated => Level::Info,
        Code::DeadlineExceeded
        | Code::PermissionDenied
        | Code::ResourceExhausted
        | Code::FailedPrecondition
        | Code::Aborted
        | Code::OutOfRange
        | Code::Unavailable => Level::Warning,
        _ => Level::Error,
    }
}

/// Outcome code of a handler result; success is `Code::Ok`.
pub fn code_of<T>(result: &Result<T, Status>) -> Code {
    match result {
        Ok(_) => Code::Ok,
        Err(status) => status.code(),
    }
}
