use std::time::Duration;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by dbusdump APIs.
///
/// This error model is designed to be:
/// - **Classifiable** (callers can branch on variants),
/// - **Diagnosable** (includes context like `backend`, `action`, `command`),
/// - **Bounded** (error snippets are truncated to avoid unbounded memory/log growth).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input validation failure (e.g. invalid service name, invalid object path).
    #[error("invalid input: {context}")]
    InvalidInput { context: String },

    /// None of the candidate introspection tools is installed. Fatal for the whole run.
    #[error("no introspection backend found (need busctl, gdbus or dbus-send on PATH)")]
    NoBackendAvailable,

    /// The service-name enumeration failed, so nothing on the bus can be reached. Fatal.
    #[error("bus unreachable: {detail}")]
    BusUnreachable { detail: String },

    /// Enumeration succeeded but returned zero documentable services. Fatal.
    #[error("no services found on the {bus} bus")]
    NoServices { bus: &'static str },

    /// Timed out while waiting for an external tool invocation.
    #[error("timeout for {action}: {timeout:?}")]
    Timeout {
        action: &'static str,
        timeout: Duration,
    },

    /// A backend is unavailable in the current environment (missing binary, operation not
    /// supported by this tool, etc). Soft: callers fall through to the next-priority backend.
    #[error("backend unavailable ({backend}): {detail}")]
    BackendUnavailable {
        backend: &'static str,
        detail: String,
    },

    /// Generic I/O or runtime error with context.
    #[error("io error: {context}")]
    IoError { context: String },

    /// A subprocess failed (non-zero exit or other failure mode).
    ///
    /// `stderr` is truncated to avoid unbounded output.
    #[error("process error: {command} (exit={exit_code:?}): {stderr}")]
    ProcessError {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl Error {
    pub(crate) fn invalid_input(context: impl Into<String>) -> Self {
        Self::InvalidInput {
            context: context.into(),
        }
    }

    pub(crate) fn process_error(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stderr: impl AsRef<str>,
    ) -> Self {
        Self::ProcessError {
            command: command.into(),
            exit_code,
            stderr: truncate_for_error(stderr.as_ref(), 8 * 1024).into_owned(),
        }
    }
}

fn truncate_for_error(input: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if input.len() <= max_bytes {
        return std::borrow::Cow::Borrowed(input);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    std::borrow::Cow::Owned(input[..end].to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn process_error_truncates_stderr() {
        let long = "x".repeat(64 * 1024);
        let err = Error::process_error("busctl", Some(1), &long);
        let Error::ProcessError { stderr, .. } = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(stderr.len(), 8 * 1024);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "aé".repeat(10);
        let out = truncate_for_error(&s, 3);
        assert!(out.len() <= 3);
        assert!(s.starts_with(out.as_ref()));
    }
}
