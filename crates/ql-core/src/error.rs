use thiserror::Error;

pub type QlResult<T> = Result<T, QlError>;

/// Error shared across the workspace crates. Cancellation is the one
/// condition every long-running operation can surface, so it lives here;
/// everything else is domain-specific and stays in the owning crate.
#[derive(Error, Debug)]
pub enum QlError {
    #[error("Operation cancelled")]
    Cancelled,
}
