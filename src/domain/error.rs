//! Error types for the reelrank core.
//!
//! This module defines the centralized error type [`ReelrankError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.

use thiserror::Error;

/// The main error type for reelrank operations.
///
/// This enum consolidates all error conditions that can occur while mirroring the
/// remote change feed, running the ranking protocol, or committing rank updates.
/// Every error is local to the operation that raised it: a failed commit does not
/// clear the in-memory list, and a feed error leaves the list as last known good.
///
/// # Examples
///
/// ```
/// use reelrank::domain::ReelrankError;
///
/// fn validate_target(target: usize, len: usize) -> Result<(), ReelrankError> {
///     if target > len {
///         return Err(ReelrankError::Invariant(format!(
///             "target index {target} outside [0, {len}]"
///         )));
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Error)]
pub enum ReelrankError {
    /// Store read or write failed.
    ///
    /// Occurs when a query against the backing document store fails.
    /// The string contains a description of what went wrong.
    #[error("Store error: {0}")]
    Store(String),

    /// The change feed delivered an error instead of a batch.
    ///
    /// The local list is left unchanged when this is raised; the core performs
    /// no retry of its own. The string carries the store's error report.
    #[error("Feed error: {0}")]
    Feed(String),

    /// An atomic multi-item transaction was rejected.
    ///
    /// No partial mutation occurred: either every staged write applied or none
    /// did. Callers retry or abandon the operation.
    #[error("Commit failed: {0}")]
    Commit(String),

    /// A rank-order invariant would have been violated.
    ///
    /// Raised when a staged commit projects a non-dense permutation (duplicate
    /// or out-of-range indices) or when a component is driven outside its
    /// protocol. Operations fail closed rather than persist a corrupt ordering.
    #[error("Rank invariant violated: {0}")]
    Invariant(String),

    /// Configuration is invalid or missing.
    ///
    /// Occurs when configuration values are malformed or the configuration
    /// file cannot be parsed. The string describes the specific problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Wraps errors from standard library I/O operations during snapshot
    /// persistence. Automatically converts from `std::io::Error` using the
    /// `#[from]` attribute.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for reelrank operations.
///
/// This is a type alias for `std::result::Result<T, ReelrankError>` that simplifies
/// function signatures throughout the codebase.
///
/// # Examples
///
/// ```
/// use reelrank::domain::Result;
///
/// fn commit_ranks() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ReelrankError>;
