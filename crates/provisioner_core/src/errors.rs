//! Error taxonomy shared by every provisioning workflow.
//!
//! Each remote client reports failures with its own error enum. This module
//! folds them into one [`ProvisionerError`] and exposes the closed set of
//! [`ErrorKind`]s the orchestrators use to decide which failures to absorb.

use config_manager::ConfigurationError;
use std::fmt;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// The kind of a failure, independent of which client reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    AlreadyEnabled,
    AlreadyNotEnabled,
    QuotaExceeded,
    Unauthorized,
    NotFound,
    ServerError,
    RemoteError,
    Configuration,
}

impl ErrorKind {
    /// Whether the kind means "the desired state is already in place".
    pub fn is_already_applied(self) -> bool {
        matches!(
            self,
            ErrorKind::AlreadyExists | ErrorKind::AlreadyEnabled | ErrorKind::AlreadyNotEnabled
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::AlreadyEnabled => "already enabled",
            ErrorKind::AlreadyNotEnabled => "already not enabled",
            ErrorKind::QuotaExceeded => "quota exceeded",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not found",
            ErrorKind::ServerError => "server error",
            ErrorKind::RemoteError => "remote error",
            ErrorKind::Configuration => "configuration error",
        };
        f.write_str(name)
    }
}

/// Errors produced by the provisioning workflows.
#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    GitHub(#[from] github_client::Error),

    #[error(transparent)]
    PullApprove(#[from] pullapprove_client::Error),

    #[error(transparent)]
    MergeCheck(#[from] merge_check_client::Error),

    #[error("Git operation failed: {0}")]
    Git(String),

    /// A failure wrapped with the message of the layer that observed it.
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<ProvisionerError>,
    },

    /// Independent per-item failures collected by a rule applier.
    #[error(transparent)]
    Aggregate(AggregateError),
}

impl ProvisionerError {
    /// Returns the kind of the failure.
    ///
    /// Context wrappers report the kind of their cause; an aggregate reports
    /// the kind of its first entry.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProvisionerError::Configuration(_) => ErrorKind::Configuration,
            ProvisionerError::GitHub(e) => github_kind(e),
            ProvisionerError::PullApprove(e) => pullapprove_kind(e),
            ProvisionerError::MergeCheck(e) => merge_check_kind(e),
            ProvisionerError::Git(_) => ErrorKind::RemoteError,
            ProvisionerError::Context { source, .. } => source.kind(),
            ProvisionerError::Aggregate(aggregate) => aggregate
                .failures()
                .first()
                .map_or(ErrorKind::RemoteError, |f| f.error.kind()),
        }
    }

    /// Wraps the error with a context message.
    pub fn context(self, context: impl Into<String>) -> Self {
        ProvisionerError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

fn github_kind(error: &github_client::Error) -> ErrorKind {
    use github_client::Error as E;
    match error {
        E::AlreadyExists(_) => ErrorKind::AlreadyExists,
        E::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
        E::Unauthorized(_) | E::AuthError(_) => ErrorKind::Unauthorized,
        E::NotFound(_) => ErrorKind::NotFound,
        E::ServerError { .. } => ErrorKind::ServerError,
        E::RemoteError(_) | E::Deserialization(_) => ErrorKind::RemoteError,
        E::InvalidRequest(_) => ErrorKind::Configuration,
    }
}

fn pullapprove_kind(error: &pullapprove_client::Error) -> ErrorKind {
    use pullapprove_client::Error as E;
    match error {
        E::Unauthorized => ErrorKind::Unauthorized,
        E::ServerError { .. } => ErrorKind::ServerError,
        E::RemoteError(_) => ErrorKind::RemoteError,
        E::InvalidUrl(_) => ErrorKind::Configuration,
    }
}

fn merge_check_kind(error: &merge_check_client::Error) -> ErrorKind {
    use merge_check_client::Error as E;
    match error {
        E::Unauthorized => ErrorKind::Unauthorized,
        E::AlreadyEnabled => ErrorKind::AlreadyEnabled,
        E::AlreadyNotEnabled => ErrorKind::AlreadyNotEnabled,
        E::ServerError { .. } => ErrorKind::ServerError,
        E::RemoteError(_) => ErrorKind::RemoteError,
        E::InvalidUrl(_) => ErrorKind::Configuration,
    }
}

/// One failed item of a per-item loop.
#[derive(Debug)]
pub struct ItemFailure {
    /// Position of the item in the rule's option list
    pub index: usize,
    /// Human readable name of the item, e.g. `label 'bug'`
    pub item: String,
    pub error: ProvisionerError,
    /// Set when the failure is expected for this item regardless of its kind,
    /// e.g. `NotFound` when deleting a label the repository never had
    pub tolerated: bool,
}

/// Failures collected while applying a rule to each of its items.
///
/// The loop keeps going after a failed item, so the aggregate can hold any
/// number of failures next to items that were applied.
#[derive(Debug, Default)]
pub struct AggregateError {
    attempted: usize,
    failures: Vec<ItemFailure>,
}

impl AggregateError {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that an item was attempted, whether or not it failed.
    pub fn attempt(&mut self) {
        self.attempted += 1;
    }

    /// Records the failure of an item.
    pub fn push(&mut self, index: usize, item: impl Into<String>, error: ProvisionerError) {
        self.failures.push(ItemFailure {
            index,
            item: item.into(),
            error,
            tolerated: false,
        });
    }

    /// Records a failure that leaves the item in its desired state.
    pub fn push_tolerated(
        &mut self,
        index: usize,
        item: impl Into<String>,
        error: ProvisionerError,
    ) {
        self.failures.push(ItemFailure {
            index,
            item: item.into(),
            error,
            tolerated: true,
        });
    }

    /// Whether any item failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The number of items attempted.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// The failed items in the order they were attempted.
    pub fn failures(&self) -> &[ItemFailure] {
        &self.failures
    }

    /// Splits the failures by `predicate`.
    ///
    /// The first aggregate holds the failures the predicate accepted, the
    /// second the rest. Both keep the attempted count.
    pub fn partition(self, predicate: impl Fn(&ItemFailure) -> bool) -> (Self, Self) {
        let (accepted, rejected): (Vec<_>, Vec<_>) =
            self.failures.into_iter().partition(|f| predicate(f));
        (
            Self {
                attempted: self.attempted,
                failures: accepted,
            },
            Self {
                attempted: self.attempted,
                failures: rejected,
            },
        )
    }

    /// Converts the aggregate into a result: `Ok` when nothing failed.
    pub fn into_result(self) -> Result<(), ProvisionerError> {
        if self.has_failures() {
            Err(ProvisionerError::Aggregate(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} item(s) failed",
            self.failures.len(),
            self.attempted
        )?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.item, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Result type alias for provisioning operations.
pub type ProvisionerResult<T> = Result<T, ProvisionerError>;
