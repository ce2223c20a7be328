//! Error taxonomy shared by the parser, the collaborator and the viewer

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a failure, used to pick recovery hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed hunk header numerics
    Parse,
    /// A version-control call failed
    GitOp,
    /// The backend denied access
    Permission,
    /// Repository state precludes the requested view
    Conflict,
    /// A backend call exceeded its time budget
    Timeout,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Parse => "Parse error",
            ErrorKind::GitOp => "Git error",
            ErrorKind::Permission => "Permission denied",
            ErrorKind::Conflict => "Repository conflict",
            ErrorKind::Timeout => "Timed out",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Something the user can do about an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryAction {
    ViewRaw,
    Retry,
    RetryLongerTimeout,
    Reload,
    Help,
}

impl RecoveryAction {
    pub fn label(self) -> &'static str {
        match self {
            RecoveryAction::ViewRaw => "view raw output",
            RecoveryAction::Retry => "retry",
            RecoveryAction::RetryLongerTimeout => "retry with longer timeout",
            RecoveryAction::Reload => "reload",
            RecoveryAction::Help => "help",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct DiffError {
    pub kind: ErrorKind,
    pub message: String,
    pub help: Option<String>,
}

impl DiffError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
            .with_help("The diff output could not be read. Inspect the raw output for corruption.")
    }

    pub fn git(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GitOp, message)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, message)
            .with_help("Check that you can read the repository and its .git directory.")
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
            .with_help("Finish or abort the in-progress merge, rebase or cherry-pick, then reload.")
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
            .with_help("Large repositories can take a while; retry with a longer timeout.")
    }

    /// Recovery hints offered for this error, always ending with help
    pub fn recovery_actions(&self) -> Vec<RecoveryAction> {
        let mut actions = match self.kind {
            ErrorKind::Parse => vec![RecoveryAction::ViewRaw],
            ErrorKind::GitOp => vec![RecoveryAction::Retry],
            ErrorKind::Permission => Vec::new(),
            ErrorKind::Conflict => vec![RecoveryAction::Reload],
            ErrorKind::Timeout => vec![RecoveryAction::RetryLongerTimeout],
        };
        actions.push(RecoveryAction::Help);
        actions
    }
}
