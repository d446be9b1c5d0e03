//! Domain-level error payload returned through the driving ports.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses, GraphQL errors, or any other protocol-specific envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::WorkspaceError;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The aggregate changed since it was read; re-fetch and retry.
    Conflict,
    /// The requested parent page does not resolve.
    InvalidParent,
    /// Reparenting would create a cycle.
    CycleDetected,
    /// The notebook has no pages.
    EmptyNotebook,
    /// The invitee does not match any account.
    UnknownUser,
    /// The invitee already has access.
    AlreadyCollaborator,
    /// The target has no collaborator row.
    NotACollaborator,
    /// The owner cannot be revoked.
    CannotRevokeOwner,
    /// A downstream dependency is unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use notebooks::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// # Panics
    /// Panics when `message` is blank.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Whether the caller should re-fetch the aggregate and re-apply.
    ///
    /// Only [`ErrorCode::Conflict`] is retry-eligible; everything else must be
    /// surfaced to the end user.
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::Conflict
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use notebooks::domain::{Error, ErrorCode};
    /// use serde_json::json;
    ///
    /// let err = Error::new(ErrorCode::InvalidRequest, "bad")
    ///     .with_details(json!({ "field": "title" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<WorkspaceError> for Error {
    fn from(value: WorkspaceError) -> Self {
        let message = value.to_string();
        let (code, details) = match value {
            WorkspaceError::InvalidParent {
                notebook_id,
                parent_id,
            } => (
                ErrorCode::InvalidParent,
                json!({ "notebookId": notebook_id, "parentId": parent_id }),
            ),
            WorkspaceError::DepthExceeded {
                parent_id,
                max_depth,
            } => (
                ErrorCode::InvalidParent,
                json!({ "parentId": parent_id, "maxDepth": max_depth }),
            ),
            WorkspaceError::CycleDetected {
                page_id,
                new_parent_id,
            } => (
                ErrorCode::CycleDetected,
                json!({ "pageId": page_id, "newParentId": new_parent_id }),
            ),
            WorkspaceError::EmptyNotebook { notebook_id } => (
                ErrorCode::EmptyNotebook,
                json!({ "notebookId": notebook_id }),
            ),
            WorkspaceError::PageNotFound {
                notebook_id,
                page_id,
            } => (
                ErrorCode::NotFound,
                json!({ "notebookId": notebook_id, "pageId": page_id }),
            ),
            WorkspaceError::NotebookNotFound { notebook_id } => {
                (ErrorCode::NotFound, json!({ "notebookId": notebook_id }))
            }
            WorkspaceError::PageOutsideNotebook {
                page_id,
                expected,
                actual,
            } => (
                ErrorCode::InternalError,
                json!({ "pageId": page_id, "expected": expected, "actual": actual }),
            ),
            WorkspaceError::DuplicatePage { page_id } => {
                (ErrorCode::InternalError, json!({ "pageId": page_id }))
            }
            WorkspaceError::UnknownUser { identifier } => {
                (ErrorCode::UnknownUser, json!({ "identifier": identifier }))
            }
            WorkspaceError::AlreadyCollaborator {
                notebook_id,
                member,
            } => (
                ErrorCode::AlreadyCollaborator,
                json!({ "notebookId": notebook_id, "member": member }),
            ),
            WorkspaceError::NotACollaborator {
                notebook_id,
                member,
            } => (
                ErrorCode::NotACollaborator,
                json!({ "notebookId": notebook_id, "member": member }),
            ),
            WorkspaceError::CannotRevokeOwner {
                notebook_id,
                owner_id,
            } => (
                ErrorCode::CannotRevokeOwner,
                json!({ "notebookId": notebook_id, "ownerId": owner_id }),
            ),
            WorkspaceError::Forbidden {
                notebook_id,
                user_id,
                capability,
            } => (
                ErrorCode::Forbidden,
                json!({
                    "notebookId": notebook_id,
                    "userId": user_id,
                    "capability": capability,
                }),
            ),
            WorkspaceError::Conflict {
                notebook_id,
                expected,
                actual,
            } => (
                ErrorCode::Conflict,
                json!({
                    "notebookId": notebook_id,
                    "expectedRevision": expected,
                    "actualRevision": actual,
                    "code": "revision_mismatch",
                }),
            ),
            WorkspaceError::Validation { field, .. } => {
                (ErrorCode::InvalidRequest, json!({ "field": field }))
            }
        };
        Self {
            code,
            message,
            details: Some(details),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}

#[cfg(test)]
mod tests;
