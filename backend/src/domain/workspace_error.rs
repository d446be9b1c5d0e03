//! Typed failures raised by the workspace model.
//!
//! Every variant carries the identifiers involved so callers can render a
//! specific message. The service layer converts these into the
//! transport-agnostic [`Error`](crate::domain::Error) payload.

use crate::domain::notebook::Capability;
use crate::domain::{NotebookId, PageId, UserId};

/// Failures produced by page tree, collaborator registry, and aggregate
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkspaceError {
    /// The requested parent does not resolve inside the notebook.
    #[error("parent page {parent_id} does not exist in notebook {notebook_id}")]
    InvalidParent {
        /// Notebook the operation targeted.
        notebook_id: NotebookId,
        /// Parent that failed to resolve.
        parent_id: PageId,
    },
    /// Reparenting would place a page underneath itself.
    #[error("moving page {page_id} under {new_parent_id} would create a cycle")]
    CycleDetected {
        /// Page being moved.
        page_id: PageId,
        /// Requested parent, equal to or descending from `page_id`.
        new_parent_id: PageId,
    },
    /// Placing a page or subtree would nest it past the configured depth.
    #[error("page nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded {
        /// Requested parent; `None` when the subtree is too tall even at the root.
        parent_id: Option<PageId>,
        /// Configured limit.
        max_depth: usize,
    },
    /// The notebook has no root page to land on.
    #[error("notebook {notebook_id} has no pages")]
    EmptyNotebook {
        /// Notebook without pages.
        notebook_id: NotebookId,
    },
    /// The page does not exist in the notebook.
    #[error("page {page_id} does not exist in notebook {notebook_id}")]
    PageNotFound {
        /// Notebook that was searched.
        notebook_id: NotebookId,
        /// Missing page.
        page_id: PageId,
    },
    /// A page record claims a different notebook than the tree holding it.
    #[error("page {page_id} belongs to notebook {actual}, not {expected}")]
    PageOutsideNotebook {
        /// Offending page.
        page_id: PageId,
        /// Notebook the tree belongs to.
        expected: NotebookId,
        /// Notebook recorded on the page.
        actual: NotebookId,
    },
    /// Two page records share the same id.
    #[error("page {page_id} appears more than once")]
    DuplicatePage {
        /// Repeated id.
        page_id: PageId,
    },
    /// The notebook does not exist.
    #[error("notebook {notebook_id} not found")]
    NotebookNotFound {
        /// Missing notebook.
        notebook_id: NotebookId,
    },
    /// The invitee could not be resolved to an account.
    #[error("no user matches {identifier}")]
    UnknownUser {
        /// Identifier supplied by the caller.
        identifier: String,
    },
    /// The resolved user (or pending email) already has access.
    #[error("{member} already has access to notebook {notebook_id}")]
    AlreadyCollaborator {
        /// Notebook being shared.
        notebook_id: NotebookId,
        /// User id or email of the existing member.
        member: String,
    },
    /// The user (or pending email) has no collaborator row.
    #[error("{member} is not a collaborator on notebook {notebook_id}")]
    NotACollaborator {
        /// Notebook being searched.
        notebook_id: NotebookId,
        /// User id or email that was not found.
        member: String,
    },
    /// The owner cannot be removed through collaborator management.
    #[error("the owner {owner_id} of notebook {notebook_id} cannot be revoked")]
    CannotRevokeOwner {
        /// Notebook being edited.
        notebook_id: NotebookId,
        /// Owner of the notebook.
        owner_id: UserId,
    },
    /// The caller lacks the capability required by the operation.
    #[error("user {user_id} may not {capability} on notebook {notebook_id}")]
    Forbidden {
        /// Notebook being accessed.
        notebook_id: NotebookId,
        /// Caller identity.
        user_id: UserId,
        /// Capability that was denied.
        capability: Capability,
    },
    /// The aggregate changed since the caller read it.
    #[error("notebook {notebook_id} revision mismatch: expected {expected}, found {actual}")]
    Conflict {
        /// Notebook being committed.
        notebook_id: NotebookId,
        /// Revision the caller based its change on.
        expected: u32,
        /// Revision currently stored.
        actual: u32,
    },
    /// Input failed validation before any mutation was attempted.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable reason.
        message: String,
    },
}

impl WorkspaceError {
    /// Convenience constructor for [`WorkspaceError::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether re-fetching the aggregate and re-applying the change may
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
