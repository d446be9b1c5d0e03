//! Port for announcing committed workspace changes.
//!
//! Real-time delivery to other sessions lives outside the domain. The service
//! informs this port after every successful commit and never consults it
//! afterwards: a failed notification is logged and the mutation stands.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{CollaboratorId, NotebookId, PageId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors exposed when publishing workspace outcomes.
    pub enum WorkspaceNotifierError {
        /// Downstream transport rejected the event.
        Publish { message: String } => "workspace notification failed: {message}",
    }
}

/// What changed in a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[serde(rename_all_fields = "camelCase")]
pub enum WorkspaceEvent {
    /// A notebook was created.
    NotebookCreated,
    /// Title or description changed.
    DetailsUpdated,
    /// The notebook was deleted.
    NotebookDeleted,
    /// An account or a pending email was granted access.
    CollaboratorAdded {
        /// Registry row.
        collaborator_id: CollaboratorId,
        /// Whether the row still waits for an account.
        pending: bool,
    },
    /// Access was revoked from an account.
    CollaboratorRemoved {
        /// Removed row.
        collaborator_id: CollaboratorId,
    },
    /// A pending invite was withdrawn.
    InviteCancelled {
        /// Removed row.
        collaborator_id: CollaboratorId,
    },
    /// A pending invite was attached to a new account.
    InviteResolved {
        /// Updated row.
        collaborator_id: CollaboratorId,
        /// Account now holding the grant.
        user_id: UserId,
    },
    /// A page was created.
    PageAdded {
        /// New page.
        page_id: PageId,
    },
    /// A page title changed.
    PageRenamed {
        /// Renamed page.
        page_id: PageId,
    },
    /// A page moved under a new parent.
    PageMoved {
        /// Moved page.
        page_id: PageId,
        /// New parent, `None` for the root.
        parent_id: Option<PageId>,
    },
    /// A page changed position within its siblings.
    PageReordered {
        /// Moved page.
        page_id: PageId,
        /// Requested index after clamping.
        position: usize,
    },
    /// A page and its descendants were removed.
    PagesDeleted {
        /// Removed pages in pre-order.
        page_ids: Vec<PageId>,
    },
}

impl WorkspaceEvent {
    /// Stable label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotebookCreated => "notebook_created",
            Self::DetailsUpdated => "details_updated",
            Self::NotebookDeleted => "notebook_deleted",
            Self::CollaboratorAdded { .. } => "collaborator_added",
            Self::CollaboratorRemoved { .. } => "collaborator_removed",
            Self::InviteCancelled { .. } => "invite_cancelled",
            Self::InviteResolved { .. } => "invite_resolved",
            Self::PageAdded { .. } => "page_added",
            Self::PageRenamed { .. } => "page_renamed",
            Self::PageMoved { .. } => "page_moved",
            Self::PageReordered { .. } => "page_reordered",
            Self::PagesDeleted { .. } => "pages_deleted",
        }
    }
}

/// A committed change together with who made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceOutcome {
    /// Notebook the change applies to.
    pub notebook_id: NotebookId,
    /// User who made the change; `None` for system-driven resolution.
    pub actor: Option<UserId>,
    /// Revision after the change; for deletions, the last stored revision.
    pub revision: u32,
    /// What changed.
    pub event: WorkspaceEvent,
}

/// Outbound notification port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceNotifier: Send + Sync {
    /// Publish one committed outcome.
    async fn notify(&self, outcome: &WorkspaceOutcome) -> Result<(), WorkspaceNotifierError>;
}

/// Notifier that drops every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpWorkspaceNotifier;

#[async_trait]
impl WorkspaceNotifier for NoOpWorkspaceNotifier {
    async fn notify(&self, _outcome: &WorkspaceOutcome) -> Result<(), WorkspaceNotifierError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn noop_notify_returns_ok() {
        let outcome = WorkspaceOutcome {
            notebook_id: NotebookId::random(),
            actor: Some(UserId::random()),
            revision: 2,
            event: WorkspaceEvent::DetailsUpdated,
        };
        assert!(NoOpWorkspaceNotifier.notify(&outcome).await.is_ok());
    }

    #[test]
    fn event_serialises_with_type_tag() {
        let page_id = PageId::random();
        let value = serde_json::to_value(WorkspaceEvent::PageMoved {
            page_id,
            parent_id: None,
        })
        .expect("serialise");
        assert_eq!(
            value,
            json!({ "type": "page_moved", "pageId": page_id, "parentId": null })
        );
    }

    #[test]
    fn error_constructor_accepts_str() {
        let err = WorkspaceNotifierError::publish("closed");
        assert_eq!(err.to_string(), "workspace notification failed: closed");
    }
}
