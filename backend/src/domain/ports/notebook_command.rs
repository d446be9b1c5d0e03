//! Driving port for notebook mutations.
//!
//! The [`NotebookCommand`] trait is what inbound adapters call to change a
//! notebook. Every call names the acting user and the notebook through a
//! [`NotebookTarget`]; the implementation authorises the actor, applies the
//! change to the aggregate, and commits it against the revision it read.

use async_trait::async_trait;

use crate::domain::{Collaborator, Error, IdentityRef, Notebook, NotebookId, Page, PageId, UserId};

/// Who is acting on which notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookTarget {
    /// The user making the request.
    pub actor: UserId,
    /// The notebook being changed.
    pub notebook_id: NotebookId,
    /// Revision the caller last saw.
    ///
    /// - `None` applies the change to whatever is stored.
    /// - `Some(n)` fails with a conflict unless the stored revision is `n`.
    pub expected_revision: Option<u32>,
}

impl NotebookTarget {
    /// Target `notebook_id` as `actor` without a revision precondition.
    pub fn new(actor: UserId, notebook_id: NotebookId) -> Self {
        Self {
            actor,
            notebook_id,
            expected_revision: None,
        }
    }

    /// Require the stored notebook to be at `revision`.
    #[must_use]
    pub fn at_revision(mut self, revision: u32) -> Self {
        self.expected_revision = Some(revision);
        self
    }
}

/// Request to create a notebook owned by the actor.
#[derive(Debug, Clone)]
pub struct CreateNotebookRequest {
    /// Future owner.
    pub actor: UserId,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Request to change notebook details. `None` fields stay as they are.
#[derive(Debug, Clone)]
pub struct UpdateNotebookRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// New title.
    pub title: Option<String>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
}

/// Request to invite someone by user id or email.
#[derive(Debug, Clone)]
pub struct AddCollaboratorRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// Raw identifier; anything containing `@` is treated as an email.
    pub invitee: String,
}

/// Request to revoke an account's access.
#[derive(Debug, Clone)]
pub struct DeleteCollaboratorRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// Collaborator to remove.
    pub user_id: UserId,
}

/// Request to withdraw a pending invite.
#[derive(Debug, Clone)]
pub struct CancelInviteRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// Email the invite was sent to.
    pub email: String,
}

/// Request to create a page.
#[derive(Debug, Clone)]
pub struct AddPageRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// Title; blank becomes "Untitled".
    pub title: String,
    /// Parent page, `None` for a root page.
    pub parent_id: Option<PageId>,
}

/// Request to rename a page.
#[derive(Debug, Clone)]
pub struct RenamePageRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// Page to rename.
    pub page_id: PageId,
    /// New title; blank becomes "Untitled".
    pub title: String,
}

/// Request to move a page under another parent.
#[derive(Debug, Clone)]
pub struct ReparentPageRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// Page to move.
    pub page_id: PageId,
    /// New parent, `None` for the root.
    pub new_parent_id: Option<PageId>,
}

/// Request to move a page within its siblings.
#[derive(Debug, Clone)]
pub struct ReorderPageRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// Page to move.
    pub page_id: PageId,
    /// Zero-based index among siblings; clamped to the group size.
    pub position: usize,
}

/// Request to delete a page and its descendants.
#[derive(Debug, Clone)]
pub struct DeletePageRequest {
    /// Actor and notebook.
    pub target: NotebookTarget,
    /// Root of the subtree to remove.
    pub page_id: PageId,
}

/// Committed aggregate plus the value the mutation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    /// Notebook as stored after the commit.
    pub notebook: Notebook,
    /// Mutation-specific result.
    pub value: T,
}

/// Driving port for notebook mutations.
///
/// # Optimistic Concurrency
///
/// Implementations commit against the revision they fetched. A concurrent
/// commit in between surfaces as a conflict error, which is the only
/// retryable failure. `add_collaborator` and `add_page` are not idempotent:
/// replaying a successful call yields an "already a collaborator" error or a
/// second page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotebookCommand: Send + Sync {
    /// Create an empty notebook owned by the actor.
    async fn create_notebook(&self, request: CreateNotebookRequest) -> Result<Notebook, Error>;

    /// Change title and/or description.
    async fn update_notebook(&self, request: UpdateNotebookRequest) -> Result<Notebook, Error>;

    /// Delete the notebook. Owner only.
    async fn delete_notebook(&self, target: NotebookTarget) -> Result<(), Error>;

    /// Invite an account or an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identifier is malformed (invalid request).
    /// - An id-addressed invitee has no account (unknown user).
    /// - The invitee already has access (already a collaborator).
    async fn add_collaborator(
        &self,
        request: AddCollaboratorRequest,
    ) -> Result<Committed<Collaborator>, Error>;

    /// Revoke an account's access. The owner can never be revoked.
    async fn delete_collaborator(
        &self,
        request: DeleteCollaboratorRequest,
    ) -> Result<Committed<Collaborator>, Error>;

    /// Withdraw a pending email invite.
    async fn cancel_invite(
        &self,
        request: CancelInviteRequest,
    ) -> Result<Committed<Collaborator>, Error>;

    /// Attach every pending invite for the identity's email to the account.
    ///
    /// Returns the notebooks that now grant the account access.
    async fn resolve_pending_invites(&self, identity: IdentityRef)
    -> Result<Vec<NotebookId>, Error>;

    /// Create a page at the end of its sibling group.
    async fn add_page(&self, request: AddPageRequest) -> Result<Committed<Page>, Error>;

    /// Rename a page.
    async fn rename_page(&self, request: RenamePageRequest) -> Result<Committed<Page>, Error>;

    /// Move a page with its subtree under a new parent.
    async fn reparent_page(&self, request: ReparentPageRequest)
    -> Result<Committed<Page>, Error>;

    /// Move a page within its sibling group.
    async fn reorder_page(&self, request: ReorderPageRequest) -> Result<Committed<Page>, Error>;

    /// Delete a page with all its descendants.
    ///
    /// Returns the removed ids in pre-order.
    async fn delete_page(
        &self,
        request: DeletePageRequest,
    ) -> Result<Committed<Vec<PageId>>, Error>;
}

/// Fixture command that rejects every notebook-scoped call as not found.
///
/// `create_notebook` builds a real aggregate with default limits so callers
/// have something to render.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotebookCommand;

fn missing(notebook_id: NotebookId) -> Error {
    Error::not_found(format!("notebook {notebook_id} not found"))
}

#[async_trait]
impl NotebookCommand for FixtureNotebookCommand {
    async fn create_notebook(&self, request: CreateNotebookRequest) -> Result<Notebook, Error> {
        Notebook::create(
            request.actor,
            &request.title,
            request.description.as_deref(),
            &crate::domain::WorkspaceLimits::default(),
            chrono::Utc::now(),
        )
        .map_err(Error::from)
    }

    async fn update_notebook(&self, request: UpdateNotebookRequest) -> Result<Notebook, Error> {
        Err(missing(request.target.notebook_id))
    }

    async fn delete_notebook(&self, target: NotebookTarget) -> Result<(), Error> {
        Err(missing(target.notebook_id))
    }

    async fn add_collaborator(
        &self,
        request: AddCollaboratorRequest,
    ) -> Result<Committed<Collaborator>, Error> {
        Err(missing(request.target.notebook_id))
    }

    async fn delete_collaborator(
        &self,
        request: DeleteCollaboratorRequest,
    ) -> Result<Committed<Collaborator>, Error> {
        Err(missing(request.target.notebook_id))
    }

    async fn cancel_invite(
        &self,
        request: CancelInviteRequest,
    ) -> Result<Committed<Collaborator>, Error> {
        Err(missing(request.target.notebook_id))
    }

    async fn resolve_pending_invites(
        &self,
        _identity: IdentityRef,
    ) -> Result<Vec<NotebookId>, Error> {
        Ok(Vec::new())
    }

    async fn add_page(&self, request: AddPageRequest) -> Result<Committed<Page>, Error> {
        Err(missing(request.target.notebook_id))
    }

    async fn rename_page(&self, request: RenamePageRequest) -> Result<Committed<Page>, Error> {
        Err(missing(request.target.notebook_id))
    }

    async fn reparent_page(
        &self,
        request: ReparentPageRequest,
    ) -> Result<Committed<Page>, Error> {
        Err(missing(request.target.notebook_id))
    }

    async fn reorder_page(&self, request: ReorderPageRequest) -> Result<Committed<Page>, Error> {
        Err(missing(request.target.notebook_id))
    }

    async fn delete_page(
        &self,
        request: DeletePageRequest,
    ) -> Result<Committed<Vec<PageId>>, Error> {
        Err(missing(request.target.notebook_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn fixture_command_creates_owned_notebook() {
        let actor = UserId::random();
        let notebook = FixtureNotebookCommand
            .create_notebook(CreateNotebookRequest {
                actor: actor.clone(),
                title: "Inbox".to_owned(),
                description: None,
            })
            .await
            .expect("fixture create");
        assert_eq!(notebook.owner_id(), &actor);
        assert_eq!(notebook.revision(), 1);
    }

    #[tokio::test]
    async fn fixture_command_reports_missing_notebooks() {
        let target = NotebookTarget::new(UserId::random(), NotebookId::random()).at_revision(3);
        assert_eq!(target.expected_revision, Some(3));

        let error = FixtureNotebookCommand
            .delete_notebook(target)
            .await
            .expect_err("nothing stored");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
