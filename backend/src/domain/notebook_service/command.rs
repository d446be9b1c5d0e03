//! [`NotebookCommand`] implementation.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::notebook::{Invitee, PendingResolution, ResolvedInvitee};
use crate::domain::ports::{
    AddCollaboratorRequest, AddPageRequest, CancelInviteRequest, Committed,
    CreateNotebookRequest, DeleteCollaboratorRequest, DeletePageRequest, IdentityProvider,
    NotebookCommand, NotebookRepository, NotebookTarget, RenamePageRequest, ReorderPageRequest,
    ReparentPageRequest, UpdateNotebookRequest, WorkspaceEvent, WorkspaceNotifier,
};
use crate::domain::{
    Capability, Collaborator, EmailAddress, Error, IdentityRef, Notebook, NotebookId, Page,
    PageId, WorkspaceError,
};

use super::NotebookService;

fn page_after(notebook: &Notebook, page_id: &PageId) -> Result<Page, WorkspaceError> {
    notebook
        .pages()
        .get(page_id)
        .cloned()
        .ok_or(WorkspaceError::PageNotFound {
            notebook_id: notebook.id(),
            page_id: *page_id,
        })
}

impl<R, P, N> NotebookService<R, P, N>
where
    R: NotebookRepository,
    P: IdentityProvider,
    N: WorkspaceNotifier,
{
    /// Turn a parsed invitee into an account or a pending email.
    async fn resolve_invitee(&self, invitee: Invitee) -> Result<ResolvedInvitee, Error> {
        match invitee {
            Invitee::Id(user_id) => self
                .identities
                .find_by_id(&user_id)
                .await
                .map_err(Self::map_identity_error)?
                .map(ResolvedInvitee::Account)
                .ok_or_else(|| {
                    WorkspaceError::UnknownUser {
                        identifier: user_id.to_string(),
                    }
                    .into()
                }),
            Invitee::Email(email) => Ok(self
                .identities
                .find_by_email(&email)
                .await
                .map_err(Self::map_identity_error)?
                .map_or(ResolvedInvitee::Pending(email), ResolvedInvitee::Account)),
        }
    }

    async fn page_change<F>(
        &self,
        target: &NotebookTarget,
        page_id: PageId,
        event: WorkspaceEvent,
        change: F,
    ) -> Result<Committed<Page>, Error>
    where
        F: FnOnce(&mut Notebook, &crate::domain::WorkspaceLimits) -> Result<(), WorkspaceError>
            + Send,
    {
        let current = self.load_authorized(target, Capability::EditPages).await?;
        let committed = self
            .commit(&target.actor, &current, Capability::EditPages, |notebook, limits| {
                change(notebook, limits)?;
                page_after(notebook, &page_id)
            })
            .await?;
        self.publish(&committed.notebook, Some(&target.actor), event)
            .await;
        Ok(committed)
    }

    async fn resolve_in(
        &self,
        notebook: &Notebook,
        identity: &IdentityRef,
    ) -> Result<Option<NotebookId>, Error> {
        let (next, resolution) = notebook.revise(self.clock.utc(), |nb| {
            Ok(nb.resolve_pending(identity))
        })?;
        let event = match resolution {
            PendingResolution::NoMatch => return Ok(None),
            PendingResolution::Attached(collaborator_id) => WorkspaceEvent::InviteResolved {
                collaborator_id,
                user_id: identity.id().clone(),
            },
            PendingResolution::Discarded(collaborator_id) => {
                WorkspaceEvent::InviteCancelled { collaborator_id }
            }
        };
        self.save(&next, notebook.revision()).await?;
        let granted = matches!(event, WorkspaceEvent::InviteResolved { .. });
        self.publish(&next, None, event).await;
        Ok(granted.then_some(next.id()))
    }
}

#[async_trait]
impl<R, P, N> NotebookCommand for NotebookService<R, P, N>
where
    R: NotebookRepository,
    P: IdentityProvider,
    N: WorkspaceNotifier,
{
    async fn create_notebook(&self, request: CreateNotebookRequest) -> Result<Notebook, Error> {
        let notebook = Notebook::create(
            request.actor.clone(),
            &request.title,
            request.description.as_deref(),
            &self.limits,
            self.clock.utc(),
        )?;
        self.notebooks
            .insert(&notebook)
            .await
            .map_err(|err| Self::map_repository_error(err, Some(notebook.id())))?;
        self.publish(&notebook, Some(&request.actor), WorkspaceEvent::NotebookCreated)
            .await;
        Ok(notebook)
    }

    async fn update_notebook(&self, request: UpdateNotebookRequest) -> Result<Notebook, Error> {
        let UpdateNotebookRequest {
            target,
            title,
            description,
        } = request;
        let current = self
            .load_authorized(&target, Capability::UpdateDetails)
            .await?;
        let committed = self
            .commit(
                &target.actor,
                &current,
                Capability::UpdateDetails,
                |notebook, limits| {
                    notebook.update_details(title.as_deref(), description.as_deref(), limits)
                },
            )
            .await?;
        self.publish(
            &committed.notebook,
            Some(&target.actor),
            WorkspaceEvent::DetailsUpdated,
        )
        .await;
        Ok(committed.notebook)
    }

    async fn delete_notebook(&self, target: NotebookTarget) -> Result<(), Error> {
        let current = self
            .load_authorized(&target, Capability::DeleteNotebook)
            .await?;
        let deleted = self
            .notebooks
            .delete(&target.notebook_id, current.revision())
            .await
            .map_err(|err| Self::map_repository_error(err, Some(target.notebook_id)))?;
        if !deleted {
            return Err(WorkspaceError::NotebookNotFound {
                notebook_id: target.notebook_id,
            }
            .into());
        }
        self.publish(&current, Some(&target.actor), WorkspaceEvent::NotebookDeleted)
            .await;
        Ok(())
    }

    async fn add_collaborator(
        &self,
        request: AddCollaboratorRequest,
    ) -> Result<Committed<Collaborator>, Error> {
        let invitee = Invitee::parse(&request.invitee)?;
        let target = request.target;
        let current = self
            .load_authorized(&target, Capability::ManageCollaborators)
            .await?;
        let resolved = self.resolve_invitee(invitee).await?;
        debug!(notebook_id = %target.notebook_id, ?resolved, "invitee resolved");

        let committed = self
            .commit(
                &target.actor,
                &current,
                Capability::ManageCollaborators,
                |notebook, _| notebook.invite(resolved),
            )
            .await?;
        let event = WorkspaceEvent::CollaboratorAdded {
            collaborator_id: committed.value.id(),
            pending: committed.value.is_pending(),
        };
        self.publish(&committed.notebook, Some(&target.actor), event)
            .await;
        Ok(committed)
    }

    async fn delete_collaborator(
        &self,
        request: DeleteCollaboratorRequest,
    ) -> Result<Committed<Collaborator>, Error> {
        let DeleteCollaboratorRequest { target, user_id } = request;
        let current = self.load(target.notebook_id).await?;
        // The owner is never revocable, whoever asks.
        if &user_id == current.owner_id() {
            return Err(WorkspaceError::CannotRevokeOwner {
                notebook_id: target.notebook_id,
                owner_id: user_id,
            }
            .into());
        }
        Self::admit(&target, &current, Capability::ManageCollaborators)?;
        let committed = self
            .commit(
                &target.actor,
                &current,
                Capability::ManageCollaborators,
                |notebook, _| notebook.revoke(&user_id),
            )
            .await?;
        let event = WorkspaceEvent::CollaboratorRemoved {
            collaborator_id: committed.value.id(),
        };
        self.publish(&committed.notebook, Some(&target.actor), event)
            .await;
        Ok(committed)
    }

    async fn cancel_invite(
        &self,
        request: CancelInviteRequest,
    ) -> Result<Committed<Collaborator>, Error> {
        let email = EmailAddress::new(&request.email)
            .map_err(|err| WorkspaceError::validation("email", err.to_string()))?;
        let target = request.target;
        let current = self
            .load_authorized(&target, Capability::ManageCollaborators)
            .await?;
        let committed = self
            .commit(
                &target.actor,
                &current,
                Capability::ManageCollaborators,
                |notebook, _| notebook.revoke_pending(&email),
            )
            .await?;
        let event = WorkspaceEvent::InviteCancelled {
            collaborator_id: committed.value.id(),
        };
        self.publish(&committed.notebook, Some(&target.actor), event)
            .await;
        Ok(committed)
    }

    async fn resolve_pending_invites(
        &self,
        identity: IdentityRef,
    ) -> Result<Vec<NotebookId>, Error> {
        let Some(email) = identity.email() else {
            return Ok(Vec::new());
        };
        let candidates = self
            .notebooks
            .list_with_pending_invite(email)
            .await
            .map_err(|err| Self::map_repository_error(err, None))?;

        let mut granted = Vec::new();
        for notebook in &candidates {
            if let Some(notebook_id) = self.resolve_in(notebook, &identity).await? {
                granted.push(notebook_id);
            }
        }
        info!(
            user_id = %identity.id(),
            resolved = granted.len(),
            "pending invites resolved"
        );
        Ok(granted)
    }

    async fn add_page(&self, request: AddPageRequest) -> Result<Committed<Page>, Error> {
        let AddPageRequest {
            target,
            title,
            parent_id,
        } = request;
        let current = self.load_authorized(&target, Capability::EditPages).await?;
        let committed = self
            .commit(
                &target.actor,
                &current,
                Capability::EditPages,
                |notebook, limits| notebook.add_page(&title, parent_id, limits),
            )
            .await?;
        let event = WorkspaceEvent::PageAdded {
            page_id: committed.value.id(),
        };
        self.publish(&committed.notebook, Some(&target.actor), event)
            .await;
        Ok(committed)
    }

    async fn rename_page(&self, request: RenamePageRequest) -> Result<Committed<Page>, Error> {
        let RenamePageRequest {
            target,
            page_id,
            title,
        } = request;
        self.page_change(
            &target,
            page_id,
            WorkspaceEvent::PageRenamed { page_id },
            |notebook, limits| notebook.rename_page(&page_id, &title, limits),
        )
        .await
    }

    async fn reparent_page(
        &self,
        request: ReparentPageRequest,
    ) -> Result<Committed<Page>, Error> {
        let ReparentPageRequest {
            target,
            page_id,
            new_parent_id,
        } = request;
        self.page_change(
            &target,
            page_id,
            WorkspaceEvent::PageMoved {
                page_id,
                parent_id: new_parent_id,
            },
            |notebook, limits| notebook.reparent_page(&page_id, new_parent_id, limits),
        )
        .await
    }

    async fn reorder_page(&self, request: ReorderPageRequest) -> Result<Committed<Page>, Error> {
        let ReorderPageRequest {
            target,
            page_id,
            position,
        } = request;
        self.page_change(
            &target,
            page_id,
            WorkspaceEvent::PageReordered { page_id, position },
            |notebook, _| notebook.reorder_page(&page_id, position),
        )
        .await
    }

    async fn delete_page(
        &self,
        request: DeletePageRequest,
    ) -> Result<Committed<Vec<PageId>>, Error> {
        let DeletePageRequest { target, page_id } = request;
        let current = self.load_authorized(&target, Capability::EditPages).await?;
        let committed = self
            .commit(&target.actor, &current, Capability::EditPages, |notebook, _| {
                notebook.delete_page(&page_id)
            })
            .await?;
        let event = WorkspaceEvent::PagesDeleted {
            page_ids: committed.value.clone(),
        };
        self.publish(&committed.notebook, Some(&target.actor), event)
            .await;
        Ok(committed)
    }
}
