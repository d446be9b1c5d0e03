//! Notebook workspace service.
//!
//! [`NotebookService`] implements the [`NotebookCommand`] and
//! [`NotebookQuery`] driving ports on top of the repository, identity, and
//! notifier driven ports. Every mutation follows the same path: load the
//! aggregate, authorise the actor, check the caller's revision, apply the
//! change to a copy, and commit it against the revision that was read.
//!
//! [`NotebookCommand`]: crate::domain::ports::NotebookCommand
//! [`NotebookQuery`]: crate::domain::ports::NotebookQuery

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    Committed, IdentityProvider, IdentityProviderError, NotebookRepository,
    NotebookRepositoryError, NotebookTarget, WorkspaceEvent, WorkspaceNotifier, WorkspaceOutcome,
};
use crate::domain::{
    Capability, Error, Notebook, NotebookId, UserId, WorkspaceError, WorkspaceLimits,
};

mod command;
mod query;

/// Notebook service implementing the driving ports.
#[derive(Clone)]
pub struct NotebookService<R, P, N> {
    notebooks: Arc<R>,
    identities: Arc<P>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    limits: WorkspaceLimits,
}

impl<R, P, N> NotebookService<R, P, N> {
    /// Create a service with default limits.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use notebooks::domain::NotebookService;
    /// # use notebooks::domain::ports::{
    /// #     FixtureIdentityProvider, FixtureNotebookRepository, NoOpWorkspaceNotifier,
    /// # };
    /// let service = NotebookService::new(
    ///     Arc::new(FixtureNotebookRepository),
    ///     Arc::new(FixtureIdentityProvider),
    ///     Arc::new(NoOpWorkspaceNotifier),
    ///     Arc::new(DefaultClock),
    /// );
    /// assert_eq!(service.limits().max_page_depth, 16);
    /// ```
    pub fn new(
        notebooks: Arc<R>,
        identities: Arc<P>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notebooks,
            identities,
            notifier,
            clock,
            limits: WorkspaceLimits::default(),
        }
    }

    /// Replace the validation limits.
    #[must_use]
    pub fn with_limits(mut self, limits: WorkspaceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Limits applied to titles, descriptions, and nesting.
    pub fn limits(&self) -> &WorkspaceLimits {
        &self.limits
    }
}

impl<R, P, N> NotebookService<R, P, N>
where
    R: NotebookRepository,
    P: IdentityProvider,
    N: WorkspaceNotifier,
{
    fn map_repository_error(
        error: NotebookRepositoryError,
        notebook_id: Option<NotebookId>,
    ) -> Error {
        match error {
            NotebookRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("notebook repository unavailable: {message}"))
            }
            NotebookRepositoryError::Query { message } => {
                Error::internal(format!("notebook repository error: {message}"))
            }
            NotebookRepositoryError::RevisionMismatch { expected, actual } => match notebook_id {
                Some(notebook_id) => WorkspaceError::Conflict {
                    notebook_id,
                    expected,
                    actual,
                }
                .into(),
                None => Error::conflict("revision mismatch"),
            },
            NotebookRepositoryError::Missing { notebook_id } => {
                WorkspaceError::NotebookNotFound { notebook_id }.into()
            }
            NotebookRepositoryError::Duplicate { notebook_id } => {
                Error::internal(format!("notebook id {notebook_id} is already taken"))
            }
        }
    }

    fn map_identity_error(error: IdentityProviderError) -> Error {
        match error {
            IdentityProviderError::Connection { message } => {
                Error::service_unavailable(format!("identity provider unavailable: {message}"))
            }
            IdentityProviderError::Lookup { message } => {
                Error::internal(format!("identity lookup failed: {message}"))
            }
        }
    }

    async fn load(&self, notebook_id: NotebookId) -> Result<Notebook, Error> {
        self.notebooks
            .find_by_id(&notebook_id)
            .await
            .map_err(|err| Self::map_repository_error(err, Some(notebook_id)))?
            .ok_or_else(|| WorkspaceError::NotebookNotFound { notebook_id }.into())
    }

    /// Load the target notebook, authorise the actor, and enforce the
    /// caller's revision precondition.
    async fn load_authorized(
        &self,
        target: &NotebookTarget,
        capability: Capability,
    ) -> Result<Notebook, Error> {
        let notebook = self.load(target.notebook_id).await?;
        Self::admit(target, &notebook, capability)?;
        Ok(notebook)
    }

    /// Authorise the actor against an already loaded notebook and enforce the
    /// caller's revision precondition.
    fn admit(
        target: &NotebookTarget,
        notebook: &Notebook,
        capability: Capability,
    ) -> Result<(), Error> {
        if let Err(err) = notebook.authorize(&target.actor, capability) {
            debug!(
                notebook_id = %target.notebook_id,
                actor = %target.actor,
                %capability,
                "access denied"
            );
            return Err(err.into());
        }
        if let Some(expected) = target.expected_revision
            && expected != notebook.revision()
        {
            return Err(WorkspaceError::Conflict {
                notebook_id: target.notebook_id,
                expected,
                actual: notebook.revision(),
            }
            .into());
        }
        Ok(())
    }

    /// Apply `change` to a copy of `current` and save it against
    /// `current`'s revision.
    async fn commit<T, F>(
        &self,
        actor: &UserId,
        current: &Notebook,
        capability: Capability,
        change: F,
    ) -> Result<Committed<T>, Error>
    where
        T: Send,
        F: FnOnce(&mut Notebook, &WorkspaceLimits) -> Result<T, WorkspaceError> + Send,
    {
        let limits = self.limits;
        let (next, value) = current.mutate(actor, capability, self.clock.utc(), |notebook| {
            change(notebook, &limits)
        })?;
        self.save(&next, current.revision()).await?;
        Ok(Committed {
            notebook: next,
            value,
        })
    }

    async fn save(&self, next: &Notebook, expected_revision: u32) -> Result<(), Error> {
        self.notebooks
            .save(next, expected_revision)
            .await
            .map_err(|err| Self::map_repository_error(err, Some(next.id())))
    }

    /// Tell the notifier about a committed change.
    ///
    /// Notification failures are logged; the commit already happened.
    async fn publish(
        &self,
        notebook: &Notebook,
        actor: Option<&UserId>,
        event: WorkspaceEvent,
    ) {
        let outcome = WorkspaceOutcome {
            notebook_id: notebook.id(),
            actor: actor.cloned(),
            revision: notebook.revision(),
            event,
        };
        info!(
            notebook_id = %outcome.notebook_id,
            revision = outcome.revision,
            event = outcome.event.name(),
            "workspace change committed"
        );
        if let Err(err) = self.notifier.notify(&outcome).await {
            warn!(
                notebook_id = %outcome.notebook_id,
                event = outcome.event.name(),
                error = %err,
                "workspace notification failed"
            );
        }
    }
}

#[cfg(test)]
mod test_helpers;
