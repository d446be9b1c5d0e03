//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`NotebookCommand`], [`NotebookQuery`]) are implemented by
//! [`crate::domain::NotebookService`]. Driven ports ([`NotebookRepository`],
//! [`IdentityProvider`], [`WorkspaceNotifier`]) are implemented by adapters
//! in [`crate::outbound`].

mod macros;
pub(crate) use macros::define_port_error;

mod identity_provider;
mod notebook_command;
mod notebook_query;
mod notebook_repository;
mod workspace_notifier;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use notebook_command::MockNotebookCommand;
pub use notebook_command::{
    AddCollaboratorRequest, AddPageRequest, CancelInviteRequest, Committed,
    CreateNotebookRequest, DeleteCollaboratorRequest, DeletePageRequest, FixtureNotebookCommand,
    NotebookCommand, NotebookTarget, RenamePageRequest, ReorderPageRequest, ReparentPageRequest,
    UpdateNotebookRequest,
};
#[cfg(test)]
pub use notebook_query::MockNotebookQuery;
pub use notebook_query::{FixtureNotebookQuery, NotebookQuery, OpenedNotebook};
#[cfg(test)]
pub use notebook_repository::MockNotebookRepository;
pub use notebook_repository::{
    FixtureNotebookRepository, NotebookRepository, NotebookRepositoryError,
};
#[cfg(test)]
pub use workspace_notifier::MockWorkspaceNotifier;
pub use workspace_notifier::{
    NoOpWorkspaceNotifier, WorkspaceEvent, WorkspaceNotifier, WorkspaceNotifierError,
    WorkspaceOutcome,
};
