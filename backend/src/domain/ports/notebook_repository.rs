//! Port for notebook aggregate persistence.
//!
//! The [`NotebookRepository`] trait stores whole aggregates. Commits are
//! guarded by the revision the caller read, so two actors racing on the same
//! notebook cannot silently overwrite each other.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Notebook, NotebookId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notebook repository adapters.
    pub enum NotebookRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notebook repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notebook repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The notebook to update or delete is not stored.
        Missing { notebook_id: NotebookId } =>
            "notebook not found: {notebook_id}",
        /// A notebook with the same id already exists.
        Duplicate { notebook_id: NotebookId } =>
            "notebook already exists: {notebook_id}",
    }
}

/// Port for notebook storage and retrieval.
///
/// # Revision Semantics
///
/// - Inserted notebooks carry revision 1.
/// - Callers bump the revision on the aggregate before saving; the repository
///   compares the stored revision with `expected_revision` and never
///   increments on its own.
/// - A stale `expected_revision` fails with
///   [`NotebookRepositoryError::RevisionMismatch`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotebookRepository: Send + Sync {
    /// Fetch a notebook with its full page tree and collaborator list.
    ///
    /// Returns `None` if no notebook exists with the given id.
    async fn find_by_id(
        &self,
        notebook_id: &NotebookId,
    ) -> Result<Option<Notebook>, NotebookRepositoryError>;

    /// Notebooks the user owns or collaborates on.
    async fn list_for_user(&self, user_id: &UserId)
    -> Result<Vec<Notebook>, NotebookRepositoryError>;

    /// Notebooks holding a pending invite for `email`.
    async fn list_with_pending_invite(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<Notebook>, NotebookRepositoryError>;

    /// Store a new notebook.
    async fn insert(&self, notebook: &Notebook) -> Result<(), NotebookRepositoryError>;

    /// Replace a stored notebook if its revision still equals
    /// `expected_revision`.
    async fn save(
        &self,
        notebook: &Notebook,
        expected_revision: u32,
    ) -> Result<(), NotebookRepositoryError>;

    /// Remove a notebook if its revision still equals `expected_revision`.
    ///
    /// Returns `Ok(false)` if nothing was stored under the id.
    async fn delete(
        &self,
        notebook_id: &NotebookId,
        expected_revision: u32,
    ) -> Result<bool, NotebookRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotebookRepository;

#[async_trait]
impl NotebookRepository for FixtureNotebookRepository {
    async fn find_by_id(
        &self,
        _notebook_id: &NotebookId,
    ) -> Result<Option<Notebook>, NotebookRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Notebook>, NotebookRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_with_pending_invite(
        &self,
        _email: &EmailAddress,
    ) -> Result<Vec<Notebook>, NotebookRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _notebook: &Notebook) -> Result<(), NotebookRepositoryError> {
        Ok(())
    }

    async fn save(
        &self,
        _notebook: &Notebook,
        _expected_revision: u32,
    ) -> Result<(), NotebookRepositoryError> {
        Ok(())
    }

    async fn delete(
        &self,
        _notebook_id: &NotebookId,
        _expected_revision: u32,
    ) -> Result<bool, NotebookRepositoryError> {
        Ok(false)
    }
}
