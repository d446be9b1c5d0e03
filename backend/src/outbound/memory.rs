//! Process-local adapters for the notebook repository and identity ports.
//!
//! The repository enforces the same revision contract a database adapter
//! would: commits and deletions name the revision they were based on and
//! fail with `RevisionMismatch` when another writer got there first.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, NotebookRepository, NotebookRepositoryError,
};
use crate::domain::{EmailAddress, IdentityRef, Notebook, NotebookId, Role, UserId};

/// Notebook store backed by a `HashMap` behind an async lock.
#[derive(Debug, Default)]
pub struct InMemoryNotebookRepository {
    notebooks: RwLock<HashMap<NotebookId, Notebook>>,
}

impl InMemoryNotebookRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `notebooks`.
    pub fn with_notebooks(notebooks: impl IntoIterator<Item = Notebook>) -> Self {
        let notebooks = notebooks
            .into_iter()
            .map(|notebook| (notebook.id(), notebook))
            .collect();
        Self {
            notebooks: RwLock::new(notebooks),
        }
    }

    /// Number of stored notebooks.
    pub async fn len(&self) -> usize {
        self.notebooks.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.notebooks.read().await.is_empty()
    }
}

fn check_revision(stored: &Notebook, expected: u32) -> Result<(), NotebookRepositoryError> {
    if stored.revision() == expected {
        Ok(())
    } else {
        Err(NotebookRepositoryError::revision_mismatch(
            expected,
            stored.revision(),
        ))
    }
}

#[async_trait]
impl NotebookRepository for InMemoryNotebookRepository {
    async fn find_by_id(
        &self,
        notebook_id: &NotebookId,
    ) -> Result<Option<Notebook>, NotebookRepositoryError> {
        Ok(self.notebooks.read().await.get(notebook_id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notebook>, NotebookRepositoryError> {
        let guard = self.notebooks.read().await;
        Ok(guard
            .values()
            .filter(|notebook| notebook.role(user_id) != Role::None)
            .cloned()
            .collect())
    }

    async fn list_with_pending_invite(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<Notebook>, NotebookRepositoryError> {
        let guard = self.notebooks.read().await;
        Ok(guard
            .values()
            .filter(|notebook| notebook.collaborators().find_pending(email).is_some())
            .cloned()
            .collect())
    }

    async fn insert(&self, notebook: &Notebook) -> Result<(), NotebookRepositoryError> {
        let mut guard = self.notebooks.write().await;
        if guard.contains_key(&notebook.id()) {
            return Err(NotebookRepositoryError::duplicate(notebook.id()));
        }
        guard.insert(notebook.id(), notebook.clone());
        debug!(notebook_id = %notebook.id(), "notebook inserted");
        Ok(())
    }

    async fn save(
        &self,
        notebook: &Notebook,
        expected_revision: u32,
    ) -> Result<(), NotebookRepositoryError> {
        let mut guard = self.notebooks.write().await;
        let stored = guard
            .get_mut(&notebook.id())
            .ok_or_else(|| NotebookRepositoryError::missing(notebook.id()))?;
        check_revision(stored, expected_revision)?;
        *stored = notebook.clone();
        debug!(
            notebook_id = %notebook.id(),
            revision = notebook.revision(),
            "notebook saved"
        );
        Ok(())
    }

    async fn delete(
        &self,
        notebook_id: &NotebookId,
        expected_revision: u32,
    ) -> Result<bool, NotebookRepositoryError> {
        let mut guard = self.notebooks.write().await;
        let Some(stored) = guard.get(notebook_id) else {
            return Ok(false);
        };
        check_revision(stored, expected_revision)?;
        guard.remove(notebook_id);
        debug!(%notebook_id, "notebook deleted");
        Ok(true)
    }
}

/// Identity directory keyed by user id; email lookups scan the accounts.
#[derive(Debug, Default)]
pub struct InMemoryIdentityDirectory {
    identities: RwLock<HashMap<UserId, IdentityRef>>,
}

impl InMemoryIdentityDirectory {
    /// Create a directory containing `identities`.
    pub fn with_identities(identities: impl IntoIterator<Item = IdentityRef>) -> Self {
        let identities = identities
            .into_iter()
            .map(|identity| (identity.id().clone(), identity))
            .collect();
        Self {
            identities: RwLock::new(identities),
        }
    }

    /// Add or replace an account.
    pub async fn register(&self, identity: IdentityRef) {
        self.identities
            .write()
            .await
            .insert(identity.id().clone(), identity);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityDirectory {
    async fn find_by_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<IdentityRef>, IdentityProviderError> {
        Ok(self.identities.read().await.get(user_id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<IdentityRef>, IdentityProviderError> {
        let guard = self.identities.read().await;
        Ok(guard
            .values()
            .find(|identity| identity.email() == Some(email))
            .cloned())
    }
}
