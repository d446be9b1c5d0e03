//! Notebook aggregate: identity, page tree, and collaborator list.
//!
//! The aggregate is the single consistency boundary for a notebook. Every
//! mutation is authorised against the caller's [`Role`], applied to a copy,
//! and only handed back for commit when every step succeeded, so a failed
//! call never leaves a partially applied change behind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EmailAddress, IdentityRef, NotebookId, PageId, UserId, WorkspaceError};

pub mod collaborators;
pub mod page_tree;

pub use self::collaborators::{
    Collaborator, CollaboratorRegistry, Invitee, PendingResolution, ResolvedInvitee,
};
pub use self::page_tree::{Page, PageTree, UNTITLED_PAGE, normalise_page_title};

/// How a user relates to a notebook. Computed once per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The notebook's creator.
    Owner,
    /// A user listed in the collaborator registry.
    Collaborator,
    /// Anyone else.
    None,
}

/// Actions gated by [`Role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Fetch the notebook and navigate its pages.
    Read,
    /// Add, rename, move, reorder, or delete pages.
    EditPages,
    /// Change the title or description.
    UpdateDetails,
    /// Invite or revoke collaborators.
    ManageCollaborators,
    /// Destroy the notebook.
    DeleteNotebook,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Read => "read",
            Self::EditPages => "edit pages",
            Self::UpdateDetails => "update details",
            Self::ManageCollaborators => "manage collaborators",
            Self::DeleteNotebook => "delete the notebook",
        };
        f.write_str(label)
    }
}

impl Role {
    /// Whether this role grants `capability`.
    ///
    /// Collaborators have full write access; only destruction is reserved
    /// for the owner.
    pub fn allows(self, capability: Capability) -> bool {
        match self {
            Self::Owner => true,
            Self::Collaborator => capability != Capability::DeleteNotebook,
            Self::None => false,
        }
    }
}

/// Size and nesting limits applied when validating input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceLimits {
    /// Maximum notebook title length in characters.
    pub notebook_title_max: usize,
    /// Maximum notebook description length in characters.
    pub description_max: usize,
    /// Maximum page title length in characters.
    pub page_title_max: usize,
    /// Maximum page nesting depth; root pages sit at depth 1.
    pub max_page_depth: usize,
}

impl Default for WorkspaceLimits {
    fn default() -> Self {
        Self {
            notebook_title_max: 100,
            description_max: 200,
            page_title_max: 120,
            max_page_depth: 16,
        }
    }
}

fn normalise_title(raw: &str, limits: &WorkspaceLimits) -> Result<String, WorkspaceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WorkspaceError::validation("title", "must not be empty"));
    }
    if trimmed.chars().count() > limits.notebook_title_max {
        return Err(WorkspaceError::validation(
            "title",
            format!("must be at most {} characters", limits.notebook_title_max),
        ));
    }
    Ok(trimmed.to_owned())
}

fn normalise_description(raw: &str, limits: &WorkspaceLimits) -> Result<String, WorkspaceError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > limits.description_max {
        return Err(WorkspaceError::validation(
            "description",
            format!("must be at most {} characters", limits.description_max),
        ));
    }
    Ok(trimmed.to_owned())
}

/// A notebook with its full page tree and collaborator list.
///
/// ## Invariants
/// - `title` is trimmed and non-empty.
/// - `pages` and `collaborators` belong to `id`.
/// - The owner never appears in `collaborators`.
/// - `revision` starts at 1 and grows by one per committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NotebookDto", into = "NotebookDto")]
pub struct Notebook {
    id: NotebookId,
    title: String,
    description: String,
    owner_id: UserId,
    pages: PageTree,
    collaborators: CollaboratorRegistry,
    revision: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Notebook {
    /// Create an empty notebook owned by `owner_id`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use notebooks::domain::UserId;
    /// use notebooks::domain::notebook::{Notebook, Role, WorkspaceLimits};
    ///
    /// let owner = UserId::random();
    /// let notebook = Notebook::create(
    ///     owner.clone(),
    ///     "  Field notes ",
    ///     None,
    ///     &WorkspaceLimits::default(),
    ///     Utc::now(),
    /// )
    /// .expect("valid notebook");
    /// assert_eq!(notebook.title(), "Field notes");
    /// assert_eq!(notebook.role(&owner), Role::Owner);
    /// assert!(notebook.pages().is_empty());
    /// ```
    pub fn create(
        owner_id: UserId,
        title: &str,
        description: Option<&str>,
        limits: &WorkspaceLimits,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkspaceError> {
        let title = normalise_title(title, limits)?;
        let description = normalise_description(description.unwrap_or_default(), limits)?;
        let id = NotebookId::random();
        Ok(Self {
            id,
            title,
            description,
            pages: PageTree::new(id),
            collaborators: CollaboratorRegistry::new(id, owner_id.clone()),
            owner_id,
            revision: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Notebook identifier.
    pub fn id(&self) -> NotebookId {
        self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Optional free-text description (empty when unset).
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Owner identity.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Page hierarchy.
    pub fn pages(&self) -> &PageTree {
        &self.pages
    }

    /// Access list, owner excluded.
    pub fn collaborators(&self) -> &CollaboratorRegistry {
        &self.collaborators
    }

    /// Optimistic concurrency revision.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last committed mutation.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Relationship between `user_id` and this notebook.
    pub fn role(&self, user_id: &UserId) -> Role {
        if user_id == &self.owner_id {
            Role::Owner
        } else if self.collaborators.get_by_user(user_id).is_some() {
            Role::Collaborator
        } else {
            Role::None
        }
    }

    /// Fail with [`WorkspaceError::Forbidden`] unless `user_id` holds
    /// `capability`.
    pub fn authorize(&self, user_id: &UserId, capability: Capability) -> Result<Role, WorkspaceError> {
        let role = self.role(user_id);
        if role.allows(capability) {
            Ok(role)
        } else {
            Err(WorkspaceError::Forbidden {
                notebook_id: self.id,
                user_id: user_id.clone(),
                capability,
            })
        }
    }

    /// Authorise, then apply `change` to a copy of the aggregate.
    ///
    /// On success the copy carries the next revision and `now` as its edit
    /// time, ready to be committed against the current revision. On failure
    /// `self` is untouched and nothing is returned to commit.
    pub fn mutate<T>(
        &self,
        actor: &UserId,
        capability: Capability,
        now: DateTime<Utc>,
        change: impl FnOnce(&mut Self) -> Result<T, WorkspaceError>,
    ) -> Result<(Self, T), WorkspaceError> {
        self.authorize(actor, capability)?;
        self.revise(now, change)
    }

    /// Apply `change` to a copy without an actor check.
    ///
    /// Used for system-driven changes such as attaching a pending invite to
    /// a newly registered account.
    pub fn revise<T>(
        &self,
        now: DateTime<Utc>,
        change: impl FnOnce(&mut Self) -> Result<T, WorkspaceError>,
    ) -> Result<(Self, T), WorkspaceError> {
        let mut next = self.clone();
        let output = change(&mut next)?;
        next.revision = self.revision.saturating_add(1);
        next.updated_at = now;
        Ok((next, output))
    }

    /// Replace the title and/or description.
    pub fn update_details(
        &mut self,
        title: Option<&str>,
        description: Option<&str>,
        limits: &WorkspaceLimits,
    ) -> Result<(), WorkspaceError> {
        let title = title.map(|raw| normalise_title(raw, limits)).transpose()?;
        let description = description
            .map(|raw| normalise_description(raw, limits))
            .transpose()?;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        Ok(())
    }

    /// Add a page under `parent_id` (or at the root).
    pub fn add_page(
        &mut self,
        title: &str,
        parent_id: Option<PageId>,
        limits: &WorkspaceLimits,
    ) -> Result<Page, WorkspaceError> {
        let title = normalise_page_title(title, limits.page_title_max)?;
        self.pages
            .add_page(title, parent_id, limits.max_page_depth)
            .cloned()
    }

    /// Rename an existing page.
    pub fn rename_page(
        &mut self,
        page_id: &PageId,
        title: &str,
        limits: &WorkspaceLimits,
    ) -> Result<(), WorkspaceError> {
        let title = normalise_page_title(title, limits.page_title_max)?;
        self.pages.rename(page_id, title)
    }

    /// Move a page under a new parent.
    pub fn reparent_page(
        &mut self,
        page_id: &PageId,
        new_parent_id: Option<PageId>,
        limits: &WorkspaceLimits,
    ) -> Result<(), WorkspaceError> {
        self.pages
            .reparent(page_id, new_parent_id, limits.max_page_depth)
    }

    /// Move a page within its sibling group.
    pub fn reorder_page(&mut self, page_id: &PageId, position: usize) -> Result<(), WorkspaceError> {
        self.pages.reorder(page_id, position)
    }

    /// Delete a page and its descendants, returning the removed ids.
    pub fn delete_page(&mut self, page_id: &PageId) -> Result<Vec<PageId>, WorkspaceError> {
        self.pages.delete_page(page_id)
    }

    /// Landing page for a freshly opened notebook.
    pub fn first_page(&self) -> Result<&Page, WorkspaceError> {
        self.pages.first_page()
    }

    /// Grant access to a resolved invitee.
    pub fn invite(&mut self, invitee: ResolvedInvitee) -> Result<Collaborator, WorkspaceError> {
        self.collaborators.invite(invitee)
    }

    /// Remove a collaborator's access.
    pub fn revoke(&mut self, user_id: &UserId) -> Result<Collaborator, WorkspaceError> {
        self.collaborators.revoke(user_id)
    }

    /// Cancel a pending invite.
    pub fn revoke_pending(&mut self, email: &EmailAddress) -> Result<Collaborator, WorkspaceError> {
        self.collaborators.revoke_pending(email)
    }

    /// Attach a new account to its pending invite, if any.
    pub fn resolve_pending(&mut self, identity: &IdentityRef) -> PendingResolution {
        self.collaborators.resolve_pending(identity)
    }

    /// Listing entry as seen by `viewer`.
    pub fn summary_for(&self, viewer: &UserId) -> NotebookSummary {
        NotebookSummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            owner_id: self.owner_id.clone(),
            role: self.role(viewer),
            page_count: self.pages.len(),
            updated_at: self.updated_at,
        }
    }
}

/// Card-sized view of a notebook for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookSummary {
    /// Notebook identifier.
    pub id: NotebookId,
    /// Display title.
    pub title: String,
    /// Description, possibly empty.
    pub description: String,
    /// Owner identity.
    pub owner_id: UserId,
    /// Viewer's role.
    pub role: Role,
    /// Number of pages.
    pub page_count: usize,
    /// Last edit time.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
struct NotebookDto {
    id: NotebookId,
    title: String,
    #[serde(default)]
    description: String,
    owner_id: UserId,
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(default)]
    collaborators: Vec<Collaborator>,
    revision: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Notebook> for NotebookDto {
    fn from(value: Notebook) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            owner_id: value.owner_id,
            pages: value.pages.iter().cloned().collect(),
            collaborators: value.collaborators.iter().cloned().collect(),
            revision: value.revision,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl TryFrom<NotebookDto> for Notebook {
    type Error = WorkspaceError;

    fn try_from(value: NotebookDto) -> Result<Self, Self::Error> {
        let title = value.title.trim();
        if title.is_empty() {
            return Err(WorkspaceError::validation("title", "must not be empty"));
        }
        let pages = PageTree::from_pages(value.id, value.pages)?;
        let collaborators =
            CollaboratorRegistry::from_rows(value.id, value.owner_id.clone(), value.collaborators)?;
        Ok(Self {
            id: value.id,
            title: title.to_owned(),
            description: value.description,
            owner_id: value.owner_id,
            pages,
            collaborators,
            revision: value.revision,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[cfg(test)]
mod tests;
