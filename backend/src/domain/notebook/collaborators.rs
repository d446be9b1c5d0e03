//! Notebook-scoped access grants with id-or-email resolution.
//!
//! Invitations name a person either by user id or by email. The identifier
//! is parsed into an [`Invitee`] once, resolved against the identity provider
//! into a [`ResolvedInvitee`], and only then applied to the
//! [`CollaboratorRegistry`]. The registry itself never branches on raw
//! strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{
    CollaboratorId, EmailAddress, IdentityRef, NotebookId, UserId, Username, WorkspaceError,
};

/// Who an invitation is addressed to, before resolution.
///
/// # Examples
/// ```
/// use notebooks::domain::notebook::Invitee;
///
/// let by_email: Invitee = "x@y.com".parse().expect("email");
/// assert!(matches!(by_email, Invitee::Email(_)));
///
/// let by_id: Invitee = "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().expect("id");
/// assert!(matches!(by_id, Invitee::Id(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Invitee {
    /// An existing account addressed by id.
    Id(UserId),
    /// A person addressed by email, who may not have an account yet.
    Email(EmailAddress),
}

impl Invitee {
    /// Parse a raw identifier; anything containing `@` is treated as an email.
    pub fn parse(identifier: &str) -> Result<Self, WorkspaceError> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(WorkspaceError::validation(
                "collaborator",
                "identifier must not be empty",
            ));
        }
        if trimmed.contains('@') {
            EmailAddress::new(trimmed)
                .map(Self::Email)
                .map_err(|err| WorkspaceError::validation("email", err.to_string()))
        } else {
            UserId::new(trimmed)
                .map(Self::Id)
                .map_err(|err| WorkspaceError::validation("user id", err.to_string()))
        }
    }
}

impl FromStr for Invitee {
    type Err = WorkspaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Invitee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Email(email) => write!(f, "{email}"),
        }
    }
}

/// Invitation target after consulting the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInvitee {
    /// The invitee has an account.
    Account(IdentityRef),
    /// No account exists yet; the invite waits on this email.
    Pending(EmailAddress),
}

/// A grant of access to a notebook.
///
/// ## Invariants
/// - At least one of `user_id` and `email` is present.
/// - A pending invite has no `user_id` and no `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CollaboratorDto", into = "CollaboratorDto")]
pub struct Collaborator {
    id: CollaboratorId,
    notebook_id: NotebookId,
    user_id: Option<UserId>,
    email: Option<EmailAddress>,
    username: Option<Username>,
}

impl Collaborator {
    fn for_account(notebook_id: NotebookId, identity: &IdentityRef) -> Self {
        Self {
            id: CollaboratorId::random(),
            notebook_id,
            user_id: Some(identity.id().clone()),
            email: identity.email().cloned(),
            username: Some(identity.username().clone()),
        }
    }

    fn pending(notebook_id: NotebookId, email: EmailAddress) -> Self {
        Self {
            id: CollaboratorId::random(),
            notebook_id,
            user_id: None,
            email: Some(email),
            username: None,
        }
    }

    /// Grant identifier.
    pub fn id(&self) -> CollaboratorId {
        self.id
    }

    /// Notebook the grant applies to.
    pub fn notebook_id(&self) -> NotebookId {
        self.notebook_id
    }

    /// Resolved account, absent while the invite is pending.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Email the invitation was addressed to (or the account's email).
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Username of the resolved account.
    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    /// Whether the invite is still waiting for an account.
    pub fn is_pending(&self) -> bool {
        self.user_id.is_none()
    }

    fn label(&self) -> String {
        match (&self.user_id, &self.email) {
            (Some(user_id), _) => user_id.to_string(),
            (None, Some(email)) => email.to_string(),
            (None, None) => self.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
struct CollaboratorDto {
    id: CollaboratorId,
    notebook_id: NotebookId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<EmailAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<Username>,
}

impl From<Collaborator> for CollaboratorDto {
    fn from(value: Collaborator) -> Self {
        Self {
            id: value.id,
            notebook_id: value.notebook_id,
            user_id: value.user_id,
            email: value.email,
            username: value.username,
        }
    }
}

impl TryFrom<CollaboratorDto> for Collaborator {
    type Error = WorkspaceError;

    fn try_from(value: CollaboratorDto) -> Result<Self, Self::Error> {
        if value.user_id.is_none() && value.email.is_none() {
            return Err(WorkspaceError::validation(
                "collaborator",
                "either userId or email must be present",
            ));
        }
        if value.user_id.is_none() && value.username.is_some() {
            return Err(WorkspaceError::validation(
                "collaborator",
                "a pending invite cannot carry a username",
            ));
        }
        Ok(Self {
            id: value.id,
            notebook_id: value.notebook_id,
            user_id: value.user_id,
            email: value.email,
            username: value.username,
        })
    }
}

/// What [`CollaboratorRegistry::resolve_pending`] did with a new account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingResolution {
    /// The pending row now carries the account's id and username.
    Attached(CollaboratorId),
    /// The account already had access, so the pending row was dropped.
    Discarded(CollaboratorId),
    /// No pending invite matched the account's email.
    NoMatch,
}

/// Access list for one notebook. The owner is never listed.
///
/// ## Invariants
/// - At most one row per user id.
/// - At most one row per email.
/// - No row refers to the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorRegistry {
    notebook_id: NotebookId,
    owner_id: UserId,
    rows: Vec<Collaborator>,
}

impl CollaboratorRegistry {
    /// Create an empty registry.
    pub fn new(notebook_id: NotebookId, owner_id: UserId) -> Self {
        Self {
            notebook_id,
            owner_id,
            rows: Vec::new(),
        }
    }

    /// Rebuild a registry from stored rows, validating uniqueness.
    pub fn from_rows(
        notebook_id: NotebookId,
        owner_id: UserId,
        rows: impl IntoIterator<Item = Collaborator>,
    ) -> Result<Self, WorkspaceError> {
        let mut registry = Self::new(notebook_id, owner_id);
        for row in rows {
            if row.notebook_id != notebook_id {
                return Err(WorkspaceError::validation(
                    "collaborator",
                    format!("row {} belongs to notebook {}", row.id, row.notebook_id),
                ));
            }
            if row.user_id.as_ref() == Some(&registry.owner_id) {
                return Err(WorkspaceError::validation(
                    "collaborator",
                    "the owner cannot be listed as a collaborator",
                ));
            }
            if registry.find_conflict(row.user_id.as_ref(), row.email.as_ref()).is_some() {
                return Err(WorkspaceError::validation(
                    "collaborator",
                    format!("duplicate access grant for {}", row.label()),
                ));
            }
            registry.rows.push(row);
        }
        Ok(registry)
    }

    /// Notebook the registry guards.
    pub fn notebook_id(&self) -> NotebookId {
        self.notebook_id
    }

    /// Owner excluded from the list.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Number of rows, pending invites included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nobody besides the owner has access.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in invitation order.
    pub fn iter(&self) -> impl Iterator<Item = &Collaborator> {
        self.rows.iter()
    }

    /// Row for a resolved account.
    pub fn get_by_user(&self, user_id: &UserId) -> Option<&Collaborator> {
        self.rows
            .iter()
            .find(|row| row.user_id.as_ref() == Some(user_id))
    }

    /// Pending row waiting on `email`.
    pub fn find_pending(&self, email: &EmailAddress) -> Option<&Collaborator> {
        self.rows
            .iter()
            .find(|row| row.is_pending() && row.email.as_ref() == Some(email))
    }

    /// Add an access grant for a resolved invitee.
    ///
    /// Rejects, without mutating, an invitee who already has access: the
    /// owner, an existing account row, or any row with the same email.
    pub fn invite(&mut self, invitee: ResolvedInvitee) -> Result<Collaborator, WorkspaceError> {
        let row = match invitee {
            ResolvedInvitee::Account(identity) => {
                if identity.id() == &self.owner_id {
                    return Err(self.already(identity.id().to_string()));
                }
                if let Some(existing) = self.find_conflict(Some(identity.id()), identity.email()) {
                    return Err(self.already(existing.label()));
                }
                Collaborator::for_account(self.notebook_id, &identity)
            }
            ResolvedInvitee::Pending(email) => {
                if let Some(existing) = self.find_conflict(None, Some(&email)) {
                    return Err(self.already(existing.label()));
                }
                Collaborator::pending(self.notebook_id, email)
            }
        };
        self.rows.push(row.clone());
        Ok(row)
    }

    /// Remove the grant held by `user_id`.
    ///
    /// Targeting the owner always fails with
    /// [`WorkspaceError::CannotRevokeOwner`].
    pub fn revoke(&mut self, user_id: &UserId) -> Result<Collaborator, WorkspaceError> {
        if user_id == &self.owner_id {
            return Err(WorkspaceError::CannotRevokeOwner {
                notebook_id: self.notebook_id,
                owner_id: self.owner_id.clone(),
            });
        }
        let position = self
            .rows
            .iter()
            .position(|row| row.user_id.as_ref() == Some(user_id))
            .ok_or_else(|| WorkspaceError::NotACollaborator {
                notebook_id: self.notebook_id,
                member: user_id.to_string(),
            })?;
        Ok(self.rows.remove(position))
    }

    /// Cancel a pending invite addressed to `email`.
    pub fn revoke_pending(&mut self, email: &EmailAddress) -> Result<Collaborator, WorkspaceError> {
        let position = self
            .rows
            .iter()
            .position(|row| row.is_pending() && row.email.as_ref() == Some(email))
            .ok_or_else(|| WorkspaceError::NotACollaborator {
                notebook_id: self.notebook_id,
                member: email.to_string(),
            })?;
        Ok(self.rows.remove(position))
    }

    /// Attach a newly created account to the pending invite for its email.
    pub fn resolve_pending(&mut self, identity: &IdentityRef) -> PendingResolution {
        let Some(email) = identity.email() else {
            return PendingResolution::NoMatch;
        };
        let Some(position) = self
            .rows
            .iter()
            .position(|row| row.is_pending() && row.email.as_ref() == Some(email))
        else {
            return PendingResolution::NoMatch;
        };

        let already_member =
            identity.id() == &self.owner_id || self.get_by_user(identity.id()).is_some();
        if already_member {
            let dropped = self.rows.remove(position);
            return PendingResolution::Discarded(dropped.id);
        }

        match self.rows.get_mut(position) {
            Some(row) => {
                row.user_id = Some(identity.id().clone());
                row.username = Some(identity.username().clone());
                PendingResolution::Attached(row.id)
            }
            None => PendingResolution::NoMatch,
        }
    }

    fn find_conflict(
        &self,
        user_id: Option<&UserId>,
        email: Option<&EmailAddress>,
    ) -> Option<&Collaborator> {
        self.rows.iter().find(|row| {
            let same_user = user_id.is_some() && row.user_id.as_ref() == user_id;
            let same_email = email.is_some() && row.email.as_ref() == email;
            same_user || same_email
        })
    }

    fn already(&self, member: String) -> WorkspaceError {
        WorkspaceError::AlreadyCollaborator {
            notebook_id: self.notebook_id,
            member,
        }
    }
}

#[cfg(test)]
#[path = "collaborators_tests.rs"]
mod tests;
