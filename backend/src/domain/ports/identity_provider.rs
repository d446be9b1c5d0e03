//! Port for resolving people named in invitations.
//!
//! Authentication happens elsewhere; this port only answers whether an
//! account exists for a user id or an email address.

use async_trait::async_trait;

use crate::domain::{EmailAddress, IdentityRef, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// Provider could not be reached.
        Connection { message: String } =>
            "identity provider connection failed: {message}",
        /// Provider answered with something unusable.
        Lookup { message: String } =>
            "identity lookup failed: {message}",
    }
}

/// Account lookups used when inviting collaborators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Find an account by id.
    async fn find_by_id(&self, user_id: &UserId)
    -> Result<Option<IdentityRef>, IdentityProviderError>;

    /// Find an account by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<IdentityRef>, IdentityProviderError>;
}

/// Fixture provider that knows nobody.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn find_by_id(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<IdentityRef>, IdentityProviderError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<IdentityRef>, IdentityProviderError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_provider_finds_nobody() {
        let provider = FixtureIdentityProvider;
        let email = EmailAddress::new("x@y.com").expect("valid email");

        assert!(
            provider
                .find_by_id(&UserId::random())
                .await
                .expect("lookup")
                .is_none()
        );
        assert!(
            provider
                .find_by_email(&email)
                .await
                .expect("lookup")
                .is_none()
        );
    }
}
