//! UUID-backed identifiers for notebook entities.
//!
//! Each identifier is a distinct type so a page id can never be passed where a
//! notebook id is expected.

macro_rules! define_uuid_id {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Construct an identifier from an existing UUID.
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(::uuid::Uuid::parse_str(s)?))
            }
        }
    };
}

define_uuid_id! {
    /// Identifier of a notebook aggregate.
    NotebookId
}

define_uuid_id! {
    /// Identifier of a page inside a notebook.
    PageId
}

define_uuid_id! {
    /// Identifier of a collaborator grant.
    CollaboratorId
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use uuid::Uuid;

    #[test]
    fn from_str_round_trips() {
        let uuid = Uuid::nil();
        let page_id: PageId = uuid.to_string().parse().expect("parse uuid");
        assert_eq!(page_id.to_string(), uuid.to_string());
    }

    #[test]
    fn from_str_rejects_garbage() {
        assert!("not-a-uuid".parse::<NotebookId>().is_err());
    }

    #[test]
    fn serialises_as_bare_string() {
        let uuid = Uuid::new_v4();
        let id = CollaboratorId::from_uuid(uuid);
        let value = serde_json::to_value(id).expect("serialise id");
        assert_eq!(value, serde_json::Value::String(uuid.to_string()));
    }
}
