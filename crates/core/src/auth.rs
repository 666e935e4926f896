use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier value.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a human or service account.
    ActorId
);
numeric_id!(
    /// Identifier of the UI rendering context a request was issued from.
    RenderingId
);
numeric_id!(
    /// Identifier of a permission role.
    RoleId
);

/// Authenticated actor issuing a request.
///
/// Supplied by the authentication layer and immutable for the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    id: ActorId,
    rendering_id: RenderingId,
    email: String,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl Actor {
    /// Creates an actor from authentication data.
    #[must_use]
    pub fn new(id: ActorId, rendering_id: RenderingId, email: impl Into<String>) -> Self {
        Self {
            id,
            rendering_id,
            email: email.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Returns the actor with the given tags attached.
    #[must_use]
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Returns the rendering context identifier.
    #[must_use]
    pub fn rendering_id(&self) -> RenderingId {
        self.rendering_id
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the free-form actor tags.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }
}
