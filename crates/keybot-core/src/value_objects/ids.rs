//! Identifier newtypes
//!
//! Member and guild ids are supplied by the chat platform; game and key ids
//! are surrogate ids assigned by the store. Wrapping the raw i64 keeps the
//! four id spaces from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create from a raw i64 value
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the inner i64 value
            #[inline]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_type!(
    /// Chat-platform user id, supplied by the adapter (never self-assigned)
    MemberId
);

id_type!(
    /// Chat-platform guild (server) id
    GuildId
);

id_type!(
    /// Surrogate id of a game row
    GameId
);

id_type!(
    /// Surrogate id of a key row
    KeyId
);
