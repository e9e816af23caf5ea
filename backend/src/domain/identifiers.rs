//! UUID-backed identifiers for marketplace aggregates.

/// Error returned when text is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidIdentifier {
    kind: &'static str,
}

impl InvalidIdentifier {
    /// Human-readable identifier kind, e.g. `job id`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! define_id {
    ($(#[$outer:meta])* $name:ident => $kind:literal) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Parse the identifier from text.
            pub fn new(id: impl AsRef<str>) -> Result<Self, InvalidIdentifier> {
                ::uuid::Uuid::parse_str(id.as_ref())
                    .map(Self)
                    .map_err(|_| InvalidIdentifier { kind: $kind })
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Saved address identifier.
    AddressId => "address id"
);
define_id!(
    /// Service category identifier.
    CategoryId => "category id"
);
define_id!(
    /// Job identifier.
    JobId => "job id"
);
define_id!(
    /// Job application identifier.
    ApplicationId => "application id"
);
define_id!(
    /// Conversation identifier.
    ConversationId => "conversation id"
);
define_id!(
    /// Message identifier.
    MessageId => "message id"
);
define_id!(
    /// Review identifier.
    ReviewId => "review id"
);
define_id!(
    /// Notification identifier.
    NotificationId => "notification id"
);
