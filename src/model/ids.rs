//! Newtype IDs for type-safe identification of stored records.
//!
//! Using newtypes prevents accidentally mixing up different kinds of IDs
//! (e.g., filtering annotation labels by an annotation ID).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[doc = concat!("Creates a new ", stringify!($name), ".")]
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value.
            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self::new(id)
            }
        }
    };
}

define_id!(
    /// A unique identifier for a volume (a collection of images).
    VolumeId
);
define_id!(
    /// A unique identifier for a project (a collection of volumes).
    ProjectId
);
define_id!(
    /// A unique identifier for an image.
    ImageId
);
define_id!(
    /// A unique identifier for an annotation.
    AnnotationId
);
define_id!(
    /// A unique identifier for a label attached to an annotation.
    AnnotationLabelId
);
define_id!(
    /// A unique identifier for a label attached to a whole image.
    ImageLabelId
);
define_id!(
    /// A unique identifier for a label.
    LabelId
);
define_id!(
    /// A unique identifier for a label tree.
    LabelTreeId
);
define_id!(
    /// A unique identifier for a user.
    UserId
);
define_id!(
    /// A unique identifier for an annotation session.
    AnnotationSessionId
);
