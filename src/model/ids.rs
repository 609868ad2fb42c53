// Fri Oct 16 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identity of a node in the type graph
    TypeId, "type"
);
define_id!(ReferenceId, "ref");
define_id!(MemberId, "member");
define_id!(InheritanceId, "base");
define_id!(TemplateArgumentId, "targ");
define_id!(TypeDefId, "typedef");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(TypeId::new(7).to_string(), "type#7");
        assert_eq!(MemberId::from(3).to_string(), "member#3");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&ReferenceId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
