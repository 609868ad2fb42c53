// Fri Oct 16 2026 - Alex

use crate::model::TypeId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Struct,
    Class,
    Union,
    Enum,
    Primitive,
    Unknown,
}

impl TypeKind {
    /// Struct, class or union
    pub fn is_aggregate(self) -> bool {
        matches!(self, Self::Struct | Self::Class | Self::Union)
    }

    pub fn is_union(self) -> bool {
        matches!(self, Self::Union)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::Primitive => "primitive",
            Self::Unknown => "unknown",
        }
    }
}

impl Default for TypeKind {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A declared type recovered from the binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    pub id: TypeId,
    pub base_name: String,
    pub namespace: String,
    pub kind: TypeKind,
    /// Explicit alignment from a declaration attribute, if any
    pub alignment: Option<u32>,
    pub is_ignored: bool,
    /// Canonical `namespace::base_name`, fixed at creation
    pub stored_fully_qualified_name: String,
    pub base_path: String,
    /// Total size written back by the layout pass
    pub size: Option<u32>,
}

impl TypeNode {
    pub fn fully_qualified_name(&self) -> &str {
        &self.stored_fully_qualified_name
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind.is_aggregate()
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.stored_fully_qualified_name)?;
        if let Some(size) = self.size {
            write!(f, " [size: 0x{:X}]", size)?;
        }
        if self.is_ignored {
            write!(f, " [ignored]")?;
        }
        Ok(())
    }
}
