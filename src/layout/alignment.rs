// Fri Oct 16 2026 - Alex

use crate::names::PrimitiveType;
use serde::Serialize;
use std::fmt;

pub const POINTER_SIZE: u32 = 4;

/// Natural alignment never exceeds this on the target, even for 8-byte scalars
pub const MAX_NATURAL_ALIGNMENT: u32 = 4;

/// Rounds `offset` up to the next multiple of `alignment`; no-op for alignment <= 1
pub fn align_offset(offset: u32, alignment: u32) -> u32 {
    if alignment <= 1 {
        return offset;
    }
    match offset % alignment {
        0 => offset,
        rem => offset.saturating_add(alignment - rem),
    }
}

pub fn alignment_from_size(size: u32) -> u32 {
    match size {
        0 | 1 => 1,
        2 => 2,
        _ => MAX_NATURAL_ALIGNMENT,
    }
}

/// Size and alignment of a type or member in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeMetrics {
    pub size: u32,
    pub alignment: u32,
}

impl TypeMetrics {
    /// Pointers of any depth, references and function pointers
    pub const POINTER: TypeMetrics = TypeMetrics {
        size: POINTER_SIZE,
        alignment: POINTER_SIZE,
    };

    /// Anything that cannot be sized: unresolved names, enums, cycles
    pub const FALLBACK: TypeMetrics = TypeMetrics { size: 4, alignment: 4 };

    pub fn new(size: u32, alignment: u32) -> Self {
        Self {
            size,
            alignment: alignment.max(1),
        }
    }

    /// Alignment derived from the size
    pub fn from_size(size: u32) -> Self {
        Self::new(size, alignment_from_size(size))
    }

    pub fn primitive(primitive: PrimitiveType) -> Self {
        Self::from_size(primitive.size())
    }

    /// `count` contiguous elements of this type
    pub fn array(self, count: u32) -> Self {
        Self::new(self.size.saturating_mul(count), self.alignment)
    }

    /// Explicit alignment from a declaration replaces the computed one
    pub fn with_explicit_alignment(self, alignment: Option<u32>) -> Self {
        match alignment.filter(|a| *a > 0) {
            Some(alignment) => Self::new(self.size, alignment),
            None => self,
        }
    }
}

impl fmt::Display for TypeMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "size {} align {}", self.size, self.alignment)
    }
}
