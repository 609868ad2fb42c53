// Fri Oct 16 2026 - Alex

use crate::model::{ReferenceId, TypeId};
use crate::names::TypeShape;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A possibly-resolved pointer from a declaration to the type it names.
///
/// `referenced_type_id == None` with `is_primitive == false` means the
/// reference is still unresolved. Primitive references stay `None` forever
/// and are sized from the primitive table instead of a graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeReference {
    pub id: ReferenceId,
    pub type_string: String,
    pub fully_qualified_type_string: String,
    pub is_pointer: bool,
    pub pointer_depth: u8,
    pub is_array: bool,
    /// Total element count, dimensions multiplied out
    pub array_size: Option<u32>,
    pub is_reference: bool,
    pub is_const: bool,
    pub referenced_type_id: Option<TypeId>,
    pub is_primitive: bool,
}

/// Outcome written back for a reference by the resolution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceResolution {
    Resolved(TypeId),
    Primitive,
}

impl TypeReference {
    /// Builds an unresolved reference from a raw type string. The id is
    /// assigned by the store when the reference is staged or inserted.
    pub fn from_type_string(id: ReferenceId, type_string: &str) -> Self {
        let shape = TypeShape::parse(type_string);
        Self {
            id,
            type_string: type_string.to_string(),
            fully_qualified_type_string: shape.canonical_string(),
            is_pointer: shape.pointer_depth > 0 || shape.is_function_pointer,
            pointer_depth: shape.pointer_depth,
            is_array: shape.is_array(),
            array_size: shape.array_count(),
            is_reference: shape.is_reference,
            is_const: shape.is_const,
            referenced_type_id: None,
            is_primitive: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.referenced_type_id.is_some()
    }

    /// Neither resolved nor marked primitive
    pub fn needs_resolution(&self) -> bool {
        self.referenced_type_id.is_none() && !self.is_primitive
    }

    /// Pointers and C++ references occupy one machine word regardless of pointee
    pub fn is_indirect(&self) -> bool {
        self.is_pointer || self.pointer_depth > 0 || self.is_reference
    }

    pub fn apply(&mut self, resolution: ReferenceResolution) {
        match resolution {
            ReferenceResolution::Resolved(type_id) => {
                self.referenced_type_id = Some(type_id);
            }
            ReferenceResolution::Primitive => {
                self.is_primitive = true;
            }
        }
    }

    pub fn resolution(&self) -> Option<ReferenceResolution> {
        match (self.referenced_type_id, self.is_primitive) {
            (Some(id), _) => Some(ReferenceResolution::Resolved(id)),
            (None, true) => Some(ReferenceResolution::Primitive),
            (None, false) => None,
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_string)?;
        match self.resolution() {
            Some(ReferenceResolution::Resolved(id)) => write!(f, " -> {}", id),
            Some(ReferenceResolution::Primitive) => write!(f, " (primitive)"),
            None => write!(f, " (unresolved)"),
        }
    }
}
