// Fri Oct 16 2026 - Alex

use crate::model::{InheritanceId, MemberId, ReferenceId, TemplateArgumentId, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of declaration a textual type reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Member,
    Typedef,
    Inheritance,
    TemplateArgument,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::Member,
        EdgeKind::Typedef,
        EdgeKind::Inheritance,
        EdgeKind::TemplateArgument,
    ];
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Member => "member",
            Self::Typedef => "typedef",
            Self::Inheritance => "inheritance",
            Self::TemplateArgument => "template argument",
        };
        f.write_str(name)
    }
}

/// Base-class edge. `parent_type_id` is the derived type that declares the base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InheritanceEdge {
    pub id: InheritanceId,
    pub parent_type_id: TypeId,
    pub order: u32,
    pub related_type_id: Option<TypeId>,
    pub related_type_string: String,
}

impl InheritanceEdge {
    pub fn is_resolved(&self) -> bool {
        self.related_type_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateArgumentEdge {
    pub id: TemplateArgumentId,
    pub owner_type_id: TypeId,
    pub position: u32,
    pub type_string: String,
    pub type_reference_id: Option<ReferenceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructMemberEdge {
    pub id: MemberId,
    pub struct_type_id: TypeId,
    pub name: String,
    /// Source order, the authority for layout
    pub declaration_order: u32,
    pub type_string: String,
    pub type_reference_id: Option<ReferenceId>,
    pub offset: Option<u32>,
    pub bit_field_width: Option<u8>,
    pub alignment: Option<u32>,
    pub is_function_pointer: bool,
    pub function_signature_id: Option<u64>,
}

impl fmt::Display for StructMemberEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_string, self.name)?;
        if let Some(width) = self.bit_field_width {
            write!(f, " : {}", width)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " @ 0x{:X}", offset)?;
        }
        Ok(())
    }
}
