// Fri Oct 16 2026 - Alex

pub mod ids;
pub mod type_node;
pub mod reference;
pub mod edges;
pub mod typedef;

pub use ids::{TypeId, ReferenceId, MemberId, InheritanceId, TemplateArgumentId, TypeDefId};
pub use type_node::{TypeNode, TypeKind};
pub use reference::{TypeReference, ReferenceResolution};
pub use edges::{InheritanceEdge, TemplateArgumentEdge, StructMemberEdge, EdgeKind};
pub use typedef::TypeDef;
