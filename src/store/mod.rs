// Fri Oct 16 2026 - Alex

//! Repository contract over the persistent type graph.
//!
//! Reads are batched so that neither engine ever issues one query per node.
//! Writes are staged in memory and become visible only after [`TypeGraphStore::flush`],
//! which applies the whole staged set or nothing.

pub mod error;
pub mod typedefs;
pub mod memory;
pub mod builder;
pub mod snapshot;

pub use error::{StoreError, StoreResult};
pub use typedefs::TypedefIndex;
pub use memory::InMemoryTypeStore;
pub use builder::{MemberSpec, TypeGraphBuilder, TypeSpec};
pub use snapshot::TypeDatabase;

use crate::model::*;
use ahash::AHashMap;
use std::collections::HashSet;
use std::fmt;

/// Who declared a reference, used for scoped lookup and diagnostics
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceOwner {
    Member {
        type_id: TypeId,
        member_id: MemberId,
        member_name: String,
    },
    Typedef {
        typedef_id: TypeDefId,
    },
}

impl ReferenceOwner {
    pub fn edge_kind(&self) -> EdgeKind {
        match self {
            Self::Member { .. } => EdgeKind::Member,
            Self::Typedef { .. } => EdgeKind::Typedef,
        }
    }
}

/// An unresolved reference together with the context it was declared in
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedReference {
    pub reference: TypeReference,
    pub owner: ReferenceOwner,
    /// Lookup scope: the declaring struct's fully-qualified name, or the typedef's namespace
    pub scope: String,
    /// Human readable declaring parent
    pub parent: String,
}

/// Effective changes applied by one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub references_resolved: usize,
    pub references_created: usize,
    pub template_arguments_linked: usize,
    pub inheritances_resolved: usize,
    pub offsets_written: usize,
    pub sizes_written: usize,
}

impl FlushSummary {
    pub fn total(&self) -> usize {
        self.references_resolved
            + self.references_created
            + self.template_arguments_linked
            + self.inheritances_resolved
            + self.offsets_written
            + self.sizes_written
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for FlushSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} references resolved, {} created, {} template arguments linked, {} bases resolved, {} offsets, {} sizes",
            self.references_resolved,
            self.references_created,
            self.template_arguments_linked,
            self.inheritances_resolved,
            self.offsets_written,
            self.sizes_written
        )
    }
}

pub trait TypeGraphStore {
    fn get_all_types(&self) -> StoreResult<Vec<TypeNode>>;

    fn get_types_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, TypeNode>>;

    /// Member and typedef references that are neither resolved nor primitive
    fn get_all_unresolved_references(&self) -> StoreResult<Vec<UnresolvedReference>>;

    fn get_all_unresolved_inheritances(&self) -> StoreResult<Vec<InheritanceEdge>>;

    /// Edges without a reference, or whose reference still needs resolution
    fn get_all_unresolved_template_arguments(&self) -> StoreResult<Vec<TemplateArgumentEdge>>;

    fn get_references_batched(&self, ids: &[ReferenceId]) -> StoreResult<AHashMap<ReferenceId, TypeReference>>;

    fn find_type_by_fully_qualified_name(&self, name: &str) -> StoreResult<Option<TypeNode>>;

    fn find_types_by_base_name(&self, name: &str) -> StoreResult<Vec<TypeNode>>;

    fn get_all_typedefs(&self) -> StoreResult<Vec<TypeDef>>;

    /// Follows the typedef named `name` to a resolved or primitive reference.
    /// Names already in `visited` abort the walk with `None`.
    fn resolve_typedef_chain(&self, name: &str, visited: &mut HashSet<String>) -> StoreResult<Option<TypeReference>>;

    /// Members per type, sorted by declaration order
    fn get_struct_members_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, Vec<StructMemberEdge>>>;

    /// Base edges per derived type, sorted by order
    fn get_inheritance_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, Vec<InheritanceEdge>>>;

    fn stage_reference_resolutions(&mut self, resolutions: &[(ReferenceId, ReferenceResolution)]);

    /// Stages a new reference and returns the id it will carry once flushed
    fn stage_new_reference(&mut self, reference: TypeReference) -> ReferenceId;

    fn stage_template_argument_references(&mut self, links: &[(TemplateArgumentId, ReferenceId)]);

    fn stage_inheritance_resolutions(&mut self, resolutions: &[(InheritanceId, TypeId)]);

    fn stage_member_offsets(&mut self, offsets: &[(MemberId, u32)]);

    fn stage_type_sizes(&mut self, sizes: &[(TypeId, u32)]);

    fn pending_writes(&self) -> usize;

    /// Applies every staged write or none of them
    fn flush(&mut self) -> StoreResult<FlushSummary>;

    fn discard_staged(&mut self);
}
