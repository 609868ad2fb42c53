// Fri Oct 16 2026 - Alex

use crate::model::*;
use crate::names::canonicalize;
use crate::store::typedefs::TypedefIndex;
use crate::store::{FlushSummary, ReferenceOwner, StoreError, StoreResult, TypeGraphStore, UnresolvedReference};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
struct StagedWrites {
    resolutions: Vec<(ReferenceId, ReferenceResolution)>,
    new_references: Vec<TypeReference>,
    template_links: Vec<(TemplateArgumentId, ReferenceId)>,
    inheritances: Vec<(InheritanceId, TypeId)>,
    offsets: Vec<(MemberId, u32)>,
    sizes: Vec<(TypeId, u32)>,
}

impl StagedWrites {
    fn len(&self) -> usize {
        self.resolutions.len()
            + self.new_references.len()
            + self.template_links.len()
            + self.inheritances.len()
            + self.offsets.len()
            + self.sizes.len()
    }
}

/// Arena-backed store. Insertion order is preserved for every entity so
/// that batched reads, and therefore both passes, are deterministic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTypeStore {
    types: IndexMap<TypeId, TypeNode>,
    references: IndexMap<ReferenceId, TypeReference>,
    members: IndexMap<MemberId, StructMemberEdge>,
    inheritances: IndexMap<InheritanceId, InheritanceEdge>,
    template_arguments: IndexMap<TemplateArgumentId, TemplateArgumentEdge>,
    typedefs: IndexMap<TypeDefId, TypeDef>,
    typedef_index: TypedefIndex,
    by_fully_qualified_name: AHashMap<String, TypeId>,
    by_base_name: AHashMap<String, Vec<TypeId>>,
    members_by_type: AHashMap<TypeId, Vec<MemberId>>,
    bases_by_type: AHashMap<TypeId, Vec<InheritanceId>>,
    template_arguments_by_type: AHashMap<TypeId, Vec<TemplateArgumentId>>,
    next_id: u64,
    staged: StagedWrites,
}

impl InMemoryTypeStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub(crate) fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    pub(crate) fn insert_type(&mut self, node: TypeNode) -> StoreResult<TypeId> {
        if self.by_fully_qualified_name.contains_key(&node.stored_fully_qualified_name) {
            return Err(StoreError::DuplicateType(node.stored_fully_qualified_name));
        }
        let id = node.id;
        self.by_fully_qualified_name.insert(node.stored_fully_qualified_name.clone(), id);
        self.by_base_name.entry(canonicalize(&node.base_name)).or_default().push(id);
        self.types.insert(id, node);
        Ok(id)
    }

    pub(crate) fn insert_reference(&mut self, reference: TypeReference) -> ReferenceId {
        let id = reference.id;
        self.references.insert(id, reference);
        id
    }

    pub(crate) fn insert_member(&mut self, member: StructMemberEdge) -> StoreResult<MemberId> {
        if !self.types.contains_key(&member.struct_type_id) {
            return Err(StoreError::UnknownType(member.struct_type_id));
        }
        let id = member.id;
        self.members_by_type.entry(member.struct_type_id).or_default().push(id);
        self.members.insert(id, member);
        Ok(id)
    }

    pub(crate) fn insert_inheritance(&mut self, edge: InheritanceEdge) -> StoreResult<InheritanceId> {
        if !self.types.contains_key(&edge.parent_type_id) {
            return Err(StoreError::UnknownType(edge.parent_type_id));
        }
        let id = edge.id;
        self.bases_by_type.entry(edge.parent_type_id).or_default().push(id);
        self.inheritances.insert(id, edge);
        Ok(id)
    }

    pub(crate) fn insert_template_argument(&mut self, edge: TemplateArgumentEdge) -> StoreResult<TemplateArgumentId> {
        if !self.types.contains_key(&edge.owner_type_id) {
            return Err(StoreError::UnknownType(edge.owner_type_id));
        }
        let id = edge.id;
        self.template_arguments_by_type.entry(edge.owner_type_id).or_default().push(id);
        self.template_arguments.insert(id, edge);
        Ok(id)
    }

    pub(crate) fn insert_typedef(&mut self, typedef: TypeDef) -> StoreResult<TypeDefId> {
        let name = typedef.fully_qualified_name();
        if self.typedef_index.contains(&name) {
            return Err(StoreError::DuplicateTypeDef(name));
        }
        let id = typedef.id;
        self.typedef_index.insert(typedef.clone());
        self.typedefs.insert(id, typedef);
        Ok(id)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn type_node(&self, id: TypeId) -> Option<&TypeNode> {
        self.types.get(&id)
    }

    pub fn type_by_name(&self, name: &str) -> Option<&TypeNode> {
        self.by_fully_qualified_name.get(name).and_then(|id| self.types.get(id))
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeNode> {
        self.types.values()
    }

    pub fn reference(&self, id: ReferenceId) -> Option<&TypeReference> {
        self.references.get(&id)
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn member(&self, id: MemberId) -> Option<&StructMemberEdge> {
        self.members.get(&id)
    }

    pub fn members_of(&self, type_id: TypeId) -> Vec<&StructMemberEdge> {
        let mut members: Vec<&StructMemberEdge> = self
            .members_by_type
            .get(&type_id)
            .map(|ids| ids.iter().filter_map(|id| self.members.get(id)).collect())
            .unwrap_or_default();
        members.sort_by_key(|m| (m.declaration_order, m.id));
        members
    }

    pub fn bases_of(&self, type_id: TypeId) -> Vec<&InheritanceEdge> {
        let mut bases: Vec<&InheritanceEdge> = self
            .bases_by_type
            .get(&type_id)
            .map(|ids| ids.iter().filter_map(|id| self.inheritances.get(id)).collect())
            .unwrap_or_default();
        bases.sort_by_key(|b| (b.order, b.id));
        bases
    }

    pub fn template_arguments_of(&self, type_id: TypeId) -> Vec<&TemplateArgumentEdge> {
        let mut arguments: Vec<&TemplateArgumentEdge> = self
            .template_arguments_by_type
            .get(&type_id)
            .map(|ids| ids.iter().filter_map(|id| self.template_arguments.get(id)).collect())
            .unwrap_or_default();
        arguments.sort_by_key(|a| (a.position, a.id));
        arguments
    }

    pub fn typedefs(&self) -> impl Iterator<Item = &TypeDef> {
        self.typedefs.values()
    }

    pub fn typedef(&self, id: TypeDefId) -> Option<&TypeDef> {
        self.typedefs.get(&id)
    }

    pub fn typedef_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.typedef_index.get(name)
    }

    fn find_type_id(&self, name: &str) -> Option<TypeId> {
        self.by_fully_qualified_name.get(name).copied()
    }

    fn reference_exists(&self, id: ReferenceId, staged: &AHashSet<ReferenceId>) -> bool {
        self.references.contains_key(&id) || staged.contains(&id)
    }

    /// Checks every staged write against committed state without applying anything
    fn validate_staged(&self) -> StoreResult<()> {
        let staged = &self.staged;
        let new_ids: AHashSet<ReferenceId> = staged.new_references.iter().map(|r| r.id).collect();

        for reference in &staged.new_references {
            if let Some(type_id) = reference.referenced_type_id {
                if !self.types.contains_key(&type_id) {
                    return Err(StoreError::UnknownType(type_id));
                }
            }
        }

        for (reference_id, resolution) in &staged.resolutions {
            if !self.reference_exists(*reference_id, &new_ids) {
                return Err(StoreError::UnknownReference(*reference_id));
            }
            if let ReferenceResolution::Resolved(type_id) = resolution {
                if !self.types.contains_key(type_id) {
                    return Err(StoreError::UnknownType(*type_id));
                }
                if let Some(existing) = self.references.get(reference_id).and_then(|r| r.referenced_type_id) {
                    if existing != *type_id {
                        return Err(StoreError::ConflictingResolution {
                            reference: *reference_id,
                            existing,
                            proposed: *type_id,
                        });
                    }
                }
            }
        }

        for (edge_id, reference_id) in &staged.template_links {
            if !self.template_arguments.contains_key(edge_id) {
                return Err(StoreError::UnknownTemplateArgument(*edge_id));
            }
            if !self.reference_exists(*reference_id, &new_ids) {
                return Err(StoreError::UnknownReference(*reference_id));
            }
        }

        for (edge_id, type_id) in &staged.inheritances {
            let edge = self
                .inheritances
                .get(edge_id)
                .ok_or(StoreError::UnknownInheritance(*edge_id))?;
            if !self.types.contains_key(type_id) {
                return Err(StoreError::UnknownType(*type_id));
            }
            if let Some(existing) = edge.related_type_id {
                if existing != *type_id {
                    return Err(StoreError::ConflictingBase {
                        edge: *edge_id,
                        existing,
                        proposed: *type_id,
                    });
                }
            }
        }

        for (member_id, _) in &staged.offsets {
            if !self.members.contains_key(member_id) {
                return Err(StoreError::UnknownMember(*member_id));
            }
        }

        for (type_id, _) in &staged.sizes {
            if !self.types.contains_key(type_id) {
                return Err(StoreError::UnknownType(*type_id));
            }
        }

        Ok(())
    }

    fn apply_staged(&mut self, staged: StagedWrites) -> FlushSummary {
        let mut summary = FlushSummary::default();

        for reference in staged.new_references {
            self.references.insert(reference.id, reference);
            summary.references_created += 1;
        }

        for (reference_id, resolution) in staged.resolutions {
            if let Some(reference) = self.references.get_mut(&reference_id) {
                if reference.resolution() != Some(resolution) && reference.needs_resolution() {
                    reference.apply(resolution);
                    summary.references_resolved += 1;
                }
            }
        }

        for (edge_id, reference_id) in staged.template_links {
            if let Some(edge) = self.template_arguments.get_mut(&edge_id) {
                if edge.type_reference_id.is_none() {
                    edge.type_reference_id = Some(reference_id);
                    summary.template_arguments_linked += 1;
                }
            }
        }

        for (edge_id, type_id) in staged.inheritances {
            if let Some(edge) = self.inheritances.get_mut(&edge_id) {
                if edge.related_type_id.is_none() {
                    edge.related_type_id = Some(type_id);
                    summary.inheritances_resolved += 1;
                }
            }
        }

        for (member_id, offset) in staged.offsets {
            if let Some(member) = self.members.get_mut(&member_id) {
                if member.offset != Some(offset) {
                    member.offset = Some(offset);
                    summary.offsets_written += 1;
                }
            }
        }

        for (type_id, size) in staged.sizes {
            if let Some(node) = self.types.get_mut(&type_id) {
                if node.size != Some(size) {
                    node.size = Some(size);
                    summary.sizes_written += 1;
                }
            }
        }

        summary
    }
}

impl TypeGraphStore for InMemoryTypeStore {
    fn get_all_types(&self) -> StoreResult<Vec<TypeNode>> {
        Ok(self.types.values().cloned().collect())
    }

    fn get_types_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, TypeNode>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.types.get(id).map(|node| (*id, node.clone())))
            .collect())
    }

    fn get_all_unresolved_references(&self) -> StoreResult<Vec<UnresolvedReference>> {
        let mut seen = AHashSet::new();
        let mut unresolved = Vec::new();

        for member in self.members.values() {
            let Some(reference_id) = member.type_reference_id else { continue };
            let Some(reference) = self.references.get(&reference_id) else { continue };
            if !reference.needs_resolution() || !seen.insert(reference_id) {
                continue;
            }
            let scope = self
                .types
                .get(&member.struct_type_id)
                .map(|node| node.stored_fully_qualified_name.clone())
                .unwrap_or_default();
            unresolved.push(UnresolvedReference {
                reference: reference.clone(),
                owner: ReferenceOwner::Member {
                    type_id: member.struct_type_id,
                    member_id: member.id,
                    member_name: member.name.clone(),
                },
                parent: format!("{}::{}", scope, member.name),
                scope,
            });
        }

        for typedef in self.typedefs.values() {
            let Some(reference) = self.references.get(&typedef.target_reference_id) else { continue };
            if !reference.needs_resolution() || !seen.insert(reference.id) {
                continue;
            }
            unresolved.push(UnresolvedReference {
                reference: reference.clone(),
                owner: ReferenceOwner::Typedef { typedef_id: typedef.id },
                scope: typedef.namespace.clone(),
                parent: typedef.fully_qualified_name(),
            });
        }

        Ok(unresolved)
    }

    fn get_all_unresolved_inheritances(&self) -> StoreResult<Vec<InheritanceEdge>> {
        Ok(self
            .inheritances
            .values()
            .filter(|edge| !edge.is_resolved())
            .cloned()
            .collect())
    }

    fn get_all_unresolved_template_arguments(&self) -> StoreResult<Vec<TemplateArgumentEdge>> {
        Ok(self
            .template_arguments
            .values()
            .filter(|edge| match edge.type_reference_id {
                None => true,
                Some(id) => self.references.get(&id).map(|r| r.needs_resolution()).unwrap_or(true),
            })
            .cloned()
            .collect())
    }

    fn get_references_batched(&self, ids: &[ReferenceId]) -> StoreResult<AHashMap<ReferenceId, TypeReference>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.references.get(id).map(|r| (*id, r.clone())))
            .collect())
    }

    fn find_type_by_fully_qualified_name(&self, name: &str) -> StoreResult<Option<TypeNode>> {
        Ok(self.type_by_name(name).cloned())
    }

    fn find_types_by_base_name(&self, name: &str) -> StoreResult<Vec<TypeNode>> {
        Ok(self
            .by_base_name
            .get(name)
            .map(|ids| ids.iter().filter_map(|id| self.types.get(id).cloned()).collect())
            .unwrap_or_default())
    }

    fn get_all_typedefs(&self) -> StoreResult<Vec<TypeDef>> {
        Ok(self.typedefs.values().cloned().collect())
    }

    fn resolve_typedef_chain(&self, name: &str, visited: &mut HashSet<String>) -> StoreResult<Option<TypeReference>> {
        let reference = |id: ReferenceId| self.references.get(&id).cloned();
        let find_type = |name: &str| self.find_type_id(name);
        Ok(self.typedef_index.resolve_chain(name, visited, &reference, &find_type))
    }

    fn get_struct_members_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, Vec<StructMemberEdge>>> {
        Ok(ids
            .iter()
            .filter(|id| self.types.contains_key(*id))
            .map(|id| (*id, self.members_of(*id).into_iter().cloned().collect()))
            .collect())
    }

    fn get_inheritance_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, Vec<InheritanceEdge>>> {
        Ok(ids
            .iter()
            .filter(|id| self.types.contains_key(*id))
            .map(|id| (*id, self.bases_of(*id).into_iter().cloned().collect()))
            .collect())
    }

    fn stage_reference_resolutions(&mut self, resolutions: &[(ReferenceId, ReferenceResolution)]) {
        self.staged.resolutions.extend_from_slice(resolutions);
    }

    fn stage_new_reference(&mut self, mut reference: TypeReference) -> ReferenceId {
        let id = ReferenceId::new(self.allocate_id());
        reference.id = id;
        self.staged.new_references.push(reference);
        id
    }

    fn stage_template_argument_references(&mut self, links: &[(TemplateArgumentId, ReferenceId)]) {
        self.staged.template_links.extend_from_slice(links);
    }

    fn stage_inheritance_resolutions(&mut self, resolutions: &[(InheritanceId, TypeId)]) {
        self.staged.inheritances.extend_from_slice(resolutions);
    }

    fn stage_member_offsets(&mut self, offsets: &[(MemberId, u32)]) {
        self.staged.offsets.extend_from_slice(offsets);
    }

    fn stage_type_sizes(&mut self, sizes: &[(TypeId, u32)]) {
        self.staged.sizes.extend_from_slice(sizes);
    }

    fn pending_writes(&self) -> usize {
        self.staged.len()
    }

    fn flush(&mut self) -> StoreResult<FlushSummary> {
        if let Err(e) = self.validate_staged() {
            log::warn!("Flush rejected, discarding {} staged writes: {}", self.staged.len(), e);
            self.discard_staged();
            return Err(e);
        }

        let staged = std::mem::take(&mut self.staged);
        let summary = self.apply_staged(staged);
        log::debug!("Flushed: {}", summary);
        Ok(summary)
    }

    fn discard_staged(&mut self) {
        self.staged = StagedWrites::default();
    }
}
