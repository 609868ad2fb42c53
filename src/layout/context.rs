// Fri Oct 16 2026 - Alex

use crate::layout::alignment::{align_offset, TypeMetrics};
use crate::layout::bitfield::MemberCursor;
use crate::layout::type_layout::{BaseSlot, BitFieldSlot, MemberSlot, TypeLayout};
use crate::model::*;
use crate::names::{enclosing_scopes, qualify, PrimitiveType, TypeShape};
use crate::store::{StoreResult, TypeGraphStore, TypedefIndex};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use std::collections::HashSet;

/// What a name refers to inside a scope
enum Named {
    Type(TypeId),
    Typedef(String),
}

/// Everything one layout pass reads, loaded up front with batched queries,
/// plus the memo caches of that pass. Built fresh for every pass.
pub struct LayoutContext {
    types: IndexMap<TypeId, TypeNode>,
    by_name: AHashMap<String, TypeId>,
    members: AHashMap<TypeId, Vec<StructMemberEdge>>,
    bases: AHashMap<TypeId, Vec<InheritanceEdge>>,
    references: AHashMap<ReferenceId, TypeReference>,
    typedefs: TypedefIndex,
    type_size_cache: AHashMap<String, TypeMetrics>,
    calculating: AHashSet<String>,
    layouts: AHashMap<TypeId, TypeLayout>,
    defaulted_members: usize,
}

impl LayoutContext {
    pub fn load(store: &dyn TypeGraphStore) -> StoreResult<Self> {
        let types: IndexMap<TypeId, TypeNode> = store.get_all_types()?.into_iter().map(|node| (node.id, node)).collect();
        let by_name = types
            .values()
            .map(|node| (node.stored_fully_qualified_name.clone(), node.id))
            .collect();

        let aggregate_ids: Vec<TypeId> = types.values().filter(|node| node.is_aggregate()).map(|node| node.id).collect();
        let members = store.get_struct_members_batched(&aggregate_ids)?;
        let bases = store.get_inheritance_batched(&aggregate_ids)?;

        let typedefs = store.get_all_typedefs()?;
        let reference_ids: Vec<ReferenceId> = members
            .values()
            .flatten()
            .filter_map(|member| member.type_reference_id)
            .chain(typedefs.iter().map(|typedef| typedef.target_reference_id))
            .collect();
        let references = store.get_references_batched(&reference_ids)?;

        log::debug!(
            "Layout context: {} types, {} aggregates, {} references, {} typedefs",
            types.len(),
            aggregate_ids.len(),
            references.len(),
            typedefs.len()
        );

        Ok(Self {
            types,
            by_name,
            members,
            bases,
            references,
            typedefs: TypedefIndex::new(typedefs),
            type_size_cache: AHashMap::new(),
            calculating: AHashSet::new(),
            layouts: AHashMap::new(),
            defaulted_members: 0,
        })
    }

    /// Aggregates in store order
    pub fn aggregate_ids(&self) -> Vec<TypeId> {
        self.types.values().filter(|node| node.is_aggregate()).map(|node| node.id).collect()
    }

    pub fn type_node(&self, id: TypeId) -> Option<&TypeNode> {
        self.types.get(&id)
    }

    pub fn members_of(&self, id: TypeId) -> &[StructMemberEdge] {
        self.members.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Members that fell back to the default size in this pass
    pub fn defaulted_members(&self) -> usize {
        self.defaulted_members
    }

    pub fn compute_type_size(&mut self, fully_qualified_name: &str) -> u32 {
        self.metrics_by_name(fully_qualified_name).size
    }

    pub fn compute_alignment(&mut self, fully_qualified_name: &str) -> u32 {
        self.metrics_by_name(fully_qualified_name).alignment
    }

    fn metrics_by_name(&mut self, name: &str) -> TypeMetrics {
        if let Some(&id) = self.by_name.get(name) {
            return self.compute_type_metrics(id);
        }
        PrimitiveType::from_name(name)
            .map(TypeMetrics::primitive)
            .unwrap_or(TypeMetrics::FALLBACK)
    }

    /// Memoised by fully-qualified name. A type already being computed
    /// further up the stack gets the fallback instead of recursing.
    pub fn compute_type_metrics(&mut self, id: TypeId) -> TypeMetrics {
        let Some(node) = self.types.get(&id) else {
            return TypeMetrics::FALLBACK;
        };
        let name = node.stored_fully_qualified_name.clone();
        if let Some(metrics) = self.type_size_cache.get(&name) {
            return *metrics;
        }
        if !self.calculating.insert(name.clone()) {
            log::debug!("Size cycle through '{}', using fallback", name);
            return TypeMetrics::FALLBACK;
        }

        let kind = node.kind;
        let explicit = node.alignment;
        let base_name = node.base_name.clone();
        let metrics = match kind {
            TypeKind::Primitive => PrimitiveType::from_name(&base_name)
                .map(TypeMetrics::primitive)
                .unwrap_or(TypeMetrics::FALLBACK)
                .with_explicit_alignment(explicit),
            TypeKind::Enum | TypeKind::Unknown => TypeMetrics::FALLBACK.with_explicit_alignment(explicit),
            TypeKind::Struct | TypeKind::Class | TypeKind::Union => {
                let layout = self.compute_layout(id);
                let metrics = TypeMetrics::new(layout.size, layout.alignment);
                self.layouts.insert(id, layout);
                metrics
            }
        };

        self.calculating.remove(&name);
        self.type_size_cache.insert(name, metrics);
        metrics
    }

    /// Layout of an aggregate, computed on first request
    pub fn layout_of(&mut self, id: TypeId) -> Option<TypeLayout> {
        if !self.types.get(&id).map(TypeNode::is_aggregate).unwrap_or(false) {
            return None;
        }
        if !self.layouts.contains_key(&id) {
            self.compute_type_metrics(id);
        }
        self.layouts.get(&id).cloned()
    }

    fn compute_layout(&mut self, id: TypeId) -> TypeLayout {
        let Some(node) = self.types.get(&id).cloned() else {
            return TypeLayout::new(id, &id.to_string(), TypeKind::Unknown);
        };
        let mut layout = TypeLayout::new(id, &node.stored_fully_qualified_name, node.kind);

        let (bases, base_end, base_alignment) = self.compute_base_class_size(id);
        let (members, end, member_alignment) = self.compute_member_offsets(id, base_end);

        let alignment = node.alignment.filter(|a| *a > 0).unwrap_or(base_alignment.max(member_alignment));
        layout.bases = bases;
        layout.members = members;
        layout.alignment = alignment;
        layout.size = align_offset(end, alignment);
        layout.find_padding();
        layout
    }

    /// Lays out resolved bases in order. Returns the slots, the end offset
    /// (where the derived type's own members start) and the largest alignment.
    pub fn compute_base_class_size(&mut self, id: TypeId) -> (Vec<BaseSlot>, u32, u32) {
        let edges = self.bases.get(&id).cloned().unwrap_or_default();
        let mut slots = Vec::with_capacity(edges.len());
        let mut offset = 0u32;
        let mut max_alignment = 1u32;

        for edge in &edges {
            let Some(base_id) = edge.related_type_id else {
                log::debug!("Skipping unresolved base '{}' of {}", edge.related_type_string, id);
                continue;
            };
            let metrics = self.compute_type_metrics(base_id);
            offset = align_offset(offset, metrics.alignment);
            let name = self
                .types
                .get(&base_id)
                .map(|node| node.stored_fully_qualified_name.clone())
                .unwrap_or_else(|| edge.related_type_string.clone());
            slots.push(BaseSlot {
                name,
                type_id: base_id,
                offset,
                size: metrics.size,
            });
            offset = offset.saturating_add(metrics.size);
            max_alignment = max_alignment.max(metrics.alignment);
        }

        (slots, offset, max_alignment)
    }

    /// Places members starting at `start_offset`. Returns the slots, the end
    /// of the last member (an open bitfield unit included) and the largest alignment.
    pub fn compute_member_offsets(&mut self, id: TypeId, start_offset: u32) -> (Vec<MemberSlot>, u32, u32) {
        let is_union = self.types.get(&id).map(|node| node.kind.is_union()).unwrap_or(false);
        let scope = self
            .types
            .get(&id)
            .map(|node| node.stored_fully_qualified_name.clone())
            .unwrap_or_default();
        let members = self.members.get(&id).cloned().unwrap_or_default();
        let mut slots = Vec::with_capacity(members.len());

        if is_union {
            let mut end = start_offset;
            let mut max_alignment = 1u32;
            for member in &members {
                let metrics = self.member_metrics(member, &scope);
                end = end.max(start_offset.saturating_add(metrics.size));
                max_alignment = max_alignment.max(metrics.alignment);
                let bit_offset = member.bit_field_width.map(|_| 0);
                slots.push(self.slot(member, start_offset, metrics, bit_offset));
            }
            return (slots, end, max_alignment);
        }

        let mut cursor = MemberCursor::new(start_offset);
        for member in &members {
            let metrics = self.member_metrics(member, &scope);
            let placement = match member.bit_field_width {
                Some(width) => cursor.place_bitfield(width, metrics),
                None => cursor.place_field(metrics),
            };
            slots.push(self.slot(member, placement.offset, metrics, placement.bit_offset));
        }

        (slots, cursor.end(), cursor.max_alignment())
    }

    fn slot(&self, member: &StructMemberEdge, offset: u32, metrics: TypeMetrics, bit_offset: Option<u32>) -> MemberSlot {
        MemberSlot {
            member_id: member.id,
            name: member.name.clone(),
            type_string: member.type_string.clone(),
            offset,
            size: metrics.size,
            alignment: metrics.alignment,
            bit_field: member.bit_field_width.zip(bit_offset).map(|(width, bit_offset)| BitFieldSlot { width, bit_offset }),
        }
    }

    /// Size and alignment of one member, array counts and explicit alignment applied
    fn member_metrics(&mut self, member: &StructMemberEdge, scope: &str) -> TypeMetrics {
        if member.is_function_pointer {
            return TypeMetrics::POINTER.with_explicit_alignment(member.alignment);
        }

        let reference = member
            .type_reference_id
            .and_then(|id| self.references.get(&id).cloned())
            .unwrap_or_else(|| TypeReference::from_type_string(ReferenceId::new(0), &member.type_string));

        let element = if reference.is_indirect() {
            TypeMetrics::POINTER
        } else {
            self.element_metrics(&reference, scope)
        };

        let metrics = match reference.array_size {
            Some(count) if reference.is_array => element.array(count),
            _ => element,
        };
        metrics.with_explicit_alignment(member.alignment)
    }

    fn element_metrics(&mut self, reference: &TypeReference, scope: &str) -> TypeMetrics {
        let shape = TypeShape::parse(&reference.type_string);

        if let Some(Named::Typedef(name)) = self.lookup_scoped(&shape.canonical_base(), scope) {
            let mut visited = HashSet::new();
            if let Some(metrics) = self.typedef_metrics(&name, &mut visited) {
                return metrics;
            }
        }
        if let Some(type_id) = reference.referenced_type_id {
            return self.compute_type_metrics(type_id);
        }
        if let Some(primitive) = shape.primitive() {
            return TypeMetrics::primitive(primitive);
        }

        self.defaulted_members += 1;
        log::debug!("No size for '{}', defaulting to 4", reference.type_string);
        TypeMetrics::FALLBACK
    }

    /// Sizes a typedef by walking its chain, honouring the pointer and array
    /// modifiers written on each link. `None` on a dead end or a cycle.
    fn typedef_metrics(&mut self, name: &str, visited: &mut HashSet<String>) -> Option<TypeMetrics> {
        if !visited.insert(name.to_string()) {
            log::debug!("Typedef cycle at '{}' while sizing", name);
            return None;
        }

        let typedef = self.typedefs.get(name)?.clone();
        let target = self.references.get(&typedef.target_reference_id)?.clone();
        let shape = TypeShape::parse(&target.type_string);

        let element = if target.is_indirect() {
            TypeMetrics::POINTER
        } else {
            match self.lookup_scoped(&shape.canonical_base(), &typedef.namespace) {
                Some(Named::Typedef(next)) => self.typedef_metrics(&next, visited)?,
                Some(Named::Type(type_id)) => self.compute_type_metrics(type_id),
                None => match (target.referenced_type_id, shape.primitive()) {
                    (Some(type_id), _) => self.compute_type_metrics(type_id),
                    (None, Some(primitive)) => TypeMetrics::primitive(primitive),
                    (None, None) => return None,
                },
            }
        };

        Some(match target.array_size {
            Some(count) if target.is_array => element.array(count),
            _ => element,
        })
    }

    /// Innermost scope first, then the name as written. A type shadows a
    /// typedef of the same name.
    fn lookup_scoped(&self, name: &str, scope: &str) -> Option<Named> {
        let name = name.strip_prefix("::").unwrap_or(name);
        let mut candidates: Vec<String> = enclosing_scopes(scope).iter().map(|s| qualify(s, name)).collect();
        candidates.push(name.to_string());

        for candidate in candidates {
            if let Some(&id) = self.by_name.get(&candidate) {
                return Some(Named::Type(id));
            }
            if self.typedefs.contains(&candidate) {
                return Some(Named::Typedef(candidate));
            }
        }
        None
    }
}
