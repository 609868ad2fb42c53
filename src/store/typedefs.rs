// Fri Oct 16 2026 - Alex

use crate::model::{ReferenceId, TypeDef, TypeId, TypeReference};
use crate::names::{enclosing_scopes, qualify, TypeShape};
use ahash::AHashMap;
use itertools::Itertools;
use std::collections::HashSet;

/// One step of a typedef chain as seen by layout: the modifiers written on
/// the link's target and the next name to follow.
#[derive(Debug, Clone)]
pub struct TypedefLink {
    pub target: TypeReference,
    pub shape: TypeShape,
}

/// Typedefs keyed by fully-qualified name
#[derive(Debug, Clone, Default)]
pub struct TypedefIndex {
    by_name: AHashMap<String, TypeDef>,
}

impl TypedefIndex {
    pub fn new(typedefs: impl IntoIterator<Item = TypeDef>) -> Self {
        let by_name = typedefs
            .into_iter()
            .map(|typedef| (typedef.fully_qualified_name(), typedef))
            .collect();
        Self { by_name }
    }

    pub fn insert(&mut self, typedef: TypeDef) {
        self.by_name.insert(typedef.fully_qualified_name(), typedef);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// The typedef's target reference with its parsed shape
    pub fn link<R>(&self, name: &str, reference: R) -> Option<TypedefLink>
    where
        R: Fn(ReferenceId) -> Option<TypeReference>,
    {
        let typedef = self.by_name.get(name)?;
        let target = reference(typedef.target_reference_id)?;
        let shape = TypeShape::parse(&target.type_string);
        Some(TypedefLink { target, shape })
    }

    /// Walks `name` through typedef links. At every link the target is
    /// checked in order: already resolved or primitive, an existing type,
    /// a primitive spelling, then the next typedef. Returns `None` on a dead
    /// end or when a name repeats, the latter logged as a cycle.
    pub fn resolve_chain<R, F>(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        reference: &R,
        find_type: &F,
    ) -> Option<TypeReference>
    where
        R: Fn(ReferenceId) -> Option<TypeReference>,
        F: Fn(&str) -> Option<TypeId>,
    {
        if !visited.insert(name.to_string()) {
            log::warn!(
                "Typedef cycle detected at '{}' (chain: {}), abandoning resolution",
                name,
                visited.iter().sorted().join(", ")
            );
            return None;
        }

        let namespace = self.by_name.get(name)?.namespace.clone();
        let TypedefLink { mut target, shape } = self.link(name, reference)?;

        if target.resolution().is_some() {
            return Some(target);
        }

        let candidates = scoped_candidates(&namespace, &shape.canonical_base());
        if let Some(type_id) = candidates.iter().find_map(|candidate| find_type(candidate.as_str())) {
            target.referenced_type_id = Some(type_id);
            return Some(target);
        }

        if shape.is_primitive_leaf() {
            target.is_primitive = true;
            return Some(target);
        }

        let next = candidates.iter().find(|candidate| self.contains(candidate.as_str()))?;
        self.resolve_chain(next, visited, reference, find_type)
    }
}

/// `name` qualified by each scope enclosing `namespace`, innermost first, then unqualified
fn scoped_candidates(namespace: &str, name: &str) -> Vec<String> {
    if let Some(global) = name.strip_prefix("::") {
        return vec![global.to_string()];
    }
    let mut candidates: Vec<String> = enclosing_scopes(namespace)
        .iter()
        .map(|scope| qualify(scope, name))
        .collect();
    candidates.push(name.to_string());
    candidates
}
