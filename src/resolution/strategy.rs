// Fri Oct 16 2026 - Alex

use crate::model::ReferenceResolution;
use crate::names::{canonicalize, enclosing_scopes, last_segment, qualify, TypeShape};
use crate::store::{StoreResult, TypeGraphStore};
use std::collections::HashSet;

/// One raw type string to resolve, with the scope it was declared in
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub type_string: String,
    pub shape: TypeShape,
    /// Namespace or enclosing type used for qualified lookups, may be empty
    pub scope: String,
}

impl ResolutionRequest {
    pub fn new(type_string: &str, scope: &str) -> Self {
        Self {
            type_string: type_string.to_string(),
            shape: TypeShape::parse(type_string),
            scope: scope.to_string(),
        }
    }

    /// `name` qualified by every enclosing scope, innermost first, then as written
    fn candidates(&self, name: &str) -> Vec<String> {
        let name = name.trim();
        if name.is_empty() {
            return Vec::new();
        }
        if let Some(global) = name.strip_prefix("::") {
            return vec![global.to_string()];
        }

        let mut candidates: Vec<String> = enclosing_scopes(&self.scope)
            .iter()
            .map(|scope| qualify(scope, name))
            .collect();
        candidates.push(name.to_string());
        candidates.dedup();
        candidates
    }
}

pub type Strategy = fn(&dyn TypeGraphStore, &ResolutionRequest) -> StoreResult<Option<ReferenceResolution>>;

/// Tried in this order; the first hit wins
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("primitive", primitive),
    ("exact", exact),
    ("typedef", typedef),
    ("bare_name", bare_name),
    ("canonical", canonical),
];

/// Runs the strategy list, returning the winning strategy's name with its result
pub fn resolve(
    store: &dyn TypeGraphStore,
    request: &ResolutionRequest,
) -> StoreResult<Option<(&'static str, ReferenceResolution)>> {
    for (name, strategy) in STRATEGIES {
        if let Some(resolution) = strategy(store, request)? {
            return Ok(Some((name, resolution)));
        }
    }
    Ok(None)
}

pub fn primitive(_store: &dyn TypeGraphStore, request: &ResolutionRequest) -> StoreResult<Option<ReferenceResolution>> {
    Ok(request.shape.is_primitive_leaf().then_some(ReferenceResolution::Primitive))
}

pub fn exact(store: &dyn TypeGraphStore, request: &ResolutionRequest) -> StoreResult<Option<ReferenceResolution>> {
    lookup_type(store, request, &request.shape.base_name)
}

pub fn typedef(store: &dyn TypeGraphStore, request: &ResolutionRequest) -> StoreResult<Option<ReferenceResolution>> {
    lookup_typedef(store, request, &request.shape.base_name)
}

pub fn bare_name(store: &dyn TypeGraphStore, request: &ResolutionRequest) -> StoreResult<Option<ReferenceResolution>> {
    let bare = request.shape.bare_name();
    if let Some(resolution) = lookup(store, request, &bare)? {
        return Ok(Some(resolution));
    }

    let segment = last_segment(&bare);
    let matches = store.find_types_by_base_name(segment)?;
    match matches.as_slice() {
        [only] => Ok(Some(ReferenceResolution::Resolved(only.id))),
        [] => Ok(None),
        many => {
            log::debug!(
                "Ambiguous bare name '{}' for '{}': {} candidates, skipping",
                segment,
                request.type_string,
                many.len()
            );
            Ok(None)
        }
    }
}

pub fn canonical(store: &dyn TypeGraphStore, request: &ResolutionRequest) -> StoreResult<Option<ReferenceResolution>> {
    lookup(store, request, &canonicalize(&request.shape.base_name))
}

fn lookup(store: &dyn TypeGraphStore, request: &ResolutionRequest, name: &str) -> StoreResult<Option<ReferenceResolution>> {
    if let Some(resolution) = lookup_type(store, request, name)? {
        return Ok(Some(resolution));
    }
    lookup_typedef(store, request, name)
}

fn lookup_type(store: &dyn TypeGraphStore, request: &ResolutionRequest, name: &str) -> StoreResult<Option<ReferenceResolution>> {
    for candidate in request.candidates(name) {
        if let Some(node) = store.find_type_by_fully_qualified_name(&candidate)? {
            return Ok(Some(ReferenceResolution::Resolved(node.id)));
        }
    }
    Ok(None)
}

fn lookup_typedef(store: &dyn TypeGraphStore, request: &ResolutionRequest, name: &str) -> StoreResult<Option<ReferenceResolution>> {
    for candidate in request.candidates(name) {
        let mut visited = HashSet::new();
        if let Some(target) = store.resolve_typedef_chain(&candidate, &mut visited)? {
            if let Some(resolution) = target.resolution() {
                return Ok(Some(resolution));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeKind;
    use crate::store::TypeGraphBuilder;

    fn winner(store: &dyn TypeGraphStore, type_string: &str, scope: &str) -> Option<(&'static str, ReferenceResolution)> {
        resolve(store, &ResolutionRequest::new(type_string, scope)).unwrap()
    }

    #[test]
    fn test_primitive_wins_first() {
        let store = TypeGraphBuilder::new().build();
        let result = winner(&store, "const unsigned  int*", "");
        assert_eq!(result, Some(("primitive", ReferenceResolution::Primitive)));
        let result = winner(&store, "void (__cdecl *)(int)", "");
        assert_eq!(result, Some(("primitive", ReferenceResolution::Primitive)));
    }

    #[test]
    fn test_exact_prefers_innermost_scope() {
        let mut builder = TypeGraphBuilder::new();
        let outer = builder.add_type("", "Node", TypeKind::Struct).unwrap();
        let inner = builder.add_type("game", "Node", TypeKind::Struct).unwrap();
        let store = builder.build();

        assert_eq!(winner(&store, "Node*", "game::List"), Some(("exact", ReferenceResolution::Resolved(inner))));
        assert_eq!(winner(&store, "Node*", "other"), Some(("exact", ReferenceResolution::Resolved(outer))));
        assert_eq!(winner(&store, "::Node", "game"), Some(("exact", ReferenceResolution::Resolved(outer))));
    }

    #[test]
    fn test_exact_beats_bare_name() {
        let mut builder = TypeGraphBuilder::new();
        let specialised = builder.add_type("", "Vec<int>", TypeKind::Class).unwrap();
        builder.add_type("", "Vec", TypeKind::Class).unwrap();
        let store = builder.build();

        assert_eq!(winner(&store, "Vec<int>", ""), Some(("exact", ReferenceResolution::Resolved(specialised))));
    }

    #[test]
    fn test_bare_name_strips_templates() {
        let mut builder = TypeGraphBuilder::new();
        let table = builder.add_type("", "IntrusiveHashTable", TypeKind::Class).unwrap();
        let store = builder.build();

        let result = winner(&store, "IntrusiveHashTable<T>*", "");
        assert_eq!(result, Some(("bare_name", ReferenceResolution::Resolved(table))));
    }

    #[test]
    fn test_bare_name_unique_base_name() {
        let mut builder = TypeGraphBuilder::new();
        let widget = builder.add_type("ui::detail", "Widget", TypeKind::Class).unwrap();
        builder.add_type("a", "Shared", TypeKind::Class).unwrap();
        builder.add_type("b", "Shared", TypeKind::Class).unwrap();
        let store = builder.build();

        assert_eq!(winner(&store, "Widget", ""), Some(("bare_name", ReferenceResolution::Resolved(widget))));
        assert_eq!(winner(&store, "Shared", ""), None);
    }

    #[test]
    fn test_canonical_fixes_spacing() {
        let mut builder = TypeGraphBuilder::new();
        let map = builder.add_type("std", "map<int, float>", TypeKind::Class).unwrap();
        let store = builder.build();

        let result = winner(&store, "std :: map< int,float >", "");
        assert_eq!(result, Some(("canonical", ReferenceResolution::Resolved(map))));
    }

    #[test]
    fn test_typedef_chain() {
        let mut builder = TypeGraphBuilder::new();
        let concrete = builder.add_type("", "Concrete", TypeKind::Struct).unwrap();
        builder.add_typedef("", "A", "B").unwrap();
        builder.add_typedef("", "B", "Concrete").unwrap();
        builder.add_typedef("", "Handle", "unsigned int").unwrap();
        let store = builder.build();

        assert_eq!(winner(&store, "A", ""), Some(("typedef", ReferenceResolution::Resolved(concrete))));
        assert_eq!(winner(&store, "Handle", ""), Some(("typedef", ReferenceResolution::Primitive)));
    }

    #[test]
    fn test_unknown_name_unresolved() {
        let store = TypeGraphBuilder::new().build();
        assert_eq!(winner(&store, "Mystery<int>*", "ns"), None);
    }
}
