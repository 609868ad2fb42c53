// Fri Oct 16 2026 - Alex

use ahash::AHashMap;
use std::collections::HashSet;
use type_layout_resolver::layout::LayoutEngine;
use type_layout_resolver::model::*;
use type_layout_resolver::progress::{BarProgress, RecordingProgress};
use type_layout_resolver::resolution::ResolutionEngine;
use type_layout_resolver::store::{
    FlushSummary, InMemoryTypeStore, MemberSpec, StoreError, StoreResult, TypeDatabase, TypeGraphBuilder,
    TypeGraphStore, UnresolvedReference,
};
use type_layout_resolver::{calculate_and_apply_offsets, resolve_type_references};

const ENGINE_DB: &str = r#"{
  "types": [
    {
      "name": "Vector3",
      "namespace": "engine",
      "kind": "Struct",
      "members": [
        { "name": "x", "type_string": "float" },
        { "name": "y", "type_string": "float" },
        { "name": "z", "type_string": "float" }
      ]
    },
    {
      "name": "Instance",
      "namespace": "engine",
      "kind": "Class",
      "members": [
        { "name": "vtable", "type_string": "void*" },
        { "name": "parent", "type_string": "Instance*" },
        { "name": "archivable", "type_string": "bool" }
      ]
    },
    {
      "name": "Part",
      "namespace": "engine",
      "kind": "Class",
      "bases": [ { "type_string": "Instance" } ],
      "members": [
        { "name": "position", "type_string": "Vector3" },
        { "name": "anchored", "type_string": "bool" },
        { "name": "mass", "type_string": "double" },
        { "name": "tags", "type_string": "char[6]" },
        { "name": "owner", "type_string": "PInstance" }
      ]
    }
  ],
  "typedefs": [
    { "name": "PInstance", "namespace": "engine", "target": "Instance*" }
  ]
}"#;

fn engine_store() -> InMemoryTypeStore {
    TypeDatabase::from_json(ENGINE_DB).unwrap().into_store().unwrap()
}

fn run_pipeline(store: &mut InMemoryTypeStore) {
    resolve_type_references(store, None).unwrap();
    calculate_and_apply_offsets(store, None).unwrap();
}

fn member_offset(store: &InMemoryTypeStore, type_name: &str, member: &str) -> Option<u32> {
    let node = store.type_by_name(type_name).unwrap();
    store
        .members_of(node.id)
        .into_iter()
        .find(|edge| edge.name == member)
        .and_then(|edge| edge.offset)
}

fn type_size(store: &InMemoryTypeStore, type_name: &str) -> Option<u32> {
    store.type_by_name(type_name).unwrap().size
}

#[test]
fn test_json_database_end_to_end() {
    let mut store = engine_store();
    let report = ResolutionEngine::new().run(&mut store, None).unwrap();
    assert!(report.is_complete(), "unresolved: {:?}", report.samples);

    let instance = store.type_by_name("engine::Instance").unwrap().id;
    let part = store.type_by_name("engine::Part").unwrap().id;
    assert_eq!(store.bases_of(part)[0].related_type_id, Some(instance));

    calculate_and_apply_offsets(&mut store, None).unwrap();

    assert_eq!(type_size(&store, "engine::Vector3"), Some(12));
    assert_eq!(type_size(&store, "engine::Instance"), Some(12));
    assert_eq!(member_offset(&store, "engine::Instance", "archivable"), Some(8));

    assert_eq!(member_offset(&store, "engine::Part", "position"), Some(12));
    assert_eq!(member_offset(&store, "engine::Part", "anchored"), Some(24));
    assert_eq!(member_offset(&store, "engine::Part", "mass"), Some(28));
    assert_eq!(member_offset(&store, "engine::Part", "tags"), Some(36));
    assert_eq!(member_offset(&store, "engine::Part", "owner"), Some(44));
    assert_eq!(type_size(&store, "engine::Part"), Some(48));
}

#[test]
fn test_pipeline_is_idempotent() {
    let mut store = engine_store();
    run_pipeline(&mut store);
    let references = store.reference_count();
    let first = TypeDatabase::from_store(&store).to_json().unwrap();

    let resolution = ResolutionEngine::new().run(&mut store, None).unwrap();
    let layout = LayoutEngine::new().run(&mut store, None).unwrap();

    assert_eq!(resolution.references_created, 0);
    assert!(resolution.flush.is_empty());
    assert!(layout.flush.is_empty());
    assert_eq!(store.reference_count(), references);
    assert_eq!(TypeDatabase::from_store(&store).to_json().unwrap(), first);
}

#[test]
fn test_typedef_chain_sizes_concrete_type() {
    let mut builder = TypeGraphBuilder::new();
    let concrete = builder.add_type("", "Concrete", TypeKind::Struct).unwrap();
    builder.add_member(concrete, MemberSpec::new("a", "int")).unwrap();
    builder.add_member(concrete, MemberSpec::new("b", "short")).unwrap();
    builder.add_typedef("", "B", "Concrete").unwrap();
    builder.add_typedef("", "A", "B").unwrap();
    let holder = builder.add_type("", "Holder", TypeKind::Struct).unwrap();
    let tag = builder.add_member(holder, MemberSpec::new("tag", "char")).unwrap();
    let value = builder.add_member(holder, MemberSpec::new("value", "A")).unwrap();
    let mut store = builder.build();

    run_pipeline(&mut store);

    let reference_id = store.member(value).unwrap().type_reference_id.unwrap();
    assert_eq!(store.reference(reference_id).unwrap().referenced_type_id, Some(concrete));
    assert_eq!(store.member(tag).unwrap().offset, Some(0));
    assert_eq!(store.member(value).unwrap().offset, Some(4));
    assert_eq!(store.type_node(holder).unwrap().size, Some(12));
}

#[test]
fn test_typedef_cycle_defaults_member() {
    let mut builder = TypeGraphBuilder::new();
    builder.add_typedef("", "X", "Y").unwrap();
    builder.add_typedef("", "Y", "X").unwrap();
    let looped = builder.add_type("", "Looped", TypeKind::Struct).unwrap();
    builder.add_member(looped, MemberSpec::new("flag", "char")).unwrap();
    let cyclic = builder.add_member(looped, MemberSpec::new("cyclic", "X")).unwrap();
    let mut store = builder.build();

    let resolution = resolve_type_references(&mut store, None).unwrap();
    let layout = calculate_and_apply_offsets(&mut store, None).unwrap();

    assert_eq!(resolution.counts(EdgeKind::Member).unresolved, 1);
    assert_eq!(layout.defaulted_members, 1);
    assert_eq!(store.member(cyclic).unwrap().offset, Some(4));
    assert_eq!(store.type_node(looped).unwrap().size, Some(8));
}

#[test]
fn test_progress_sink_does_not_change_results() {
    let mut silent = engine_store();
    run_pipeline(&mut silent);

    let mut recorded = engine_store();
    let mut recorder = RecordingProgress::default();
    resolve_type_references(&mut recorded, Some(&mut recorder)).unwrap();
    calculate_and_apply_offsets(&mut recorded, Some(&mut recorder)).unwrap();

    let mut barred = engine_store();
    let mut bar = BarProgress::hidden();
    resolve_type_references(&mut barred, Some(&mut bar)).unwrap();
    calculate_and_apply_offsets(&mut barred, Some(&mut bar)).unwrap();

    let expected = TypeDatabase::from_store(&silent).to_json().unwrap();
    assert_eq!(TypeDatabase::from_store(&recorded).to_json().unwrap(), expected);
    assert_eq!(TypeDatabase::from_store(&barred).to_json().unwrap(), expected);
    assert!(!recorder.tasks.is_empty());
    assert_eq!(recorder.finished.len(), recorder.tasks.len());
}

#[test]
fn test_snapshot_preserves_pipeline_output() {
    let mut store = engine_store();
    run_pipeline(&mut store);

    let json = TypeDatabase::from_store(&store).to_json().unwrap();
    let reloaded = TypeDatabase::from_json(&json).unwrap().into_store().unwrap();

    assert_eq!(type_size(&reloaded, "engine::Part"), Some(48));
    assert_eq!(member_offset(&reloaded, "engine::Part", "owner"), Some(44));
    let part = reloaded.type_by_name("engine::Part").unwrap().id;
    assert!(reloaded.bases_of(part)[0].is_resolved());
    assert!(reloaded.get_all_unresolved_references().unwrap().is_empty());
}

/// Delegates reads to an in-memory store and rejects every flush
struct RejectingStore {
    inner: InMemoryTypeStore,
}

impl TypeGraphStore for RejectingStore {
    fn get_all_types(&self) -> StoreResult<Vec<TypeNode>> {
        self.inner.get_all_types()
    }

    fn get_types_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, TypeNode>> {
        self.inner.get_types_batched(ids)
    }

    fn get_all_unresolved_references(&self) -> StoreResult<Vec<UnresolvedReference>> {
        self.inner.get_all_unresolved_references()
    }

    fn get_all_unresolved_inheritances(&self) -> StoreResult<Vec<InheritanceEdge>> {
        self.inner.get_all_unresolved_inheritances()
    }

    fn get_all_unresolved_template_arguments(&self) -> StoreResult<Vec<TemplateArgumentEdge>> {
        self.inner.get_all_unresolved_template_arguments()
    }

    fn get_references_batched(&self, ids: &[ReferenceId]) -> StoreResult<AHashMap<ReferenceId, TypeReference>> {
        self.inner.get_references_batched(ids)
    }

    fn find_type_by_fully_qualified_name(&self, name: &str) -> StoreResult<Option<TypeNode>> {
        self.inner.find_type_by_fully_qualified_name(name)
    }

    fn find_types_by_base_name(&self, name: &str) -> StoreResult<Vec<TypeNode>> {
        self.inner.find_types_by_base_name(name)
    }

    fn get_all_typedefs(&self) -> StoreResult<Vec<TypeDef>> {
        self.inner.get_all_typedefs()
    }

    fn resolve_typedef_chain(&self, name: &str, visited: &mut HashSet<String>) -> StoreResult<Option<TypeReference>> {
        self.inner.resolve_typedef_chain(name, visited)
    }

    fn get_struct_members_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, Vec<StructMemberEdge>>> {
        self.inner.get_struct_members_batched(ids)
    }

    fn get_inheritance_batched(&self, ids: &[TypeId]) -> StoreResult<AHashMap<TypeId, Vec<InheritanceEdge>>> {
        self.inner.get_inheritance_batched(ids)
    }

    fn stage_reference_resolutions(&mut self, resolutions: &[(ReferenceId, ReferenceResolution)]) {
        self.inner.stage_reference_resolutions(resolutions)
    }

    fn stage_new_reference(&mut self, reference: TypeReference) -> ReferenceId {
        self.inner.stage_new_reference(reference)
    }

    fn stage_template_argument_references(&mut self, links: &[(TemplateArgumentId, ReferenceId)]) {
        self.inner.stage_template_argument_references(links)
    }

    fn stage_inheritance_resolutions(&mut self, resolutions: &[(InheritanceId, TypeId)]) {
        self.inner.stage_inheritance_resolutions(resolutions)
    }

    fn stage_member_offsets(&mut self, offsets: &[(MemberId, u32)]) {
        self.inner.stage_member_offsets(offsets)
    }

    fn stage_type_sizes(&mut self, sizes: &[(TypeId, u32)]) {
        self.inner.stage_type_sizes(sizes)
    }

    fn pending_writes(&self) -> usize {
        self.inner.pending_writes()
    }

    fn flush(&mut self) -> StoreResult<FlushSummary> {
        self.inner.discard_staged();
        Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "backend offline")))
    }

    fn discard_staged(&mut self) {
        self.inner.discard_staged()
    }
}

#[test]
fn test_rejected_flush_leaves_graph_untouched() {
    let before = TypeDatabase::from_store(&engine_store()).to_json().unwrap();
    let mut store = RejectingStore { inner: engine_store() };

    assert!(ResolutionEngine::new().run(&mut store, None).is_err());
    assert!(LayoutEngine::new().run(&mut store, None).is_err());

    assert_eq!(store.pending_writes(), 0);
    assert_eq!(TypeDatabase::from_store(&store.inner).to_json().unwrap(), before);
    assert!(!store.inner.get_all_unresolved_references().unwrap().is_empty());
}
