// Fri Oct 16 2026 - Alex

use crate::layout::context::LayoutContext;
use crate::layout::type_layout::TypeLayout;
use crate::model::{MemberId, TypeId};
use crate::progress::{ProgressScope, ProgressSink};
use crate::store::{FlushSummary, StoreResult, TypeGraphStore};
use crate::utils::logging::ScopedTimer;
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct LayoutReport {
    pub types_laid_out: usize,
    pub ignored_types: usize,
    pub members_placed: usize,
    pub bitfield_members: usize,
    /// Members sized with the 4-byte fallback
    pub defaulted_members: usize,
    pub padding_bytes: u64,
    pub layouts: Vec<TypeLayout>,
    pub flush: FlushSummary,
}

impl LayoutReport {
    pub fn layout(&self, name: &str) -> Option<&TypeLayout> {
        self.layouts.iter().find(|layout| layout.name == name)
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout: {} types, {} members ({} bitfields, {} defaulted), {} ignored, {} padding bytes",
            self.types_laid_out,
            self.members_placed,
            self.bitfield_members,
            self.defaulted_members,
            self.ignored_types,
            self.padding_bytes
        )
    }
}

/// Computes member offsets and sizes for every aggregate and writes them back in one flush
#[derive(Debug)]
pub struct LayoutEngine {
    keep_layouts: bool,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self { keep_layouts: true }
    }

    /// Drop per-type layouts from the report once counted
    pub fn without_layouts(mut self) -> Self {
        self.keep_layouts = false;
        self
    }

    pub fn run(&self, store: &mut dyn TypeGraphStore, progress: Option<&mut dyn ProgressSink>) -> StoreResult<LayoutReport> {
        let _timer = ScopedTimer::new("layout pass");
        let mut progress = ProgressScope::new(progress);
        let mut context = LayoutContext::load(&*store)?;
        let mut report = LayoutReport::default();

        let aggregates = context.aggregate_ids();
        progress.start("Calculating layouts", aggregates.len() as u64);

        let mut offsets: Vec<(MemberId, u32)> = Vec::new();
        let mut sizes: Vec<(TypeId, u32)> = Vec::new();

        for id in aggregates {
            let Some(layout) = context.layout_of(id) else { continue };
            let ignored = context.type_node(id).map(|node| node.is_ignored).unwrap_or(false);
            progress.step(&layout.name);

            if ignored {
                report.ignored_types += 1;
                log::debug!("{} is ignored, not writing layout", layout.name);
                continue;
            }

            report.types_laid_out += 1;
            report.members_placed += layout.members.len();
            report.bitfield_members += layout.members.iter().filter(|m| m.bit_field.is_some()).count();
            report.padding_bytes += u64::from(layout.total_padding());

            offsets.extend(layout.members.iter().map(|slot| (slot.member_id, slot.offset)));
            sizes.push((id, layout.size));
            log::trace!("{}", layout);

            if self.keep_layouts {
                report.layouts.push(layout);
            }
        }
        report.defaulted_members = context.defaulted_members();

        store.stage_member_offsets(&offsets);
        store.stage_type_sizes(&sizes);
        report.flush = store.flush()?;

        progress.finish(&format!("{} types", report.types_laid_out));
        log::info!("{}", report);
        Ok(report)
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReferenceResolution, TypeKind};
    use crate::store::{InMemoryTypeStore, MemberSpec, TypeGraphBuilder, TypeSpec};

    fn resolve_all(store: &mut InMemoryTypeStore) {
        let pending: Vec<_> = store
            .get_all_unresolved_references()
            .unwrap()
            .into_iter()
            .filter_map(|unresolved| {
                let shape = crate::names::TypeShape::parse(&unresolved.reference.type_string);
                store
                    .type_by_name(&shape.canonical_base())
                    .map(|node| (unresolved.reference.id, ReferenceResolution::Resolved(node.id)))
            })
            .collect();
        let bases: Vec<_> = store
            .get_all_unresolved_inheritances()
            .unwrap()
            .into_iter()
            .filter_map(|edge| store.type_by_name(&edge.related_type_string).map(|node| (edge.id, node.id)))
            .collect();
        store.stage_reference_resolutions(&pending);
        store.stage_inheritance_resolutions(&bases);
        store.flush().unwrap();
    }

    #[test]
    fn test_derived_layout_places_bases_first() {
        let mut builder = TypeGraphBuilder::new();
        let base1 = builder.add_type("", "Base1", TypeKind::Class).unwrap();
        builder.add_member(base1, MemberSpec::new("a", "int")).unwrap();
        builder.add_member(base1, MemberSpec::new("b", "char")).unwrap();
        let base2 = builder.add_type("", "Base2", TypeKind::Class).unwrap();
        builder.add_member(base2, MemberSpec::new("c", "int")).unwrap();
        let derived = builder.add_type("", "Derived", TypeKind::Class).unwrap();
        builder.add_base(derived, "Base1").unwrap();
        builder.add_base(derived, "Base2").unwrap();
        let d = builder.add_member(derived, MemberSpec::new("d", "char")).unwrap();
        let mut store = builder.build();
        resolve_all(&mut store);

        let report = LayoutEngine::new().run(&mut store, None).unwrap();

        let layout = report.layout("Derived").unwrap();
        assert_eq!(layout.base("Base1").unwrap().offset, 0);
        assert_eq!(layout.base("Base2").unwrap().offset, 8);
        assert_eq!(store.member(d).unwrap().offset, Some(12));
        assert_eq!(store.type_node(derived).unwrap().size, Some(16));
        assert_eq!(store.type_node(base1).unwrap().size, Some(8));
    }

    #[test]
    fn test_bitfield_struct() {
        let mut builder = TypeGraphBuilder::new();
        let flags = builder.add_type("", "Flags", TypeKind::Struct).unwrap();
        let a = builder.add_member(flags, MemberSpec::new("a", "int").bit_field(1)).unwrap();
        let b = builder.add_member(flags, MemberSpec::new("b", "int").bit_field(30)).unwrap();
        let c = builder.add_member(flags, MemberSpec::new("c", "int").bit_field(5)).unwrap();
        let mut store = builder.build();

        LayoutEngine::new().run(&mut store, None).unwrap();

        assert_eq!(store.member(a).unwrap().offset, Some(0));
        assert_eq!(store.member(b).unwrap().offset, Some(0));
        assert_eq!(store.member(c).unwrap().offset, Some(4));
        assert_eq!(store.type_node(flags).unwrap().size, Some(8));
    }

    #[test]
    fn test_union_members_overlap() {
        let mut builder = TypeGraphBuilder::new();
        let value = builder.add_type("", "Value", TypeKind::Union).unwrap();
        let i = builder.add_member(value, MemberSpec::new("i", "int")).unwrap();
        let d = builder.add_member(value, MemberSpec::new("d", "double")).unwrap();
        let s = builder.add_member(value, MemberSpec::new("s", "char[10]")).unwrap();
        let mut store = builder.build();

        LayoutEngine::new().run(&mut store, None).unwrap();

        for member in [i, d, s] {
            assert_eq!(store.member(member).unwrap().offset, Some(0));
        }
        assert_eq!(store.type_node(value).unwrap().size, Some(12));
    }

    #[test]
    fn test_ignored_type_not_written_but_sized() {
        let mut builder = TypeGraphBuilder::new();
        let hidden = builder.add_type_spec(TypeSpec::new("", "Hidden", TypeKind::Struct).ignored()).unwrap();
        let inner = builder.add_member(hidden, MemberSpec::new("x", "double")).unwrap();
        let user = builder.add_type("", "User", TypeKind::Struct).unwrap();
        builder.add_member(user, MemberSpec::new("h", "Hidden")).unwrap();
        builder.add_member(user, MemberSpec::new("tail", "char")).unwrap();
        let mut store = builder.build();
        resolve_all(&mut store);

        let report = LayoutEngine::new().run(&mut store, None).unwrap();

        assert_eq!(report.ignored_types, 1);
        assert_eq!(store.member(inner).unwrap().offset, None);
        assert_eq!(store.type_node(hidden).unwrap().size, None);
        assert_eq!(store.type_node(user).unwrap().size, Some(12));
    }

    #[test]
    fn test_unresolved_member_defaults_to_four() {
        let mut builder = TypeGraphBuilder::new();
        let s = builder.add_type("", "S", TypeKind::Struct).unwrap();
        builder.add_member(s, MemberSpec::new("c", "char")).unwrap();
        let mystery = builder.add_member(s, MemberSpec::new("m", "Mystery")).unwrap();
        let mut store = builder.build();

        let report = LayoutEngine::new().run(&mut store, None).unwrap();

        assert_eq!(report.defaulted_members, 1);
        assert_eq!(store.member(mystery).unwrap().offset, Some(4));
        assert_eq!(store.type_node(s).unwrap().size, Some(8));
    }

    #[test]
    fn test_second_pass_writes_nothing_new() {
        let mut builder = TypeGraphBuilder::new();
        let s = builder.add_type("", "S", TypeKind::Struct).unwrap();
        builder.add_member(s, MemberSpec::new("p", "void**")).unwrap();
        builder.add_member(s, MemberSpec::new("f", "void (__stdcall *)(int)").function_pointer(None)).unwrap();
        let mut store = builder.build();

        let first = LayoutEngine::new().run(&mut store, None).unwrap();
        assert_eq!(first.flush.offsets_written, 2);
        let second = LayoutEngine::new().run(&mut store, None).unwrap();
        assert!(second.flush.is_empty());
        assert_eq!(store.type_node(s).unwrap().size, Some(8));
    }

    #[test]
    fn test_oversized_arrays_saturate_instead_of_overflowing() {
        let mut builder = TypeGraphBuilder::new();
        let huge = builder.add_type("", "Huge", TypeKind::Struct).unwrap();
        builder.add_member(huge, MemberSpec::new("data", "int[0x40000000]")).unwrap();
        let tail = builder.add_member(huge, MemberSpec::new("tail", "char")).unwrap();
        let packed = builder.add_type("", "Packed", TypeKind::Struct).unwrap();
        builder.add_member(packed, MemberSpec::new("bytes", "char[0xFFFFFFFF]")).unwrap();
        let flag = builder.add_member(packed, MemberSpec::new("flag", "int").bit_field(1)).unwrap();
        let mut store = builder.build();

        let report = LayoutEngine::new().run(&mut store, None).unwrap();

        assert_eq!(report.types_laid_out, 2);
        assert_eq!(store.member(tail).unwrap().offset, Some(u32::MAX));
        assert_eq!(store.member(flag).unwrap().offset, Some(u32::MAX));
        assert_eq!(store.type_node(huge).unwrap().size, Some(u32::MAX));
        assert_eq!(store.type_node(packed).unwrap().size, Some(u32::MAX));
        assert_eq!(report.layout("Packed").unwrap().total_padding(), 0);
    }
}
