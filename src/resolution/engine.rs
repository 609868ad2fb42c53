// Fri Oct 16 2026 - Alex

use crate::model::*;
use crate::progress::{ProgressScope, ProgressSink};
use crate::resolution::report::{ResolutionReport, DEFAULT_SAMPLE_LIMIT};
use crate::resolution::strategy::{self, ResolutionRequest};
use crate::store::{StoreResult, TypeGraphStore};
use crate::utils::logging::ScopedTimer;
use ahash::{AHashMap, AHashSet};

/// Runs one full resolution pass: member and typedef references, base
/// edges, then template arguments. Every write is staged and flushed once.
pub struct ResolutionEngine {
    sample_limit: usize,
}

#[derive(Default)]
struct StagedResolution {
    references: Vec<(ReferenceId, ReferenceResolution)>,
    inheritances: Vec<(InheritanceId, TypeId)>,
    template_links: Vec<(TemplateArgumentId, ReferenceId)>,
}

impl ResolutionEngine {
    pub fn new() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    pub fn with_sample_limit(sample_limit: usize) -> Self {
        Self { sample_limit }
    }

    pub fn run(
        &self,
        store: &mut dyn TypeGraphStore,
        progress: Option<&mut dyn ProgressSink>,
    ) -> StoreResult<ResolutionReport> {
        let _timer = ScopedTimer::new("resolution pass");
        let mut progress = ProgressScope::new(progress);
        let mut report = ResolutionReport::new(self.sample_limit);
        let mut staged = StagedResolution::default();

        let references = store.get_all_unresolved_references()?;
        let inheritances = store.get_all_unresolved_inheritances()?;
        let template_arguments = store.get_all_unresolved_template_arguments()?;

        let total = references.len() + inheritances.len() + template_arguments.len();
        progress.start("Resolving type references", total as u64);
        log::debug!(
            "Resolving {} references, {} bases, {} template arguments",
            references.len(),
            inheritances.len(),
            template_arguments.len()
        );

        for unresolved in &references {
            let reference = &unresolved.reference;
            let request = ResolutionRequest::new(&reference.type_string, &unresolved.scope);
            let outcome = self.resolve(&*store, &request)?;
            if let Some(resolution) = outcome {
                staged.references.push((reference.id, resolution));
            }
            report.record(unresolved.owner.edge_kind(), outcome, &reference.type_string, &unresolved.parent);
            progress.step(&reference.type_string);
        }

        let derived_ids: Vec<TypeId> = inheritances.iter().map(|edge| edge.parent_type_id).collect();
        let derived = store.get_types_batched(&derived_ids)?;
        for edge in &inheritances {
            let (scope, parent) = scope_of(&derived, edge.parent_type_id);
            let request = ResolutionRequest::new(&edge.related_type_string, &scope);
            let outcome = match self.resolve(&*store, &request)? {
                Some(ReferenceResolution::Resolved(type_id)) if type_id != edge.parent_type_id => {
                    staged.inheritances.push((edge.id, type_id));
                    Some(ReferenceResolution::Resolved(type_id))
                }
                _ => None,
            };
            report.record(EdgeKind::Inheritance, outcome, &edge.related_type_string, &parent);
            progress.step(&edge.related_type_string);
        }

        self.resolve_template_arguments(store, &template_arguments, &mut staged, &mut report, &mut progress)?;

        store.stage_reference_resolutions(&staged.references);
        store.stage_inheritance_resolutions(&staged.inheritances);
        store.stage_template_argument_references(&staged.template_links);
        report.flush = store.flush()?;

        progress.finish(&format!("{} unresolved", report.totals().unresolved));
        report.log();
        Ok(report)
    }

    /// Template arguments share references: one reference per distinct type
    /// string in this pass, existing references are reused and resolved once.
    fn resolve_template_arguments(
        &self,
        store: &mut dyn TypeGraphStore,
        edges: &[TemplateArgumentEdge],
        staged: &mut StagedResolution,
        report: &mut ResolutionReport,
        progress: &mut ProgressScope<'_>,
    ) -> StoreResult<()> {
        let owner_ids: Vec<TypeId> = edges.iter().map(|edge| edge.owner_type_id).collect();
        let owners = store.get_types_batched(&owner_ids)?;
        let existing_ids: Vec<ReferenceId> = edges.iter().filter_map(|edge| edge.type_reference_id).collect();
        let existing = store.get_references_batched(&existing_ids)?;

        let mut seen: AHashMap<String, ReferenceId> = AHashMap::new();
        let mut outcomes: AHashMap<ReferenceId, Option<ReferenceResolution>> = AHashMap::new();
        let mut resolved_once: AHashSet<ReferenceId> = AHashSet::new();

        for edge in edges {
            let (scope, parent) = scope_of(&owners, edge.owner_type_id);
            let parent = format!("{}<#{}>", parent, edge.position);

            let outcome = match edge.type_reference_id {
                Some(reference_id) => {
                    if resolved_once.insert(reference_id) {
                        let type_string = existing
                            .get(&reference_id)
                            .map(|reference| reference.type_string.as_str())
                            .unwrap_or(edge.type_string.as_str());
                        let outcome = self.resolve(&*store, &ResolutionRequest::new(type_string, &scope))?;
                        if let Some(resolution) = outcome {
                            staged.references.push((reference_id, resolution));
                        }
                        outcomes.insert(reference_id, outcome);
                        seen.entry(edge.type_string.clone()).or_insert(reference_id);
                    }
                    outcomes.get(&reference_id).copied().flatten()
                }
                None => match seen.get(&edge.type_string) {
                    Some(&reference_id) => {
                        staged.template_links.push((edge.id, reference_id));
                        outcomes.get(&reference_id).copied().flatten()
                    }
                    None => {
                        let outcome = self.resolve(&*store, &ResolutionRequest::new(&edge.type_string, &scope))?;
                        let mut reference = TypeReference::from_type_string(ReferenceId::new(0), &edge.type_string);
                        if let Some(resolution) = outcome {
                            reference.apply(resolution);
                        }
                        let reference_id = store.stage_new_reference(reference);
                        report.references_created += 1;
                        seen.insert(edge.type_string.clone(), reference_id);
                        outcomes.insert(reference_id, outcome);
                        resolved_once.insert(reference_id);
                        staged.template_links.push((edge.id, reference_id));
                        outcome
                    }
                },
            };

            report.record(EdgeKind::TemplateArgument, outcome, &edge.type_string, &parent);
            progress.step(&edge.type_string);
        }

        Ok(())
    }

    fn resolve(&self, store: &dyn TypeGraphStore, request: &ResolutionRequest) -> StoreResult<Option<ReferenceResolution>> {
        let result = strategy::resolve(store, request)?;
        match &result {
            Some((name, resolution)) => {
                log::trace!("'{}' resolved by {} strategy: {:?}", request.type_string, name, resolution)
            }
            None => log::trace!("'{}' unresolved", request.type_string),
        }
        Ok(result.map(|(_, resolution)| resolution))
    }
}

impl Default for ResolutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Lookup scope (the declaring type's namespace) and display name of a declaring type
fn scope_of(types: &AHashMap<TypeId, TypeNode>, id: TypeId) -> (String, String) {
    match types.get(&id) {
        Some(node) => (node.namespace.clone(), node.stored_fully_qualified_name.clone()),
        None => (String::new(), id.to_string()),
    }
}
