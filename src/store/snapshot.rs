// Fri Oct 16 2026 - Alex

use crate::model::*;
use crate::store::{InMemoryTypeStore, MemberSpec, StoreResult, TypeGraphBuilder, TypeGraphStore, TypeSpec};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// JSON document exchanged with the upstream parser and downstream renderers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDatabase {
    #[serde(default)]
    pub types: Vec<TypeRecord>,
    #[serde(default)]
    pub typedefs: Vec<TypedefRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRecord {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<u32>,
    #[serde(default)]
    pub is_ignored: bool,
    #[serde(default)]
    pub base_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default)]
    pub bases: Vec<LinkRecord>,
    #[serde(default)]
    pub template_arguments: Vec<LinkRecord>,
    #[serde(default)]
    pub members: Vec<MemberRecord>,
}

/// A textual type reference and, once known, the fully-qualified name it resolved to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub type_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(default)]
    pub primitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    pub type_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_field_width: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<u32>,
    #[serde(default)]
    pub is_function_pointer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_signature_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(default)]
    pub primitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedefRecord {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(default)]
    pub primitive: bool,
}

impl TypeDatabase {
    pub fn load(path: &Path) -> StoreResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Ingests every record. Previously computed resolutions, offsets and
    /// sizes carried by the document are restored through one flush.
    pub fn into_store(self) -> StoreResult<InMemoryTypeStore> {
        let mut builder = TypeGraphBuilder::new();
        let mut pending = Vec::new();

        for record in &self.types {
            let mut spec = TypeSpec::new(&record.namespace, &record.name, record.kind).base_path(&record.base_path);
            if let Some(alignment) = record.alignment {
                spec = spec.alignment(alignment);
            }
            if record.is_ignored {
                spec = spec.ignored();
            }
            let type_id = builder.add_type_spec(spec)?;
            pending.push((type_id, record));
        }

        let mut typedef_ids = Vec::new();
        for record in &self.typedefs {
            let id = builder.add_typedef(&record.namespace, &record.name, &record.target)?;
            typedef_ids.push((id, record));
        }

        let mut restore = Restore::default();
        for (type_id, record) in pending {
            for base in &record.bases {
                let edge = builder.add_base(type_id, &base.type_string)?;
                if let Some(name) = &base.resolved {
                    restore.bases.push((edge, name.clone()));
                }
            }
            for argument in &record.template_arguments {
                let edge = builder.add_template_argument(type_id, &argument.type_string)?;
                if argument.resolved.is_some() || argument.primitive {
                    restore.template_arguments.push((edge, argument.clone()));
                }
            }
            for member in &record.members {
                let mut spec = MemberSpec::new(&member.name, &member.type_string);
                if let Some(order) = member.declaration_order {
                    spec = spec.order(order);
                }
                if let Some(width) = member.bit_field_width {
                    spec = spec.bit_field(width);
                }
                if let Some(alignment) = member.alignment {
                    spec = spec.alignment(alignment);
                }
                if member.is_function_pointer {
                    spec = spec.function_pointer(member.function_signature_id);
                }
                let member_id = builder.add_member(type_id, spec)?;
                if let Some(offset) = member.offset {
                    restore.offsets.push((member_id, offset));
                }
                restore.member_links.push((member_id, member.resolved.clone(), member.primitive));
            }
            if let Some(size) = record.size {
                restore.sizes.push((type_id, size));
            }
        }

        let mut store = builder.build();

        for (typedef_id, record) in typedef_ids {
            let Some(typedef) = store.typedef(typedef_id) else { continue };
            let reference_id = typedef.target_reference_id;
            restore.link(&store, reference_id, record.resolved.as_deref(), record.primitive);
        }
        for (member_id, resolved, primitive) in std::mem::take(&mut restore.member_links) {
            if let Some(reference_id) = store.member(member_id).and_then(|m| m.type_reference_id) {
                restore.link(&store, reference_id, resolved.as_deref(), primitive);
            }
        }

        restore.apply(&mut store)?;
        Ok(store)
    }

    pub fn from_store(store: &InMemoryTypeStore) -> Self {
        let name_of = |id: Option<TypeId>| {
            id.and_then(|id| store.type_node(id)).map(|node| node.stored_fully_qualified_name.clone())
        };
        let link_of = |reference_id: Option<ReferenceId>| -> (Option<String>, bool) {
            match reference_id.and_then(|id| store.reference(id)) {
                Some(reference) => (name_of(reference.referenced_type_id), reference.is_primitive),
                None => (None, false),
            }
        };

        let types = store
            .types()
            .map(|node| TypeRecord {
                name: node.base_name.clone(),
                namespace: node.namespace.clone(),
                kind: node.kind,
                alignment: node.alignment,
                is_ignored: node.is_ignored,
                base_path: node.base_path.clone(),
                size: node.size,
                bases: store
                    .bases_of(node.id)
                    .into_iter()
                    .map(|edge| LinkRecord {
                        type_string: edge.related_type_string.clone(),
                        resolved: name_of(edge.related_type_id),
                        primitive: false,
                    })
                    .collect(),
                template_arguments: store
                    .template_arguments_of(node.id)
                    .into_iter()
                    .map(|edge| {
                        let (resolved, primitive) = link_of(edge.type_reference_id);
                        LinkRecord {
                            type_string: edge.type_string.clone(),
                            resolved,
                            primitive,
                        }
                    })
                    .collect(),
                members: store
                    .members_of(node.id)
                    .into_iter()
                    .map(|member| {
                        let (resolved, primitive) = link_of(member.type_reference_id);
                        MemberRecord {
                            name: member.name.clone(),
                            type_string: member.type_string.clone(),
                            declaration_order: Some(member.declaration_order),
                            bit_field_width: member.bit_field_width,
                            alignment: member.alignment,
                            is_function_pointer: member.is_function_pointer,
                            function_signature_id: member.function_signature_id,
                            offset: member.offset,
                            resolved,
                            primitive,
                        }
                    })
                    .collect(),
            })
            .collect();

        let typedefs = store
            .typedefs()
            .map(|typedef| {
                let (resolved, primitive) = link_of(Some(typedef.target_reference_id));
                let target = store
                    .reference(typedef.target_reference_id)
                    .map(|r| r.type_string.clone())
                    .unwrap_or_default();
                TypedefRecord {
                    name: typedef.name.clone(),
                    namespace: typedef.namespace.clone(),
                    target,
                    resolved,
                    primitive,
                }
            })
            .collect();

        Self { types, typedefs }
    }
}

#[derive(Default)]
struct Restore {
    bases: Vec<(InheritanceId, String)>,
    template_arguments: Vec<(TemplateArgumentId, LinkRecord)>,
    member_links: Vec<(MemberId, Option<String>, bool)>,
    resolutions: Vec<(ReferenceId, ReferenceResolution)>,
    offsets: Vec<(MemberId, u32)>,
    sizes: Vec<(TypeId, u32)>,
}

impl Restore {
    fn link(&mut self, store: &InMemoryTypeStore, reference_id: ReferenceId, resolved: Option<&str>, primitive: bool) {
        if let Some(node) = resolved.and_then(|name| store.type_by_name(name)) {
            self.resolutions.push((reference_id, ReferenceResolution::Resolved(node.id)));
        } else if primitive {
            self.resolutions.push((reference_id, ReferenceResolution::Primitive));
        }
    }

    fn apply(self, store: &mut InMemoryTypeStore) -> StoreResult<()> {
        let bases: Vec<(InheritanceId, TypeId)> = self
            .bases
            .iter()
            .filter_map(|(edge, name)| store.type_by_name(name).map(|node| (*edge, node.id)))
            .collect();

        let mut links = Vec::new();
        for (edge, record) in &self.template_arguments {
            let mut reference = TypeReference::from_type_string(ReferenceId::new(0), &record.type_string);
            match record.resolved.as_deref().and_then(|name| store.type_by_name(name)) {
                Some(node) => reference.referenced_type_id = Some(node.id),
                None if record.primitive => reference.is_primitive = true,
                None => continue,
            }
            let reference_id = store.stage_new_reference(reference);
            links.push((*edge, reference_id));
        }

        store.stage_reference_resolutions(&self.resolutions);
        store.stage_inheritance_resolutions(&bases);
        store.stage_template_argument_references(&links);
        store.stage_member_offsets(&self.offsets);
        store.stage_type_sizes(&self.sizes);
        if store.pending_writes() > 0 {
            store.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "types": [
            {
                "name": "Node",
                "namespace": "game",
                "kind": "Struct",
                "members": [
                    { "name": "next", "type_string": "game::Node*" },
                    { "name": "value", "type_string": "int" }
                ]
            },
            {
                "name": "List",
                "namespace": "game",
                "kind": "Class",
                "bases": [ { "type_string": "game::Node" } ],
                "template_arguments": [ { "type_string": "int" } ]
            }
        ],
        "typedefs": [
            { "name": "PNode", "namespace": "game", "target": "game::Node*" }
        ]
    }"#;

    #[test]
    fn test_import_document() {
        let store = TypeDatabase::from_json(DOCUMENT).unwrap().into_store().unwrap();
        assert_eq!(store.type_count(), 2);

        let node = store.type_by_name("game::Node").unwrap();
        assert_eq!(store.members_of(node.id).len(), 2);
        let list = store.type_by_name("game::List").unwrap();
        assert_eq!(store.bases_of(list.id).len(), 1);
        assert_eq!(store.template_arguments_of(list.id).len(), 1);
        assert!(store.typedef_by_name("game::PNode").is_some());
    }

    #[test]
    fn test_export_restores_computed_state() {
        let mut store = TypeDatabase::from_json(DOCUMENT).unwrap().into_store().unwrap();
        let node = store.type_by_name("game::Node").unwrap().id;
        let next = store.members_of(node)[0].id;
        let reference_id = store.member(next).unwrap().type_reference_id.unwrap();

        store.stage_reference_resolutions(&[(reference_id, ReferenceResolution::Resolved(node))]);
        store.stage_member_offsets(&[(next, 0)]);
        store.stage_type_sizes(&[(node, 8)]);
        store.flush().unwrap();

        let exported = TypeDatabase::from_store(&store).to_json().unwrap();
        let restored = TypeDatabase::from_json(&exported).unwrap().into_store().unwrap();

        let node = restored.type_by_name("game::Node").unwrap();
        assert_eq!(node.size, Some(8));
        let next = restored.members_of(node.id)[0];
        assert_eq!(next.offset, Some(0));
        let reference = restored.reference(next.type_reference_id.unwrap()).unwrap();
        assert_eq!(reference.referenced_type_id, Some(node.id));
    }
}
