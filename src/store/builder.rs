// Fri Oct 16 2026 - Alex

use crate::model::*;
use crate::names::{canonicalize, qualify};
use crate::store::{InMemoryTypeStore, StoreResult};

/// Declaration of a type to ingest
#[derive(Debug, Clone)]
pub struct TypeSpec {
    namespace: String,
    base_name: String,
    kind: TypeKind,
    alignment: Option<u32>,
    is_ignored: bool,
    base_path: String,
}

impl TypeSpec {
    pub fn new(namespace: &str, base_name: &str, kind: TypeKind) -> Self {
        Self {
            namespace: namespace.to_string(),
            base_name: base_name.to_string(),
            kind,
            alignment: None,
            is_ignored: false,
            base_path: String::new(),
        }
    }

    pub fn alignment(mut self, alignment: u32) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn ignored(mut self) -> Self {
        self.is_ignored = true;
        self
    }

    pub fn base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.to_string();
        self
    }
}

/// Declaration of a struct member to ingest
#[derive(Debug, Clone)]
pub struct MemberSpec {
    name: String,
    type_string: String,
    declaration_order: Option<u32>,
    bit_field_width: Option<u8>,
    alignment: Option<u32>,
    is_function_pointer: bool,
    function_signature_id: Option<u64>,
}

impl MemberSpec {
    pub fn new(name: &str, type_string: &str) -> Self {
        Self {
            name: name.to_string(),
            type_string: type_string.to_string(),
            declaration_order: None,
            bit_field_width: None,
            alignment: None,
            is_function_pointer: false,
            function_signature_id: None,
        }
    }

    pub fn order(mut self, declaration_order: u32) -> Self {
        self.declaration_order = Some(declaration_order);
        self
    }

    pub fn bit_field(mut self, width: u8) -> Self {
        self.bit_field_width = Some(width);
        self
    }

    pub fn alignment(mut self, alignment: u32) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn function_pointer(mut self, signature_id: Option<u64>) -> Self {
        self.is_function_pointer = true;
        self.function_signature_id = signature_id;
        self
    }
}

/// Ingest surface for records produced by the upstream parser
pub struct TypeGraphBuilder {
    store: InMemoryTypeStore,
}

impl TypeGraphBuilder {
    pub fn new() -> Self {
        Self {
            store: InMemoryTypeStore::new(),
        }
    }

    pub fn add_type(&mut self, namespace: &str, base_name: &str, kind: TypeKind) -> StoreResult<TypeId> {
        self.add_type_spec(TypeSpec::new(namespace, base_name, kind))
    }

    pub fn add_type_spec(&mut self, spec: TypeSpec) -> StoreResult<TypeId> {
        let id = TypeId::new(self.store.allocate_id());
        let node = TypeNode {
            id,
            stored_fully_qualified_name: canonicalize(&qualify(&spec.namespace, &spec.base_name)),
            base_name: spec.base_name,
            namespace: spec.namespace,
            kind: spec.kind,
            alignment: spec.alignment,
            is_ignored: spec.is_ignored,
            base_path: spec.base_path,
            size: None,
        };
        self.store.insert_type(node)
    }

    pub fn add_member(&mut self, struct_type_id: TypeId, spec: MemberSpec) -> StoreResult<MemberId> {
        let declaration_order = spec
            .declaration_order
            .unwrap_or_else(|| self.store.members_of(struct_type_id).len() as u32);
        let reference_id = self.new_reference(&spec.type_string);

        let member = StructMemberEdge {
            id: MemberId::new(self.store.allocate_id()),
            struct_type_id,
            name: spec.name,
            declaration_order,
            type_string: spec.type_string,
            type_reference_id: Some(reference_id),
            offset: None,
            bit_field_width: spec.bit_field_width,
            alignment: spec.alignment,
            is_function_pointer: spec.is_function_pointer,
            function_signature_id: spec.function_signature_id,
        };
        self.store.insert_member(member)
    }

    pub fn add_base(&mut self, derived_type_id: TypeId, type_string: &str) -> StoreResult<InheritanceId> {
        let order = self.store.bases_of(derived_type_id).len() as u32;
        let edge = InheritanceEdge {
            id: InheritanceId::new(self.store.allocate_id()),
            parent_type_id: derived_type_id,
            order,
            related_type_id: None,
            related_type_string: type_string.to_string(),
        };
        self.store.insert_inheritance(edge)
    }

    pub fn add_template_argument(&mut self, owner_type_id: TypeId, type_string: &str) -> StoreResult<TemplateArgumentId> {
        let position = self.store.template_arguments_of(owner_type_id).len() as u32;
        let edge = TemplateArgumentEdge {
            id: TemplateArgumentId::new(self.store.allocate_id()),
            owner_type_id,
            position,
            type_string: type_string.to_string(),
            type_reference_id: None,
        };
        self.store.insert_template_argument(edge)
    }

    pub fn add_typedef(&mut self, namespace: &str, name: &str, target: &str) -> StoreResult<TypeDefId> {
        let target_reference_id = self.new_reference(target);
        let typedef = TypeDef {
            id: TypeDefId::new(self.store.allocate_id()),
            name: name.to_string(),
            namespace: namespace.to_string(),
            target_reference_id,
        };
        self.store.insert_typedef(typedef)
    }

    fn new_reference(&mut self, type_string: &str) -> ReferenceId {
        let id = ReferenceId::new(self.store.allocate_id());
        self.store.insert_reference(TypeReference::from_type_string(id, type_string))
    }

    pub fn store(&self) -> &InMemoryTypeStore {
        &self.store
    }

    pub fn build(self) -> InMemoryTypeStore {
        self.store
    }
}

impl Default for TypeGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_fully_qualified_name_is_canonical() {
        let mut builder = TypeGraphBuilder::new();
        let id = builder.add_type("game :: world", "Table< int >", TypeKind::Class).unwrap();
        let store = builder.build();
        assert_eq!(store.type_node(id).unwrap().stored_fully_qualified_name, "game::world::Table<int>");
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut builder = TypeGraphBuilder::new();
        builder.add_type("ns", "Foo", TypeKind::Struct).unwrap();
        let result = builder.add_type("ns", "Foo", TypeKind::Class);
        assert!(matches!(result, Err(StoreError::DuplicateType(_))));
    }

    #[test]
    fn test_edge_ordering_follows_insertion() {
        let mut builder = TypeGraphBuilder::new();
        let derived = builder.add_type("", "Derived", TypeKind::Class).unwrap();
        builder.add_base(derived, "Base1").unwrap();
        builder.add_base(derived, "Base2").unwrap();
        builder.add_member(derived, MemberSpec::new("a", "int")).unwrap();
        builder.add_member(derived, MemberSpec::new("b", "char")).unwrap();
        let store = builder.build();

        let bases: Vec<u32> = store.bases_of(derived).iter().map(|b| b.order).collect();
        assert_eq!(bases, vec![0, 1]);
        let members: Vec<u32> = store.members_of(derived).iter().map(|m| m.declaration_order).collect();
        assert_eq!(members, vec![0, 1]);
    }

    #[test]
    fn test_member_gets_parsed_reference() {
        let mut builder = TypeGraphBuilder::new();
        let s = builder.add_type("", "S", TypeKind::Struct).unwrap();
        let member = builder.add_member(s, MemberSpec::new("items", "Item*[4]")).unwrap();
        let store = builder.build();

        let reference_id = store.member(member).unwrap().type_reference_id.unwrap();
        let reference = store.reference(reference_id).unwrap();
        assert!(reference.is_pointer);
        assert_eq!(reference.array_size, Some(4));
    }
}
