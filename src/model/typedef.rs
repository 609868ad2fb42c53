// Fri Oct 16 2026 - Alex

use crate::model::{ReferenceId, TypeDefId};
use crate::names::{canonicalize, qualify};
use serde::{Deserialize, Serialize};

/// `typedef <target> name;` recovered from the binary. The target may
/// itself name another typedef.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub id: TypeDefId,
    pub name: String,
    pub namespace: String,
    pub target_reference_id: ReferenceId,
}

impl TypeDef {
    pub fn fully_qualified_name(&self) -> String {
        canonicalize(&qualify(&self.namespace, &self.name))
    }
}
