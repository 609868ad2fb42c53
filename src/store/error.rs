// Fri Oct 16 2026 - Alex

use crate::model::{InheritanceId, MemberId, ReferenceId, TemplateArgumentId, TypeId, TypeDefId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Type not found: {0}")]
    UnknownType(TypeId),
    #[error("Type reference not found: {0}")]
    UnknownReference(ReferenceId),
    #[error("Struct member not found: {0}")]
    UnknownMember(MemberId),
    #[error("Inheritance edge not found: {0}")]
    UnknownInheritance(InheritanceId),
    #[error("Template argument not found: {0}")]
    UnknownTemplateArgument(TemplateArgumentId),
    #[error("Typedef not found: {0}")]
    UnknownTypeDef(TypeDefId),
    #[error("{reference} already resolves to {existing}, refusing to rebind to {proposed}")]
    ConflictingResolution {
        reference: ReferenceId,
        existing: TypeId,
        proposed: TypeId,
    },
    #[error("{edge} already names base {existing}, refusing to rebind to {proposed}")]
    ConflictingBase {
        edge: InheritanceId,
        existing: TypeId,
        proposed: TypeId,
    },
    #[error("Duplicate type name: {0}")]
    DuplicateType(String),
    #[error("Duplicate typedef name: {0}")]
    DuplicateTypeDef(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
