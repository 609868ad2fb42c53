// Fri Oct 16 2026 - Alex

//! Byte-accurate layout for the 32-bit x86 target: 4-byte pointers,
//! natural alignment capped at 4, bases laid out before members and
//! bitfields packed into storage units of their declared type.

pub mod alignment;
pub mod bitfield;
pub mod type_layout;
pub mod context;
pub mod engine;

pub use alignment::{align_offset, alignment_from_size, TypeMetrics, POINTER_SIZE};
pub use bitfield::{MemberCursor, Placement};
pub use context::LayoutContext;
pub use engine::{LayoutEngine, LayoutReport};
pub use type_layout::{BaseSlot, BitFieldSlot, MemberSlot, TypeLayout};

use crate::progress::ProgressSink;
use crate::store::{StoreResult, TypeGraphStore};

/// Runs a full layout pass over every aggregate and flushes offsets and sizes
pub fn calculate_and_apply_offsets(
    store: &mut dyn TypeGraphStore,
    progress: Option<&mut dyn ProgressSink>,
) -> StoreResult<LayoutReport> {
    LayoutEngine::new().run(store, progress)
}
