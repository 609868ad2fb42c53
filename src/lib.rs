// Fri Oct 16 2026 - Alex

pub mod config;
pub mod model;
pub mod names;
pub mod store;
pub mod resolution;
pub mod layout;
pub mod progress;
pub mod utils;

pub use config::{Config, ConfigError};
pub use layout::{calculate_and_apply_offsets, LayoutEngine, LayoutReport, TypeLayout};
pub use model::{TypeId, TypeKind, TypeNode, TypeReference};
pub use progress::{BarProgress, LogProgress, ProgressSink};
pub use resolution::{resolve_type_references, ResolutionEngine, ResolutionReport};
pub use store::{InMemoryTypeStore, StoreError, TypeDatabase, TypeGraphBuilder, TypeGraphStore};
