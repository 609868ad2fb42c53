// Fri Oct 16 2026 - Alex

pub mod primitive;
pub mod normalize;
pub mod shape;

pub use primitive::{PrimitiveType, primitive_type_size, is_primitive_name, all_primitive_names};
pub use normalize::{canonicalize, strip_template_arguments, qualify, enclosing_scopes, last_segment, collapse_whitespace};
pub use shape::TypeShape;
