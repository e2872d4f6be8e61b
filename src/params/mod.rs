//! Parameter Module
//!
//! The fixed flame parameter schema, its defaults and control ranges, the
//! canonical color type, and the per-layer Parameter Set.

mod color;
mod schema;
mod set;

pub use color::Rgb;
pub use schema::{ParamGroup, ParamKind, ParamName, ParamValue, PARAM_COUNT};
pub use set::ParameterSet;
