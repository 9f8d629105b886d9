//! Rule Catalog
//!
//! One module per compliance category. Each exposes `rules()` returning its
//! rules in registration order; `RuleCatalog::standard()` stitches them together.

pub mod heuristics;
pub mod registry;

pub mod error_handling;
pub mod maintainability;
pub mod performance;
pub mod reliability;
pub mod security;
pub mod tenant;
pub mod transactions;

pub use registry::{CheckFn, Finding, Rule, RuleCatalog};
