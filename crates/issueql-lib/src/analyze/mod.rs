//! Semantic analysis: qualifier schema, symbol table, validation.

pub mod schema;
pub mod symbols;
pub mod validate;


pub use schema::{QualifierInfo, Schema, ValueInfo, ValueType};
pub use symbols::{DocumentId, SymbolInfo, SymbolTable};
pub use validate::validate;
