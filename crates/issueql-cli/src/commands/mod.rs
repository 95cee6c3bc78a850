pub mod ast;
pub mod check;
pub mod compile;

mod query_loader;
