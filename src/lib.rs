pub mod ast;
pub mod compile;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod intermediate;
pub mod report;
pub mod symbols;

pub use compile::{compile, compile_with, Compilation, CompileError, Options};
