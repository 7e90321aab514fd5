//! The driver: runs lexer, parser, code generator and evaluator in order and
//! collects whatever each phase produced.
use crate::ast::Program;
use crate::error::SourceMetadata;
use crate::eval::{self, Execution, RuntimeError};
use crate::grammar::lexer::{self, LexError, Token};
use crate::grammar::{self, ParseError};
use crate::intermediate::generate::{generate, GenError};
use crate::intermediate::{validate_labels, LabelError, IR};
use crate::symbols::SymbolTable;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Reject dangling jumps before running instead of when they are taken.
    pub eager_label_check: bool,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Symbol(#[from] GenError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Artifacts of every phase that completed, plus the error that stopped the
/// pipeline if one did.
#[derive(Debug, Default)]
pub struct Compilation<'source> {
    pub tokens: Option<Vec<Token<'source>>>,
    pub ast: Option<Program<'source>>,
    pub instructions: Option<IR>,
    pub symbols: Option<SymbolTable>,
    pub execution: Option<Execution>,
    pub error: Option<CompileError>,
}

impl Compilation<'_> {
    pub const fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Final values of the user variables, in declaration order.
    pub fn bindings(&self) -> Vec<(&str, i64)> {
        match (&self.execution, &self.symbols) {
            (Some(execution), Some(symbols)) => execution.user_bindings(symbols).collect(),
            _ => Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.execution.as_ref()?.get(name)
    }
}

pub fn compile(source: &str) -> Compilation<'_> {
    compile_with(source, &Options::default())
}

pub fn compile_with<'source>(source: &'source str, options: &Options) -> Compilation<'source> {
    compile_source(&SourceMetadata::new(source), options)
}

/// Like [`compile_with`], but diagnostics carry `meta`'s file name.
pub fn compile_source<'source>(
    meta: &SourceMetadata<'source>,
    options: &Options,
) -> Compilation<'source> {
    let mut compilation = Compilation::default();
    if let Err(e) = run_phases(meta, options, &mut compilation) {
        tracing::info!(target: "compile", "compilation failed: {e}");
        compilation.error = Some(e);
    }
    compilation
}

fn run_phases<'source>(
    meta: &SourceMetadata<'source>,
    options: &Options,
    out: &mut Compilation<'source>,
) -> Result<(), CompileError> {
    let tokens = out.tokens.insert(lexer::analyze(meta)?);
    tracing::info!(target: "compile", "lexing done: {} tokens", tokens.len());

    let ast = out.ast.insert(grammar::parse_program(tokens, meta)?);
    tracing::info!(target: "compile", "parsing done: {} statements", ast.0.len());

    let symbols = out.symbols.insert(SymbolTable::new());
    let instructions = out.instructions.insert(generate(ast, symbols, meta)?);
    tracing::info!(
        target: "compile",
        "code generation done: {} instructions, {} symbols",
        instructions.len(),
        symbols.len()
    );

    if options.eager_label_check {
        validate_labels(instructions)?;
    }

    let execution = eval::execute(instructions, symbols)?;
    tracing::info!(target: "compile", "execution done in {} steps", execution.steps);

    let finals: Vec<(String, i64)> = execution
        .user_bindings(symbols)
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    for (name, value) in finals {
        symbols.update(&name, value).map_err(GenError::new)?;
    }
    out.execution = Some(execution);
    Ok(())
}
