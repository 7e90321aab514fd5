//! Plain text rendering of a [`Compilation`].
use crate::compile::Compilation;
use crate::intermediate::Instruction;
use crate::symbols::{Statistics, SymbolTable};
use itertools::Itertools;

const RULE: &str = "----------------------------------------";

/// One row per symbol: name, kind, value (or `undefined`) and declaration
/// line (or `-`).
pub fn symbol_table(symbols: &SymbolTable) -> String {
    let header = format!("{:<10}{:<12}{:<12}{}", "name", "kind", "value", "line");
    let rows = symbols.iter().map(|symbol| {
        let value = symbol
            .value
            .map_or_else(|| "undefined".to_string(), |value| value.to_string());
        let line = symbol
            .line
            .map_or_else(|| "-".to_string(), |line| line.to_string());
        format!(
            "{:<10}{:<12}{:<12}{}",
            symbol.name, symbol.kind, value, line
        )
    });
    std::iter::once(header)
        .chain(std::iter::once(RULE.to_string()))
        .chain(rows)
        .join("\n")
}

pub fn statistics(stats: &Statistics) -> String {
    format!(
        "total symbols: {}\nuser variables: {}\ntemporaries: {}\ninitialized variables: {}",
        stats.total, stats.variables, stats.temporaries, stats.initialized_variables
    )
}

/// Numbered listing, starting at 1.
pub fn instructions(code: &[Instruction]) -> String {
    code.iter()
        .enumerate()
        .format_with("\n", |(i, instr), f| f(&format_args!("{:>4}. {instr}", i + 1)))
        .to_string()
}

pub fn bindings(bindings: &[(&str, i64)]) -> String {
    bindings
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .join("\n")
}

/// Everything the compilation produced, section by section.
pub fn render(compilation: &Compilation) -> String {
    let mut sections = Vec::new();
    if let Some(symbols) = &compilation.symbols {
        sections.push(format!("symbol table\n{}", symbol_table(symbols)));
        sections.push(format!("statistics\n{}", statistics(&symbols.statistics())));
    }
    if let Some(code) = &compilation.instructions {
        sections.push(format!("three-address code\n{}", instructions(code)));
    }
    if let Some(execution) = &compilation.execution {
        sections.push(format!(
            "final variables ({} steps)\n{}",
            execution.steps,
            bindings(&compilation.bindings())
        ));
    }
    if let Some(error) = &compilation.error {
        sections.push(format!("error: {error}"));
    }
    sections.join("\n\n")
}
