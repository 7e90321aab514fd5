//! Flat, insertion ordered table of every name a program uses: user
//! variables and the temporaries introduced by code generation.
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Prefix of every temporary name. `%` can't start an identifier, so user
/// variables never collide with temporaries.
pub const TEMPORARY_PREFIX: &str = "%t";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Temporary,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Variable => "variable",
            Self::Temporary => "temporary",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub value: Option<i64>,
    /// Line of the declaration, temporaries have none.
    pub line: Option<usize>,
    pub initialized: bool,
}

impl Symbol {
    fn new(name: String, kind: SymbolKind, value: Option<i64>, line: Option<usize>) -> Self {
        Self {
            name,
            kind,
            initialized: value.is_some(),
            value,
            line,
        }
    }
    pub const fn is_temporary(&self) -> bool {
        matches!(self.kind, SymbolKind::Temporary)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("variable {name:?} was already declared{}", at_line(*.line))]
    Redeclared { name: String, line: Option<usize> },
    #[error("variable {0:?} is not declared")]
    Undeclared(String),
}

fn at_line(line: Option<usize>) -> String {
    line.map(|line| format!(" (line {line})"))
        .unwrap_or_default()
}

/// Counts of the symbols in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub total: usize,
    pub variables: usize,
    pub temporaries: usize,
    pub initialized_variables: usize,
}

#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
    temporaries: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: &str,
        kind: SymbolKind,
        value: Option<i64>,
        line: Option<usize>,
    ) -> Result<&Symbol, SymbolError> {
        if self.symbols.contains_key(name) {
            return Err(SymbolError::Redeclared {
                name: name.to_string(),
                line,
            });
        }
        let entry = self.symbols.entry(name.to_string());
        Ok(entry.or_insert(Symbol::new(name.to_string(), kind, value, line)))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn update(&mut self, name: &str, value: i64) -> Result<&Symbol, SymbolError> {
        let symbol = self
            .symbols
            .get_mut(name)
            .ok_or_else(|| SymbolError::Undeclared(name.to_string()))?;
        symbol.value = Some(value);
        symbol.initialized = true;
        Ok(symbol)
    }

    /// Allocates a new temporary. Names are `%t0`, `%t1`, ... in allocation
    /// order.
    pub fn fresh_temporary(&mut self) -> &Symbol {
        let name = format!("{TEMPORARY_PREFIX}{}", self.temporaries);
        self.temporaries += 1;
        tracing::trace!(target: "symbols", "new temporary {name}");
        self.symbols
            .entry(name.clone())
            .or_insert(Symbol::new(name, SymbolKind::Temporary, None, None))
    }

    /// Every symbol, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Symbol> {
        self.iter().filter(|symbol| !symbol.is_temporary())
    }

    pub fn temporaries(&self) -> impl Iterator<Item = &Symbol> {
        self.iter().filter(|symbol| symbol.is_temporary())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn statistics(&self) -> Statistics {
        self.iter().fold(Statistics::default(), |mut stats, symbol| {
            stats.total += 1;
            match symbol.kind {
                SymbolKind::Temporary => stats.temporaries += 1,
                SymbolKind::Variable => {
                    stats.variables += 1;
                    if symbol.initialized {
                        stats.initialized_variables += 1;
                    }
                }
            }
            stats
        })
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = indexmap::map::Values<'a, String, Symbol>;
    fn into_iter(self) -> Self::IntoIter {
        self.symbols.values()
    }
}
