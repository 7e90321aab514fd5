//! Program-counter driven interpreter for the three-address code.
use crate::intermediate::{label_map, BinaryOpcode, Instruction, Label, LabelError, Operand};
use crate::symbols::{SymbolKind, SymbolTable};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use std::collections::HashMap;
use thiserror::Error;

/// Current value of every name, in symbol table order.
pub type Store = IndexMap<String, i64>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    #[error("variable {0:?} is not defined")]
    UndefinedVariable(String),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}\n    at instruction {pc}: {instruction}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub pc: usize,
    pub instruction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Halted,
}

/// What is left after the program ran off the end of its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub store: Store,
    /// Number of executed instructions.
    pub steps: usize,
}

impl Execution {
    pub fn get(&self, name: &str) -> Option<i64> {
        self.store.get(name).copied()
    }

    /// Final values of the user variables of `symbols`, temporaries excluded.
    pub fn user_bindings<'a>(
        &'a self,
        symbols: &'a SymbolTable,
    ) -> impl Iterator<Item = (&'a str, i64)> + 'a {
        symbols
            .variables()
            .filter_map(move |symbol| Some((symbol.name.as_str(), self.get(&symbol.name)?)))
    }
}

pub struct Evaluator<'code> {
    code: &'code [Instruction],
    labels: HashMap<Label, usize>,
    store: Store,
    variables: IndexSet<String>,
    pc: usize,
    steps: usize,
}

impl<'code> Evaluator<'code> {
    /// Seeds the store from `symbols`: variables get their declared value or
    /// 0, temporaries get 0.
    pub fn new(code: &'code [Instruction], symbols: &SymbolTable) -> Self {
        let store = symbols
            .iter()
            .map(|symbol| {
                let value = match symbol.kind {
                    SymbolKind::Variable => symbol.value.unwrap_or(0),
                    SymbolKind::Temporary => 0,
                };
                (symbol.name.clone(), value)
            })
            .collect();
        Self {
            code,
            labels: label_map(code),
            store,
            variables: symbols.variables().map(|symbol| symbol.name.clone()).collect(),
            pc: 0,
            steps: 0,
        }
    }

    pub const fn pc(&self) -> usize {
        self.pc
    }

    pub const fn store(&self) -> &Store {
        &self.store
    }

    pub const fn state(&self) -> MachineState {
        if self.pc < self.code.len() {
            MachineState::Running
        } else {
            MachineState::Halted
        }
    }

    /// Executes the instruction at the program counter.
    pub fn step(&mut self) -> Result<MachineState, RuntimeError> {
        let code = self.code;
        let instr = match code.get(self.pc) {
            Some(instr) => instr,
            None => return Ok(MachineState::Halted),
        };
        tracing::trace!(target: "eval", "{:>4}: {:<8} {instr}", self.pc, instr.opcode());
        let jump = self.execute(instr).map_err(|kind| RuntimeError {
            kind,
            pc: self.pc,
            instruction: instr.to_string(),
        })?;
        self.steps += 1;
        self.pc = jump.unwrap_or(self.pc + 1);
        Ok(self.state())
    }

    /// Runs until the program counter leaves the code. A program that never
    /// does so never returns.
    pub fn run(mut self) -> Result<Execution, RuntimeError> {
        while self.step()? == MachineState::Running {}
        tracing::debug!(target: "eval", "halted after {} steps", self.steps);
        Ok(Execution {
            store: self.store,
            steps: self.steps,
        })
    }

    // returns the new program counter if the instruction jumped
    fn execute(&mut self, instr: &Instruction) -> Result<Option<usize>, RuntimeErrorKind> {
        match instr {
            Instruction::Assign { result, value } => {
                let value = self.resolve(value)?;
                self.store.insert(result.clone(), value);
                if self.variables.contains(result) {
                    tracing::debug!(target: "eval", "state: [{}]", self.user_state());
                }
                Ok(None)
            }
            Instruction::Binary {
                opcode,
                lhs,
                rhs,
                result,
            } => {
                let lhs = self.resolve(lhs)?;
                let rhs = self.resolve(rhs)?;
                let value = apply(*opcode, lhs, rhs)?;
                self.store.insert(result.clone(), value);
                Ok(None)
            }
            Instruction::Label(_) => Ok(None),
            Instruction::Goto(target) => self.jump(*target).map(Some),
            Instruction::IfFalse { condition, target } => {
                if self.resolve(condition)? == 0 {
                    self.jump(*target).map(Some)
                } else {
                    Ok(None)
                }
            }
            Instruction::IfTrue { condition, target } => {
                if self.resolve(condition)? != 0 {
                    self.jump(*target).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn user_state(&self) -> String {
        self.variables
            .iter()
            .filter_map(|name| Some((name, self.store.get(name)?)))
            .format_with(", ", |(name, value), f| f(&format_args!("{name}={value}")))
            .to_string()
    }

    fn resolve(&self, operand: &Operand) -> Result<i64, RuntimeErrorKind> {
        match operand {
            Operand::Constant(constant) => Ok(*constant),
            Operand::Name(name) => self
                .store
                .get(name)
                .copied()
                .ok_or_else(|| RuntimeErrorKind::UndefinedVariable(name.clone())),
        }
    }

    // labels are only checked once something jumps to them
    fn jump(&self, target: Label) -> Result<usize, RuntimeErrorKind> {
        self.labels
            .get(&target)
            .copied()
            .ok_or(RuntimeErrorKind::Label(LabelError(target)))
    }
}

fn apply(opcode: BinaryOpcode, lhs: i64, rhs: i64) -> Result<i64, RuntimeErrorKind> {
    Ok(match opcode {
        BinaryOpcode::Add => lhs.wrapping_add(rhs),
        BinaryOpcode::Sub => lhs.wrapping_sub(rhs),
        BinaryOpcode::Mul => lhs.wrapping_mul(rhs),
        BinaryOpcode::Div => floor_div(lhs, rhs).ok_or(RuntimeErrorKind::DivisionByZero)?,
        BinaryOpcode::Eq => (lhs == rhs).into(),
        BinaryOpcode::Ne => (lhs != rhs).into(),
        BinaryOpcode::Lt => (lhs < rhs).into(),
        BinaryOpcode::Gt => (lhs > rhs).into(),
        BinaryOpcode::Le => (lhs <= rhs).into(),
        BinaryOpcode::Ge => (lhs >= rhs).into(),
    })
}

/// Division rounding toward negative infinity. `None` for a zero divisor.
pub fn floor_div(lhs: i64, rhs: i64) -> Option<i64> {
    if rhs == 0 {
        return None;
    }
    let quotient = lhs.wrapping_div(rhs);
    if lhs.wrapping_rem(rhs) != 0 && ((lhs < 0) != (rhs < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

/// Runs `code` against a store seeded from `symbols`.
pub fn execute(code: &[Instruction], symbols: &SymbolTable) -> Result<Execution, RuntimeError> {
    tracing::info!(target: "eval", "executing {} instructions", code.len());
    Evaluator::new(code, symbols).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intermediate::Opcode;

    fn binary(
        opcode: BinaryOpcode,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> Instruction {
        Instruction::Binary {
            opcode,
            lhs: lhs.into(),
            rhs: rhs.into(),
            result: "r".into(),
        }
    }

    fn table(names: &[&str]) -> SymbolTable {
        let mut symbols = SymbolTable::new();
        for name in names {
            symbols
                .insert(name, SymbolKind::Variable, None, None)
                .unwrap();
        }
        symbols
    }

    fn eval_one(instr: Instruction) -> Result<i64, RuntimeErrorKind> {
        let code = [instr];
        execute(&code, &table(&["r"]))
            .map(|exec| exec.get("r").unwrap())
            .map_err(|e| e.kind)
    }

    #[test]
    fn floor_division() {
        assert_eq!(floor_div(-7, 2), Some(-4));
        assert_eq!(floor_div(7, -2), Some(-4));
        assert_eq!(floor_div(-7, -2), Some(3));
        assert_eq!(floor_div(7, 2), Some(3));
        assert_eq!(floor_div(-8, 2), Some(-4));
        assert_eq!(floor_div(i64::MIN, -1), Some(i64::MIN));
        assert_eq!(floor_div(1, 0), None);
        assert_eq!(eval_one(binary(BinaryOpcode::Div, -7, 2)), Ok(-4));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            eval_one(binary(BinaryOpcode::Div, 5, 0)),
            Err(RuntimeErrorKind::DivisionByZero)
        );
        assert_eq!(
            eval_one(binary(BinaryOpcode::Div, 0, 0)),
            Err(RuntimeErrorKind::DivisionByZero)
        );
    }

    #[test]
    fn comparisons_yield_one_or_zero() {
        assert_eq!(eval_one(binary(BinaryOpcode::Lt, 1, 2)), Ok(1));
        assert_eq!(eval_one(binary(BinaryOpcode::Gt, 1, 2)), Ok(0));
        assert_eq!(eval_one(binary(BinaryOpcode::Le, 2, 2)), Ok(1));
        assert_eq!(eval_one(binary(BinaryOpcode::Ge, 1, 2)), Ok(0));
        assert_eq!(eval_one(binary(BinaryOpcode::Eq, 3, 3)), Ok(1));
        assert_eq!(eval_one(binary(BinaryOpcode::Ne, 3, 3)), Ok(0));
    }

    #[test]
    fn arithmetic_wraps() {
        assert_eq!(eval_one(binary(BinaryOpcode::Add, i64::MAX, 1)), Ok(i64::MIN));
        assert_eq!(eval_one(binary(BinaryOpcode::Mul, 6, -7)), Ok(-42));
        assert_eq!(eval_one(binary(BinaryOpcode::Sub, 3, 10)), Ok(-7));
    }

    #[test]
    fn unknown_name() {
        assert_eq!(
            eval_one(binary(BinaryOpcode::Add, "nope", 1)),
            Err(RuntimeErrorKind::UndefinedVariable("nope".into()))
        );
    }

    #[test]
    fn store_is_seeded_from_symbols() {
        let mut symbols = table(&["a"]);
        symbols
            .insert("b", SymbolKind::Variable, Some(9), None)
            .unwrap();
        let temp = symbols.fresh_temporary().name.clone();
        let evaluator = Evaluator::new(&[], &symbols);
        let store: Vec<_> = evaluator
            .store()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        assert_eq!(store, vec![("a".into(), 0), ("b".into(), 9), (temp, 0)]);
        assert_eq!(evaluator.state(), MachineState::Halted);
    }

    #[test]
    fn if_true_jumps_on_nonzero() {
        let code = vec![
            Instruction::IfTrue {
                condition: (-3).into(),
                target: Label(0),
            },
            Instruction::Assign {
                result: "r".into(),
                value: 1.into(),
            },
            Instruction::Label(Label(0)),
        ];
        let exec = execute(&code, &table(&["r"])).unwrap();
        assert_eq!(exec.get("r"), Some(0));
        assert_eq!(exec.steps, 2);
    }

    #[test]
    fn if_false_falls_through_on_nonzero() {
        let code = vec![
            Instruction::IfFalse {
                condition: 1.into(),
                target: Label(0),
            },
            Instruction::Assign {
                result: "r".into(),
                value: 1.into(),
            },
            Instruction::Label(Label(0)),
        ];
        let exec = execute(&code, &table(&["r"])).unwrap();
        assert_eq!(exec.get("r"), Some(1));
    }

    #[test]
    fn dangling_label_is_only_found_when_jumped_to() {
        let mut code = vec![
            Instruction::IfFalse {
                condition: 1.into(),
                target: Label(7),
            },
            Instruction::Assign {
                result: "r".into(),
                value: 2.into(),
            },
        ];
        assert!(execute(&code, &table(&["r"])).is_ok());

        code.push(Instruction::Goto(Label(7)));
        let err = execute(&code, &table(&["r"])).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Label(LabelError(Label(7))));
        assert_eq!(err.pc, 2);
        assert_eq!(err.instruction, "goto L7");
    }

    #[test]
    fn single_stepping() {
        let code = vec![
            Instruction::Label(Label(0)),
            Instruction::Assign {
                result: "r".into(),
                value: 5.into(),
            },
        ];
        let symbols = table(&["r"]);
        let mut evaluator = Evaluator::new(&code, &symbols);
        assert_eq!(code[0].opcode(), Opcode::Label);
        assert_eq!(evaluator.step(), Ok(MachineState::Running));
        assert_eq!(evaluator.pc(), 1);
        assert_eq!(evaluator.step(), Ok(MachineState::Halted));
        assert_eq!(evaluator.store()["r"], 5);
        assert_eq!(evaluator.step(), Ok(MachineState::Halted));
    }

    #[test]
    fn state_lists_user_variables_only() {
        let mut symbols = table(&["a", "b"]);
        let temp = symbols.fresh_temporary().name.clone();
        let code = vec![
            Instruction::Assign {
                result: temp.clone(),
                value: 4.into(),
            },
            Instruction::Assign {
                result: "a".into(),
                value: temp.as_str().into(),
            },
        ];
        let mut evaluator = Evaluator::new(&code, &symbols);
        assert_eq!(evaluator.user_state(), "a=0, b=0");
        evaluator.step().unwrap();
        evaluator.step().unwrap();
        assert_eq!(evaluator.user_state(), "a=4, b=0");
    }

    #[test]
    fn user_bindings_skip_temporaries() {
        let mut symbols = table(&["a"]);
        symbols.fresh_temporary();
        let exec = Evaluator::new(&[], &symbols).run().unwrap();
        let bindings: Vec<_> = exec.user_bindings(&symbols).collect();
        assert_eq!(bindings, vec![("a", 0)]);
    }
}
