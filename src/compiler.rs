use thiserror::Error;

use crate::ast::{Expr, Program, Stmt};
use crate::code::{make, Instructions, Opcode};
use crate::object::Object;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("unknown operator {0}")]
    UnknownOperator(String),
    #[error("{0} is not supported by the bytecode backend")]
    Unsupported(&'static str),
}

/// The compiler's output: a flat instruction stream plus the constant pool
/// it indexes into. This is the VM's entire input.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Object>,
}

/// Walks the AST and emits instructions instead of computing values.
#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Object>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for stmt in &program.statements {
            self.compile_statement(stmt)?;
        }
        Ok(())
    }

    pub fn bytecode(self) -> Bytecode {
        Bytecode { instructions: self.instructions, constants: self.constants }
    }

    fn compile_statement(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Expression { expr } => {
                self.compile_expression(expr)?;
                // Discard the statement's value to keep the stack balanced.
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
            Stmt::Let { .. } => Err(CompileError::Unsupported("let statement")),
            Stmt::Return { .. } => Err(CompileError::Unsupported("return statement")),
        }
    }

    fn compile_expression(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::IntegerLiteral(value) => {
                let index = self.add_constant(Object::Integer(*value));
                self.emit(Opcode::Constant, &[index]);
                Ok(())
            }
            Expr::Boolean(true) => {
                self.emit(Opcode::True, &[]);
                Ok(())
            }
            Expr::Boolean(false) => {
                self.emit(Opcode::False, &[]);
                Ok(())
            }
            Expr::Prefix { operator, right } => {
                self.compile_expression(right)?;
                match operator.as_str() {
                    "!" => self.emit(Opcode::Bang, &[]),
                    "-" => self.emit(Opcode::Minus, &[]),
                    other => return Err(CompileError::UnknownOperator(other.to_owned())),
                };
                Ok(())
            }
            Expr::Infix { left, operator, right } => {
                // The instruction set has only a greater-than opcode; `<`
                // compiles with the operands reversed.
                if operator == "<" {
                    self.compile_expression(right)?;
                    self.compile_expression(left)?;
                    self.emit(Opcode::GreaterThan, &[]);
                    return Ok(());
                }

                self.compile_expression(left)?;
                self.compile_expression(right)?;
                match operator.as_str() {
                    "+" => self.emit(Opcode::Add, &[]),
                    "-" => self.emit(Opcode::Sub, &[]),
                    "*" => self.emit(Opcode::Mul, &[]),
                    "/" => self.emit(Opcode::Div, &[]),
                    ">" => self.emit(Opcode::GreaterThan, &[]),
                    "==" => self.emit(Opcode::Equal, &[]),
                    "!=" => self.emit(Opcode::NotEqual, &[]),
                    other => return Err(CompileError::UnknownOperator(other.to_owned())),
                };
                Ok(())
            }
            Expr::Identifier(_) => Err(CompileError::Unsupported("identifier")),
            Expr::StringLiteral(_) => Err(CompileError::Unsupported("string literal")),
            Expr::ArrayLiteral { .. } => Err(CompileError::Unsupported("array literal")),
            Expr::HashLiteral { .. } => Err(CompileError::Unsupported("hash literal")),
            Expr::If { .. } => Err(CompileError::Unsupported("if expression")),
            Expr::FunctionLiteral { .. } => Err(CompileError::Unsupported("function literal")),
            Expr::Call { .. } => Err(CompileError::Unsupported("call expression")),
            Expr::Index { .. } => Err(CompileError::Unsupported("index expression")),
        }
    }

    /// Append to the constant pool; each AST occurrence gets its own entry,
    /// and the returned index is the Constant instruction's operand.
    fn add_constant(&mut self, obj: Object) -> usize {
        self.constants.push(obj);
        self.constants.len() - 1
    }

    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let instruction = make(op, operands);
        self.instructions.push(&instruction)
    }
}
