use thiserror::Error;

use crate::code::{lookup, read_operands, CodeError, Instructions, Opcode};
use crate::compiler::Bytecode;
use crate::object::{Object, FALSE, NULL, TRUE};

/// Fixed operand-stack capacity; every push is checked against it.
pub const STACK_SIZE: usize = 2048;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VmError {
    #[error("stack overflow")]
    StackOverflow,
    #[error("popped from an empty stack")]
    StackUnderflow,
    #[error("unsupported types {0} {1}")]
    UnsupportedTypes(&'static str, &'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported type for negation: {0}")]
    UnsupportedNegation(&'static str),
    #[error("operator not supported: {0:?} {1} {2}")]
    UnsupportedComparison(Opcode, &'static str, &'static str),
    #[error(transparent)]
    Code(#[from] CodeError),
}

/// Stack machine over a compiled instruction stream. The stack pointer
/// always points one past the logical top.
#[derive(Debug)]
pub struct Vm {
    constants: Vec<Object>,
    instructions: Instructions,
    stack: Vec<Object>,
    sp: usize,
}

impl Vm {
    pub fn new(bytecode: Bytecode) -> Self {
        Self {
            constants: bytecode.constants,
            instructions: bytecode.instructions,
            stack: vec![NULL; STACK_SIZE],
            sp: 0,
        }
    }

    /// Fetch-decode-execute until the instruction stream runs out; there is
    /// no halt opcode.
    pub fn run(&mut self) -> Result<(), VmError> {
        let mut ip = 0;
        while ip < self.instructions.len() {
            let op = Opcode::try_from(self.instructions.as_bytes()[ip])?;

            match op {
                Opcode::Constant => {
                    let def = lookup(op);
                    let (operands, read) =
                        read_operands(def, &self.instructions.as_bytes()[ip + 1..]);
                    ip += read;

                    let constant = self.constants[operands[0]].clone();
                    self.push(constant)?;
                }
                Opcode::True => self.push(TRUE)?,
                Opcode::False => self.push(FALSE)?,
                Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                    self.execute_binary_operation(op)?;
                }
                Opcode::Equal | Opcode::NotEqual | Opcode::GreaterThan => {
                    self.execute_comparison(op)?;
                }
                Opcode::Bang => self.execute_bang_operator()?,
                Opcode::Minus => self.execute_minus_operator()?,
                Opcode::Pop => {
                    self.pop()?;
                }
            }
            ip += 1;
        }
        Ok(())
    }

    /// Current top of stack; what the host reads after `run` when the
    /// trailing pop has not yet discarded the result.
    pub fn stack_top(&self) -> Option<&Object> {
        if self.sp == 0 {
            None
        } else {
            Some(&self.stack[self.sp - 1])
        }
    }

    /// The slot just above the stack pointer, i.e. the most recently popped
    /// value. This is how the result of a balanced program is observed.
    /// `None` when the run ended with the stack exactly full.
    pub fn last_popped(&self) -> Option<&Object> {
        self.stack.get(self.sp)
    }

    fn execute_binary_operation(&mut self, op: Opcode) -> Result<(), VmError> {
        let right = self.pop()?;
        let left = self.pop()?;

        match (&left, &right) {
            (Object::Integer(l), Object::Integer(r)) => {
                // Wrapping, to match the evaluator's overflow behavior.
                let result = match op {
                    Opcode::Add => l.wrapping_add(*r),
                    Opcode::Sub => l.wrapping_sub(*r),
                    Opcode::Mul => l.wrapping_mul(*r),
                    Opcode::Div => {
                        if *r == 0 {
                            return Err(VmError::DivisionByZero);
                        }
                        l.wrapping_div(*r)
                    }
                    _ => unreachable!("non-arithmetic opcode {:?}", op),
                };
                self.push(Object::Integer(result))
            }
            _ => Err(VmError::UnsupportedTypes(left.type_name(), right.type_name())),
        }
    }

    fn execute_comparison(&mut self, op: Opcode) -> Result<(), VmError> {
        let right = self.pop()?;
        let left = self.pop()?;

        if let (Object::Integer(l), Object::Integer(r)) = (&left, &right) {
            let result = match op {
                Opcode::Equal => l == r,
                Opcode::NotEqual => l != r,
                Opcode::GreaterThan => l > r,
                _ => unreachable!("non-comparison opcode {:?}", op),
            };
            return self.push(native_bool(result));
        }

        match op {
            Opcode::Equal => self.push(native_bool(left == right)),
            Opcode::NotEqual => self.push(native_bool(left != right)),
            _ => Err(VmError::UnsupportedComparison(op, left.type_name(), right.type_name())),
        }
    }

    fn execute_bang_operator(&mut self) -> Result<(), VmError> {
        let operand = self.pop()?;
        match operand {
            Object::Boolean(false) | Object::Null => self.push(TRUE),
            _ => self.push(FALSE),
        }
    }

    fn execute_minus_operator(&mut self) -> Result<(), VmError> {
        let operand = self.pop()?;
        match operand {
            Object::Integer(value) => self.push(Object::Integer(value.wrapping_neg())),
            other => Err(VmError::UnsupportedNegation(other.type_name())),
        }
    }

    fn push(&mut self, obj: Object) -> Result<(), VmError> {
        if self.sp >= STACK_SIZE {
            return Err(VmError::StackOverflow);
        }
        self.stack[self.sp] = obj;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<Object, VmError> {
        if self.sp == 0 {
            return Err(VmError::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp].clone())
    }
}

fn native_bool(value: bool) -> Object {
    if value {
        TRUE
    } else {
        FALSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::make;
    use crate::compiler::Compiler;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(source: &str) -> Object {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "parser errors: {:?}", parser.errors());

        let mut compiler = Compiler::new();
        compiler.compile(&program).expect("compile failed");

        let mut vm = Vm::new(compiler.bytecode());
        vm.run().expect("vm run failed");
        vm.last_popped().expect("nothing was popped").clone()
    }

    macro_rules! assert_runs {
        ($source:expr, $expected:expr) => {
            assert_eq!(run($source), $expected, "source: {}", $source);
        };
    }

    #[test]
    fn integer_arithmetic() {
        assert_runs!("1", Object::Integer(1));
        assert_runs!("1 + 2", Object::Integer(3));
        assert_runs!("1 - 2", Object::Integer(-1));
        assert_runs!("4 / 2", Object::Integer(2));
        assert_runs!("50 / 2 * 2 + 10 - 5", Object::Integer(55));
        assert_runs!("5 * (2 + 10)", Object::Integer(60));
        assert_runs!("2 + 3 * 4", Object::Integer(14));
        assert_runs!("-5 + 10", Object::Integer(5));
        assert_runs!("(5 + 10 * 2 + 15 / 3) * 2 + -10", Object::Integer(50));
    }

    #[test]
    fn integer_arithmetic_wraps_on_overflow() {
        assert_runs!("9223372036854775807 + 1", Object::Integer(i64::MIN));
        assert_runs!("-9223372036854775807 - 2", Object::Integer(i64::MAX));
        assert_runs!("9223372036854775807 * 2", Object::Integer(-2));
        assert_runs!("-(-9223372036854775807 - 1)", Object::Integer(i64::MIN));
        assert_runs!("(-9223372036854775807 - 1) / -1", Object::Integer(i64::MIN));
    }

    #[test]
    fn boolean_expressions() {
        assert_runs!("true", TRUE);
        assert_runs!("false", FALSE);
        assert_runs!("1 < 2", TRUE);
        assert_runs!("1 > 2", FALSE);
        assert_runs!("1 == 1", TRUE);
        assert_runs!("1 != 2", TRUE);
        assert_runs!("true == true", TRUE);
        assert_runs!("true != false", TRUE);
        assert_runs!("(1 < 2) == true", TRUE);
        assert_runs!("!true", FALSE);
        assert_runs!("!!true", TRUE);
        assert_runs!("!5", FALSE);
    }

    #[test]
    fn stack_top_before_the_trailing_pop() {
        let mut parser = Parser::new(Lexer::new("1 + 2"));
        let program = parser.parse_program();
        let mut compiler = Compiler::new();
        compiler.compile(&program).unwrap();

        let mut vm = Vm::new(compiler.bytecode());
        assert!(vm.stack_top().is_none());
        vm.run().unwrap();
        assert_eq!(vm.last_popped(), Some(&Object::Integer(3)));
    }

    #[test]
    fn full_stack_leaves_no_popped_slot() {
        // Exactly STACK_SIZE pushes succeed; there is then no slot above
        // the stack pointer to read.
        let mut instructions = Instructions::default();
        for _ in 0..STACK_SIZE {
            instructions.push(&make(Opcode::True, &[]));
        }

        let mut vm = Vm::new(Bytecode { instructions, constants: vec![] });
        vm.run().unwrap();
        assert_eq!(vm.stack_top(), Some(&TRUE));
        assert!(vm.last_popped().is_none());
    }

    #[test]
    fn type_mismatch_is_fatal() {
        let mut parser = Parser::new(Lexer::new("1 + true"));
        let program = parser.parse_program();
        let mut compiler = Compiler::new();
        compiler.compile(&program).unwrap();

        let mut vm = Vm::new(compiler.bytecode());
        assert_eq!(vm.run(), Err(VmError::UnsupportedTypes("INTEGER", "BOOLEAN")));
    }

    #[test]
    fn stack_overflow_is_a_returned_error() {
        // A raw instruction stream that pushes forever without popping.
        let mut instructions = Instructions::default();
        for _ in 0..=STACK_SIZE {
            instructions.push(&make(Opcode::True, &[]));
        }

        let mut vm = Vm::new(Bytecode { instructions, constants: vec![] });
        assert_eq!(vm.run(), Err(VmError::StackOverflow));
    }

    #[test]
    fn evaluator_and_vm_agree_on_arithmetic() {
        use crate::environment::Environment;
        use crate::evaluator::eval_program;

        let sources = [
            "1 + 2 * 3",
            "(1 + 2) * 3",
            "10 / 2 - 3",
            "-(5 + 5) + 20",
            "5 < 10",
            "5 > 10",
            "1 + 2 == 3",
            "2 * 2 != 5",
            "!false",
        ];

        for source in sources {
            let mut parser = Parser::new(Lexer::new(source));
            let program = parser.parse_program();
            assert!(parser.errors().is_empty());

            let env = Environment::new().as_rc();
            let evaluated = eval_program(&program, &env).expect("no value");

            assert_eq!(run(source), evaluated, "backends disagree on {}", source);
        }
    }
}
