pub mod ast;
pub mod builtins;
pub mod code;
pub mod compiler;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod token;
pub mod vm;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::code::{make, Instructions, Opcode};
    pub use crate::compiler::{Bytecode, CompileError, Compiler};
    pub use crate::environment::Environment;
    pub use crate::evaluator::eval_program;
    pub use crate::lexer::Lexer;
    pub use crate::object::{Object, NULL};
    pub use crate::parser::Parser;
    pub use crate::token::{Token, TokenKind};
    pub use crate::vm::{Vm, VmError};
    pub use crate::{Engine, Quill};
}

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use anyhow::bail;

use crate::compiler::Compiler;
use crate::environment::Environment;
use crate::evaluator::eval_program;
use crate::lexer::Lexer;
use crate::object::{Object, NULL};
use crate::parser::Parser;
use crate::vm::Vm;

const PROMPT: &str = ">> ";
const SOURCE_EXTENSION: &str = "ql";

/// Which backend executes a parsed program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// Walk the AST directly.
    #[default]
    Eval,
    /// Compile to bytecode and run it on the stack machine.
    Vm,
}

/// Host driver: owns the environment that persists across inputs and feeds
/// each source text through the pipeline.
pub struct Quill {
    engine: Engine,
    env: Rc<RefCell<Environment>>,
}

impl Quill {
    pub fn new(engine: Engine) -> Self {
        Self { engine, env: Environment::new().as_rc() }
    }

    pub fn run_file(&mut self, filename: &str) -> Result<(), anyhow::Error> {
        match filename.rsplit_once('.') {
            Some((_, ext)) if ext == SOURCE_EXTENSION => {}
            _ => bail!("wrong file extension, expected a .{} file", SOURCE_EXTENSION),
        }

        let content = std::fs::read_to_string(filename)?;
        if let Some(output) = self.run(&content) {
            if let Object::Error(_) = output.result {
                eprintln!("{}", output.result.inspect());
            }
        }
        Ok(())
    }

    /// Read-eval-print loop. The environment carries bindings from line to
    /// line; the compiler and VM are rebuilt per line.
    pub fn repl(
        &mut self,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<(), anyhow::Error> {
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }

            if let Some(outcome) = self.run(&line) {
                writeln!(output, "{}", outcome.result.inspect())?;
            }
        }
    }

    /// Run one source text through the selected backend. `None` means the
    /// input produced no value (empty input, a bare `let`, or a reported
    /// failure).
    pub fn run(&mut self, source: &str) -> Option<RunOutcome> {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();

        if !parser.errors().is_empty() {
            print_parser_errors(parser.errors());
            return None;
        }

        match self.engine {
            Engine::Eval => {
                let result = eval_program(&program, &self.env)?;
                Some(RunOutcome { result })
            }
            Engine::Vm => {
                let mut compiler = Compiler::new();
                if let Err(e) = compiler.compile(&program) {
                    eprintln!("compilation failed: {}", e);
                    return None;
                }

                let mut machine = Vm::new(compiler.bytecode());
                if let Err(e) = machine.run() {
                    eprintln!("bytecode execution failed: {}", e);
                    return None;
                }
                let result = machine.last_popped().cloned().unwrap_or(NULL);
                Some(RunOutcome { result })
            }
        }
    }
}

impl Default for Quill {
    fn default() -> Self {
        Self::new(Engine::Eval)
    }
}

/// The value a source text produced, as observed by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub result: Object,
}

fn print_parser_errors(errors: &[String]) {
    for msg in errors {
        eprintln!("\t{}", msg);
    }
}
