use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

use crate::ast::{BlockStatement, Identifier};
use crate::environment::Environment;

/// Shared immutable singletons. Equality on these is plain value equality,
/// so comparing against them is always safe.
pub const NULL: Object = Object::Null;
pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);

pub type BuiltinFn = fn(Vec<Object>) -> Object;

/// A user-defined function bundled with the environment captured at its
/// definition site.
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Rc<RefCell<Environment>>,
}

/// `env` is elided: a closure bound in the frame it captured forms an `Rc`
/// cycle, and deriving would recurse through it.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// Runtime value. `ReturnValue` and `Error` are control-flow markers that
/// flow through the same channel as ordinary values; user code never sees a
/// bare `ReturnValue`.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Null,
    ReturnValue(Box<Object>),
    Error(String),
    Array(Vec<Object>),
    Hash(HashMap<HashKey, HashPair>),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::Str(_) => "STRING",
            Object::Null => "NULL",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
        }
    }

    /// Human-readable rendering, as printed by the REPL.
    pub fn inspect(&self) -> String {
        match self {
            Object::Integer(value) => value.to_string(),
            Object::Boolean(value) => value.to_string(),
            Object::Str(value) => value.clone(),
            Object::Null => "nil".to_owned(),
            Object::ReturnValue(value) => value.inspect(),
            Object::Error(message) => format!("ERROR: {}", message),
            Object::Array(elements) => {
                let rendered: Vec<String> = elements.iter().map(|e| e.inspect()).collect();
                format!("[{}]", rendered.join(", "))
            }
            Object::Hash(pairs) => {
                let rendered: Vec<String> = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key.inspect(), pair.value.inspect()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Object::Function(function) => {
                let params: Vec<String> =
                    function.parameters.iter().map(|p| p.to_string()).collect();
                format!("fn({}) {{\n{}\n}}", params.join(", "), function.body)
            }
            Object::Builtin(_) => "builtin function".to_owned(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// The hashable capability. Arrays, hashes and functions have none.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => {
                Some(HashKey { kind: HashKind::Integer, value: *value as u64 })
            }
            Object::Boolean(value) => {
                Some(HashKey { kind: HashKind::Boolean, value: u64::from(*value) })
            }
            Object::Str(value) => {
                Some(HashKey { kind: HashKind::Str, value: fnv1a_64(value.as_bytes()) })
            }
            _ => None,
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(left), Object::Integer(right)) => left == right,
            (Object::Boolean(left), Object::Boolean(right)) => left == right,
            (Object::Str(left), Object::Str(right)) => left == right,
            (Object::Null, Object::Null) => true,
            (Object::ReturnValue(left), Object::ReturnValue(right)) => left == right,
            (Object::Error(left), Object::Error(right)) => left == right,
            (Object::Array(left), Object::Array(right)) => left == right,
            (Object::Hash(left), Object::Hash(right)) => left == right,
            (Object::Function(left), Object::Function(right)) => Rc::ptr_eq(left, right),
            (Object::Builtin(left), Object::Builtin(right)) => left == right,
            _ => false,
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    Integer,
    Boolean,
    Str,
}

/// Type-tagged 64-bit key. Two equal hashable values of the same variant
/// always produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: HashKind,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// 64-bit FNV-1a over the string's bytes.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
