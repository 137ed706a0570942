use crate::object::{Builtin, Object, NULL};

/// Fixed table of native functions, consulted after environment lookup
/// fails.
pub fn lookup(name: &str) -> Option<Builtin> {
    let func: Builtin = match name {
        "len" => Builtin { name: "len", func: len },
        "first" => Builtin { name: "first", func: first },
        "last" => Builtin { name: "last", func: last },
        "rest" => Builtin { name: "rest", func: rest },
        "push" => Builtin { name: "push", func: push },
        "puts" => Builtin { name: "puts", func: puts },
        _ => return None,
    };
    Some(func)
}

fn wrong_arity(got: usize, want: usize) -> Object {
    Object::Error(format!("wrong number of arguments. got={}, want={}", got, want))
}

fn len(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Str(value) => Object::Integer(value.len() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => Object::Error(format!("argument to `len` not supported, got {}", other.type_name())),
    }
}

fn first(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.first().cloned().unwrap_or(NULL),
        other => {
            Object::Error(format!("argument to `first` must be ARRAY, got {}", other.type_name()))
        }
    }
}

fn last(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.last().cloned().unwrap_or(NULL),
        other => {
            Object::Error(format!("argument to `last` must be ARRAY, got {}", other.type_name()))
        }
    }
}

fn rest(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => {
            if elements.is_empty() {
                NULL
            } else {
                Object::Array(elements[1..].to_vec())
            }
        }
        other => {
            Object::Error(format!("argument to `rest` must be ARRAY, got {}", other.type_name()))
        }
    }
}

fn push(args: Vec<Object>) -> Object {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    match &args[0] {
        Object::Array(elements) => {
            let mut extended = elements.clone();
            extended.push(args[1].clone());
            Object::Array(extended)
        }
        other => {
            Object::Error(format!("argument to `push` must be ARRAY, got {}", other.type_name()))
        }
    }
}

fn puts(args: Vec<Object>) -> Object {
    for arg in &args {
        println!("{}", arg.inspect());
    }
    NULL
}
