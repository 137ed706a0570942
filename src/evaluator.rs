use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{BlockStatement, Expr, Identifier, Program, Stmt};
use crate::builtins;
use crate::environment::Environment;
use crate::object::{Function, HashPair, Object, FALSE, NULL, TRUE};

/// Tree-walking execution of a parsed program against a caller-supplied
/// environment. `None` means the program produced no value (for instance a
/// trailing `let`).
pub fn eval_program(program: &Program, env: &Rc<RefCell<Environment>>) -> Option<Object> {
    let mut result = None;
    for stmt in &program.statements {
        result = eval_statement(stmt, env);
        match result {
            Some(Object::ReturnValue(value)) => return Some(*value),
            Some(Object::Error(_)) => return result,
            _ => {}
        }
    }
    result
}

fn eval_statement(stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Option<Object> {
    match stmt {
        Stmt::Let { name, value } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return Some(value);
            }
            env.borrow_mut().set(&name.name, value);
            None
        }
        Stmt::Return { value } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return Some(value);
            }
            Some(Object::ReturnValue(Box::new(value)))
        }
        Stmt::Expression { expr } => Some(eval_expression(expr, env)),
    }
}

/// Unlike `eval_program`, a block propagates a `ReturnValue` wrapper
/// unchanged so that `return` unwinds nested blocks up to the enclosing
/// function call.
fn eval_block(block: &BlockStatement, env: &Rc<RefCell<Environment>>) -> Option<Object> {
    let mut result = None;
    for stmt in &block.statements {
        result = eval_statement(stmt, env);
        if matches!(result, Some(Object::ReturnValue(_)) | Some(Object::Error(_))) {
            return result;
        }
    }
    result
}

fn eval_expression(expr: &Expr, env: &Rc<RefCell<Environment>>) -> Object {
    match expr {
        Expr::IntegerLiteral(value) => Object::Integer(*value),
        Expr::StringLiteral(value) => Object::Str(value.clone()),
        Expr::Boolean(value) => native_bool(*value),
        Expr::Identifier(ident) => eval_identifier(ident, env),
        Expr::Prefix { operator, right } => {
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expr::Infix { left, operator, right } => {
            // `&&` and `||` evaluate their right side only when the left
            // side has not already decided the outcome.
            if operator == "&&" || operator == "||" {
                return eval_logical_expression(operator, left, right, env);
            }

            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expr::If { condition, consequence, alternative } => {
            let condition = eval_expression(condition, env);
            if condition.is_error() {
                return condition;
            }
            if is_truthy(&condition) {
                eval_block(consequence, env).unwrap_or(NULL)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env).unwrap_or(NULL)
            } else {
                NULL
            }
        }
        Expr::FunctionLiteral { parameters, body } => Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: env.clone(),
        })),
        Expr::Call { function, arguments } => {
            let function = eval_expression(function, env);
            if function.is_error() {
                return function;
            }
            let args = match eval_expressions(arguments, env) {
                Ok(args) => args,
                Err(err) => return err,
            };
            apply_function(function, args)
        }
        Expr::ArrayLiteral { elements } => match eval_expressions(elements, env) {
            Ok(elements) => Object::Array(elements),
            Err(err) => err,
        },
        Expr::Index { left, index } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let index = eval_expression(index, env);
            if index.is_error() {
                return index;
            }
            eval_index_expression(left, index)
        }
        Expr::HashLiteral { pairs } => eval_hash_literal(pairs, env),
    }
}

fn eval_identifier(ident: &Identifier, env: &Rc<RefCell<Environment>>) -> Object {
    if let Some(value) = env.borrow().get(&ident.name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(&ident.name) {
        return Object::Builtin(builtin);
    }
    Object::Error(format!("identifier not found: {}", ident.name))
}

/// Left-to-right evaluation, short-circuiting on the first error.
fn eval_expressions(
    exprs: &[Expr],
    env: &Rc<RefCell<Environment>>,
) -> Result<Vec<Object>, Object> {
    let mut results = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let value = eval_expression(expr, env);
        if value.is_error() {
            return Err(value);
        }
        results.push(value);
    }
    Ok(results)
}

fn eval_prefix_expression(operator: &str, right: Object) -> Object {
    match operator {
        "!" => native_bool(!is_truthy(&right)),
        "-" => match right {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            other => Object::Error(format!("unknown operator: -{}", other.type_name())),
        },
        _ => Object::Error(format!("unknown operator: {}{}", operator, right.type_name())),
    }
}

/// Both operands coerce to their truthiness; the result is always a
/// boolean.
fn eval_logical_expression(
    operator: &str,
    left: &Expr,
    right: &Expr,
    env: &Rc<RefCell<Environment>>,
) -> Object {
    let left = eval_expression(left, env);
    if left.is_error() {
        return left;
    }

    let left_truthy = is_truthy(&left);
    if (operator == "&&" && !left_truthy) || (operator == "||" && left_truthy) {
        return native_bool(left_truthy);
    }

    let right = eval_expression(right, env);
    if right.is_error() {
        return right;
    }
    native_bool(is_truthy(&right))
}

fn eval_infix_expression(operator: &str, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Object::Str(l), Object::Str(r)) => match operator {
            "+" => Object::Str(format!("{}{}", l, r)),
            _ => Object::Error(format!("unknown operator: STRING {} STRING", operator)),
        },
        _ if operator == "==" => native_bool(left == right),
        _ if operator == "!=" => native_bool(left != right),
        _ if left.type_name() != right.type_name() => Object::Error(format!(
            "type mismatch: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
        _ => Object::Error(format!(
            "unknown operator: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
    }
}

// Integer arithmetic wraps on overflow.
fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Object {
    match operator {
        "+" => Object::Integer(left.wrapping_add(right)),
        "-" => Object::Integer(left.wrapping_sub(right)),
        "*" => Object::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Object::Error("division by zero".to_owned())
            } else {
                Object::Integer(left.wrapping_div(right))
            }
        }
        "<" => native_bool(left < right),
        ">" => native_bool(left > right),
        "<=" => native_bool(left <= right),
        ">=" => native_bool(left >= right),
        "==" => native_bool(left == right),
        "!=" => native_bool(left != right),
        _ => Object::Error(format!("unknown operator: INTEGER {} INTEGER", operator)),
    }
}

fn apply_function(function: Object, args: Vec<Object>) -> Object {
    match function {
        Object::Function(function) => {
            if args.len() != function.parameters.len() {
                return Object::Error(format!(
                    "wrong number of arguments: want={}, got={}",
                    function.parameters.len(),
                    args.len()
                ));
            }

            let mut call_env = Environment::new().with_enclosing(function.env.clone());
            for (param, arg) in function.parameters.iter().zip(args) {
                call_env.set(&param.name, arg);
            }

            let result = eval_block(&function.body, &call_env.as_rc()).unwrap_or(NULL);
            // `return` must not leak past its own function.
            match result {
                Object::ReturnValue(value) => *value,
                other => other,
            }
        }
        Object::Builtin(builtin) => (builtin.func)(args),
        other => Object::Error(format!("not a function: {}", other.type_name())),
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(i)) => {
            if *i < 0 || *i as usize >= elements.len() {
                NULL
            } else {
                elements[*i as usize].clone()
            }
        }
        (Object::Hash(pairs), _) => match index.hash_key() {
            Some(key) => pairs.get(&key).map(|pair| pair.value.clone()).unwrap_or(NULL),
            None => Object::Error(format!("unusable as hash key: {}", index.type_name())),
        },
        _ => Object::Error(format!("index operator not supported: {}", left.type_name())),
    }
}

fn eval_hash_literal(pairs: &[(Expr, Expr)], env: &Rc<RefCell<Environment>>) -> Object {
    let mut map = HashMap::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, env);
        if key.is_error() {
            return key;
        }
        let hash_key = match key.hash_key() {
            Some(hash_key) => hash_key,
            None => return Object::Error(format!("unusable as hash key: {}", key.type_name())),
        };

        let value = eval_expression(value_expr, env);
        if value.is_error() {
            return value;
        }
        map.insert(hash_key, HashPair { key, value });
    }
    Object::Hash(map)
}

fn is_truthy(value: &Object) -> bool {
    !matches!(value, Object::Null | Object::Boolean(false))
}

fn native_bool(value: bool) -> Object {
    if value {
        TRUE
    } else {
        FALSE
    }
}
