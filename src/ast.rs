use std::fmt::Display;

/// Identifier node, also used for `let` targets and function parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_owned() }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    IntegerLiteral(i64),
    Boolean(bool),
    StringLiteral(String),
    ArrayLiteral {
        elements: Vec<Expr>,
    },
    HashLiteral {
        pairs: Vec<(Expr, Expr)>,
    },
    Prefix {
        operator: String,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    FunctionLiteral {
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
}

impl Expr {
    /// Literal text of the node's defining token.
    pub fn token_literal(&self) -> String {
        match self {
            Expr::Identifier(ident) => ident.name.clone(),
            Expr::IntegerLiteral(value) => value.to_string(),
            Expr::Boolean(value) => value.to_string(),
            Expr::StringLiteral(value) => value.clone(),
            Expr::ArrayLiteral { .. } => "[".to_owned(),
            Expr::HashLiteral { .. } => "{".to_owned(),
            Expr::Prefix { operator, .. } => operator.clone(),
            Expr::Infix { operator, .. } => operator.clone(),
            Expr::If { .. } => "if".to_owned(),
            Expr::FunctionLiteral { .. } => "fn".to_owned(),
            Expr::Call { function, .. } => function.token_literal(),
            Expr::Index { left, .. } => left.token_literal(),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Identifier(ident) => write!(f, "{}", ident),
            Expr::IntegerLiteral(value) => write!(f, "{}", value),
            Expr::Boolean(value) => write!(f, "{}", value),
            Expr::StringLiteral(value) => write!(f, "{}", value),
            Expr::ArrayLiteral { elements } => {
                write!(f, "[{}]", join(elements))
            }
            Expr::HashLiteral { pairs } => {
                let rendered: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Expr::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expr::Infix { left, operator, right } => {
                write!(f, "({} {} {})", left, operator, right)
            }
            Expr::If { condition, consequence, alternative } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, "else {}", alternative)?;
                }
                Ok(())
            }
            Expr::FunctionLiteral { parameters, body } => {
                let params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "fn({}) {}", params.join(", "), body)
            }
            Expr::Call { function, arguments } => {
                write!(f, "{}({})", function, join(arguments))
            }
            Expr::Index { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { name: Identifier, value: Expr },
    Return { value: Expr },
    Expression { expr: Expr },
}

impl Stmt {
    pub fn token_literal(&self) -> String {
        match self {
            Stmt::Let { .. } => "let".to_owned(),
            Stmt::Return { .. } => "return".to_owned(),
            Stmt::Expression { expr } => expr.token_literal(),
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {} = {};", name, value),
            Stmt::Return { value } => write!(f, "return {};", value),
            Stmt::Expression { expr } => write!(f, "{}", expr),
        }
    }
}

/// A brace-delimited sequence of statements. Never nil, possibly empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Stmt>,
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

/// Root of every parse. Statement order is significant and preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn token_literal(&self) -> String {
        match self.statements.first() {
            Some(stmt) => stmt.token_literal(),
            None => String::new(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_let_statement() {
        let program = Program {
            statements: vec![Stmt::Let {
                name: Identifier::new("answer"),
                value: Expr::Identifier(Identifier::new("other")),
            }],
        };

        assert_eq!(program.to_string(), "let answer = other;");
        assert_eq!(program.token_literal(), "let");
    }

    #[test]
    fn render_nested_expression() {
        // This is '-a * b'.
        let expr = Expr::Infix {
            left: Box::new(Expr::Prefix {
                operator: "-".to_owned(),
                right: Box::new(Expr::Identifier(Identifier::new("a"))),
            }),
            operator: "*".to_owned(),
            right: Box::new(Expr::Identifier(Identifier::new("b"))),
        };

        assert_eq!(expr.to_string(), "((-a) * b)");
    }

    #[test]
    fn render_collections() {
        let array = Expr::ArrayLiteral {
            elements: vec![Expr::IntegerLiteral(1), Expr::IntegerLiteral(2)],
        };
        assert_eq!(array.to_string(), "[1, 2]");

        let hash = Expr::HashLiteral {
            pairs: vec![(
                Expr::StringLiteral("one".to_owned()),
                Expr::IntegerLiteral(1),
            )],
        };
        assert_eq!(hash.to_string(), "{one: 1}");

        let index = Expr::Index {
            left: Box::new(Expr::Identifier(Identifier::new("xs"))),
            index: Box::new(Expr::IntegerLiteral(0)),
        };
        assert_eq!(index.to_string(), "(xs[0])");
    }

    #[test]
    fn empty_program_is_usable() {
        let program = Program::default();
        assert_eq!(program.to_string(), "");
        assert_eq!(program.token_literal(), "");
    }
}
