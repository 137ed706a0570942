use crate::ast::{BlockStatement, Expr, Identifier, Program, Stmt};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Binding power for infix operators, low to high. The derived `Ord` is what
/// drives the precedence-climbing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Or,
    And,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
            Precedence::LessGreater
        }
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Slash | TokenKind::Asterisk => Precedence::Product,
        TokenKind::LeftParen => Precedence::Call,
        TokenKind::LeftBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Pratt parser over the lexer's token stream. Errors never abort the whole
/// parse; they accumulate in `errors` and the offending statement is
/// dropped, so one pass surfaces everything.
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<String>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Self {
            lexer,
            cur_token: Token::eof(),
            peek_token: Token::eof(),
            errors: Vec::new(),
        };

        // Prime both lookahead slots.
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.cur_token_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }
        program
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Stmt> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(&self.cur_token.literal);

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Stmt::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Stmt::Return { value })
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Stmt::Expression { expr })
    }

    fn parse_expression(&mut self, min_precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenKind::Semicolon)
            && min_precedence < precedence_of(self.peek_token.kind)
        {
            if !has_infix(self.peek_token.kind) {
                return Some(left);
            }
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    /// Dispatch for tokens that can start an expression.
    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.cur_token.kind {
            TokenKind::Ident => Some(Expr::Identifier(Identifier::new(&self.cur_token.literal))),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::Str => Some(Expr::StringLiteral(self.cur_token.literal.clone())),
            TokenKind::True => Some(Expr::Boolean(true)),
            TokenKind::False => Some(Expr::Boolean(false)),
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::LeftParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_hash_literal(),
            kind => {
                self.errors.push(format!("no prefix parse function for {} found", kind));
                None
            }
        }
    }

    /// Dispatch for tokens that can continue an expression. The current
    /// token is the operator; `left` is everything parsed so far.
    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        match self.cur_token.kind {
            TokenKind::LeftParen => self.parse_call_expression(left),
            TokenKind::LeftBracket => self.parse_index_expression(left),
            _ => {
                let operator = self.cur_token.literal.clone();
                let precedence = precedence_of(self.cur_token.kind);
                self.next_token();
                let right = self.parse_expression(precedence)?;
                Some(Expr::Infix {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                })
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expr> {
        match self.cur_token.literal.parse::<i64>() {
            Ok(value) => Some(Expr::IntegerLiteral(value)),
            Err(_) => {
                self.errors
                    .push(format!("could not parse {:?} as integer", self.cur_token.literal));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expr> {
        let operator = self.cur_token.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Prefix { operator, right: Box::new(right) })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;
        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expr> {
        self.expect_peek(TokenKind::LeftParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LeftBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expr::If { condition: Box::new(condition), consequence, alternative })
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        self.next_token();

        while !self.cur_token_is(TokenKind::RightBrace) && !self.cur_token_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.next_token();
        }
        block
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        self.expect_peek(TokenKind::LeftParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement();

        Some(Expr::FunctionLiteral { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(TokenKind::RightParen) {
            self.next_token();
            return Some(parameters);
        }

        self.next_token();
        parameters.push(Identifier::new(&self.cur_token.literal));

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            parameters.push(Identifier::new(&self.cur_token.literal));
        }

        self.expect_peek(TokenKind::RightParen)?;
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expr) -> Option<Expr> {
        let arguments = self.parse_expression_list(TokenKind::RightParen)?;
        Some(Expr::Call { function: Box::new(function), arguments })
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let elements = self.parse_expression_list(TokenKind::RightBracket)?;
        Some(Expr::ArrayLiteral { elements })
    }

    /// Shared comma-separated list parser for calls and array literals,
    /// parameterized by the closing delimiter.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Some(list)
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenKind::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_token_is(TokenKind::RightBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::RightBrace)?;
        Some(Expr::HashLiteral { pairs })
    }

    fn parse_index_expression(&mut self, left: Expr) -> Option<Expr> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightBracket)?;
        Some(Expr::Index { left: Box::new(left), index: Box::new(index) })
    }

    fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    /// Advance over the next token if it matches; otherwise record a
    /// diagnostic and abort the enclosing construct.
    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_token_is(kind) {
            self.next_token();
            Some(())
        } else {
            self.errors.push(format!(
                "expected next token to be {}, got {} instead",
                kind, self.peek_token.kind
            ));
            None
        }
    }
}

fn has_infix(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Slash
            | TokenKind::Asterisk
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::And
            | TokenKind::Or
            | TokenKind::LeftParen
            | TokenKind::LeftBracket
    )
}
