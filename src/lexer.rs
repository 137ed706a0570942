use crate::token::{lookup_ident, Token, TokenKind};

/// Pull-based lexer. `next_token` may be called forever; once the input is
/// exhausted it keeps returning an Eof token.
#[derive(Debug)]
pub struct Lexer {
    source_chars: Vec<char>,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self { source_chars: source.chars().collect(), current: 0 }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        if self.is_at_end() {
            return Token::eof();
        }

        let c = self.advance();
        match c {
            '=' => self.one_or_two('=', TokenKind::Eq, TokenKind::Assign),
            '!' => self.one_or_two('=', TokenKind::NotEq, TokenKind::Bang),
            '<' => self.one_or_two('=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.one_or_two('=', TokenKind::GtEq, TokenKind::Gt),
            '&' => {
                if self.match_next('&') {
                    Token::new(TokenKind::And, "&&")
                } else {
                    Token::new(TokenKind::Illegal, "&")
                }
            }
            '|' => {
                if self.match_next('|') {
                    Token::new(TokenKind::Or, "||")
                } else {
                    Token::new(TokenKind::Illegal, "|")
                }
            }
            '+' => Token::new(TokenKind::Plus, "+"),
            '-' => Token::new(TokenKind::Minus, "-"),
            '*' => Token::new(TokenKind::Asterisk, "*"),
            '/' => Token::new(TokenKind::Slash, "/"),
            ',' => Token::new(TokenKind::Comma, ","),
            ';' => Token::new(TokenKind::Semicolon, ";"),
            ':' => Token::new(TokenKind::Colon, ":"),
            '(' => Token::new(TokenKind::LeftParen, "("),
            ')' => Token::new(TokenKind::RightParen, ")"),
            '{' => Token::new(TokenKind::LeftBrace, "{"),
            '}' => Token::new(TokenKind::RightBrace, "}"),
            '[' => Token::new(TokenKind::LeftBracket, "["),
            ']' => Token::new(TokenKind::RightBracket, "]"),
            '"' => self.string(),
            '0'..='9' => self.number(c),
            c if is_alpha(c) => self.identifier(c),
            c => Token::new(TokenKind::Illegal, &c.to_string()),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source_chars.len()
    }

    fn advance(&mut self) -> char {
        let ch = self.source_chars[self.current];
        self.current += 1;
        ch
    }

    fn peek(&self) -> char {
        *self.source_chars.get(self.current).unwrap_or(&'\0')
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.current += 1;
            return true;
        }
        false
    }

    fn one_or_two(&mut self, second: char, two: TokenKind, one: TokenKind) -> Token {
        let first = self.source_chars[self.current - 1];
        if self.match_next(second) {
            Token::new(two, &format!("{}{}", first, second))
        } else {
            Token::new(one, &first.to_string())
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                // '$' and '#' both open a comment running to end of line.
                '$' | '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Token {
        let mut text = String::new();
        while !self.is_at_end() && self.peek() != '"' {
            text.push(self.advance());
        }

        if self.is_at_end() {
            // Unterminated literal; surface it so the parser reports a
            // diagnostic instead of silently truncating.
            return Token::new(TokenKind::Illegal, &text);
        }

        // The closing quote.
        self.advance();
        Token::new(TokenKind::Str, &text)
    }

    fn number(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }

        if self.peek() != '.' {
            return Token::new(TokenKind::Int, &text);
        }

        text.push(self.advance());
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }
        Token::new(TokenKind::Float, &text)
    }

    fn identifier(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        while is_alpha(self.peek()) {
            text.push(self.advance());
        }
        Token::new(lookup_ident(&text), &text)
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind::*;

    fn assert_tokens(source: &str, expected: &[(TokenKind, &str)]) {
        let mut lexer = Lexer::new(source);
        for (i, (kind, literal)) in expected.iter().enumerate() {
            let tok = lexer.next_token();
            assert_eq!(tok.kind, *kind, "token {} of {:?}", i, source);
            assert_eq!(tok.literal, *literal, "token {} of {:?}", i, source);
        }
        assert_eq!(lexer.next_token().kind, Eof);
    }

    #[test]
    fn full_program() {
        let source = r#"
            let five = 5;
            let add = fn(x, y) {
                x + y;
            };
            let result = add(five, 10);
            !-/*0;
            2 < 10 > 7;

            if (5 < 10) {
                return true;
            } else {
                return false;
            }
        "#;

        assert_tokens(
            source,
            &[
                (Let, "let"),
                (Ident, "five"),
                (Assign, "="),
                (Int, "5"),
                (Semicolon, ";"),
                (Let, "let"),
                (Ident, "add"),
                (Assign, "="),
                (Function, "fn"),
                (LeftParen, "("),
                (Ident, "x"),
                (Comma, ","),
                (Ident, "y"),
                (RightParen, ")"),
                (LeftBrace, "{"),
                (Ident, "x"),
                (Plus, "+"),
                (Ident, "y"),
                (Semicolon, ";"),
                (RightBrace, "}"),
                (Semicolon, ";"),
                (Let, "let"),
                (Ident, "result"),
                (Assign, "="),
                (Ident, "add"),
                (LeftParen, "("),
                (Ident, "five"),
                (Comma, ","),
                (Int, "10"),
                (RightParen, ")"),
                (Semicolon, ";"),
                (Bang, "!"),
                (Minus, "-"),
                (Slash, "/"),
                (Asterisk, "*"),
                (Int, "0"),
                (Semicolon, ";"),
                (Int, "2"),
                (Lt, "<"),
                (Int, "10"),
                (Gt, ">"),
                (Int, "7"),
                (Semicolon, ";"),
                (If, "if"),
                (LeftParen, "("),
                (Int, "5"),
                (Lt, "<"),
                (Int, "10"),
                (RightParen, ")"),
                (LeftBrace, "{"),
                (Return, "return"),
                (True, "true"),
                (Semicolon, ";"),
                (RightBrace, "}"),
                (Else, "else"),
                (LeftBrace, "{"),
                (Return, "return"),
                (False, "false"),
                (Semicolon, ";"),
                (RightBrace, "}"),
            ],
        );
    }

    #[test]
    fn two_char_operators() {
        assert_tokens(
            "10 <= 11; 10 >= 9; 10 == 10; 10 != 9; true && false; true || false;",
            &[
                (Int, "10"),
                (LtEq, "<="),
                (Int, "11"),
                (Semicolon, ";"),
                (Int, "10"),
                (GtEq, ">="),
                (Int, "9"),
                (Semicolon, ";"),
                (Int, "10"),
                (Eq, "=="),
                (Int, "10"),
                (Semicolon, ";"),
                (Int, "10"),
                (NotEq, "!="),
                (Int, "9"),
                (Semicolon, ";"),
                (True, "true"),
                (And, "&&"),
                (False, "false"),
                (Semicolon, ";"),
                (True, "true"),
                (Or, "||"),
                (False, "false"),
                (Semicolon, ";"),
            ],
        );
    }

    #[test]
    fn strings_arrays_hashes() {
        assert_tokens(
            r#""foobar"; "foo bar"; [1, 2]; {"foo": "bar"};"#,
            &[
                (Str, "foobar"),
                (Semicolon, ";"),
                (Str, "foo bar"),
                (Semicolon, ";"),
                (LeftBracket, "["),
                (Int, "1"),
                (Comma, ","),
                (Int, "2"),
                (RightBracket, "]"),
                (Semicolon, ";"),
                (LeftBrace, "{"),
                (Str, "foo"),
                (Colon, ":"),
                (Str, "bar"),
                (RightBrace, "}"),
                (Semicolon, ";"),
            ],
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_tokens(
            "# a full line comment\nlet a = 1; $ trailing comment\nlet b = 2;",
            &[
                (Let, "let"),
                (Ident, "a"),
                (Assign, "="),
                (Int, "1"),
                (Semicolon, ";"),
                (Let, "let"),
                (Ident, "b"),
                (Assign, "="),
                (Int, "2"),
                (Semicolon, ";"),
            ],
        );
    }

    #[test]
    fn float_literals() {
        assert_tokens(
            "123.45; 0.678; 9.0;",
            &[
                (Float, "123.45"),
                (Semicolon, ";"),
                (Float, "0.678"),
                (Semicolon, ";"),
                (Float, "9.0"),
                (Semicolon, ";"),
            ],
        );
    }

    #[test]
    fn illegal_bytes() {
        assert_tokens("@", &[(Illegal, "@")]);
        assert_tokens("&", &[(Illegal, "&")]);
        assert_tokens("|", &[(Illegal, "|")]);
    }

    #[test]
    fn unterminated_string_is_illegal() {
        let mut lexer = Lexer::new(r#""never closed"#);
        let tok = lexer.next_token();
        assert_eq!(tok.kind, Illegal);
        assert_eq!(tok.literal, "never closed");
        assert_eq!(lexer.next_token().kind, Eof);
    }

    #[test]
    fn eof_is_idempotent() {
        let mut lexer = Lexer::new("1");
        assert_eq!(lexer.next_token().kind, Int);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, Eof);
        }
    }
}
