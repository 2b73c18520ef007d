//! Lexer (spec.md §4.1).
//!
//! Scans source text into a token stream. Exposes `next`/`peek` with a
//! single token of non-destructive lookahead, the way the teacher's own
//! `LineLexer` exposes a byte-indexed cursor over the raw `&str`
//! (`src/lexer.rs`).

use crate::token::{Position, Token, TokenType};

pub struct Lexer<'a> {
    source: &'a str,
    byte_pos: usize,
    line: usize,
    column: usize,
    lookahead: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            byte_pos: 0,
            line: 1,
            column: 1,
            lookahead: None,
        }
    }

    /// Current source position (of the next character to be consumed).
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Token {
        if let Some(tok) = self.lookahead.take() {
            return tok;
        }
        self.scan_token()
    }

    /// Non-destructive one-token lookahead.
    pub fn peek(&mut self) -> Token {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scan_token());
        }
        self.lookahead.clone().unwrap()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.byte_pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.byte_pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c == ' ' || c == '\t' || c == '\r' || c == '\n' => {
                    self.advance();
                }
                Some('/') if self.peek_char_at(1) == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let pos = self.position();

        let c = match self.peek_char() {
            None => return Token::eof(pos),
            Some(c) => c,
        };

        if c == '-' && self.peek_char_at(1).is_some_and(|d| d.is_ascii_digit()) {
            self.advance(); // '-'
            let n = self.scan_digits();
            return Token::new(TokenType::Integer(-n), pos);
        }

        if c.is_ascii_digit() {
            let n = self.scan_digits();
            return Token::new(TokenType::Integer(n), pos);
        }

        if c == '`' {
            return self.scan_string(pos);
        }

        if is_ident_start(c) {
            return self.scan_identifier(pos);
        }

        self.scan_symbol(pos)
    }

    fn scan_digits(&mut self) -> i64 {
        let mut buf = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                buf.push(c);
                self.advance();
            } else {
                break;
            }
        }
        buf.parse().unwrap_or(0)
    }

    fn scan_identifier(&mut self, pos: Position) -> Token {
        let mut buf = String::new();
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                buf.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenType::from_word(&buf), pos)
    }

    fn scan_string(&mut self, pos: Position) -> Token {
        self.advance(); // opening '`'
        let mut buf = String::new();
        loop {
            match self.peek_char() {
                None => break, // unterminated string, tolerated
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        None => break,
                        Some('n') => {
                            buf.push('\n');
                            self.advance();
                        }
                        Some('r') => {
                            buf.push('\r');
                            self.advance();
                        }
                        Some('t') => {
                            buf.push('\t');
                            self.advance();
                        }
                        Some(other) => {
                            buf.push(other);
                            self.advance();
                        }
                    }
                }
                Some(other) => {
                    buf.push(other);
                    self.advance();
                }
            }
        }
        Token::new(TokenType::String(buf), pos)
    }

    fn scan_symbol(&mut self, pos: Position) -> Token {
        const TWO_CHAR: &[&str] = &[
            "&&", "||", "==", "=>", "!=", ">>", ">=", "<<", "<=", "|>", "->",
        ];
        let first = self.advance().unwrap();
        if let Some(second) = self.peek_char() {
            let pair: String = [first, second].iter().collect();
            if TWO_CHAR.contains(&pair.as_str()) {
                self.advance();
                return Token::new(TokenType::Symbol(pair), pos);
            }
        }
        Token::new(TokenType::Symbol(first.to_string()), pos)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenType> {
        let mut lx = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let t = lx.next();
            let eof = t.kind.is_eof();
            out.push(t.kind);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        let ks = kinds("let fn if return foo");
        assert_eq!(
            ks,
            vec![
                TokenType::Keyword(crate::token::Keyword::Let),
                TokenType::Keyword(crate::token::Keyword::Fn),
                TokenType::Keyword(crate::token::Keyword::If),
                TokenType::Keyword(crate::token::Keyword::Return),
                TokenType::Identifier("foo".into()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn scans_negative_integer_only_when_adjacent_to_digit() {
        assert_eq!(kinds("-5")[0], TokenType::Integer(-5));
        let ks = kinds("a - 5");
        assert_eq!(ks[1], TokenType::Symbol("-".into()));
    }

    #[test]
    fn scans_two_char_symbols_greedily() {
        let ks = kinds("a |> b");
        assert_eq!(ks[1], TokenType::Symbol("|>".into()));
    }

    #[test]
    fn scans_string_with_escapes() {
        let ks = kinds(r"`hello\nworld'");
        assert_eq!(ks[0], TokenType::String("hello\nworld".into()));
    }

    #[test]
    fn tolerates_unterminated_string() {
        let ks = kinds("`hello");
        assert_eq!(ks[0], TokenType::String("hello".into()));
    }

    #[test]
    fn skips_line_comments() {
        let ks = kinds("a // comment\nb");
        assert_eq!(
            ks,
            vec![
                TokenType::Identifier("a".into()),
                TokenType::Identifier("b".into()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn peek_is_non_destructive() {
        let mut lx = Lexer::new("a b");
        let p1 = lx.peek();
        let p2 = lx.peek();
        assert_eq!(p1, p2);
        let n1 = lx.next();
        assert_eq!(n1, p1);
        let n2 = lx.next();
        assert_eq!(n2.kind, TokenType::Identifier("b".into()));
    }
}
