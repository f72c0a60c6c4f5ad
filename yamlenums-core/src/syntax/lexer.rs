//! Go source lexer.
//!
//! Pull-based: the parser asks for one token at a time. Implements Go's
//! automatic semicolon insertion, so a newline after an identifier, literal,
//! closing bracket or `return`-like keyword yields a `Semicolon` token.

use std::fmt;

use super::token::{Keyword, Pos, Punct, Token, TokenKind};

/// Errors that can occur while lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub pos: Pos,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.pos)
    }
}

impl std::error::Error for LexError {}

pub type LexResult<T> = Result<T, LexError>;

/// Operators, longest spelling first so prefix matching picks the right one.
const PUNCTS: &[(&str, Punct)] = &[
    ("<<=", Punct::OpAssign),
    (">>=", Punct::OpAssign),
    ("&^=", Punct::OpAssign),
    ("...", Punct::Ellipsis),
    ("+=", Punct::OpAssign),
    ("-=", Punct::OpAssign),
    ("*=", Punct::OpAssign),
    ("/=", Punct::OpAssign),
    ("%=", Punct::OpAssign),
    ("&=", Punct::OpAssign),
    ("|=", Punct::OpAssign),
    ("^=", Punct::OpAssign),
    ("&^", Punct::AndNot),
    ("<<", Punct::Shl),
    (">>", Punct::Shr),
    ("&&", Punct::LAnd),
    ("||", Punct::LOr),
    ("<-", Punct::Arrow),
    ("++", Punct::Inc),
    ("--", Punct::Dec),
    ("==", Punct::Eql),
    ("!=", Punct::Neq),
    ("<=", Punct::Leq),
    (">=", Punct::Geq),
    (":=", Punct::Define),
    ("(", Punct::LParen),
    (")", Punct::RParen),
    ("[", Punct::LBrack),
    ("]", Punct::RBrack),
    ("{", Punct::LBrace),
    ("}", Punct::RBrace),
    (",", Punct::Comma),
    (".", Punct::Dot),
    (":", Punct::Colon),
    ("=", Punct::Assign),
    ("+", Punct::Add),
    ("-", Punct::Sub),
    ("*", Punct::Mul),
    ("/", Punct::Quo),
    ("%", Punct::Rem),
    ("&", Punct::And),
    ("|", Punct::Or),
    ("^", Punct::Xor),
    ("<", Punct::Lss),
    (">", Punct::Gtr),
    ("!", Punct::Not),
    ("~", Punct::Tilde),
];

/// Pull-based lexer producing tokens from a source string.
pub struct Lexer<'a> {
    source: &'a str,
    cursor: usize,
    line: usize,
    column: usize,
    insert_semi: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Self {
            source,
            cursor: 0,
            line: 1,
            column: 1,
            insert_semi: false,
            finished: false,
        };
        if lexer.peek_char() == Some('\u{feff}') {
            lexer.cursor += '\u{feff}'.len_utf8();
        }
        lexer
    }

    /// Lex the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::with_capacity(self.source.len() / 4);
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Pull the next token from the stream.
    pub fn next_token(&mut self) -> LexResult<Token> {
        if self.finished {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: self.pos(),
            });
        }

        let newline = self.skip_trivia()?;
        if let Some(pos) = newline {
            if self.insert_semi {
                self.insert_semi = false;
                return Ok(Token {
                    kind: TokenKind::Semicolon,
                    pos,
                });
            }
        }

        let pos = self.pos();
        let Some(ch) = self.peek_char() else {
            if self.insert_semi {
                self.insert_semi = false;
                return Ok(Token {
                    kind: TokenKind::Semicolon,
                    pos,
                });
            }
            self.finished = true;
            return Ok(Token {
                kind: TokenKind::Eof,
                pos,
            });
        };

        let kind = if is_letter(ch) {
            self.lex_identifier_or_keyword()
        } else if ch.is_ascii_digit()
            || (ch == '.' && self.peek_next_char().is_some_and(|c| c.is_ascii_digit()))
        {
            self.lex_number()
        } else {
            match ch {
                '"' => self.lex_string(pos)?,
                '`' => self.lex_raw_string(pos)?,
                '\'' => self.lex_rune(pos)?,
                ';' => {
                    self.bump_char();
                    TokenKind::Semicolon
                }
                _ => self.lex_punct(pos)?,
            }
        };

        self.insert_semi = match &kind {
            TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Imag(_)
            | TokenKind::Rune(_)
            | TokenKind::Str(_) => true,
            TokenKind::Keyword(kw) => kw.ends_statement(),
            TokenKind::Punct(p) => matches!(
                p,
                Punct::RParen | Punct::RBrack | Punct::RBrace | Punct::Inc | Punct::Dec
            ),
            TokenKind::Semicolon | TokenKind::Eof => false,
        };

        Ok(Token { kind, pos })
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, message: impl Into<String>, pos: Pos) -> LexError {
        LexError {
            message: message.into(),
            pos,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut chars = self.source[self.cursor..].chars();
        chars.next();
        chars.next()
    }

    fn bump_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.cursor += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.bump_char();
        }
    }

    /// Consume whitespace and comments. Returns the position of the first
    /// line break crossed, if any.
    fn skip_trivia(&mut self) -> LexResult<Option<Pos>> {
        let mut newline = None;
        loop {
            match self.peek_char() {
                Some('\n') => {
                    newline.get_or_insert(self.pos());
                    self.bump_char();
                }
                Some(ch) if ch.is_whitespace() => {
                    self.bump_char();
                }
                Some('/') if self.peek_next_char() == Some('/') => {
                    self.bump_while(|c| c != '\n');
                }
                Some('/') if self.peek_next_char() == Some('*') => {
                    let start = self.pos();
                    self.bump_char();
                    self.bump_char();
                    if self.skip_block_comment(start)? {
                        newline.get_or_insert(start);
                    }
                }
                _ => return Ok(newline),
            }
        }
    }

    /// Returns whether the comment spanned a line break.
    fn skip_block_comment(&mut self, start: Pos) -> LexResult<bool> {
        let mut multiline = false;
        while let Some(ch) = self.bump_char() {
            if ch == '\n' {
                multiline = true;
            } else if ch == '*' && self.peek_char() == Some('/') {
                self.bump_char();
                return Ok(multiline);
            }
        }
        Err(self.error("comment not terminated", start))
    }

    fn lex_identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.cursor;
        self.bump_while(|c| is_letter(c) || c.is_numeric());
        let ident = &self.source[start..self.cursor];
        match Keyword::from_ident(ident) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(ident.to_string()),
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.cursor;
        let mut is_float = false;
        let prefix = self.peek_next_char().filter(|_| self.peek_char() == Some('0'));

        match prefix {
            Some('x' | 'X') => {
                self.bump_char();
                self.bump_char();
                self.bump_while(|c| c.is_ascii_hexdigit() || c == '_');
                if self.peek_char() == Some('.') {
                    is_float = true;
                    self.bump_char();
                    self.bump_while(|c| c.is_ascii_hexdigit() || c == '_');
                }
                if matches!(self.peek_char(), Some('p' | 'P')) {
                    is_float = true;
                    self.lex_exponent();
                }
            }
            Some('b' | 'B' | 'o' | 'O') => {
                self.bump_char();
                self.bump_char();
                self.bump_while(|c| c.is_ascii_digit() || c == '_');
            }
            _ => {
                self.bump_while(|c| c.is_ascii_digit() || c == '_');
                if self.peek_char() == Some('.') {
                    is_float = true;
                    self.bump_char();
                    self.bump_while(|c| c.is_ascii_digit() || c == '_');
                }
                if matches!(self.peek_char(), Some('e' | 'E')) {
                    is_float = true;
                    self.lex_exponent();
                }
            }
        }

        let imaginary = self.peek_char() == Some('i');
        if imaginary {
            self.bump_char();
        }

        let text = self.source[start..self.cursor].to_string();
        if imaginary {
            TokenKind::Imag(text)
        } else if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        }
    }

    fn lex_exponent(&mut self) {
        self.bump_char();
        if matches!(self.peek_char(), Some('+' | '-')) {
            self.bump_char();
        }
        self.bump_while(|c| c.is_ascii_digit() || c == '_');
    }

    fn lex_string(&mut self, start: Pos) -> LexResult<TokenKind> {
        self.bump_char();
        let body_start = self.cursor;
        loop {
            match self.peek_char() {
                None | Some('\n') => return Err(self.error("string literal not terminated", start)),
                Some('\\') => {
                    self.bump_char();
                    if self.bump_char().is_none() {
                        return Err(self.error("string literal not terminated", start));
                    }
                }
                Some('"') => {
                    let body = self.source[body_start..self.cursor].to_string();
                    self.bump_char();
                    return Ok(TokenKind::Str(body));
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
    }

    fn lex_raw_string(&mut self, start: Pos) -> LexResult<TokenKind> {
        self.bump_char();
        let body_start = self.cursor;
        self.bump_while(|c| c != '`');
        if self.peek_char().is_none() {
            return Err(self.error("raw string literal not terminated", start));
        }
        let body = self.source[body_start..self.cursor].to_string();
        self.bump_char();
        Ok(TokenKind::Str(body))
    }

    fn lex_rune(&mut self, start: Pos) -> LexResult<TokenKind> {
        self.bump_char();
        let value = match self.bump_char() {
            None | Some('\n') => return Err(self.error("rune literal not terminated", start)),
            Some('\'') => return Err(self.error("empty rune literal or unescaped ' in rune literal", start)),
            Some('\\') => self.lex_escape(start)?,
            Some(ch) => ch as u32,
        };
        if self.bump_char() != Some('\'') {
            return Err(self.error("rune literal not terminated", start));
        }
        Ok(TokenKind::Rune(value))
    }

    /// Decode the escape sequence following a backslash.
    fn lex_escape(&mut self, start: Pos) -> LexResult<u32> {
        let simple = |c: char| -> Option<u32> {
            Some(match c {
                'a' => 0x07,
                'b' => 0x08,
                'f' => 0x0C,
                'n' => 0x0A,
                'r' => 0x0D,
                't' => 0x09,
                'v' => 0x0B,
                '\\' => 0x5C,
                '\'' => 0x27,
                '"' => 0x22,
                _ => return None,
            })
        };

        let Some(ch) = self.bump_char() else {
            return Err(self.error("escape sequence not terminated", start));
        };
        if let Some(v) = simple(ch) {
            return Ok(v);
        }
        let (digits, radix, first) = match ch {
            '0'..='7' => (2, 8, Some(ch)),
            'x' => (2, 16, None),
            'u' => (4, 16, None),
            'U' => (8, 16, None),
            _ => return Err(self.error(format!("unknown escape sequence \\{}", ch), start)),
        };
        let mut text: String = first.into_iter().collect();
        for _ in 0..digits {
            match self.bump_char() {
                Some(c) if c.is_digit(radix) => text.push(c),
                _ => return Err(self.error("illegal character in escape sequence", start)),
            }
        }
        let value = u32::from_str_radix(&text, radix)
            .map_err(|_| self.error("invalid escape sequence", start))?;
        if value > 0x10FFFF || (0xD800..0xE000).contains(&value) {
            return Err(self.error("escape sequence is invalid Unicode code point", start));
        }
        Ok(value)
    }

    fn lex_punct(&mut self, pos: Pos) -> LexResult<TokenKind> {
        let rest = &self.source[self.cursor..];
        let Some(&(text, punct)) = PUNCTS.iter().find(|(text, _)| rest.starts_with(text)) else {
            let ch = self.peek_char().unwrap_or_default();
            return Err(self.error(format!("invalid character {:?}", ch), pos));
        };
        for _ in 0..text.len() {
            self.bump_char();
        }
        Ok(TokenKind::Punct(punct))
    }
}

fn is_letter(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

/// Parse the text of a Go integer literal (`0x1F`, `0o17`, `017`, `0b101`,
/// `1_000`). Returns `None` for malformed or out-of-range text.
pub fn parse_int_literal(text: &str) -> Option<u128> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() {
        return None;
    }
    u128::from_str_radix(digits, radix).ok()
}
