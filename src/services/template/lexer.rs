//! Lexer for Go `text/template` source.
//!
//! Produces tokens lazily so that the parser reports the first problem in
//! source order, whether it is a lexical or a grammatical one.
//!
//! # Actions
//!
//! Text outside `{{ }}` is emitted as a single [`TokenKind::Text`] token.
//! Inside an action the lexer emits spaces, punctuation, literals, fields,
//! variables, identifiers and keywords. Comments (`{{/* ... */}}`) are
//! skipped entirely. Trim markers (`{{- ` and ` -}}`) are recognised and
//! swallowed as part of their delimiter.

use std::fmt;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const LEFT_COMMENT: &str = "/*";
const RIGHT_COMMENT: &str = "*/";
/// Length of `"- "` / `" -"`
const TRIM_MARKER_LEN: usize = 2;

const DECIMAL_DIGITS: &str = "0123456789_";
const HEX_DIGITS: &str = "0123456789abcdefABCDEF_";
const OCTAL_DIGITS: &str = "01234567_";
const BINARY_DIGITS: &str = "01_";

/// Control keywords recognised inside actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Block,
    Break,
    Continue,
    Define,
    Else,
    End,
    If,
    Range,
    Template,
    With,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "block" => Some(Self::Block),
            "break" => Some(Self::Break),
            "continue" => Some(Self::Continue),
            "define" => Some(Self::Define),
            "else" => Some(Self::Else),
            "end" => Some(Self::End),
            "if" => Some(Self::If),
            "range" => Some(Self::Range),
            "template" => Some(Self::Template),
            "with" => Some(Self::With),
            _ => None,
        }
    }
}

/// Token types for template source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Lexical error; the token text holds the message
    Error,
    Eof,
    /// Plain text outside actions
    Text,
    LeftDelim,
    RightDelim,
    /// Run of spaces inside an action
    Space,
    /// `:=`
    Declare,
    /// `=`
    Assign,
    Pipe,
    LeftParen,
    RightParen,
    /// Any other printable ASCII character, e.g. `,`
    Punct,
    Bool,
    CharConstant,
    Number,
    /// Complex constant such as `1+2i`
    Complex,
    String,
    RawString,
    /// `$` or `$name`
    Variable,
    /// `.Name`
    Field,
    /// Bare `.`
    Dot,
    Nil,
    Identifier,
    Keyword(Keyword),
}

/// A token with the line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("EOF"),
            TokenKind::Error => f.write_str(&self.text),
            TokenKind::Keyword(_) | TokenKind::Dot | TokenKind::Nil => {
                write!(f, "<{}>", self.text)
            }
            _ if self.text.chars().count() > 10 => {
                let head: String = self.text.chars().take(10).collect();
                write!(f, "{head:?}...")
            }
            _ => write!(f, "{:?}", self.text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Action,
    Done,
}

/// Lazy tokenizer over template source
pub struct Lexer<'a> {
    input: &'a str,
    /// Start of the token being scanned
    start: usize,
    pos: usize,
    start_line: usize,
    line: usize,
    paren_depth: usize,
    state: State,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            start: 0,
            pos: 0,
            start_line: 1,
            line: 1,
            paren_depth: 0,
            state: State::Text,
        }
    }

    /// Scan the next token. After an error or end of input only
    /// [`TokenKind::Eof`] is returned.
    pub fn next_token(&mut self) -> Token {
        match self.state {
            State::Text => self.lex_text(),
            State::Action => self.lex_inside_action(),
            State::Done => Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line: self.line,
            },
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Step back over the last consumed character
    fn backup(&mut self) {
        if let Some(c) = self.input[..self.pos].chars().next_back() {
            self.pos -= c.len_utf8();
            if c == '\n' {
                self.line -= 1;
            }
        }
    }

    fn advance(&mut self, bytes: usize) {
        let skipped = &self.input[self.pos..self.pos + bytes];
        self.line += skipped.matches('\n').count();
        self.pos += bytes;
    }

    fn accept(&mut self, valid: &str) -> bool {
        match self.peek_char() {
            Some(c) if valid.contains(c) => {
                self.next_char();
                true
            }
            _ => false,
        }
    }

    fn accept_run(&mut self, valid: &str) {
        while self.accept(valid) {}
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        let token = Token {
            kind,
            text: self.input[self.start..self.pos].to_string(),
            line: self.start_line,
        };
        self.ignore();
        token
    }

    fn ignore(&mut self) {
        self.start = self.pos;
        self.start_line = self.line;
    }

    fn error(&mut self, message: impl Into<String>) -> Token {
        self.state = State::Done;
        Token {
            kind: TokenKind::Error,
            text: message.into(),
            line: self.start_line,
        }
    }

    fn lex_text(&mut self) -> Token {
        loop {
            let rest = self.rest();
            match rest.find(LEFT_DELIM) {
                Some(0) => {
                    if let Some(token) = self.lex_left_delim() {
                        return token;
                    }
                }
                Some(offset) => {
                    self.advance(offset);
                    return self.emit(TokenKind::Text);
                }
                None if rest.is_empty() => {
                    self.state = State::Done;
                    return self.emit(TokenKind::Eof);
                }
                None => {
                    self.advance(rest.len());
                    return self.emit(TokenKind::Text);
                }
            }
        }
    }

    /// Returns `None` when the delimiter opened a comment that was skipped.
    fn lex_left_delim(&mut self) -> Option<Token> {
        self.advance(LEFT_DELIM.len());
        let after_marker = if has_left_trim_marker(self.rest()) {
            TRIM_MARKER_LEN
        } else {
            0
        };
        if self.rest()[after_marker..].starts_with(LEFT_COMMENT) {
            self.advance(after_marker);
            self.ignore();
            return self.lex_comment();
        }
        let token = self.emit(TokenKind::LeftDelim);
        self.advance(after_marker);
        self.ignore();
        self.paren_depth = 0;
        self.state = State::Action;
        Some(token)
    }

    fn lex_comment(&mut self) -> Option<Token> {
        self.advance(LEFT_COMMENT.len());
        let Some(end) = self.rest().find(RIGHT_COMMENT) else {
            return Some(self.error("unclosed comment"));
        };
        self.advance(end + RIGHT_COMMENT.len());
        let (delim, trim) = self.at_right_delim();
        if !delim {
            return Some(self.error("comment ends before closing delimiter"));
        }
        let marker = if trim { TRIM_MARKER_LEN } else { 0 };
        self.advance(marker + RIGHT_DELIM.len());
        self.ignore();
        None
    }

    /// Whether the input is at a right delimiter, and whether it carries a
    /// trim marker.
    fn at_right_delim(&self) -> (bool, bool) {
        let rest = self.rest();
        if has_right_trim_marker(rest) && rest[TRIM_MARKER_LEN..].starts_with(RIGHT_DELIM) {
            return (true, true);
        }
        (rest.starts_with(RIGHT_DELIM), false)
    }

    fn lex_right_delim(&mut self, trim: bool) -> Token {
        if trim {
            self.advance(TRIM_MARKER_LEN);
            self.ignore();
        }
        self.advance(RIGHT_DELIM.len());
        self.state = State::Text;
        self.emit(TokenKind::RightDelim)
    }

    fn lex_inside_action(&mut self) -> Token {
        loop {
            let (delim, trim) = self.at_right_delim();
            if delim {
                if self.paren_depth == 0 {
                    return self.lex_right_delim(trim);
                }
                return self.error("unclosed left paren");
            }

            let Some(c) = self.next_char() else {
                return self.error("unclosed action");
            };
            match c {
                c if is_space(c) => {
                    self.backup();
                    if let Some(token) = self.lex_space() {
                        return token;
                    }
                }
                '=' => return self.emit(TokenKind::Assign),
                ':' => {
                    if self.next_char() != Some('=') {
                        return self.error("expected :=");
                    }
                    return self.emit(TokenKind::Declare);
                }
                '|' => return self.emit(TokenKind::Pipe),
                '"' => return self.lex_quote(),
                '`' => return self.lex_raw_quote(),
                '$' => return self.lex_field_or_variable(TokenKind::Variable),
                '\'' => return self.lex_char(),
                '.' if self.peek_char().is_some_and(|n| !n.is_ascii_digit()) => {
                    return self.lex_field_or_variable(TokenKind::Field);
                }
                '.' | '+' | '-' | '0'..='9' => {
                    self.backup();
                    return self.lex_number();
                }
                c if is_alphanumeric(c) => {
                    self.backup();
                    return self.lex_identifier();
                }
                '(' => {
                    self.paren_depth += 1;
                    return self.emit(TokenKind::LeftParen);
                }
                ')' => {
                    if self.paren_depth == 0 {
                        return self.error("unexpected right paren");
                    }
                    self.paren_depth -= 1;
                    return self.emit(TokenKind::RightParen);
                }
                c if c.is_ascii_graphic() => return self.emit(TokenKind::Punct),
                c => {
                    return self.error(format!(
                        "unrecognized character in action: {}",
                        describe_char(c)
                    ));
                }
            }
        }
    }

    /// Returns `None` when the only space belongs to a ` -}}` trim marker.
    fn lex_space(&mut self) -> Option<Token> {
        let mut count = 0;
        while self.peek_char().is_some_and(is_space) {
            self.next_char();
            count += 1;
        }
        let tail = &self.input[self.pos - 1..];
        if has_right_trim_marker(tail) && tail[TRIM_MARKER_LEN..].starts_with(RIGHT_DELIM) {
            self.backup();
            if count == 1 {
                return None;
            }
        }
        Some(self.emit(TokenKind::Space))
    }

    fn lex_quote(&mut self) -> Token {
        loop {
            match self.next_char() {
                Some('\\') => {
                    if matches!(self.next_char(), None | Some('\n')) {
                        return self.error("unterminated quoted string");
                    }
                }
                None | Some('\n') => return self.error("unterminated quoted string"),
                Some('"') => return self.emit(TokenKind::String),
                Some(_) => {}
            }
        }
    }

    fn lex_raw_quote(&mut self) -> Token {
        loop {
            match self.next_char() {
                None => return self.error("unterminated raw quoted string"),
                Some('`') => return self.emit(TokenKind::RawString),
                Some(_) => {}
            }
        }
    }

    fn lex_char(&mut self) -> Token {
        loop {
            match self.next_char() {
                Some('\\') => {
                    if matches!(self.next_char(), None | Some('\n')) {
                        return self.error("unterminated character constant");
                    }
                }
                None | Some('\n') => return self.error("unterminated character constant"),
                Some('\'') => return self.emit(TokenKind::CharConstant),
                Some(_) => {}
            }
        }
    }

    /// Scan `$name` / `.Name`; the leading `$` or `.` is already consumed.
    fn lex_field_or_variable(&mut self, kind: TokenKind) -> Token {
        if self.at_terminator() {
            let kind = if kind == TokenKind::Variable {
                TokenKind::Variable
            } else {
                TokenKind::Dot
            };
            return self.emit(kind);
        }
        while self.peek_char().is_some_and(is_alphanumeric) {
            self.next_char();
        }
        if !self.at_terminator() {
            return self.bad_character();
        }
        self.emit(kind)
    }

    fn lex_identifier(&mut self) -> Token {
        while self.peek_char().is_some_and(is_alphanumeric) {
            self.next_char();
        }
        if !self.at_terminator() {
            return self.bad_character();
        }
        let kind = match &self.input[self.start..self.pos] {
            "true" | "false" => TokenKind::Bool,
            "nil" => TokenKind::Nil,
            word => Keyword::from_word(word).map_or(TokenKind::Identifier, TokenKind::Keyword),
        };
        self.emit(kind)
    }

    fn bad_character(&mut self) -> Token {
        let c = self.peek_char().unwrap_or_default();
        self.error(format!("bad character {}", describe_char(c)))
    }

    fn lex_number(&mut self) -> Token {
        if !self.scan_number() {
            return self.bad_number();
        }
        if matches!(self.peek_char(), Some('+' | '-')) {
            if !self.scan_number() || !self.input[self.start..self.pos].ends_with('i') {
                return self.bad_number();
            }
            return self.emit(TokenKind::Complex);
        }
        self.emit(TokenKind::Number)
    }

    fn bad_number(&mut self) -> Token {
        let text = self.input[self.start..self.pos].to_string();
        self.error(format!("bad number syntax: {text:?}"))
    }

    fn scan_number(&mut self) -> bool {
        self.accept("+-");
        let mut digits = DECIMAL_DIGITS;
        if self.accept("0") {
            if self.accept("xX") {
                digits = HEX_DIGITS;
            } else if self.accept("oO") {
                digits = OCTAL_DIGITS;
            } else if self.accept("bB") {
                digits = BINARY_DIGITS;
            }
        }
        self.accept_run(digits);
        if self.accept(".") {
            self.accept_run(digits);
        }
        if digits == DECIMAL_DIGITS && self.accept("eE") {
            self.accept("+-");
            self.accept_run(DECIMAL_DIGITS);
        }
        if digits == HEX_DIGITS && self.accept("pP") {
            self.accept("+-");
            self.accept_run(DECIMAL_DIGITS);
        }
        self.accept("i");
        if self.peek_char().is_some_and(is_alphanumeric) {
            self.next_char();
            return false;
        }
        true
    }

    /// Whether the next character can legally follow an identifier or field
    fn at_terminator(&self) -> bool {
        match self.peek_char() {
            None => true,
            Some(c) if is_space(c) => true,
            Some('.' | ',' | '|' | ':' | ')' | '(') => true,
            Some(_) => self.rest().starts_with(RIGHT_DELIM),
        }
    }
}

const fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_alphanumeric(c: char) -> bool {
    c == '_' || c.is_alphabetic() || c.is_numeric()
}

fn has_left_trim_marker(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= TRIM_MARKER_LEN && bytes[0] == b'-' && is_space(char::from(bytes[1]))
}

fn has_right_trim_marker(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= TRIM_MARKER_LEN && is_space(char::from(bytes[0])) && bytes[1] == b'-'
}

/// `U+0040 '@'`, or just `U+0007` when the character does not print.
fn describe_char(c: char) -> String {
    let code = u32::from(c);
    if is_printable(c) {
        format!("U+{code:04X} '{c}'")
    } else {
        format!("U+{code:04X}")
    }
}

/// Graphic characters plus the ASCII space. Controls, other spaces and
/// the common invisible format characters do not print.
fn is_printable(c: char) -> bool {
    let invisible = matches!(
        c,
        '\u{ad}' | '\u{200b}'..='\u{200f}' | '\u{2060}'..='\u{2064}' | '\u{feff}'
    );
    c == ' ' || !(c.is_control() || c.is_whitespace() || invisible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            let kind = token.kind;
            out.push(kind);
            if matches!(kind, TokenKind::Eof | TokenKind::Error) {
                return out;
            }
        }
    }

    fn first_error(source: &str) -> String {
        let mut lexer = Lexer::new(source);
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Error => return token.text,
                TokenKind::Eof => panic!("no error lexing {source:?}"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_text_only() {
        assert_eq!(kinds("hello"), vec![TokenKind::Text, TokenKind::Eof]);
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_field_chain() {
        assert_eq!(
            kinds(r#"{"m": "{{.Request.Method}}"}"#),
            vec![
                TokenKind::Text,
                TokenKind::LeftDelim,
                TokenKind::Field,
                TokenKind::Field,
                TokenKind::RightDelim,
                TokenKind::Text,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_literals() {
        assert_eq!(
            kinds(r#"{{if eq $x "a" 1.5 'c' true nil}}"#),
            vec![
                TokenKind::LeftDelim,
                TokenKind::Keyword(Keyword::If),
                TokenKind::Space,
                TokenKind::Identifier,
                TokenKind::Space,
                TokenKind::Variable,
                TokenKind::Space,
                TokenKind::String,
                TokenKind::Space,
                TokenKind::Number,
                TokenKind::Space,
                TokenKind::CharConstant,
                TokenKind::Space,
                TokenKind::Bool,
                TokenKind::Space,
                TokenKind::Nil,
                TokenKind::RightDelim,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_trim_markers() {
        assert_eq!(
            kinds("a {{- .X -}} b"),
            vec![
                TokenKind::Text,
                TokenKind::LeftDelim,
                TokenKind::Field,
                TokenKind::RightDelim,
                TokenKind::Text,
                TokenKind::Eof,
            ]
        );
        // Without a following space the dash is a sign.
        assert_eq!(
            kinds("{{-3}}"),
            vec![
                TokenKind::LeftDelim,
                TokenKind::Number,
                TokenKind::RightDelim,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("a{{/* note */}}b{{- /* trimmed */ -}}c"),
            vec![TokenKind::Text, TokenKind::Text, TokenKind::Text, TokenKind::Eof]
        );
    }

    #[test]
    fn test_lex_errors() {
        assert_eq!(first_error("{{ .X "), "unclosed action");
        assert_eq!(first_error("{{/* open"), "unclosed comment");
        assert_eq!(
            first_error("{{/* c */ .X}}"),
            "comment ends before closing delimiter"
        );
        assert_eq!(first_error(r#"{{ "abc }}"#), "unterminated quoted string");
        assert_eq!(first_error("{{ `abc }}"), "unterminated raw quoted string");
        assert_eq!(first_error("{{ 'a }}"), "unterminated character constant");
        assert_eq!(first_error("{{ 3k }}"), r#"bad number syntax: "3k""#);
        assert_eq!(first_error("{{ (.X }}"), "unclosed left paren");
        assert_eq!(first_error("{{ .X) }}"), "unexpected right paren");
        assert_eq!(first_error("{{ $x : 1 }}"), "expected :=");
        assert_eq!(
            first_error("{{ \u{7} }}"),
            "unrecognized character in action: U+0007"
        );
        assert_eq!(
            first_error("{{ \u{a0} }}"),
            "unrecognized character in action: U+00A0"
        );
    }

    #[test]
    fn test_describe_char() {
        assert_eq!(describe_char('@'), "U+0040 '@'");
        assert_eq!(describe_char('é'), "U+00E9 'é'");
        assert_eq!(describe_char('\u{1b}'), "U+001B");
        assert_eq!(describe_char('\u{feff}'), "U+FEFF");
    }

    #[test]
    fn test_token_lines() {
        let mut lexer = Lexer::new("one\ntwo {{\n.X}}");
        assert_eq!(lexer.next_token().line, 1);
        let delim = lexer.next_token();
        assert_eq!(delim.kind, TokenKind::LeftDelim);
        assert_eq!(delim.line, 2);
        assert_eq!(lexer.next_token().kind, TokenKind::Space);
        let field = lexer.next_token();
        assert_eq!(field.kind, TokenKind::Field);
        assert_eq!(field.line, 3);
    }

    #[test]
    fn test_token_display() {
        let token = Token {
            kind: TokenKind::Keyword(Keyword::End),
            text: "end".to_string(),
            line: 1,
        };
        assert_eq!(token.to_string(), "<end>");
        let long = Token {
            kind: TokenKind::String,
            text: "\"abcdefghijkl\"".to_string(),
            line: 1,
        };
        assert_eq!(long.to_string(), r#""\"abcdefghi"..."#);
    }
}
