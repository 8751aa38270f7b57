//! Recursive-descent syntax checker for Go `text/template`.
//!
//! Walks the grammar without building a tree: it only needs to know whether
//! the source would parse. Besides grammar it enforces the checks the Go
//! parser makes eagerly: functions must be defined, variables must be
//! declared in scope, `{{break}}`/`{{continue}}` must sit inside `range`,
//! and a template name may only be given a non-empty body once.

use std::collections::HashMap;

use super::lexer::{Keyword, Lexer, Token, TokenKind};
use super::TemplateError;
use super::BUILTIN_FUNCTIONS;

type ParseResult<T> = Result<T, TemplateError>;

const END_NODE: &str = "{{end}}";
const ELSE_NODE: &str = "{{else}}";
const RANGE_NODE: &str = "{{range}}";

/// What `text_or_action` produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item {
    /// An ordinary node; `empty` for whitespace-only text
    Node { empty: bool },
    End,
    Else,
}

const NON_EMPTY: Item = Item::Node { empty: false };

/// Kind of the leading operand of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Bool,
    Chain,
    Dot,
    Field,
    Identifier,
    Nil,
    Number,
    Pipeline,
    String,
    Variable,
}

impl Operand {
    /// Only the first stage of a pipeline may start with a constant.
    const fn is_executable(self) -> bool {
        !matches!(
            self,
            Self::Bool | Self::Dot | Self::Nil | Self::Number | Self::String
        )
    }
}

pub(super) struct Parser<'a> {
    name: &'a str,
    lexer: Lexer<'a>,
    /// Pushed-back tokens; the last one is returned next
    lookahead: Vec<Token>,
    line: usize,
    /// Line of the left delimiter of the action being parsed
    action_line: Option<usize>,
    vars: Vec<String>,
    range_depth: usize,
    /// Template name -> whether its body is non-empty
    trees: HashMap<String, bool>,
}

impl<'a> Parser<'a> {
    pub(super) fn new(name: &'a str, source: &'a str) -> Self {
        Self {
            name,
            lexer: Lexer::new(source),
            lookahead: Vec::new(),
            line: 1,
            action_line: None,
            vars: vec!["$".to_string()],
            range_depth: 0,
            trees: HashMap::new(),
        }
    }

    pub(super) fn parse(mut self) -> ParseResult<()> {
        let mut non_empty = false;
        loop {
            let token = self.peek()?;
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::LeftDelim => {
                    let delim = self.next()?;
                    let after = self.next_non_space()?;
                    if after.kind == TokenKind::Keyword(Keyword::Define) {
                        self.parse_definition()?;
                        continue;
                    }
                    self.backup(after);
                    self.backup(delim);
                }
                _ => {}
            }
            match self.text_or_action()? {
                Item::End => return Err(self.error(format!("unexpected {END_NODE}"))),
                Item::Else => return Err(self.error(format!("unexpected {ELSE_NODE}"))),
                Item::Node { empty } => non_empty |= !empty,
            }
        }
        let name = self.name;
        self.add_tree(name, non_empty)
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::new(self.name, self.line, message)
    }

    fn unexpected(&self, token: &Token, context: &str) -> TemplateError {
        self.error(format!("unexpected {token} in {context}"))
    }

    fn next(&mut self) -> ParseResult<Token> {
        let token = match self.lookahead.pop() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
        self.line = token.line;
        if token.kind == TokenKind::Error {
            return Err(self.lex_error(token));
        }
        Ok(token)
    }

    /// A lex error past the line its action opened on names where the
    /// action started.
    fn lex_error(&self, token: Token) -> TemplateError {
        let mut message = token.text;
        if let Some(start) = self.action_line.filter(|&start| start != token.line) {
            let context = if message.ends_with(" action") { "" } else { " in action" };
            message.push_str(&format!("{context} started at {}:{start}", self.name));
        }
        self.error(message)
    }

    fn backup(&mut self, token: Token) {
        self.lookahead.push(token);
    }

    fn peek(&mut self) -> ParseResult<Token> {
        let token = self.next()?;
        self.backup(token.clone());
        Ok(token)
    }

    fn next_non_space(&mut self) -> ParseResult<Token> {
        loop {
            let token = self.next()?;
            if token.kind != TokenKind::Space {
                return Ok(token);
            }
        }
    }

    fn peek_non_space(&mut self) -> ParseResult<Token> {
        let token = self.next_non_space()?;
        self.backup(token.clone());
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> ParseResult<Token> {
        let token = self.next_non_space()?;
        if token.kind != kind {
            return Err(self.unexpected(&token, context));
        }
        Ok(token)
    }

    fn add_tree(&mut self, name: &str, non_empty: bool) -> ParseResult<()> {
        match self.trees.get(name) {
            Some(true) if non_empty => Err(self.error(format!(
                "template: multiple definition of template {name:?}"
            ))),
            Some(true) => Ok(()),
            _ => {
                self.trees.insert(name.to_string(), non_empty);
                Ok(())
            }
        }
    }

    /// Run `body` with the scope of a freshly started template.
    fn in_new_tree<T>(&mut self, body: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let vars = std::mem::replace(&mut self.vars, vec!["$".to_string()]);
        let range_depth = std::mem::take(&mut self.range_depth);
        let result = body(self);
        self.vars = vars;
        self.range_depth = range_depth;
        result
    }

    /// `{{define "name"}} ... {{end}}`; the `define` keyword is consumed.
    fn parse_definition(&mut self) -> ParseResult<()> {
        const CONTEXT: &str = "define clause";
        let token = self.next_non_space()?;
        let name = self.parse_template_name(&token, CONTEXT)?;
        self.expect(TokenKind::RightDelim, CONTEXT)?;
        let non_empty = self.in_new_tree(|p| {
            let (non_empty, end) = p.item_list()?;
            if end != Item::End {
                return Err(p.error(format!("unexpected {ELSE_NODE} in {CONTEXT}")));
            }
            Ok(non_empty)
        })?;
        self.add_tree(&name, non_empty)
    }

    fn parse_template_name(&self, token: &Token, context: &str) -> ParseResult<String> {
        match token.kind {
            TokenKind::String | TokenKind::RawString => {
                unquote(&token.text).ok_or_else(|| self.error("invalid syntax"))
            }
            _ => Err(self.unexpected(token, context)),
        }
    }

    /// Items up to the `{{end}}` or `{{else}}` that closes them.
    fn item_list(&mut self) -> ParseResult<(bool, Item)> {
        let mut non_empty = false;
        loop {
            if self.peek_non_space()?.kind == TokenKind::Eof {
                return Err(self.error("unexpected EOF"));
            }
            match self.text_or_action()? {
                Item::Node { empty } => non_empty |= !empty,
                terminator => return Ok((non_empty, terminator)),
            }
        }
    }

    fn text_or_action(&mut self) -> ParseResult<Item> {
        let token = self.next_non_space()?;
        match token.kind {
            TokenKind::Text => Ok(Item::Node {
                empty: token.text.trim().is_empty(),
            }),
            TokenKind::LeftDelim => {
                self.action_line = Some(token.line);
                let item = self.action();
                self.action_line = None;
                item
            }
            _ => Err(self.unexpected(&token, "input")),
        }
    }

    /// Left delimiter is consumed.
    fn action(&mut self) -> ParseResult<Item> {
        let token = self.next_non_space()?;
        match token.kind {
            TokenKind::Keyword(Keyword::Block) => return self.block_control(),
            TokenKind::Keyword(Keyword::Break) => return self.loop_control("{{break}}"),
            TokenKind::Keyword(Keyword::Continue) => return self.loop_control("{{continue}}"),
            TokenKind::Keyword(Keyword::Else) => return self.else_control(),
            TokenKind::Keyword(Keyword::End) => return self.end_control(),
            TokenKind::Keyword(Keyword::If) => return self.parse_control("if"),
            TokenKind::Keyword(Keyword::Range) => return self.parse_control("range"),
            TokenKind::Keyword(Keyword::Template) => return self.template_control(),
            TokenKind::Keyword(Keyword::With) => return self.parse_control("with"),
            _ => {}
        }
        self.backup(token);
        self.pipeline("command", TokenKind::RightDelim)?;
        Ok(NON_EMPTY)
    }

    fn loop_control(&mut self, name: &str) -> ParseResult<Item> {
        let token = self.next_non_space()?;
        if token.kind != TokenKind::RightDelim {
            return Err(self.unexpected(&token, name));
        }
        if self.range_depth == 0 {
            return Err(self.error(format!("{name} outside {RANGE_NODE}")));
        }
        Ok(NON_EMPTY)
    }

    fn end_control(&mut self) -> ParseResult<Item> {
        self.expect(TokenKind::RightDelim, "end")?;
        Ok(Item::End)
    }

    /// `{{else if ...}}` and `{{else with ...}}` leave the keyword pending
    /// for the enclosing control to pick up.
    fn else_control(&mut self) -> ParseResult<Item> {
        let peek = self.peek_non_space()?;
        if matches!(
            peek.kind,
            TokenKind::Keyword(Keyword::If | Keyword::With)
        ) {
            return Ok(Item::Else);
        }
        self.expect(TokenKind::RightDelim, "else")?;
        Ok(Item::Else)
    }

    /// `if`, `range` and `with`.
    fn parse_control(&mut self, context: &str) -> ParseResult<Item> {
        let scope = self.vars.len();
        self.pipeline(context, TokenKind::RightDelim)?;
        let is_range = context == "range";
        if is_range {
            self.range_depth += 1;
        }
        let (_, next) = self.item_list()?;
        if is_range {
            self.range_depth -= 1;
        }
        if next == Item::Else {
            let chained = match (context, self.peek()?.kind) {
                ("if", TokenKind::Keyword(Keyword::If)) => Some("if"),
                ("with", TokenKind::Keyword(Keyword::With)) => Some("with"),
                _ => None,
            };
            if let Some(chained) = chained {
                // {{else if b}} reads as {{else}}{{if b}}...{{end}}{{end}}
                // with the inner end shared.
                self.next()?;
                self.parse_control(chained)?;
            } else {
                let (_, next) = self.item_list()?;
                if next != Item::End {
                    return Err(self.error(format!("expected end; found {ELSE_NODE}")));
                }
            }
        }
        self.vars.truncate(scope);
        Ok(NON_EMPTY)
    }

    fn template_control(&mut self) -> ParseResult<Item> {
        const CONTEXT: &str = "template clause";
        let token = self.next_non_space()?;
        self.parse_template_name(&token, CONTEXT)?;
        let next = self.next_non_space()?;
        if next.kind != TokenKind::RightDelim {
            self.backup(next);
            self.pipeline(CONTEXT, TokenKind::RightDelim)?;
        }
        Ok(NON_EMPTY)
    }

    fn block_control(&mut self) -> ParseResult<Item> {
        const CONTEXT: &str = "block clause";
        let token = self.next_non_space()?;
        let name = self.parse_template_name(&token, CONTEXT)?;
        self.pipeline(CONTEXT, TokenKind::RightDelim)?;
        let non_empty = self.in_new_tree(|p| {
            let (non_empty, end) = p.item_list()?;
            if end != Item::End {
                return Err(p.error(format!("unexpected {ELSE_NODE} in {CONTEXT}")));
            }
            Ok(non_empty)
        })?;
        self.add_tree(&name, non_empty)?;
        Ok(NON_EMPTY)
    }

    fn pipeline(&mut self, context: &str, end: TokenKind) -> ParseResult<()> {
        let mut declared = 0;
        loop {
            if self.peek_non_space()?.kind != TokenKind::Variable {
                break;
            }
            let variable = self.next()?;
            let after = self.peek()?;
            let next = self.peek_non_space()?;
            match next.kind {
                TokenKind::Assign | TokenKind::Declare => {
                    self.next_non_space()?;
                    self.vars.push(variable.text);
                }
                TokenKind::Punct if next.text == "," => {
                    self.next_non_space()?;
                    self.vars.push(variable.text);
                    declared += 1;
                    if context == "range" && declared < 2 {
                        match self.peek_non_space()?.kind {
                            TokenKind::Variable | TokenKind::RightDelim | TokenKind::RightParen => {
                                continue;
                            }
                            _ => return Err(self.error("range can only initialize variables")),
                        }
                    }
                    return Err(self.error(format!("too many declarations in {context}")));
                }
                _ => {
                    if after.kind == TokenKind::Space {
                        self.backup(after);
                    }
                    self.backup(variable);
                }
            }
            break;
        }

        let mut stages = Vec::new();
        loop {
            let token = self.next_non_space()?;
            if token.kind == end {
                return self.check_pipeline(&stages, context);
            }
            match token.kind {
                TokenKind::Bool
                | TokenKind::CharConstant
                | TokenKind::Complex
                | TokenKind::Dot
                | TokenKind::Field
                | TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::Nil
                | TokenKind::RawString
                | TokenKind::String
                | TokenKind::Variable
                | TokenKind::LeftParen => {
                    self.backup(token);
                    stages.push(self.command()?);
                }
                _ => return Err(self.unexpected(&token, context)),
            }
        }
    }

    fn check_pipeline(&self, stages: &[Operand], context: &str) -> ParseResult<()> {
        if stages.is_empty() {
            return Err(self.error(format!("missing value for {context}")));
        }
        if let Some(index) = stages.iter().skip(1).position(|op| !op.is_executable()) {
            return Err(self.error(format!(
                "non executable command in pipeline stage {}",
                index + 2
            )));
        }
        Ok(())
    }

    /// One pipeline stage; returns the kind of its first operand.
    fn command(&mut self) -> ParseResult<Operand> {
        let mut first = None;
        loop {
            self.peek_non_space()?;
            if let Some(operand) = self.operand()? {
                first.get_or_insert(operand);
            }
            let token = self.next()?;
            match token.kind {
                TokenKind::Space => continue,
                TokenKind::RightDelim | TokenKind::RightParen => self.backup(token),
                TokenKind::Pipe => {}
                _ => return Err(self.unexpected(&token, "operand")),
            }
            break;
        }
        first.ok_or_else(|| self.error("empty command"))
    }

    fn operand(&mut self) -> ParseResult<Option<Operand>> {
        let Some((operand, text)) = self.term()? else {
            return Ok(None);
        };
        if self.peek()?.kind != TokenKind::Field {
            return Ok(Some(operand));
        }
        while self.peek()?.kind == TokenKind::Field {
            self.next()?;
        }
        match operand {
            Operand::Bool | Operand::Dot | Operand::Nil | Operand::Number | Operand::String => {
                Err(self.error(format!("unexpected . after term {text:?}")))
            }
            Operand::Field | Operand::Variable => Ok(Some(operand)),
            _ => Ok(Some(Operand::Chain)),
        }
    }

    fn term(&mut self) -> ParseResult<Option<(Operand, String)>> {
        let token = self.next_non_space()?;
        let operand = match token.kind {
            TokenKind::Identifier => {
                if !BUILTIN_FUNCTIONS.contains(&token.text.as_str()) {
                    return Err(self.error(format!("function {:?} not defined", token.text)));
                }
                Operand::Identifier
            }
            TokenKind::Dot => Operand::Dot,
            TokenKind::Nil => Operand::Nil,
            TokenKind::Variable => {
                if !self.vars.iter().any(|v| *v == token.text) {
                    return Err(self.error(format!("undefined variable {:?}", token.text)));
                }
                Operand::Variable
            }
            TokenKind::Field => Operand::Field,
            TokenKind::Bool => Operand::Bool,
            TokenKind::CharConstant => {
                check_char_constant(&token.text).map_err(|message| self.error(message))?;
                Operand::Number
            }
            TokenKind::Number | TokenKind::Complex => {
                check_number(&token.text, token.kind == TokenKind::Complex)
                    .map_err(|message| self.error(message))?;
                Operand::Number
            }
            TokenKind::LeftParen => {
                self.pipeline("parenthesized pipeline", TokenKind::RightParen)?;
                Operand::Pipeline
            }
            TokenKind::String | TokenKind::RawString => {
                if unquote(&token.text).is_none() {
                    return Err(self.error("invalid syntax"));
                }
                Operand::String
            }
            _ => {
                self.backup(token);
                return Ok(None);
            }
        };
        Ok(Some((operand, token.text)))
    }
}

/// Decode a double-quoted or raw string literal, quotes included.
fn unquote(text: &str) -> Option<String> {
    let quote = text.chars().next()?;
    if text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    let body = &text[1..text.len() - 1];
    match quote {
        '`' => Some(body.replace('\r', "")),
        '"' => {
            let mut out = String::with_capacity(body.len());
            let mut chars = body.chars();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => out.push(unescape(&mut chars, '"')?),
                    '"' | '\n' => return None,
                    c => out.push(c),
                }
            }
            Some(out)
        }
        _ => None,
    }
}

/// Decode the escape sequence following a backslash.
fn unescape(chars: &mut impl Iterator<Item = char>, quote: char) -> Option<char> {
    let c = chars.next()?;
    let value = match c {
        'a' => '\u{7}',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        '\\' => '\\',
        '\'' | '"' if c == quote => c,
        'x' => char::from_u32(hex_value(chars, 2)?)?,
        'u' => char::from_u32(hex_value(chars, 4)?)?,
        'U' => char::from_u32(hex_value(chars, 8)?)?,
        '0'..='7' => {
            let mut value = c.to_digit(8)?;
            for _ in 0..2 {
                value = value * 8 + chars.next()?.to_digit(8)?;
            }
            if value > 255 {
                return None;
            }
            char::from_u32(value)?
        }
        _ => return None,
    };
    Some(value)
}

fn hex_value(chars: &mut impl Iterator<Item = char>, digits: usize) -> Option<u32> {
    (0..digits).try_fold(0u32, |acc, _| Some(acc * 16 + chars.next()?.to_digit(16)?))
}

fn check_char_constant(text: &str) -> Result<(), String> {
    let mut chars = text[1..].chars();
    match chars.next() {
        None | Some('\'') => return Err("invalid syntax".to_string()),
        Some('\\') => {
            if unescape(&mut chars, '\'').is_none() {
                return Err("invalid syntax".to_string());
            }
        }
        Some(_) => {}
    }
    if chars.as_str() != "'" {
        return Err(format!("malformed character constant: {text}"));
    }
    Ok(())
}

/// Checks a number literal the way Go builds a number node: a 64-bit
/// integer first, then a finite float.
fn check_number(text: &str, complex: bool) -> Result<(), String> {
    let illegal = || format!("illegal number syntax: {text:?}");
    if complex {
        let split = text
            .char_indices()
            .skip(1)
            .filter(|&(i, c)| {
                matches!(c, '+' | '-') && !text[..i].ends_with(['e', 'E', 'p', 'P'])
            })
            .last()
            .map(|(i, _)| i);
        let valid = split.is_some_and(|i| {
            is_float(&text[..i]) && text[i..].strip_suffix('i').is_some_and(is_float)
        });
        return if valid { Ok(()) } else { Err(illegal()) };
    }

    if text.strip_suffix('i').is_some_and(is_float) || is_integer(text) {
        return Ok(());
    }
    if is_float(text) {
        // Integer-looking text that only fits a float is too large.
        if !text.contains(['.', 'e', 'E', 'p', 'P']) {
            return Err(format!("integer overflow: {text:?}"));
        }
        return Ok(());
    }
    Err(illegal())
}

/// Integer with an optional base prefix that fits in an `i64` or `u64`.
/// A bare leading `0` selects octal.
fn is_integer(text: &str) -> bool {
    let (limit, body) = match text.as_bytes().first() {
        Some(b'-') => (i64::MIN.unsigned_abs(), &text[1..]),
        Some(b'+') => (i64::MAX.unsigned_abs(), &text[1..]),
        _ => (u64::MAX, text),
    };
    if !underscores_ok(body) {
        return false;
    }
    let lower = body.to_ascii_lowercase();
    let (radix, digits) = match lower.as_bytes() {
        [b'0', b'x', ..] => (16, &lower[2..]),
        [b'0', b'o', ..] => (8, &lower[2..]),
        [b'0', b'b', ..] => (2, &lower[2..]),
        [b'0', _, ..] => (8, &lower[1..]),
        _ => (10, lower.as_str()),
    };
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return false;
    }
    u64::from_str_radix(&digits, radix).is_ok_and(|value| value <= limit)
}

/// Decimal or hex float whose value is finite.
fn is_float(text: &str) -> bool {
    if !underscores_ok(text) {
        return false;
    }
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let body = cleaned.strip_prefix(['+', '-']).unwrap_or(&cleaned);
    let value = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => hex_float(hex),
        // Excludes `inf` and `nan`, which only Rust's parser takes.
        None if body.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
            body.parse::<f64>().ok()
        }
        None => None,
    };
    value.is_some_and(f64::is_finite)
}

/// Hex float with a mandatory `p` exponent, prefix already stripped.
fn hex_float(hex: &str) -> Option<f64> {
    let (mantissa, exponent) = hex.split_once(['p', 'P'])?;
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = || whole.chars().chain(fraction.chars());
    if (whole.is_empty() && fraction.is_empty()) || !digits().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let magnitude = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    if magnitude.is_empty() || !magnitude.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let exponent = exponent.parse::<i32>().unwrap_or(if exponent.starts_with('-') {
        i32::MIN
    } else {
        i32::MAX
    });
    let value = digits().fold(0f64, |acc, c| {
        acc * 16.0 + f64::from(c.to_digit(16).unwrap_or_default())
    });
    let fraction_bits = i32::try_from(fraction.len() * 4).unwrap_or(i32::MAX);
    Some(value * 2f64.powi(exponent.saturating_sub(fraction_bits)))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Seen {
    Start,
    Digit,
    Underscore,
    Other,
}

/// Underscores may only separate digits, or follow a base prefix. An
/// exponent is not a digit, so `1e_5` is rejected.
fn underscores_ok(text: &str) -> bool {
    let bytes = text.strip_prefix(['+', '-']).unwrap_or(text).as_bytes();
    let mut seen = Seen::Start;
    let mut hex = false;
    let mut rest = bytes;
    if let [b'0', prefix, tail @ ..] = bytes {
        if matches!(prefix.to_ascii_lowercase(), b'b' | b'o' | b'x') {
            seen = Seen::Digit;
            hex = prefix.to_ascii_lowercase() == b'x';
            rest = tail;
        }
    }
    for &b in rest {
        if b.is_ascii_digit() || (hex && b.is_ascii_hexdigit()) {
            seen = Seen::Digit;
        } else if b == b'_' {
            if seen != Seen::Digit {
                return false;
            }
            seen = Seen::Underscore;
        } else if seen == Seen::Underscore {
            return false;
        } else {
            seen = Seen::Other;
        }
    }
    seen != Seen::Underscore
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a\tb""#).as_deref(), Some("a\tb"));
        assert_eq!(unquote(r#""é\x41\101""#).as_deref(), Some("éAA"));
        assert_eq!(unquote("`raw \\n`").as_deref(), Some("raw \\n"));
        assert!(unquote(r#""\q""#).is_none());
        assert!(unquote(r#""\'""#).is_none());
        assert!(unquote(r#""\777""#).is_none());
    }

    #[test]
    fn test_char_constants() {
        assert!(check_char_constant("'a'").is_ok());
        assert!(check_char_constant(r"'\n'").is_ok());
        assert!(check_char_constant(r"'\''").is_ok());
        assert!(check_char_constant("'é'").is_ok());
        assert_eq!(check_char_constant("''"), Err("invalid syntax".to_string()));
        assert_eq!(
            check_char_constant("'ab'"),
            Err("malformed character constant: 'ab'".to_string())
        );
    }

    #[test]
    fn test_numbers() {
        for valid in [
            "0", "42", "-7", "+3", "1.5", ".5", "1.", "1e10", "1E-3", "0x1F", "0o17", "0b101",
            "1_000", "0x_1f", "2i", "0x1p-2", "017", "1e1_0", "0x.8p1", "1e-400",
            "18446744073709551615", "-9223372036854775808",
        ] {
            assert_eq!(check_number(valid, false), Ok(()), "{valid} should be valid");
        }
        for invalid in [
            "+", "-", ".", "1e", "0x", "0b2", "1__0", "_1", "1_", "0o8", "1e_5", "1e400",
            "0x1p99999", "0x1p_2",
        ] {
            assert_eq!(
                check_number(invalid, false),
                Err(format!("illegal number syntax: {invalid:?}")),
                "{invalid} should be invalid"
            );
        }
        for overflow in ["99999999999999999999", "08", "019", "+9223372036854775808"] {
            assert_eq!(
                check_number(overflow, false),
                Err(format!("integer overflow: {overflow:?}"))
            );
        }
        assert!(check_number("1+2i", true).is_ok());
        assert!(check_number("1e3-2.5i", true).is_ok());
        assert!(check_number("1e400+2i", true).is_err());
    }

    #[test]
    fn test_underscores() {
        assert!(underscores_ok("1_000"));
        assert!(underscores_ok("0x_ff"));
        assert!(underscores_ok("-0b_1"));
        assert!(!underscores_ok("1e_5"));
        assert!(!underscores_ok("1_.5"));
        assert!(!underscores_ok("0_x1"));
    }
}
