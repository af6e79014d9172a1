//! # Dialect Scanner
//!
//! Character-stream to token-stream scanner for the SQL-superset dialect.
//! One token is produced per [`Scanner::scan`] call; the scanner owns
//! line/column tracking and the sub-language scanning for external
//! commands.
//!
//! ## Dispatch
//!
//! After skipping Unicode whitespace, the first code point selects the
//! scan routine:
//!
//! - digits: INTEGER, or FLOAT when a fractional part follows
//! - `_` or letter: identifier, then classified ternary > keyword >
//!   function family > IDENTIFIER
//! - `=` `>` `<` `!` `|` `:`: operator run, classified comparison /
//!   string / substitution, single characters passing through raw
//! - `@`: variable sigil family (`@x`, `@@x`, `@%x`, `@#x`)
//! - `$`: external command, scanned to `;` or EOF with embedded quoted
//!   runs and `${ … }` expression spans kept intact
//! - `/* … */` and `-- …`: comments, consumed and the scan restarted
//! - `"` `'`: string literal, promoted to DATETIME when the decoded text
//!   parses as a datetime
//! - `` ` ``: quoted identifier
//! - anything else: the code point itself
//!
//! ## Positions
//!
//! Lines and columns are 1-based and recorded before the first code point
//! of a token is consumed, so every token (EOF included) carries a valid
//! position. `\r\n`, `\r` and `\n` all count as a single line break.
//!
//! ## Errors
//!
//! `scan` returns a typed [`LexError`] instead of latching state; the
//! error carries the failing token's start position. The scanner remains
//! usable afterwards, so a driver can report and resynchronize.
//!
//! The scanner works on a decoded code-point buffer rather than borrowed
//! byte slices: classification is Unicode-aware and string literals are
//! escape-decoded, so tokens own their text.

use super::token::{
    is_aggregate_function, is_analytic_function, is_function_nth,
    is_function_with_ignore_nulls, is_list_function, Keyword, Token, TokenKind,
};
use crate::config::Session;
use crate::types::Ternary;
use std::fmt;
use std::sync::Arc;

pub const VARIABLE_SIGN: char = '@';
pub const ENVIRONMENT_VARIABLE_SIGN: char = '%';
pub const EXTERNAL_COMMAND_SIGN: char = '$';
pub const RUNTIME_INFORMATION_SIGN: char = '#';

pub const BEGIN_EXPRESSION: char = '{';
pub const END_EXPRESSION: char = '}';

const COMPARISON_OPERATORS: &[&str] = &[">", "<", ">=", "<=", "<>", "!=", "=="];
const STRING_OPERATORS: &[&str] = &["||"];
const SUBSTITUTION_OPERATOR: &str = ":=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    LiteralNotTerminated,
    InvalidVariableSymbol,
}

impl LexErrorKind {
    fn message(self) -> &'static str {
        match self {
            LexErrorKind::LiteralNotTerminated => "literal not terminated",
            LexErrorKind::InvalidVariableSymbol => "invalid variable symbol",
        }
    }
}

/// Scan failure with the start position of the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: u32,
    pub column: u32,
    pub source_file: Arc<str>,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source_file.is_empty() {
            write!(f, "{} [L:{} C:{}]", self.kind.message(), self.line, self.column)
        } else {
            write!(
                f,
                "{} [{} L:{} C:{}]",
                self.kind.message(),
                self.source_file,
                self.line,
                self.column
            )
        }
    }
}

impl std::error::Error for LexError {}

pub struct Scanner<'s> {
    session: &'s Session,
    src: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    source_file: Arc<str>,
}

impl<'s> Scanner<'s> {
    pub fn new(input: &str, source_file: &str, session: &'s Session) -> Self {
        Self {
            session,
            src: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
            source_file: Arc::from(source_file),
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    /// Consumes one code point. All newline forms collapse to a single
    /// `'\n'` and reset the column counter.
    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        self.column += 1;

        if ch == '\r' || ch == '\n' {
            if ch == '\r' && self.peek() == Some('\n') {
                self.pos += 1;
            }
            self.line += 1;
            self.column = 0;
            return Some('\n');
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next();
        }
    }

    fn is_ident_start(ch: char) -> bool {
        ch == '_' || ch.is_alphabetic()
    }

    fn is_ident_rune(ch: char) -> bool {
        ch == '_' || ch.is_alphabetic() || ch.is_numeric()
    }

    fn is_operator_rune(ch: char) -> bool {
        matches!(ch, '=' | '>' | '<' | '!' | '|' | ':')
    }

    /// Returns the next token, or the EOF sentinel once input is
    /// exhausted.
    pub fn scan(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_whitespace();
            let line = self.line;
            let column = self.column + 1;

            let Some(ch) = self.next() else {
                return Ok(self.token(TokenKind::Eof, String::new(), false, line, column));
            };

            if ch.is_ascii_digit() {
                let (kind, literal) = self.scan_number(ch);
                return Ok(self.token(kind, literal, false, line, column));
            }

            if Self::is_ident_start(ch) {
                let word = self.scan_identifier(ch);
                let kind = Self::classify_word(&word);
                return Ok(self.token(kind, word, false, line, column));
            }

            if Self::is_operator_rune(ch) {
                let run = self.scan_operator(ch);
                let kind = Self::classify_operator(ch, &run);
                return Ok(self.token(kind, run, false, line, column));
            }

            match ch {
                VARIABLE_SIGN => return self.scan_variable(line, column),
                EXTERNAL_COMMAND_SIGN => {
                    let literal = self.scan_external_command();
                    return Ok(self.token(
                        TokenKind::ExternalCommand,
                        literal,
                        false,
                        line,
                        column,
                    ));
                }
                '/' if self.peek() == Some('*') => {
                    self.next();
                    self.skip_block_comment();
                }
                '-' if self.peek() == Some('-') => {
                    self.next();
                    self.skip_line_comment();
                }
                '"' | '\'' => {
                    let raw = self.scan_quoted(ch, line, column)?;
                    let decoded = unescape_string(&raw, ch);
                    let kind = if self.session.parse_datetime(&decoded).is_some() {
                        TokenKind::Datetime
                    } else {
                        TokenKind::String
                    };
                    return Ok(self.token(kind, decoded, false, line, column));
                }
                '`' => {
                    let raw = self.scan_quoted('`', line, column)?;
                    let decoded = unescape_identifier(&raw);
                    return Ok(self.token(TokenKind::Identifier, decoded, true, line, column));
                }
                _ => {
                    return Ok(self.token(
                        TokenKind::Punct(ch),
                        ch.to_string(),
                        false,
                        line,
                        column,
                    ))
                }
            }
        }
    }

    fn token(
        &self,
        kind: TokenKind,
        literal: String,
        quoted: bool,
        line: u32,
        column: u32,
    ) -> Token {
        Token::new(kind, literal, quoted, line, column, self.source_file.clone())
    }

    fn scan_number(&mut self, head: char) -> (TokenKind, String) {
        let mut literal = String::new();
        literal.push(head);
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.next();
            literal.push(c);
        }

        if self.peek() == Some('.') {
            self.next();
            literal.push('.');
            while let Some(c) = self.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                self.next();
                literal.push(c);
            }
            return (TokenKind::Float, literal);
        }
        (TokenKind::Integer, literal)
    }

    fn scan_identifier(&mut self, head: char) -> String {
        let mut word = String::new();
        word.push(head);
        while let Some(c) = self.peek() {
            if !Self::is_ident_rune(c) {
                break;
            }
            self.next();
            word.push(c);
        }
        word
    }

    /// Classification precedence: ternary > keyword > function families >
    /// identifier. Source casing is preserved in the literal.
    fn classify_word(word: &str) -> TokenKind {
        if Ternary::parse(word).is_some() {
            TokenKind::Ternary
        } else if let Some(kw) = Keyword::lookup(word) {
            TokenKind::Keyword(kw)
        } else if is_aggregate_function(word) {
            TokenKind::AggregateFunction
        } else if is_list_function(word) {
            TokenKind::ListFunction
        } else if is_analytic_function(word) {
            TokenKind::AnalyticFunction
        } else if is_function_nth(word) {
            TokenKind::FunctionNth
        } else if is_function_with_ignore_nulls(word) {
            TokenKind::FunctionWithIns
        } else {
            TokenKind::Identifier
        }
    }

    fn scan_operator(&mut self, head: char) -> String {
        let mut run = String::new();
        run.push(head);
        while let Some(c) = self.peek() {
            if !Self::is_operator_rune(c) {
                break;
            }
            self.next();
            run.push(c);
        }
        run
    }

    fn classify_operator(head: char, run: &str) -> TokenKind {
        if COMPARISON_OPERATORS.contains(&run) {
            TokenKind::ComparisonOp
        } else if STRING_OPERATORS.contains(&run) {
            TokenKind::StringOp
        } else if run == SUBSTITUTION_OPERATOR {
            TokenKind::SubstitutionOp
        } else if run.chars().count() == 1 {
            TokenKind::Punct(head)
        } else {
            TokenKind::Uncategorized
        }
    }

    fn scan_variable(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let kind = match self.peek() {
            Some(ENVIRONMENT_VARIABLE_SIGN) => {
                self.next();
                TokenKind::EnvironmentVariable
            }
            Some(RUNTIME_INFORMATION_SIGN) => {
                self.next();
                TokenKind::RuntimeInformation
            }
            Some(VARIABLE_SIGN) => {
                self.next();
                TokenKind::Flag
            }
            _ => TokenKind::Variable,
        };

        let mut quoted = false;
        let literal = if kind == TokenKind::EnvironmentVariable && self.peek() == Some('`') {
            self.next();
            let raw = self.scan_quoted('`', line, column)?;
            quoted = true;
            unescape_identifier(&raw)
        } else if let Some(head) = self.peek().filter(|c| Self::is_ident_rune(*c)) {
            self.next();
            self.scan_identifier(head)
        } else {
            String::new()
        };

        if literal.is_empty() {
            return Err(LexError {
                kind: LexErrorKind::InvalidVariableSymbol,
                line,
                column,
                source_file: self.source_file.clone(),
            });
        }
        Ok(self.token(kind, literal, quoted, line, column))
    }

    /// Captures the raw span of a quoted string/identifier. Escape pairs
    /// (`\\` and `\<quote>`) are kept verbatim so an escaped quote cannot
    /// terminate the scan; decoding happens in [`unescape_string`] /
    /// [`unescape_identifier`].
    fn scan_quoted(&mut self, quote: char, line: u32, column: u32) -> Result<String, LexError> {
        let mut raw = String::new();
        loop {
            let Some(ch) = self.next() else {
                return Err(LexError {
                    kind: LexErrorKind::LiteralNotTerminated,
                    line,
                    column,
                    source_file: self.source_file.clone(),
                });
            };
            if ch == quote {
                return Ok(raw);
            }
            if ch == '\\' {
                if let Some(p) = self.peek() {
                    if p == '\\' || p == quote {
                        self.next();
                        raw.push('\\');
                        raw.push(p);
                        continue;
                    }
                }
            }
            raw.push(ch);
        }
    }

    /// External command sublanguage: everything up to an unquoted `;` or
    /// EOF. Quoted runs and `${ … }` expression spans are captured whole,
    /// terminators inside them ignored.
    fn scan_external_command(&mut self) -> String {
        let mut buf = String::new();
        while let Some(ch) = self.peek() {
            if ch == ';' {
                break;
            }
            self.next();
            buf.push(ch);

            if ch == '"' || ch == '\'' || ch == '`' {
                self.scan_external_quoted(&mut buf, ch);
            } else if ch == EXTERNAL_COMMAND_SIGN && self.peek() == Some(BEGIN_EXPRESSION) {
                self.next();
                buf.push(BEGIN_EXPRESSION);
                self.scan_external_expression(&mut buf);
            }
        }
        buf
    }

    fn scan_external_quoted(&mut self, buf: &mut String, quote: char) {
        while let Some(ch) = self.next() {
            buf.push(ch);
            if ch == quote {
                return;
            }
            if ch == '\\' {
                if let Some(p) = self.peek() {
                    if p == '\\' || p == quote {
                        self.next();
                        buf.push(p);
                    }
                }
            }
        }
    }

    fn scan_external_expression(&mut self, buf: &mut String) {
        while let Some(ch) = self.next() {
            buf.push(ch);
            if ch == END_EXPRESSION {
                return;
            }
            if ch == '\\' {
                if let Some(p) = self.peek() {
                    if p == '\\' || p == BEGIN_EXPRESSION || p == END_EXPRESSION {
                        self.next();
                        buf.push(p);
                    }
                }
            }
        }
    }

    /// Non-nesting block comment. An unterminated comment runs to EOF.
    fn skip_block_comment(&mut self) {
        while let Some(ch) = self.next() {
            if ch == '*' && self.peek() == Some('/') {
                self.next();
                return;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\r' || ch == '\n' {
                return;
            }
            self.next();
        }
    }
}

/// Decodes string-literal escapes: `\\`, `\<quote>`, `\n`, `\t`, `\r`.
/// Unknown sequences are kept verbatim.
pub fn unescape_string(raw: &str, quote: char) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(c) if c == quote => out.push(c),
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Decodes quoted-identifier escapes: `\\` and `` \` ``.
pub fn unescape_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('`') => out.push('`'),
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(input: &str) -> Vec<Token> {
        let session = Session::new();
        let mut scanner = Scanner::new(input, "test.sql", &session);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.scan().expect("scan should succeed");
            let eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if eof {
                break;
            }
        }
        tokens
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        scan_all(input).into_iter().map(|t| t.kind).collect()
    }

    fn first(input: &str) -> Token {
        scan_all(input).into_iter().next().expect("at least EOF")
    }

    #[test]
    fn lex_keywords_case_insensitive() {
        assert_eq!(first("SELECT").kind, TokenKind::Keyword(Keyword::Select));
        assert_eq!(first("select").kind, TokenKind::Keyword(Keyword::Select));
        assert_eq!(first("Natural").kind, TokenKind::Keyword(Keyword::Natural));
        assert_eq!(first("json_object").kind, TokenKind::Keyword(Keyword::JsonObject));
    }

    #[test]
    fn classification_precedence() {
        assert_eq!(first("true").kind, TokenKind::Ternary);
        assert_eq!(first("UNKNOWN").kind, TokenKind::Ternary);
        assert_eq!(first("SELECT").kind, TokenKind::Keyword(Keyword::Select));
        assert_eq!(first("SUM").kind, TokenKind::AggregateFunction);
        assert_eq!(first("listagg").kind, TokenKind::ListFunction);
        assert_eq!(first("rank").kind, TokenKind::AnalyticFunction);
        assert_eq!(first("NTH_VALUE").kind, TokenKind::FunctionNth);
        assert_eq!(first("lead").kind, TokenKind::FunctionWithIns);
        assert_eq!(first("foo").kind, TokenKind::Identifier);
    }

    #[test]
    fn identifier_preserves_casing() {
        let token = first("CityName");
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.literal, "CityName");
        assert!(!token.quoted);
    }

    #[test]
    fn unicode_identifiers() {
        let token = first("名前");
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.literal, "名前");
        let token = first("_x1");
        assert_eq!(token.literal, "_x1");
    }

    #[test]
    fn lex_numbers() {
        let token = first("42");
        assert_eq!(token.kind, TokenKind::Integer);
        assert_eq!(token.literal, "42");

        let token = first("3.14");
        assert_eq!(token.kind, TokenKind::Float);
        assert_eq!(token.literal, "3.14");

        let token = first("1.");
        assert_eq!(token.kind, TokenKind::Float);
        assert_eq!(token.literal, "1.");
    }

    #[test]
    fn number_then_identifier() {
        let kinds = kinds("1a");
        assert_eq!(
            kinds,
            vec![TokenKind::Integer, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_operators() {
        assert_eq!(first(">=").kind, TokenKind::ComparisonOp);
        assert_eq!(first("<>").kind, TokenKind::ComparisonOp);
        assert_eq!(first("!=").kind, TokenKind::ComparisonOp);
        assert_eq!(first("==").kind, TokenKind::ComparisonOp);
        assert_eq!(first("||").kind, TokenKind::StringOp);
        assert_eq!(first(":=").kind, TokenKind::SubstitutionOp);
        assert_eq!(first("=").kind, TokenKind::Punct('='));
        assert_eq!(first(":").kind, TokenKind::Punct(':'));
        assert_eq!(first("!").kind, TokenKind::Punct('!'));
        assert_eq!(first("=:").kind, TokenKind::Uncategorized);
    }

    #[test]
    fn punctuation_passes_through() {
        assert_eq!(
            kinds("( ) , ;"),
            vec![
                TokenKind::Punct('('),
                TokenKind::Punct(')'),
                TokenKind::Punct(','),
                TokenKind::Punct(';'),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_variable_sigils() {
        let token = first("@x");
        assert_eq!(token.kind, TokenKind::Variable);
        assert_eq!(token.literal, "x");

        let token = first("@@x");
        assert_eq!(token.kind, TokenKind::Flag);
        assert_eq!(token.literal, "x");

        let token = first("@%x");
        assert_eq!(token.kind, TokenKind::EnvironmentVariable);
        assert_eq!(token.literal, "x");

        let token = first("@#x");
        assert_eq!(token.kind, TokenKind::RuntimeInformation);
        assert_eq!(token.literal, "x");
    }

    #[test]
    fn quoted_environment_variable() {
        let token = first("@%`HOME PATH`");
        assert_eq!(token.kind, TokenKind::EnvironmentVariable);
        assert_eq!(token.literal, "HOME PATH");
        assert!(token.quoted);
    }

    #[test]
    fn error_invalid_variable_symbol() {
        let session = Session::new();
        let mut scanner = Scanner::new("@", "q.sql", &session);
        let err = scanner.scan().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidVariableSymbol);
        assert_eq!((err.line, err.column), (1, 1));

        let mut scanner = Scanner::new("@%", "q.sql", &session);
        let err = scanner.scan().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidVariableSymbol);
    }

    #[test]
    fn lex_external_command() {
        let tokens = scan_all("$echo 'a;b' ${1+2};");
        assert_eq!(tokens[0].kind, TokenKind::ExternalCommand);
        assert_eq!(tokens[0].literal, "echo 'a;b' ${1+2}");
        assert_eq!(tokens[1].kind, TokenKind::Punct(';'));
    }

    #[test]
    fn external_command_runs_to_eof() {
        let token = first("$ls -la");
        assert_eq!(token.kind, TokenKind::ExternalCommand);
        assert_eq!(token.literal, "ls -la");
    }

    #[test]
    fn external_command_escaped_braces() {
        let token = first(r"$printf ${a\}b};");
        assert_eq!(token.kind, TokenKind::ExternalCommand);
        assert_eq!(token.literal, r"printf ${a\}b}");
    }

    #[test]
    fn lex_comments() {
        assert_eq!(kinds("-- c\nX"), vec![TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(kinds("/* c */X"), vec![TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(
            kinds("a /* skip\nlines */ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_strings() {
        let token = first("'hello'");
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.literal, "hello");

        let token = first("\"double\"");
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.literal, "double");
    }

    #[test]
    fn string_escapes_decoded() {
        let token = first(r"'a\'b'");
        assert_eq!(token.literal, "a'b");

        let token = first(r"'a\\b'");
        assert_eq!(token.literal, r"a\b");

        let token = first(r"'tab\there'");
        assert_eq!(token.literal, "tab\there");
    }

    #[test]
    fn datetime_promotion() {
        assert_eq!(first("'2020-01-02 03:04:05'").kind, TokenKind::Datetime);
        assert_eq!(first("'2020-01-02'").kind, TokenKind::Datetime);
        assert_eq!(first("'hello'").kind, TokenKind::String);
    }

    #[test]
    fn quoted_identifier() {
        let token = first("`order`");
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.literal, "order");
        assert!(token.quoted);

        let token = first(r"`back\`tick`");
        assert_eq!(token.literal, "back`tick");
        assert!(token.quoted);
    }

    #[test]
    fn error_unterminated_string() {
        let session = Session::new();
        let mut scanner = Scanner::new("  'abc", "q.sql", &session);
        let err = scanner.scan().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::LiteralNotTerminated);
        assert_eq!((err.line, err.column), (1, 3));
    }

    #[test]
    fn error_unterminated_quoted_identifier() {
        let session = Session::new();
        let mut scanner = Scanner::new("`abc", "q.sql", &session);
        let err = scanner.scan().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::LiteralNotTerminated);
    }

    #[test]
    fn round_trip_stable_kinds() {
        for input in ["city", "42", "3.14", "_private", "x1"] {
            let original = first(input);
            let rescanned = first(&original.literal);
            assert_eq!(original.kind, rescanned.kind, "round-trip of {:?}", input);
            assert_eq!(original.literal, rescanned.literal);
        }
    }

    #[test]
    fn line_column_tracking() {
        let tokens = scan_all("SELECT\ncity,\r\n  name");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 1));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 5));
        assert_eq!((tokens[3].line, tokens[3].column), (3, 3));
    }

    #[test]
    fn carriage_return_alone_breaks_line() {
        let tokens = scan_all("a\rb");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 1));
    }

    #[test]
    fn positions_monotonic() {
        let tokens = scan_all("SELECT a, b FROM t1\nJOIN t2 ON t1.k = t2.k -- tail\n");
        let mut prev = (0u32, 0u32);
        for token in &tokens {
            let pos = (token.line, token.column);
            assert!(prev <= pos, "position went backwards: {:?} -> {:?}", prev, pos);
            assert!(token.line >= 1 && token.column >= 1);
            prev = pos;
        }
    }

    #[test]
    fn eof_carries_valid_position() {
        let tokens = scan_all("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    }

    #[test]
    fn scanner_usable_after_error() {
        let session = Session::new();
        let mut scanner = Scanner::new("@ x", "q.sql", &session);
        assert!(scanner.scan().is_err());
        let token = scanner.scan().expect("scan continues after error");
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.literal, "x");
    }
}
