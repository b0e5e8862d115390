//! Lexer for kubescript sources
//!
//! The lexer turns script text into the token sequence the parser consumes.
//! Tokens are recognised by an ordered table of anchored patterns; the first
//! rule that matches the head of the remaining input wins. Line breaks count
//! as plain whitespace, so a script may be laid out freely.

use regex_lite::Regex;

/// Token types for the kubescript lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    FuncDef, // def
    Var,     // $NAME
    Ask,     // ask
    String,  // "text"
    Identifier,
    LParen, // (
    RParen, // )
    Comma,  // ,
    Equal,  // =
    LBrace, // {
    RBrace, // }
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FuncDef => "def",
            Self::Var => "VARIABLE",
            Self::Ask => "ask",
            Self::String => "STRING",
            Self::Identifier => "IDENTIFIER",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::Equal => "=",
            Self::LBrace => "{",
            Self::RBrace => "}",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    /// Token text, with the sigil or quotes already stripped
    pub value: String,
    /// Byte range of the raw match in the input
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        value: impl Into<String>,
        start: usize,
        end: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            token_type,
            value: value.into(),
            start,
            end,
            line,
            column,
        }
    }
}

/// Why lexing stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// No rule matches at the current position
    NoMatch,
    /// A rule matched but its extract pattern did not. This is a bug in the
    /// rule table, not in the script.
    Extract,
}

/// Error returned when the lexer cannot continue
#[derive(Debug, Clone)]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for LexerError {}

impl LexerError {
    pub fn new(kind: LexerErrorKind, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

/// One entry of the rule table.
struct LexRule {
    token_type: TokenType,
    find: Regex,
    /// Re-applied to the matched text to pull out the token value. When the
    /// pattern has a capture group, group 1 is the value.
    extract: Option<Regex>,
}

impl LexRule {
    fn new(token_type: TokenType, find: &str, extract: Option<&str>) -> Self {
        let anchored = format!("^(?:{})", find);
        Self {
            token_type,
            find: Regex::new(&anchored).expect("lexer match pattern must compile"),
            extract: extract.map(|p| Regex::new(p).expect("lexer extract pattern must compile")),
        }
    }
}

lazy_static::lazy_static! {
    /// Token rules in priority order. Keywords come before the identifier
    /// rule and the variable sigil before anything that could eat `$`.
    static ref RULES: Vec<LexRule> = vec![
        LexRule::new(TokenType::FuncDef, r"\bdef\b", None),
        LexRule::new(TokenType::Var, r"\$[A-Z_]+", Some(r"[A-Z_]+")),
        LexRule::new(TokenType::Ask, r"\bask\b", None),
        LexRule::new(TokenType::String, r#"(?s)"(.*?)""#, Some(r#"(?s)^"(.*)"$"#)),
        LexRule::new(TokenType::Identifier, r"\b[a-zA-Z_]+\b", None),
        LexRule::new(TokenType::LParen, r"\(", None),
        LexRule::new(TokenType::RParen, r"\)", None),
        LexRule::new(TokenType::Comma, r",", None),
        LexRule::new(TokenType::Equal, r"=", None),
        LexRule::new(TokenType::LBrace, r"\{", None),
        LexRule::new(TokenType::RBrace, r"\}", None),
    ];
}

/// Lexer over a single script.
pub struct Lexer {
    /// Original input, used for line/column reporting
    input: String,
    /// Input with line breaks turned into spaces. Byte offsets are identical
    /// to `input`.
    normalized: String,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let normalized = input.replace(['\n', '\r'], " ");
        Self {
            input: input.to_string(),
            normalized,
        }
    }

    /// Tokenize the whole input. Empty or blank input gives an empty vector.
    pub fn tokenize(&self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        let mut cursor = Cursor::start();
        let mut pos = self.skip_whitespace(0);

        while pos < self.normalized.len() {
            cursor.advance_to(&self.input, pos);
            let token = self.next_token(pos, cursor.line, cursor.column)?;
            pos = self.skip_whitespace(token.end);
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn skip_whitespace(&self, pos: usize) -> usize {
        let rest = &self.normalized[pos..];
        pos + (rest.len() - rest.trim_start().len())
    }

    fn next_token(&self, pos: usize, line: usize, column: usize) -> Result<Token, LexerError> {
        let rest = &self.normalized[pos..];

        for rule in RULES.iter() {
            let Some(found) = rule.find.find(rest) else {
                continue;
            };
            let matched = found.as_str();

            let value = match &rule.extract {
                None => matched.to_string(),
                Some(extract) => {
                    let caps = extract.captures(matched).ok_or_else(|| {
                        LexerError::new(
                            LexerErrorKind::Extract,
                            format!(
                                "extract pattern for {} failed on {:?}",
                                rule.token_type, matched
                            ),
                            line,
                            column,
                        )
                    })?;
                    caps.get(1)
                        .or_else(|| caps.get(0))
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default()
                }
            };

            return Ok(Token::new(
                rule.token_type,
                value,
                pos,
                pos + matched.len(),
                line,
                column,
            ));
        }

        Err(LexerError::new(
            LexerErrorKind::NoMatch,
            format!("couldn't match token on {:?}", rest),
            line,
            column,
        ))
    }
}

/// Line and column of a byte offset, moved forward only. Each stretch of
/// input is counted once, however many tokens the script has.
struct Cursor {
    offset: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn advance_to(&mut self, input: &str, pos: usize) {
        for c in input[self.offset..pos].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = pos;
    }
}

/// Tokenize `source` in one call.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new(source).tokenize()
}
