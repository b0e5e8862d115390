//! Recursive Descent Parser for kubescript
//!
//! Consumes the lexer's tokens and produces a single AST root. Alternatives
//! are picked with at most two tokens of lookahead and there is no
//! backtracking.
//!
//! Grammar:
//!   program     ::= 'def' IDENT '(' [IDENT (',' IDENT)*] ')' '{' expression* '}'
//!   script      ::= expression*
//!   expression  ::= STRING | call | var_assign | var_ref
//!   call        ::= IDENT '(' [expression (',' expression)*] ')'
//!   var_assign  ::= VAR '=' (STRING | 'ask' | call)
//!   var_ref     ::= VAR
//!
//! Variables are global and single-assignment: the parser keeps the set of
//! names assigned so far and rejects both re-assignment and use before
//! assignment.

use indexmap::IndexSet;

use crate::ast::types::{AssignValue, CallNode, Node, AST};
use crate::parser::lexer::{Token, TokenType};
use crate::parser::types::ParseException;

/// Max nesting of calls inside call arguments
pub const MAX_PARSER_DEPTH: usize = 200;

/// Main parser struct
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    /// Variables assigned so far, in assignment order
    declared: IndexSet<String>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Parser {
            tokens: Vec::new(),
            pos: 0,
            depth: 0,
            declared: IndexSet::new(),
        }
    }

    /// Parse a program: exactly one function definition.
    pub fn parse_tokens(&mut self, tokens: Vec<Token>) -> Result<Node, ParseException> {
        self.reset(tokens);
        let root = self.parse_function_def()?;

        if let Some(extra) = self.tokens.get(self.pos) {
            return Err(ParseException::syntax(
                format!(
                    "unexpected {} '{}' after the end of the function",
                    extra.token_type, extra.value
                ),
                extra.line,
                extra.column,
            )
            .with_token(extra.clone()));
        }

        Ok(root)
    }

    /// Parse a bare statement list with no enclosing function.
    pub fn parse_script_tokens(&mut self, tokens: Vec<Token>) -> Result<Node, ParseException> {
        self.reset(tokens);
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_expression()?);
        }
        Ok(AST::program(statements))
    }

    /// Variable names assigned by the last parse, in order.
    pub fn declared_variables(&self) -> &IndexSet<String> {
        &self.declared
    }

    fn reset(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
        self.pos = 0;
        self.depth = 0;
        self.declared = IndexSet::new();
    }

    // ===========================================================================
    // HELPER METHODS
    // ===========================================================================

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Where to report problems found at the end of input.
    fn end_position(&self) -> (usize, usize) {
        match self.tokens.last() {
            Some(last) => (last.line, last.column + last.end.saturating_sub(last.start)),
            None => (1, 1),
        }
    }

    /// Take the next token, which must be of kind `expected`.
    fn consume(&mut self, expected: TokenType) -> Result<Token, ParseException> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            let (line, column) = self.end_position();
            return Err(ParseException::syntax(
                format!("expected {} but reached end of input", expected),
                line,
                column,
            ));
        };
        self.pos += 1;

        if token.token_type != expected {
            return Err(ParseException::syntax(
                format!(
                    "expected {} but got {} '{}'",
                    expected, token.token_type, token.value
                ),
                token.line,
                token.column,
            )
            .with_token(token));
        }

        Ok(token)
    }

    /// Check the kind of the token `offset` places ahead without consuming.
    /// Looking past the end of input is an error, not `false`.
    fn peek(&self, expected: TokenType, offset: usize) -> Result<bool, ParseException> {
        match self.tokens.get(self.pos + offset) {
            Some(token) => Ok(token.token_type == expected),
            None => {
                let (line, column) = self.end_position();
                Err(ParseException::syntax(
                    format!("expected {} but reached end of input", expected),
                    line,
                    column,
                ))
            }
        }
    }

    /// Like `peek`, but running out of tokens is just `false`. Only used where
    /// the shorter alternative is complete on its own.
    fn lookahead_is(&self, expected: TokenType, offset: usize) -> bool {
        self.tokens
            .get(self.pos + offset)
            .is_some_and(|t| t.token_type == expected)
    }

    // ===========================================================================
    // GRAMMAR RULES
    // ===========================================================================

    fn parse_function_def(&mut self) -> Result<Node, ParseException> {
        self.consume(TokenType::FuncDef)?;
        let name = self.consume(TokenType::Identifier)?.value;
        let params = self.parse_function_params()?;
        let body = self.parse_function_body()?;
        Ok(AST::function_def(name, params, body))
    }

    fn parse_function_params(&mut self) -> Result<Vec<String>, ParseException> {
        self.consume(TokenType::LParen)?;

        if self.peek(TokenType::RParen, 0)? {
            self.consume(TokenType::RParen)?;
            return Ok(Vec::new());
        }

        let mut params: Vec<String> = Vec::new();
        loop {
            let token = self.consume(TokenType::Identifier)?;
            if params.contains(&token.value) {
                return Err(ParseException::semantic(
                    format!("parameter {} is declared twice", token.value),
                    &token,
                ));
            }
            // A parameter spelled like a variable can be read as `$NAME`.
            if is_variable_name(&token.value) {
                self.declared.insert(token.value.clone());
            }
            params.push(token.value);

            if !self.peek(TokenType::Comma, 0)? {
                break;
            }
            self.consume(TokenType::Comma)?;
        }
        self.consume(TokenType::RParen)?;

        Ok(params)
    }

    fn parse_function_body(&mut self) -> Result<Vec<Node>, ParseException> {
        self.consume(TokenType::LBrace)?;

        let mut body = Vec::new();
        while !self.peek(TokenType::RBrace, 0)? {
            body.push(self.parse_expression()?);
        }
        self.consume(TokenType::RBrace)?;

        Ok(body)
    }

    fn parse_expression(&mut self) -> Result<Node, ParseException> {
        if self.peek(TokenType::String, 0)? {
            self.parse_string()
        } else if self.peek(TokenType::Identifier, 0)? && self.peek(TokenType::LParen, 1)? {
            Ok(Node::Call(self.parse_call()?))
        } else if self.peek(TokenType::Var, 0)? && self.lookahead_is(TokenType::Equal, 1) {
            self.parse_var_assign()
        } else if self.peek(TokenType::Var, 0)? {
            self.parse_var_ref()
        } else {
            let token = self.tokens[self.pos].clone();
            Err(ParseException::syntax(
                format!(
                    "unexpected {} '{}', expected an expression",
                    token.token_type, token.value
                ),
                token.line,
                token.column,
            )
            .with_token(token))
        }
    }

    fn parse_string(&mut self) -> Result<Node, ParseException> {
        let token = self.consume(TokenType::String)?;
        Ok(AST::string(token.value))
    }

    fn parse_var_assign(&mut self) -> Result<Node, ParseException> {
        let name_token = self.consume(TokenType::Var)?;
        self.consume(TokenType::Equal)?;

        if self.declared.contains(&name_token.value) {
            return Err(ParseException::semantic(
                format!("variable {} is already defined", name_token.value),
                &name_token,
            ));
        }

        let value = if self.peek(TokenType::String, 0)? {
            AssignValue::Literal(AST::literal_node(self.consume(TokenType::String)?.value))
        } else if self.peek(TokenType::Ask, 0)? {
            self.consume(TokenType::Ask)?;
            AssignValue::Prompt
        } else if self.peek(TokenType::Identifier, 0)? && self.peek(TokenType::LParen, 1)? {
            AssignValue::Call(self.parse_call()?)
        } else {
            let token = self.tokens[self.pos].clone();
            let message = if token.token_type == TokenType::Var {
                format!(
                    "cannot assign ${} to {}: a variable takes a string, ask, or a call",
                    token.value, name_token.value
                )
            } else {
                format!(
                    "unknown assignment type {} '{}' for {}",
                    token.token_type, token.value, name_token.value
                )
            };
            return Err(ParseException::syntax(message, token.line, token.column).with_token(token));
        };

        self.declared.insert(name_token.value.clone());
        Ok(AST::assign(name_token.value, value))
    }

    fn parse_var_ref(&mut self) -> Result<Node, ParseException> {
        let token = self.consume(TokenType::Var)?;

        if !self.declared.contains(&token.value) {
            return Err(ParseException::semantic(
                format!("variable {} has not been set", token.value),
                &token,
            ));
        }

        Ok(AST::var_ref(token.value))
    }

    fn parse_call(&mut self) -> Result<CallNode, ParseException> {
        let name_token = self.consume(TokenType::Identifier)?;
        self.consume(TokenType::LParen)?;

        self.depth += 1;
        if self.depth > MAX_PARSER_DEPTH {
            return Err(ParseException::syntax(
                format!("calls nested deeper than {}", MAX_PARSER_DEPTH),
                name_token.line,
                name_token.column,
            ));
        }

        let mut args = Vec::new();
        if !self.peek(TokenType::RParen, 0)? {
            args.push(self.parse_expression()?);
            while self.peek(TokenType::Comma, 0)? {
                self.consume(TokenType::Comma)?;
                args.push(self.parse_expression()?);
            }
        }
        self.consume(TokenType::RParen)?;
        self.depth -= 1;

        Ok(AST::call_node(name_token.value, args))
    }
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}

/// Parse a token sequence as a single function definition.
pub fn parse(tokens: Vec<Token>) -> Result<Node, ParseException> {
    Parser::new().parse_tokens(tokens)
}

/// Parse a token sequence as a bare statement list.
pub fn parse_script(tokens: Vec<Token>) -> Result<Node, ParseException> {
    Parser::new().parse_script_tokens(tokens)
}
