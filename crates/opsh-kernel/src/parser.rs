//! Parser for opsh source code.
//!
//! Transforms the token stream from the lexer into statements. The grammar
//! is intentionally small — whole scripts are parsed as one fragment and
//! may contain multiple statements separated by `;` or newlines.

use std::fmt;

use opsh_types::Value;
use thiserror::Error;

use crate::ast::{
    AssignTarget, Command, CommandArg, Expr, Pipeline, PipelineElement, Program, Stmt,
};
use crate::lexer::{tokenize, Spanned, Token};

/// A parse failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Parse a source fragment into a program.
pub fn parse(input: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(input).map_err(ParseError::new)?;
    Parser { tokens, pos: 0 }.program()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn is_separator(token: &Token) -> bool {
        matches!(token, Token::Newline | Token::Semi)
    }

    fn skip_separators(&mut self) {
        while self.peek().is_some_and(Self::is_separator) {
            self.pos += 1;
        }
    }

    /// True at a statement boundary: separator or end of input.
    fn at_statement_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(token) => Self::is_separator(token),
        }
    }

    fn program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        self.skip_separators();
        while !self.at_end() {
            statements.push(self.statement()?);
            if !self.at_statement_end() {
                return Err(ParseError::new(format!(
                    "unexpected token after statement: {:?}",
                    self.peek()
                )));
            }
            self.skip_separators();
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Some(Token::Throw) => {
                self.next();
                let expr = if self.at_statement_end() {
                    None
                } else {
                    Some(self.expression()?)
                };
                Ok(Stmt::Throw(expr))
            }
            Some(Token::Exit) => {
                self.next();
                let expr = if self.at_statement_end() {
                    None
                } else {
                    Some(self.expression()?)
                };
                Ok(Stmt::Exit(expr))
            }
            Some(Token::Bareword(_)) => Ok(Stmt::Pipeline(self.pipeline(None)?)),
            Some(_) => {
                let expr = self.expression()?;
                if matches!(self.peek(), Some(Token::Equals)) {
                    self.next();
                    let target = Self::assign_target(expr)?;
                    let value = self.pipeline(None)?;
                    Ok(Stmt::Assign { target, value })
                } else {
                    Ok(Stmt::Pipeline(self.pipeline(Some(expr))?))
                }
            }
            None => Err(ParseError::new("expected a statement")),
        }
    }

    fn assign_target(expr: Expr) -> Result<AssignTarget, ParseError> {
        match expr {
            Expr::Variable(name) => Ok(AssignTarget::Variable(name)),
            Expr::Member { base, name } => Ok(AssignTarget::Member { base: *base, name }),
            other => Err(ParseError::new(format!(
                "invalid assignment target: {other:?}"
            ))),
        }
    }

    /// Parse a pipeline, optionally seeded with an already-parsed leading
    /// expression.
    fn pipeline(&mut self, first: Option<Expr>) -> Result<Pipeline, ParseError> {
        let mut elements = Vec::new();
        match first {
            Some(expr) => elements.push(PipelineElement::Expr(expr)),
            None => elements.push(self.pipeline_element(true)?),
        }
        while matches!(self.peek(), Some(Token::Pipe)) {
            self.next();
            elements.push(self.pipeline_element(false)?);
        }
        Ok(Pipeline { elements })
    }

    fn pipeline_element(&mut self, first: bool) -> Result<PipelineElement, ParseError> {
        match self.peek() {
            Some(Token::Bareword(_)) => Ok(PipelineElement::Command(self.command()?)),
            Some(_) if first => Ok(PipelineElement::Expr(self.expression()?)),
            Some(token) => Err(ParseError::new(format!(
                "expected a command after '|', found {token:?}"
            ))),
            None => Err(ParseError::new("expected a pipeline element")),
        }
    }

    fn command(&mut self) -> Result<Command, ParseError> {
        let name = match self.next() {
            Some(Token::Bareword(name)) => name,
            other => return Err(ParseError::new(format!("expected a command name, found {other:?}"))),
        };
        let mut args = Vec::new();
        loop {
            match self.peek() {
                None | Some(Token::Pipe | Token::Newline | Token::Semi) => break,
                Some(Token::Flag(_)) => {
                    if let Some(Token::Flag(flag)) = self.next() {
                        args.push(CommandArg::Flag(flag));
                    }
                }
                Some(Token::Bareword(_)) => {
                    if let Some(Token::Bareword(word)) = self.next() {
                        args.push(CommandArg::Positional(Expr::Literal(Value::String(word))));
                    }
                }
                Some(_) => args.push(CommandArg::Positional(self.expression()?)),
            }
        }
        Ok(Command { name, args })
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        while matches!(self.peek(), Some(Token::Dot)) {
            self.next();
            let name = match self.next() {
                Some(Token::Bareword(name)) => name,
                other => {
                    return Err(ParseError::new(format!(
                        "expected a member name after '.', found {other:?}"
                    )))
                }
            };
            if matches!(self.peek(), Some(Token::LParen)) {
                self.next();
                let args = self.argument_list()?;
                expr = Expr::MethodCall {
                    base: Box::new(expr),
                    name,
                    args,
                };
            } else {
                expr = Expr::Member {
                    base: Box::new(expr),
                    name,
                };
            }
        }
        Ok(expr)
    }

    fn argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if matches!(self.peek(), Some(Token::RParen)) {
            self.next();
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                other => {
                    return Err(ParseError::new(format!(
                        "expected ',' or ')' in argument list, found {other:?}"
                    )))
                }
            }
        }
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.next() {
            Some(Token::Int(i)) => Ok(Expr::Literal(Value::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Value::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Token::Variable(name)) => Ok(Expr::Variable(name)),
            Some(Token::TypeLiteral(raw)) => Ok(Expr::TypeLiteral(raw)),
            Some(Token::HashOpen) => self.hashtable(),
            Some(Token::LParen) => {
                let expr = self.expression()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    other => Err(ParseError::new(format!(
                        "expected ')', found {other:?}"
                    ))),
                }
            }
            other => Err(ParseError::new(format!(
                "expected an expression, found {other:?}"
            ))),
        }
    }

    fn hashtable(&mut self) -> Result<Expr, ParseError> {
        let mut entries = Vec::new();
        loop {
            // Entries may be separated by `;` or newlines; both may trail.
            while matches!(self.peek(), Some(Token::Semi | Token::Newline)) {
                self.next();
            }
            match self.next() {
                Some(Token::RBrace) => break,
                Some(Token::Bareword(key)) | Some(Token::Str(key)) => {
                    match self.next() {
                        Some(Token::Equals) => {}
                        other => {
                            return Err(ParseError::new(format!(
                                "expected '=' after hashtable key, found {other:?}"
                            )))
                        }
                    }
                    entries.push((key, self.expression()?));
                }
                other => {
                    return Err(ParseError::new(format!(
                        "expected a hashtable key or '}}', found {other:?}"
                    )))
                }
            }
        }
        Ok(Expr::HashTable(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Stmt {
        let program = parse(input).expect("parse");
        assert_eq!(program.statements.len(), 1, "expected one statement");
        program.statements.into_iter().next().expect("statement")
    }

    #[test]
    fn parse_variable_assignment() {
        let stmt = parse_one("$a = 5");
        let Stmt::Assign { target, value } = stmt else {
            panic!("expected assignment, got {stmt:?}");
        };
        assert_eq!(target, AssignTarget::Variable("a".into()));
        assert_eq!(
            value.elements,
            vec![PipelineElement::Expr(Expr::Literal(Value::Int(5)))]
        );
    }

    #[test]
    fn parse_member_assignment() {
        let stmt = parse_one("$a.baz = 'd'");
        let Stmt::Assign { target, .. } = stmt else {
            panic!("expected assignment");
        };
        assert_eq!(
            target,
            AssignTarget::Member {
                base: Expr::Variable("a".into()),
                name: "baz".into()
            }
        );
    }

    #[test]
    fn parse_assignment_from_command() {
        let stmt = parse_one("$a = new-object -type psobject");
        let Stmt::Assign { value, .. } = stmt else {
            panic!("expected assignment");
        };
        let PipelineElement::Command(command) = &value.elements[0] else {
            panic!("expected command value");
        };
        assert_eq!(command.name, "new-object");
        assert_eq!(command.args.len(), 2);
    }

    #[test]
    fn parse_member_chain_and_call() {
        let stmt = parse_one("$a.GetType().FullName");
        let Stmt::Pipeline(pipeline) = stmt else {
            panic!("expected pipeline");
        };
        let PipelineElement::Expr(expr) = &pipeline.elements[0] else {
            panic!("expected expression element");
        };
        let Expr::Member { base, name } = expr else {
            panic!("expected member access");
        };
        assert_eq!(name, "FullName");
        assert!(matches!(**base, Expr::MethodCall { .. }));
    }

    #[test]
    fn parse_method_call_arguments() {
        let stmt = parse_one("$a.SetMessages('bla', 'blub')");
        let Stmt::Pipeline(pipeline) = stmt else {
            panic!("expected pipeline");
        };
        let PipelineElement::Expr(Expr::MethodCall { args, .. }) = &pipeline.elements[0] else {
            panic!("expected method call");
        };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn parse_pipeline_with_expression_head() {
        let stmt = parse_one("$a | out-default");
        let Stmt::Pipeline(pipeline) = stmt else {
            panic!("expected pipeline");
        };
        assert_eq!(pipeline.elements.len(), 2);
        assert!(matches!(pipeline.elements[0], PipelineElement::Expr(_)));
        assert!(matches!(pipeline.elements[1], PipelineElement::Command(_)));
    }

    #[test]
    fn parse_expression_not_first_in_pipeline_fails() {
        assert!(parse("write-output 1 | $a").is_err());
    }

    #[test]
    fn parse_throw_with_message() {
        assert_eq!(
            parse_one("throw 'x'"),
            Stmt::Throw(Some(Expr::Literal(Value::String("x".into()))))
        );
    }

    #[test]
    fn parse_exit_with_code() {
        assert_eq!(parse_one("exit 5"), Stmt::Exit(Some(Expr::Literal(Value::Int(5)))));
        assert_eq!(parse_one("exit"), Stmt::Exit(None));
    }

    #[test]
    fn parse_multiple_statements() {
        let program = parse("write-output 1; throw 'x'; write-output 2").expect("parse");
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn parse_hashtable_literal() {
        let stmt = parse_one("$a = @{foo='a';bar='b';baz='c'}");
        let Stmt::Assign { value, .. } = stmt else {
            panic!("expected assignment");
        };
        let PipelineElement::Expr(Expr::HashTable(entries)) = &value.elements[0] else {
            panic!("expected hashtable literal");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, "foo");
    }

    #[test]
    fn parse_command_with_flag_values() {
        let stmt = parse_one("add-member -Type NoteProperty -Name TestName -Value TestValue");
        let Stmt::Pipeline(pipeline) = stmt else {
            panic!("expected pipeline");
        };
        let PipelineElement::Command(command) = &pipeline.elements[0] else {
            panic!("expected command");
        };
        assert_eq!(command.args.len(), 6);
        assert!(matches!(&command.args[0], CommandArg::Flag(f) if f == "Type"));
    }

    #[test]
    fn parse_type_literal_expression() {
        let stmt = parse_one("[int[,]]");
        let Stmt::Pipeline(pipeline) = stmt else {
            panic!("expected pipeline");
        };
        assert_eq!(
            pipeline.elements,
            vec![PipelineElement::Expr(Expr::TypeLiteral("[int[,]]".into()))]
        );
    }

    #[test]
    fn parse_empty_input_is_empty_program() {
        assert!(parse("").expect("parse").statements.is_empty());
        assert!(parse(" \n ; \n").expect("parse").statements.is_empty());
    }
}
