//! Lexer for opsh source code.
//!
//! Converts source text into a stream of tokens using the logos lexer
//! generator. The surface is deliberately small: variables, literals,
//! member access, command words, flags, pipes, type literals, and
//! hashtable literals.
//!
//! Type literals are lexed as a single token (`[int]`, `[int[,]]`,
//! `[Some.Generic[int]]`) and split later by the type-name resolver; the
//! lexer only needs to find the closing bracket, one nesting level deep.

use logos::Logos;

/// A token with its byte span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

fn unquote(slice: &str) -> String {
    slice[1..slice.len() - 1].to_string()
}

/// Tokens of the opsh surface grammar.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("\n")]
    Newline,
    #[token(";")]
    Semi,
    #[token("|")]
    Pipe,
    #[token("=")]
    Equals,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("@{")]
    HashOpen,
    #[token("throw")]
    Throw,
    #[token("exit")]
    Exit,

    /// `$name`, without the sigil.
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Variable(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'[^']*'", |lex| unquote(lex.slice()))]
    Str(String),

    /// A bracketed type literal, outer brackets included.
    #[regex(r"\[[^\[\]]*(?:\[[^\[\]]*\][^\[\]]*)*\]", |lex| lex.slice().to_string())]
    TypeLiteral(String),

    /// `-name`, without the dash.
    #[regex(r"-[A-Za-z][A-Za-z0-9-]*", |lex| lex.slice()[1..].to_string())]
    Flag(String),

    /// Command names and bare string arguments.
    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*", |lex| lex.slice().to_string())]
    Bareword(String),
}

/// Tokenize a source fragment.
///
/// Returns the token stream with spans, or a message describing the first
/// unrecognized character.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, String> {
    let mut lexer = Token::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(Spanned {
                token,
                span: lexer.span(),
            }),
            Err(()) => {
                return Err(format!(
                    "unexpected character {:?} at offset {}",
                    &input[lexer.span()],
                    lexer.span().start
                ));
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn lex_member_chain() {
        assert_eq!(
            kinds("$a.testname"),
            vec![
                Token::Variable("a".into()),
                Token::Dot,
                Token::Bareword("testname".into()),
            ]
        );
    }

    #[test]
    fn lex_command_with_flag() {
        assert_eq!(
            kinds("write-host -nonewline"),
            vec![
                Token::Bareword("write-host".into()),
                Token::Flag("nonewline".into()),
            ]
        );
    }

    #[test]
    fn lex_type_literal_whole() {
        assert_eq!(kinds("[int[,]]"), vec![Token::TypeLiteral("[int[,]]".into())]);
        assert_eq!(
            kinds("[SomeGeneric[int]]"),
            vec![Token::TypeLiteral("[SomeGeneric[int]]".into())]
        );
    }

    #[test]
    fn lex_negative_int_is_not_a_flag() {
        assert_eq!(kinds("-42"), vec![Token::Int(-42)]);
    }

    #[test]
    fn lex_keywords_beat_barewords() {
        assert_eq!(
            kinds("throw exit exits"),
            vec![Token::Throw, Token::Exit, Token::Bareword("exits".into())]
        );
    }

    #[test]
    fn lex_hashtable_literal() {
        assert_eq!(
            kinds("@{foo='a';bar=2}"),
            vec![
                Token::HashOpen,
                Token::Bareword("foo".into()),
                Token::Equals,
                Token::Str("a".into()),
                Token::Semi,
                Token::Bareword("bar".into()),
                Token::Equals,
                Token::Int(2),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn lex_strings_both_quote_styles() {
        assert_eq!(
            kinds(r#"'hello' "world""#),
            vec![Token::Str("hello".into()), Token::Str("world".into())]
        );
    }

    #[test]
    fn lex_comments_are_skipped() {
        assert_eq!(
            kinds("exit 5 # done"),
            vec![Token::Exit, Token::Int(5)]
        );
    }

    #[test]
    fn lex_rejects_stray_characters() {
        assert!(tokenize("write-output ^").is_err());
    }
}
