//! Lexer/tokenizer for WHERE clauses.

use winnow::ascii::digit1;
use winnow::combinator::{alt, delimited, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

/// Token types for the WHERE-clause grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Words are classified as keywords or identifiers by the parser
    Word(String),
    QuotedIdent(String), // `field name`
    Number(String),      // numeric literal, verbatim
    Str(String),         // string literal, delimiters included

    // Comparison operators, verbatim so the translator can reject spellings
    Compare(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,

    // Punctuation
    LParen,
    RParen,
    Comma,

    // End of input
    Eof,
}

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, ErrMode<ContextError>>;

/// Lex a bare word: letters, digits, underscore, and dots for qualified names.
fn lex_word(input: &mut &str) -> PResult<Token> {
    (
        one_of(|c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_' || c == '.'),
    )
        .take()
        .map(|s: &str| Token::Word(s.to_string()))
        .parse_next(input)
}

/// Lex a backtick-quoted identifier.
fn lex_quoted_ident(input: &mut &str) -> PResult<Token> {
    delimited('`', take_while(0.., |c: char| c != '`'), '`')
        .map(|s: &str| Token::QuotedIdent(s.to_string()))
        .parse_next(input)
}

/// Lex an unsigned number with optional fraction and exponent.
fn lex_number(input: &mut &str) -> PResult<Token> {
    (
        digit1,
        opt(('.', take_while(0.., |c: char| c.is_ascii_digit()))),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .map(|s: &str| Token::Number(s.to_string()))
        .parse_next(input)
}

/// Lex a quoted string. A doubled delimiter stands for one literal quote.
fn lex_string(input: &mut &str) -> PResult<Token> {
    let Some(quote) = input.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return Err(ErrMode::Backtrack(ContextError::new()));
    };
    let body = &input[1..];

    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != quote {
            continue;
        }
        if chars.peek().is_some_and(|&(_, next)| next == quote) {
            chars.next();
            continue;
        }
        let token = Token::Str(format!("{quote}{}{quote}", &body[..i]));
        *input = &body[i + 1..];
        return Ok(token);
    }

    // Unterminated literal: no other token can start with a quote
    Err(ErrMode::Cut(ContextError::new()))
}

fn lex_compare(input: &mut &str) -> PResult<Token> {
    alt((
        // Longest spellings first
        "===", "!==", "<=>", "==", "!=", "<>", ">=", "<=", "=", ">", "<",
    ))
    .map(|op: &str| Token::Compare(op.to_string()))
    .parse_next(input)
}

fn lex_punct(input: &mut &str) -> PResult<Token> {
    alt((
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        ",".value(Token::Comma),
        "+".value(Token::Plus),
        "-".value(Token::Minus),
        "*".value(Token::Star),
        "/".value(Token::Slash),
    ))
    .parse_next(input)
}

/// Lex a single token.
fn lex_token(input: &mut &str) -> PResult<Token> {
    *input = input.trim_start();

    if input.is_empty() {
        return Ok(Token::Eof);
    }

    alt((
        lex_compare,
        lex_punct,
        lex_number,
        lex_string,
        lex_quoted_ident,
        lex_word,
    ))
    .parse_next(input)
}

/// Tokenize the entire input.
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        match lex_token(&mut remaining) {
            Ok(Token::Eof) => break,
            Ok(tok) => tokens.push(tok),
            Err(_) if remaining.starts_with(['\'', '"']) => {
                return Err(format!("Unterminated string literal at '{}'", remaining));
            }
            Err(e) => return Err(format!("Lexer error at '{}': {:?}", remaining, e)),
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.into())
    }

    #[test]
    fn test_simple_comparison() {
        let tokens = tokenize("pop > 150").unwrap();
        assert_eq!(
            tokens,
            vec![
                word("pop"),
                Token::Compare(">".into()),
                Token::Number("150".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_equality_spellings() {
        let tokens = tokenize("a===1 b!==2 c<>3 d<=4").unwrap();
        let ops: Vec<_> = tokens
            .into_iter()
            .filter_map(|t| match t {
                Token::Compare(op) => Some(op),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec!["===", "!==", "<>", "<="]);
    }

    #[test]
    fn test_string_literals_keep_delimiters() {
        let tokens = tokenize(r#"n = 'Al%' OR m = "x""#).unwrap();
        assert_eq!(tokens[2], Token::Str("'Al%'".into()));
        assert_eq!(tokens[6], Token::Str("\"x\"".into()));
    }

    #[test]
    fn test_doubled_quote_stays_inside_literal() {
        let tokens = tokenize("name = 'O''Brien'").unwrap();
        assert_eq!(tokens[2], Token::Str("'O''Brien'".into()));
        assert_eq!(tokens[3], Token::Eof);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("name = 'open").unwrap_err();
        assert!(err.contains("Unterminated"));
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("1.5 2e3 10").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number("1.5".into()),
                Token::Number("2e3".into()),
                Token::Number("10".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_function_call_and_list() {
        let tokens = tokenize("UPPER(name) IN ('A', `my field`)").unwrap();
        assert_eq!(
            tokens,
            vec![
                word("UPPER"),
                Token::LParen,
                word("name"),
                Token::RParen,
                word("IN"),
                Token::LParen,
                Token::Str("'A'".into()),
                Token::Comma,
                Token::QuotedIdent("my field".into()),
                Token::RParen,
                Token::Eof,
            ]
        );
    }
}
