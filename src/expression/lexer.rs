use std::rc::Rc;

use super::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(Rc<str>),
    Ident(Rc<str>),
    Punct(&'static str),
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

// Longest first, so `===` is not read as `==` followed by `=`.
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "!", "<", ">", "+", "-", "*", "/", "%", "(",
    ")", "[", "]", ".", ",", "?", ":",
];

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = if c.is_ascii_digit() {
            let mut end = offset;
            while let Some(&(i, c)) = chars.peek() {
                if !(c.is_ascii_digit() || c == '.') {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            let text = &source[offset..end];
            let number = text
                .parse::<f64>()
                .map_err(|_| ParseError::new(format!("invalid number `{text}`"), offset))?;
            Token::Number(number)
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some((_, q)) if q == c => break,
                    Some((i, '\\')) => match chars.next() {
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, 't')) => text.push('\t'),
                        Some((_, other)) => text.push(other),
                        None => return Err(ParseError::new("unterminated escape", i)),
                    },
                    Some((_, other)) => text.push(other),
                    None => return Err(ParseError::new("unterminated string", offset)),
                }
            }
            Token::Str(text.into())
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let mut end = offset;
            while let Some(&(i, c)) = chars.peek() {
                if !(c.is_alphanumeric() || c == '_' || c == '$') {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            Token::Ident(source[offset..end].into())
        } else {
            let rest = &source[offset..];
            let punct = PUNCTUATION
                .iter()
                .find(|p| rest.starts_with(**p))
                .ok_or_else(|| ParseError::new(format!("unexpected character `{c}`"), offset))?;
            for _ in 0..punct.len() {
                chars.next();
            }
            Token::Punct(punct)
        };

        tokens.push(Spanned { token, offset });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: source.len(),
    });
    Ok(tokens)
}
