//! Condition expression tokenizer.

use std::iter::Peekable;
use std::str::CharIndices;

use super::ConditionError;

/// Token of a condition expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Not,
    Minus,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl Token {
    /// Source text of the token, for error messages.
    pub(crate) fn describe(&self) -> String {
        let text = match self {
            Self::Number(n) => return n.to_string(),
            Self::Str(s) => return format!("{s:?}"),
            Self::Ident(name) => return name.clone(),
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Not => "!",
            Self::Minus => "-",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::StrictEq => "===",
            Self::StrictNotEq => "!==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        };
        text.to_owned()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Split an expression into tokens.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ConditionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match c {
            '0'..='9' => lex_number(input, &mut chars)?,
            '"' | '\'' => lex_string(&mut chars, pos)?,
            c if is_ident_start(c) => {
                let mut end = pos;
                while let Some(&(i, c)) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                Token::Ident(input[pos..end].to_owned())
            }
            _ => {
                chars.next();
                lex_operator(c, pos, &mut chars)?
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn lex_operator(
    c: char,
    pos: usize,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<Token, ConditionError> {
    let mut next_is = |expected: char| chars.next_if(|&(_, n)| n == expected).is_some();

    let token = match c {
        '(' => Token::LParen,
        ')' => Token::RParen,
        '[' => Token::LBracket,
        ']' => Token::RBracket,
        '{' => Token::LBrace,
        '}' => Token::RBrace,
        ',' => Token::Comma,
        ':' => Token::Colon,
        '.' => Token::Dot,
        '-' => Token::Minus,
        '!' if next_is('=') => {
            if next_is('=') {
                Token::StrictNotEq
            } else {
                Token::NotEq
            }
        }
        '!' => Token::Not,
        '=' if next_is('=') => {
            if next_is('=') {
                Token::StrictEq
            } else {
                Token::Eq
            }
        }
        '<' if next_is('=') => Token::Le,
        '<' => Token::Lt,
        '>' if next_is('=') => Token::Ge,
        '>' => Token::Gt,
        '&' if next_is('&') => Token::And,
        '|' if next_is('|') => Token::Or,
        _ => return Err(ConditionError::UnexpectedChar { ch: c, pos }),
    };
    Ok(token)
}

fn lex_number(input: &str, chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, ConditionError> {
    let start = chars.peek().map_or(input.len(), |&(i, _)| i);
    let mut end = start;
    let mut seen_dot = false;
    let mut seen_exp = false;

    while let Some(&(i, c)) = chars.peek() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot && !seen_exp => {
                // `1.length` style member access is not a fraction
                let fraction = input[i + 1..].starts_with(|n: char| n.is_ascii_digit());
                if !fraction {
                    break;
                }
                seen_dot = true;
            }
            'e' | 'E' if !seen_exp => {
                let rest = &input[i + 1..];
                let rest = rest.strip_prefix(['+', '-']).unwrap_or(rest);
                if !rest.starts_with(|n: char| n.is_ascii_digit()) {
                    break;
                }
                seen_exp = true;
                chars.next();
                end = i + 1;
                if let Some((j, sign)) = chars.next_if(|&(_, n)| n == '+' || n == '-') {
                    end = j + sign.len_utf8();
                }
                continue;
            }
            _ => break,
        }
        end = i + c.len_utf8();
        chars.next();
    }

    let text = &input[start..end];
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| ConditionError::InvalidNumber(text.to_owned()))
}

fn lex_string(chars: &mut Peekable<CharIndices<'_>>, pos: usize) -> Result<Token, ConditionError> {
    let Some((_, quote)) = chars.next() else {
        return Err(ConditionError::UnterminatedString { pos });
    };
    let mut value = String::new();

    loop {
        let Some((_, c)) = chars.next() else {
            return Err(ConditionError::UnterminatedString { pos });
        };
        match c {
            c if c == quote => return Ok(Token::Str(value)),
            '\\' => {
                let Some((at, escaped)) = chars.next() else {
                    return Err(ConditionError::UnterminatedString { pos });
                };
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    '0' => value.push('\0'),
                    'u' => value.push(lex_unicode_escape(chars, at)?),
                    other => value.push(other),
                }
            }
            c => value.push(c),
        }
    }
}

fn lex_unicode_escape(
    chars: &mut Peekable<CharIndices<'_>>,
    pos: usize,
) -> Result<char, ConditionError> {
    let mut code = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|(_, c)| c.to_digit(16))
            .ok_or(ConditionError::InvalidEscape { pos })?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or(ConditionError::InvalidEscape { pos })
}
