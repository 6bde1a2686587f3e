//! Recursive-descent parser for condition expressions.
//!
//! Precedence, lowest first: `||`, `&&`, equality, relational, unary,
//! member access.

use serde_json::Value;

use super::ConditionError;
use super::lexer::Token;

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Short-circuiting operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalOp {
    And,
    Or,
}

/// Parsed condition expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Undefined,
    Literal(Value),
    Number(f64),
    Ident(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
}

/// Parse a token stream into a single expression.
pub(crate) fn parse(tokens: &[Token]) -> Result<Expr, ConditionError> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.logical_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ConditionError::UnexpectedToken(token.describe())),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ConditionError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ConditionError::UnexpectedToken(token.describe())),
            None => Err(ConditionError::UnexpectedEnd),
        }
    }

    fn logical_or(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.logical_and()?;
        while self.eat(&Token::Or) {
            let right = self.logical_and()?;
            left = Expr::Logical(LogicalOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.equality()?;
        while self.eat(&Token::And) {
            let right = self.equality()?;
            left = Expr::Logical(LogicalOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                Some(Token::StrictEq) => BinaryOp::StrictEq,
                Some(Token::StrictNotEq) => BinaryOp::StrictNotEq,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.relational()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn relational(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, ConditionError> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ConditionError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&Token::Dot) {
                match self.advance() {
                    Some(Token::Ident(name)) => {
                        expr = Expr::Member(Box::new(expr), name.clone());
                    }
                    Some(token) => return Err(ConditionError::UnexpectedToken(token.describe())),
                    None => return Err(ConditionError::UnexpectedEnd),
                }
            } else if self.eat(&Token::LBracket) {
                let index = self.logical_or()?;
                self.expect(&Token::RBracket)?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ConditionError> {
        let Some(token) = self.advance() else {
            return Err(ConditionError::UnexpectedEnd);
        };

        let expr = match token {
            Token::Number(n) => Expr::Number(*n),
            Token::Str(s) => Expr::Literal(Value::String(s.clone())),
            Token::Ident(name) => match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Undefined,
                _ => Expr::Ident(name.clone()),
            },
            Token::LParen => {
                let inner = self.logical_or()?;
                self.expect(&Token::RParen)?;
                inner
            }
            Token::LBracket => self.array()?,
            Token::LBrace => self.object()?,
            other => return Err(ConditionError::UnexpectedToken(other.describe())),
        };
        Ok(expr)
    }

    /// Array literal, after `[`.
    fn array(&mut self) -> Result<Expr, ConditionError> {
        let mut items = Vec::new();
        if self.eat(&Token::RBracket) {
            return Ok(Expr::Array(items));
        }
        loop {
            items.push(self.logical_or()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RBracket)?;
            return Ok(Expr::Array(items));
        }
    }

    /// Object literal, after `{`.
    fn object(&mut self) -> Result<Expr, ConditionError> {
        let mut entries = Vec::new();
        if self.eat(&Token::RBrace) {
            return Ok(Expr::Object(entries));
        }
        loop {
            let key = match self.advance() {
                Some(Token::Str(key) | Token::Ident(key)) => key.clone(),
                Some(Token::Number(n)) => n.to_string(),
                Some(token) => return Err(ConditionError::UnexpectedToken(token.describe())),
                None => return Err(ConditionError::UnexpectedEnd),
            };
            self.expect(&Token::Colon)?;
            entries.push((key, self.logical_or()?));
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RBrace)?;
            return Ok(Expr::Object(entries));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::super::lexer::tokenize;
    use super::*;

    fn parse_str(input: &str) -> Result<Expr, ConditionError> {
        parse(&tokenize(input)?)
    }

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(name.to_owned()))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_str("a || b && c").unwrap(),
            Expr::Logical(
                LogicalOp::Or,
                ident("a"),
                Box::new(Expr::Logical(LogicalOp::And, ident("b"), ident("c")))
            )
        );
    }

    #[test]
    fn test_comparison_binds_tighter_than_equality() {
        assert_eq!(
            parse_str("a < b == true").unwrap(),
            Expr::Binary(
                BinaryOp::Eq,
                Box::new(Expr::Binary(BinaryOp::Lt, ident("a"), ident("b"))),
                Box::new(Expr::Literal(json!(true)))
            )
        );
    }

    #[test]
    fn test_member_and_index() {
        assert_eq!(
            parse_str(r#"post.tags["x"].length"#).unwrap(),
            Expr::Member(
                Box::new(Expr::Index(
                    Box::new(Expr::Member(ident("post"), "tags".to_owned())),
                    Box::new(Expr::Literal(json!("x")))
                )),
                "length".to_owned()
            )
        );
    }

    #[test]
    fn test_unary() {
        assert_eq!(
            parse_str("!-x").unwrap(),
            Expr::Not(Box::new(Expr::Neg(ident("x"))))
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_str("undefined").unwrap(), Expr::Undefined);
        assert_eq!(parse_str("null").unwrap(), Expr::Literal(Value::Null));
        assert_eq!(
            parse_str(r#"[1, "a", {"k": true}]"#).unwrap(),
            Expr::Array(vec![
                Expr::Number(1.0),
                Expr::Literal(json!("a")),
                Expr::Object(vec![("k".to_owned(), Expr::Literal(json!(true)))]),
            ])
        );
        assert_eq!(parse_str("{}").unwrap(), Expr::Object(vec![]));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_str("a &&"), Err(ConditionError::UnexpectedEnd)));
        assert!(matches!(
            parse_str("(a"),
            Err(ConditionError::UnexpectedEnd)
        ));
        assert!(matches!(
            parse_str("a b"),
            Err(ConditionError::UnexpectedToken(t)) if t == "b"
        ));
        assert!(matches!(
            parse_str("{a}"),
            Err(ConditionError::UnexpectedToken(t)) if t == "}"
        ));
    }
}
