// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile activation expressions.
//!
//! A YAML document can restrict itself to some profiles with an expression such
//! as `dev`, `dev,qa`, `!prod` or `(eu | us) & prod`. A comma-separated list
//! matches when any of its items matches. Inside one item `!` binds tightest,
//! then `&`, then `|`.

use crate::domain::errors::{ConfigError, Result};

/// The profile that is considered active when no profile is active.
pub const DEFAULT_PROFILE: &str = "default";

/// Maximum nesting of parentheses and negations in one expression.
const MAX_EXPRESSION_DEPTH: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Expr {
    Profile(String),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    fn matches(&self, active: &[&str]) -> bool {
        match self {
            Expr::Profile(name) => active.contains(&name.as_str()),
            Expr::Not(inner) => !inner.matches(active),
            Expr::And(items) => items.iter().all(|e| e.matches(active)),
            Expr::Or(items) => items.iter().any(|e| e.matches(active)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Not,
    Name(String),
}

/// A parsed profile activation expression.
///
/// # Examples
///
/// ```
/// use k8scfg::domain::ProfileExpression;
///
/// let expression = ProfileExpression::parse("dev & !eu").unwrap();
/// assert!(expression.matches(&["dev".to_string()]));
/// assert!(!expression.matches(&["dev".to_string(), "eu".to_string()]));
///
/// // with no active profile, only `default` is active
/// let expression = ProfileExpression::parse("default").unwrap();
/// assert!(expression.matches(&[]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileExpression {
    alternatives: Vec<Expr>,
}

impl ProfileExpression {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ProfileExpressionError`] for empty or malformed input.
    pub fn parse(expression: &str) -> Result<Self> {
        let mut alternatives = Vec::new();
        for item in expression.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let tokens = tokenize(item);
            let mut parser = Parser {
                tokens: &tokens,
                position: 0,
                depth: 0,
                expression,
            };
            let parsed = parser.parse_or()?;
            if parser.position != tokens.len() {
                return Err(parser.error("unexpected trailing input"));
            }
            alternatives.push(parsed);
        }

        if alternatives.is_empty() {
            return Err(ConfigError::ProfileExpressionError {
                expression: expression.to_string(),
                message: "expression is empty".to_string(),
            });
        }

        Ok(Self { alternatives })
    }

    /// Returns `true` if the expression accepts the active profiles.
    ///
    /// An empty active list is treated as only [`DEFAULT_PROFILE`] being active.
    pub fn matches(&self, active_profiles: &[String]) -> bool {
        let active: Vec<&str> = if active_profiles.is_empty() {
            vec![DEFAULT_PROFILE]
        } else {
            active_profiles.iter().map(String::as_str).collect()
        };
        self.alternatives.iter().any(|e| e.matches(&active))
    }
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut name = String::new();

    for c in input.chars() {
        let token = match c {
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            '&' => Some(Token::And),
            '|' => Some(Token::Or),
            '!' => Some(Token::Not),
            c if c.is_whitespace() => None,
            c => {
                name.push(c);
                continue;
            }
        };
        if !name.is_empty() {
            tokens.push(Token::Name(std::mem::take(&mut name)));
        }
        if let Some(token) = token {
            tokens.push(token);
        }
    }
    if !name.is_empty() {
        tokens.push(Token::Name(name));
    }
    tokens
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
    expression: &'a str,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> ConfigError {
        ConfigError::ProfileExpressionError {
            expression: self.expression.to_string(),
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.position += 1;
            items.push(self.parse_and()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::Or(items)
        })
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::And) {
            self.position += 1;
            items.push(self.parse_unary()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::And(items)
        })
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| self.error("unexpected end of expression"))?;
        self.position += 1;

        match token {
            Token::Not => {
                self.enter()?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                Ok(Expr::Not(Box::new(inner)))
            }
            Token::Open => {
                self.enter()?;
                let inner = self.parse_or()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(self.error("missing closing parenthesis"));
                }
                self.position += 1;
                self.depth -= 1;
                Ok(inner)
            }
            Token::Name(name) => Ok(Expr::Profile(name)),
            Token::Close | Token::And | Token::Or => Err(self.error("expected a profile name")),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(self.error(&format!(
                "expression nested too deeply (max {} levels)",
                MAX_EXPRESSION_DEPTH
            )));
        }
        Ok(())
    }
}
