//! The row-filter query language. A query is a boolean expression over
//! `column op value` comparisons (`&&` binds tighter than `||`); a bare word
//! matches any row with a cell containing it. Comparisons are numeric-aware:
//! when both sides parse as numbers they compare numerically, otherwise as
//! strings. `~` matches the cell against a regular expression.
//!
//! Compiling never touches live state: a failed compile leaves the previously
//! applied filter and visible set in effect.

use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use regex::Regex;

use crate::data::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

#[derive(Debug)]
enum Expr {
    /// `column op value`
    Compare {
        column: usize,
        op: CompareOp,
        value: String,
    },
    /// `column ~ pattern`
    Match { column: usize, regex: Regex },
    /// Bare word: substring match against every cell of the row.
    Any(String),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

/// A compiled row predicate, kept together with its source text so the filter
/// prompt can be re-opened with the active query.
#[derive(Debug)]
pub struct Filter {
    pub query: String,
    expr: Expr,
}

impl Filter {
    pub fn compile(query: &str, columns: &[Column]) -> Result<Self> {
        let tokens = tokenize(query)?;
        let mut parser = Parser {
            tokens: tokens.into_iter().peekable(),
            columns,
        };
        let expr = parser.or_expr()?;
        if let Some(tok) = parser.tokens.next() {
            bail!("unexpected trailing input: {}", tok.describe());
        }
        Ok(Self {
            query: query.to_string(),
            expr,
        })
    }

    pub fn matches(&self, row: &[String]) -> bool {
        eval(&self.expr, row)
    }
}

/// Scan all rows in original order and keep the indices the filter accepts.
/// `None` means match-all.
pub fn apply(filter: Option<&Filter>, rows: &[Vec<String>]) -> Vec<usize> {
    match filter {
        None => (0..rows.len()).collect(),
        Some(f) => rows
            .iter()
            .enumerate()
            .filter(|(_, row)| f.matches(row))
            .map(|(i, _)| i)
            .collect(),
    }
}

fn eval(expr: &Expr, row: &[String]) -> bool {
    match expr {
        Expr::Compare { column, op, value } => {
            let cell = row.get(*column).map(String::as_str).unwrap_or("");
            compare(cell, *op, value)
        }
        Expr::Match { column, regex } => {
            let cell = row.get(*column).map(String::as_str).unwrap_or("");
            regex.is_match(cell)
        }
        Expr::Any(needle) => row.iter().any(|cell| cell.contains(needle.as_str())),
        Expr::And(terms) => terms.iter().all(|t| eval(t, row)),
        Expr::Or(terms) => terms.iter().any(|t| eval(t, row)),
    }
}

fn compare(cell: &str, op: CompareOp, value: &str) -> bool {
    let ordering = match (cell.trim().parse::<f64>(), value.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b),
        _ => Some(cell.cmp(value)),
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        CompareOp::Eq => ordering.is_eq(),
        CompareOp::NotEq => !ordering.is_eq(),
        CompareOp::Gt => ordering.is_gt(),
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::GtEq => ordering.is_ge(),
        CompareOp::LtEq => ordering.is_le(),
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Op(CompareOp),
    Tilde,
    AndAnd,
    OrOr,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Op(_) | Token::Tilde => "operator".to_string(),
            Token::AndAnd => "'&&'".to_string(),
            Token::OrOr => "'||'".to_string(),
        }
    }
}

fn tokenize(query: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = query.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '&' => {
                chars.next();
                if chars.next() != Some('&') {
                    bail!("expected '&&'");
                }
                tokens.push(Token::AndAnd);
            }
            '|' => {
                chars.next();
                if chars.next() != Some('|') {
                    bail!("expected '||'");
                }
                tokens.push(Token::OrOr);
            }
            '=' => {
                chars.next();
                if chars.next() != Some('=') {
                    bail!("expected '=='");
                }
                tokens.push(Token::Op(CompareOp::Eq));
            }
            '!' => {
                chars.next();
                if chars.next() != Some('=') {
                    bail!("expected '!='");
                }
                tokens.push(Token::Op(CompareOp::NotEq));
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Op(CompareOp::GtEq));
                } else {
                    tokens.push(Token::Op(CompareOp::Gt));
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Op(CompareOp::LtEq));
                } else {
                    tokens.push(Token::Op(CompareOp::Lt));
                }
            }
            '~' => {
                chars.next();
                tokens.push(Token::Tilde);
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => word.push(c),
                        None => bail!("unterminated quoted string"),
                    }
                }
                tokens.push(Token::Word(word));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || "&|=!<>~\"'".contains(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: std::iter::Peekable<std::vec::IntoIter<Token>>,
    columns: &'a [Column],
}

impl Parser<'_> {
    fn or_expr(&mut self) -> Result<Expr> {
        let mut terms = vec![self.and_expr()?];
        while self.tokens.peek() == Some(&Token::OrOr) {
            self.tokens.next();
            terms.push(self.and_expr()?);
        }
        Ok(if terms.len() == 1 {
            terms.pop().unwrap()
        } else {
            Expr::Or(terms)
        })
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut terms = vec![self.term()?];
        while self.tokens.peek() == Some(&Token::AndAnd) {
            self.tokens.next();
            terms.push(self.term()?);
        }
        Ok(if terms.len() == 1 {
            terms.pop().unwrap()
        } else {
            Expr::And(terms)
        })
    }

    fn term(&mut self) -> Result<Expr> {
        let word = match self.tokens.next() {
            Some(Token::Word(w)) => w,
            Some(tok) => bail!("expected column name or text, found {}", tok.describe()),
            None => bail!("expected column name or text"),
        };

        match self.tokens.peek() {
            Some(Token::Op(_)) | Some(Token::Tilde) => {}
            _ => return Ok(Expr::Any(word)),
        }

        let column = self
            .columns
            .iter()
            .position(|c| c.name == word)
            .ok_or_else(|| eyre!("unknown column: {}", word))?;

        match self.tokens.next() {
            Some(Token::Op(op)) => {
                let value = match self.tokens.next() {
                    Some(Token::Word(w)) => w,
                    _ => bail!("expected value after operator"),
                };
                Ok(Expr::Compare { column, op, value })
            }
            Some(Token::Tilde) => {
                let pattern = match self.tokens.next() {
                    Some(Token::Word(w)) => w,
                    _ => bail!("expected pattern after '~'"),
                };
                let regex = Regex::new(&pattern)?;
                Ok(Expr::Match { column, regex })
            }
            _ => unreachable!("peeked an operator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn columns() -> Vec<Column> {
        vec![Column::new("name"), Column::new("age")]
    }

    fn row(name: &str, age: &str) -> Vec<String> {
        vec![name.to_string(), age.to_string()]
    }

    #[test]
    fn test_numeric_comparison() {
        let f = Filter::compile("age > 9", &columns()).unwrap();
        assert!(f.matches(&row("alice", "10")));
        assert!(!f.matches(&row("bob", "9")));
        // "10" < "9" lexicographically; numeric parsing must win.
        assert!(f.matches(&row("carol", "100")));
    }

    #[test]
    fn test_string_comparison() {
        let f = Filter::compile("name == alice", &columns()).unwrap();
        assert!(f.matches(&row("alice", "1")));
        assert!(!f.matches(&row("bob", "1")));
    }

    #[test]
    fn test_bareword_matches_any_cell() {
        let f = Filter::compile("ali", &columns()).unwrap();
        assert!(f.matches(&row("alice", "3")));
        assert!(!f.matches(&row("bob", "3")));
    }

    #[test]
    fn test_boolean_operators_precedence() {
        let f = Filter::compile("name == bob || name == alice && age >= 18", &columns()).unwrap();
        assert!(f.matches(&row("bob", "1")));
        assert!(f.matches(&row("alice", "20")));
        assert!(!f.matches(&row("alice", "2")));
    }

    #[test]
    fn test_regex_operator() {
        let f = Filter::compile("name ~ ^a.*e$", &columns()).unwrap();
        assert!(f.matches(&row("alice", "1")));
        assert!(!f.matches(&row("abe1", "1")));
    }

    #[test]
    fn test_quoted_values() {
        let f = Filter::compile("name == \"mary anne\"", &columns()).unwrap();
        assert!(f.matches(&row("mary anne", "1")));
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        assert!(Filter::compile("height > 3", &columns()).is_err());
    }

    #[test]
    fn test_malformed_queries_are_errors() {
        assert!(Filter::compile("age >", &columns()).is_err());
        assert!(Filter::compile("age = 3", &columns()).is_err());
        assert!(Filter::compile("name == a || ", &columns()).is_err());
        assert!(Filter::compile("name ~ [", &columns()).is_err());
    }

    #[test]
    fn test_apply_preserves_order_and_subset() {
        let rows = vec![row("a", "1"), row("b", "2"), row("a", "3")];
        assert_eq!(apply(None, &rows), vec![0, 1, 2]);
        let f = Filter::compile("name == a", &columns()).unwrap();
        assert_eq!(apply(Some(&f), &rows), vec![0, 2]);
    }
}
