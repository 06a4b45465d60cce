//! Constrained arithmetic evaluator for duration fields.
//!
//! Grammar, over `f64`:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! number := digits ['.' digits] | '.' digits
//! ```
//!
//! `×` and `÷` are accepted for `*` and `/`. Anything else is rejected.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character {ch:?} at {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("malformed number at {0}")]
    BadNumber(usize),

    #[error("result is not a finite number")]
    NotFinite,
}

/// Maps the typographic operators onto their ASCII forms.
pub fn replace_aliases(text: &str) -> String {
    text.replace('×', "*").replace('÷', "/")
}

pub fn evaluate(text: &str) -> Result<f64, ExprError> {
    let chars: Vec<char> = replace_aliases(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if chars.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser { chars, pos: 0 };
    let value = parser.expr()?;
    if let Some(&ch) = parser.chars.get(parser.pos) {
        return Err(ExprError::UnexpectedChar { pos: parser.pos, ch });
    }
    if !value.is_finite() {
        return Err(ExprError::NotFinite);
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            if op == '+' {
                acc += rhs;
            } else {
                acc -= rhs;
            }
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == '*' {
                acc *= rhs;
            } else {
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    fn factor(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some('+') => {
                self.pos += 1;
                self.factor()
            }
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(ch) => Err(ExprError::UnexpectedChar { pos: self.pos, ch }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.number(),
            Some(ch) => Err(ExprError::UnexpectedChar { pos: self.pos, ch }),
        }
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.pos += 1;
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        if literal == "." {
            return Err(ExprError::BadNumber(start));
        }
        literal.parse::<f64>().map_err(|_| ExprError::BadNumber(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(evaluate("42"), Ok(42.0));
        assert_eq!(evaluate(" 1.5 "), Ok(1.5));
        assert_eq!(evaluate(".5"), Ok(0.5));
        assert_eq!(evaluate("5."), Ok(5.0));
        assert_eq!(evaluate("007"), Ok(7.0));
    }

    #[test]
    fn test_precedence_and_parens() {
        assert_eq!(evaluate("2*30"), Ok(60.0));
        assert_eq!(evaluate("1+2*3"), Ok(7.0));
        assert_eq!(evaluate("(1+2)*3"), Ok(9.0));
        assert_eq!(evaluate("10-4-3"), Ok(3.0));
        assert_eq!(evaluate("90/2/3"), Ok(15.0));
        assert_eq!(evaluate("-(3+2)"), Ok(-5.0));
        assert_eq!(evaluate("--4"), Ok(4.0));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(evaluate("2×30"), Ok(60.0));
        assert_eq!(evaluate("90÷4"), Ok(22.5));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(evaluate(""), Err(ExprError::Empty));
        assert_eq!(evaluate("   "), Err(ExprError::Empty));
        assert_eq!(evaluate("2*"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("(1+2"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("1+2)"), Err(ExprError::UnexpectedChar { pos: 3, ch: ')' }));
        assert_eq!(evaluate("1.2.3"), Err(ExprError::UnexpectedChar { pos: 3, ch: '.' }));
        assert_eq!(evaluate("."), Err(ExprError::BadNumber(0)));
        assert_eq!(evaluate("()"), Err(ExprError::UnexpectedChar { pos: 1, ch: ')' }));
    }

    #[test]
    fn test_rejects_code() {
        assert!(matches!(evaluate("alert(1)"), Err(ExprError::UnexpectedChar { pos: 0, .. })));
        assert!(evaluate("2**3").is_err());
        assert!(evaluate("1e3").is_err());
        assert!(evaluate("12abc").is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(evaluate("1/0"), Err(ExprError::NotFinite));
        assert_eq!(evaluate("0/0"), Err(ExprError::NotFinite));
    }
}
