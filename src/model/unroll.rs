//! Equation templating: resolving array subscripts for one index.
//!
//! An equation shared by an array statement refers to elements through
//! subscripts such as `A[j]`, `A[j-1]` or `A[2]`. For a concrete index every
//! subscript is evaluated with `j` bound to that index and rewritten to the
//! expanded element name (`A_3`).

use std::iter::Peekable;
use std::str::Chars;

use crate::dsl::element_name;
use crate::error::{ModelError, Result};

/// Name of the index variable inside subscripts.
pub const INDEX_VAR: &str = "j";

/// Rewrite every subscript in `text` for the given index.
pub fn substitute_index(text: &str, index: i64) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() {
            // Numeric literals (including exponents like 1e5) pass through untouched
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '.' {
                    out.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }

            let mut spaces = String::new();
            while let Some(&c) = chars.peek() {
                if c == ' ' {
                    spaces.push(c);
                    chars.next();
                } else {
                    break;
                }
            }

            if chars.peek() == Some(&'[') {
                chars.next();
                let subscript = read_subscript(&mut chars, &name)?;
                let value = eval_subscript(&subscript, index)?;
                out.push_str(&element_name(&name, value));
            } else {
                out.push_str(&name);
                out.push_str(&spaces);
            }
        } else {
            out.push(ch);
            chars.next();
        }
    }

    Ok(out)
}

fn read_subscript(chars: &mut Peekable<Chars<'_>>, name: &str) -> Result<String> {
    let mut subscript = String::new();
    for c in chars.by_ref() {
        if c == ']' {
            return Ok(subscript);
        }
        subscript.push(c);
    }
    Err(ModelError::BadIndexExpression {
        expression: format!("{}[{}", name, subscript),
        message: "missing ']'".to_string(),
    })
}

/// Evaluate a subscript expression with `j` bound to `index`.
pub fn eval_subscript(expression: &str, index: i64) -> Result<i64> {
    let mut eval = IndexEval {
        source: expression,
        chars: expression.chars().peekable(),
        index,
    };
    let value = eval.expr()?;
    eval.skip_spaces();
    if let Some(c) = eval.chars.peek().copied() {
        return Err(eval.error(format!("unexpected '{}'", c)));
    }
    if value < 0 {
        return Err(eval.error(format!("index evaluates to {}", value)));
    }
    Ok(value)
}

struct IndexEval<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    index: i64,
}

impl IndexEval<'_> {
    fn error(&self, message: impl Into<String>) -> ModelError {
        ModelError::BadIndexExpression {
            expression: self.source.to_string(),
            message: message.into(),
        }
    }

    fn skip_spaces(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expr(&mut self) -> Result<i64> {
        let mut value = self.term()?;
        loop {
            self.skip_spaces();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    let rhs = self.term()?;
                    value = value.checked_add(rhs).ok_or_else(|| self.error("overflow"))?;
                }
                Some('-') => {
                    self.chars.next();
                    let rhs = self.term()?;
                    value = value.checked_sub(rhs).ok_or_else(|| self.error("overflow"))?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<i64> {
        let mut value = self.factor()?;
        loop {
            self.skip_spaces();
            if self.chars.peek() == Some(&'*') {
                self.chars.next();
                let rhs = self.factor()?;
                value = value.checked_mul(rhs).ok_or_else(|| self.error("overflow"))?;
            } else {
                return Ok(value);
            }
        }
    }

    fn factor(&mut self) -> Result<i64> {
        self.skip_spaces();
        match self.chars.peek().copied() {
            Some('-') => {
                self.chars.next();
                let value = self.factor()?;
                value.checked_neg().ok_or_else(|| self.error("overflow"))
            }
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                self.skip_spaces();
                if self.chars.next() != Some(')') {
                    return Err(self.error("missing ')'"));
                }
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&d) = self.chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                digits
                    .parse::<i64>()
                    .map_err(|e| self.error(format!("bad integer '{}': {}", digits, e)))
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&d) = self.chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        name.push(d);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                if name == INDEX_VAR {
                    Ok(self.index)
                } else {
                    Err(self.error(format!("unknown index variable '{}'", name)))
                }
            }
            Some(c) => Err(self.error(format!("unexpected '{}'", c))),
            None => Err(self.error("empty subscript")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(substitute_index("k * (A - B) + 1e5", 0).unwrap(), "k * (A - B) + 1e5");
    }

    #[test]
    fn test_subscripts_resolved() {
        assert_eq!(
            substitute_index("k * A[j] - k * A[j-1]", 3).unwrap(),
            "k * A_3 - k * A_2"
        );
        assert_eq!(substitute_index("V[2] * C [ j * 2 + 1 ]", 4).unwrap(), "V_2 * C_9");
    }

    #[test]
    fn test_negative_index_rejected() {
        assert!(matches!(
            substitute_index("A[j-1]", 0),
            Err(ModelError::BadIndexExpression { .. })
        ));
    }

    #[test]
    fn test_malformed_subscripts() {
        assert!(substitute_index("A[j", 1).is_err());
        assert!(substitute_index("A[i]", 1).is_err());
        assert!(substitute_index("A[]", 1).is_err());
        assert!(substitute_index("A[(j+1]", 1).is_err());
    }

    #[test]
    fn test_eval_subscript() {
        assert_eq!(eval_subscript("j", 7).unwrap(), 7);
        assert_eq!(eval_subscript("-(j - 10)", 4).unwrap(), 6);
        assert_eq!(eval_subscript(" 2*j+1 ", 3).unwrap(), 7);
    }
}
