//! Stochastic-expression literals
//!
//! Rendered between guillemets so the converter reads them as literal expressions
//! rather than identifiers: `«42»`, `«12.5»`, `«true»`, `«"abc"»`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Primitive;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl Literal {
    pub fn primitive(&self) -> Primitive {
        match self {
            Literal::Integer(_) => Primitive::Integer,
            Literal::Double(_) => Primitive::Double,
            Literal::Boolean(_) => Primitive::Boolean,
            Literal::String(_) => Primitive::String,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => write!(f, "«{}»", v),
            // Debug keeps the decimal point on whole numbers (`100.0`, not `100`)
            Literal::Double(v) => write!(f, "«{:?}»", v),
            Literal::Boolean(v) => write!(f, "«{}»", v),
            Literal::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "«\"{}\"»", escaped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_render_between_guillemets() {
        assert_eq!(Literal::Integer(42).to_string(), "«42»");
        assert_eq!(Literal::Double(100.0).to_string(), "«100.0»");
        assert_eq!(Literal::Double(12.34).to_string(), "«12.34»");
        assert_eq!(Literal::Boolean(false).to_string(), "«false»");
        assert_eq!(Literal::String("aB3".into()).to_string(), "«\"aB3\"»");
    }

    #[test]
    fn string_literals_escape_quotes() {
        assert_eq!(
            Literal::String("a\"b".into()).to_string(),
            "«\"a\\\"b\"»"
        );
    }

    #[test]
    fn primitive_kind_follows_variant() {
        assert_eq!(Literal::Integer(1).primitive(), Primitive::Integer);
        assert_eq!(Literal::String(String::new()).primitive(), Primitive::String);
    }
}
