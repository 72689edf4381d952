use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Comparison operator used to decide whether a datafile has reached its target accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareOp {
    Less,
    Greater,
    #[default]
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Less => "<",
            CompareOp::Greater => ">",
            CompareOp::LessEqual => "<=",
            CompareOp::GreaterEqual => ">=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        }
    }
}

impl FromStr for CompareOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "<" => CompareOp::Less,
            ">" => CompareOp::Greater,
            "<=" => CompareOp::LessEqual,
            ">=" => CompareOp::GreaterEqual,
            "==" => CompareOp::Equal,
            "!=" => CompareOp::NotEqual,
            _ => anyhow::bail!("unknown operator \"{s}\""),
        })
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn compare<T: PartialOrd>(lhs: T, rhs: T, op: CompareOp) -> bool {
    match op {
        CompareOp::Less => lhs < rhs,
        CompareOp::Greater => lhs > rhs,
        CompareOp::LessEqual => lhs <= rhs,
        CompareOp::GreaterEqual => lhs >= rhs,
        CompareOp::Equal => lhs == rhs,
        CompareOp::NotEqual => lhs != rhs,
    }
}

#[cfg(test)]
mod tests {
    use super::{CompareOp, compare};
    use std::str::FromStr;

    #[test]
    fn test_parse_operators() {
        for op in ["<", ">", "<=", ">=", "==", "!="] {
            assert_eq!(CompareOp::from_str(op).unwrap().as_str(), op);
        }
        assert!(CompareOp::from_str("=<").is_err());
    }

    #[test]
    fn test_compare() {
        assert!(compare(1.0, 2.0, CompareOp::Less));
        assert!(!compare(2.0, 2.0, CompareOp::Less));
        assert!(compare(2.0, 2.0, CompareOp::LessEqual));
        assert!(compare(3.0, 2.0, CompareOp::Greater));
        assert!(compare(2.0, 2.0, CompareOp::GreaterEqual));
        assert!(compare(2.0, 2.0, CompareOp::Equal));
        assert!(compare(1.0, 2.0, CompareOp::NotEqual));
    }

    #[test]
    fn test_default_operator() {
        assert_eq!(CompareOp::default(), CompareOp::LessEqual);
    }
}
