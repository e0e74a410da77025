use serde::{Deserialize, Serialize};
use std::fmt;

/// Result produced by a workload variant.
///
/// Comparison is exact. A floating-point case would need a tolerance policy
/// in the equivalence checker before it can be added here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_text_only() {
        assert_eq!(Value::Int(4_000_000).to_string(), "4000000");
        assert_eq!(Value::from("ABC").to_string(), "\"ABC\"");
    }

    #[test]
    fn int_and_text_never_compare_equal() {
        assert_ne!(Value::Int(1), Value::from("1"));
    }

    #[test]
    fn oversized_counts_saturate() {
        assert_eq!(Value::from(2501_usize), Value::Int(2501));
        if usize::BITS >= 64 {
            assert_eq!(Value::from(usize::MAX), Value::Int(i64::MAX));
        }
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::Int(7), Value::from("x")]).unwrap();
        assert_eq!(json, r#"[7,"x"]"#);
    }
}
