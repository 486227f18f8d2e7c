//! Comparison and logical operators used in selection predicates.

use crate::Value;

/// A comparison between a column and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Substring containment, strings only.
    Contains,
}

impl ComparisonOperator {
    /// The operator's symbol in the rendered query grammar.
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "==",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Contains => ".str.contains",
        }
    }

    /// Evaluate `left <op> right`. Returns None when the operand types
    /// do not support this comparison.
    pub fn evaluate(&self, left: &Value, right: &Value) -> Option<bool> {
        use std::cmp::Ordering;

        if let ComparisonOperator::Contains = self {
            return match (left, right) {
                (Value::Str(haystack), Value::Str(needle)) => {
                    Some(haystack.contains(needle.as_str()))
                }
                _ => None,
            };
        }

        let ordering = left.partial_cmp_value(right)?;

        Some(match self {
            ComparisonOperator::Eq => ordering == Ordering::Equal,
            ComparisonOperator::Ne => ordering != Ordering::Equal,
            ComparisonOperator::Lt => ordering == Ordering::Less,
            ComparisonOperator::Le => ordering != Ordering::Greater,
            ComparisonOperator::Gt => ordering == Ordering::Greater,
            ComparisonOperator::Ge => ordering != Ordering::Less,
            ComparisonOperator::Contains => unreachable!(),
        })
    }
}

/// Connective between two selection conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// The connective's symbol in the rendered query grammar.
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&",
            LogicalOperator::Or => "|",
        }
    }

    /// Combine two boolean operands.
    pub fn combine(&self, left: bool, right: bool) -> bool {
        match self {
            LogicalOperator::And => left && right,
            LogicalOperator::Or => left || right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison() {
        let op = ComparisonOperator::Ge;
        assert_eq!(op.evaluate(&Value::Int(5), &Value::Int(5)), Some(true));
        assert_eq!(op.evaluate(&Value::Int(4), &Value::Float(4.5)), Some(false));
    }

    #[test]
    fn test_contains() {
        let op = ComparisonOperator::Contains;
        assert_eq!(
            op.evaluate(&Value::Str("silver".into()), &Value::Str("ilv".into())),
            Some(true)
        );
        assert_eq!(op.evaluate(&Value::Int(1), &Value::Str("1".into())), None);
    }

    #[test]
    fn test_type_mismatch_is_none() {
        let op = ComparisonOperator::Lt;
        assert_eq!(op.evaluate(&Value::Str("a".into()), &Value::Int(1)), None);
    }

    #[test]
    fn test_logical_combine() {
        assert!(LogicalOperator::And.combine(true, true));
        assert!(!LogicalOperator::And.combine(true, false));
        assert!(LogicalOperator::Or.combine(false, true));
    }
}
