//! Additional raw-table columns and their per-row values.

use serde_json::Value;

/// Supplies the additional columns of a raw table and, per stored document,
/// the values that go into them.
pub trait TablePolicy {
    type Document;

    /// Additional column names with their SQL types, in column order.
    fn additional_columns(&self) -> Vec<(String, String)>;

    /// One value per additional column, in the order of `additional_columns`.
    fn additional_values(&self, document: &Self::Document) -> Vec<Value>;
}

/// A fixed list of additional columns whose values are read by column name
/// from a JSON object. Missing keys encode as `null`.
#[derive(Debug, Clone, Default)]
pub struct StaticColumns {
    columns: Vec<(String, String)>,
}

impl StaticColumns {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        StaticColumns { columns }
    }

    /// No additional columns.
    pub fn none() -> Self {
        StaticColumns::default()
    }
}

impl TablePolicy for StaticColumns {
    type Document = Value;

    fn additional_columns(&self) -> Vec<(String, String)> {
        self.columns.clone()
    }

    fn additional_values(&self, document: &Value) -> Vec<Value> {
        self.columns
            .iter()
            .map(|(name, _)| document.get(name).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_follow_column_order() {
        let policy = StaticColumns::new(vec![
            ("TENANT".to_string(), "VARCHAR(20)".to_string()),
            ("YEAR".to_string(), "INTEGER".to_string()),
        ]);
        let values = policy.additional_values(&json!({ "YEAR": 2024, "TENANT": "acme" }));
        assert_eq!(values, vec![json!("acme"), json!(2024)]);
    }

    #[test]
    fn test_missing_values_are_null() {
        let policy = StaticColumns::new(vec![("TENANT".to_string(), "TEXT".to_string())]);
        assert_eq!(policy.additional_values(&json!({})), vec![Value::Null]);
        assert_eq!(policy.additional_values(&json!("scalar")), vec![Value::Null]);
    }

    #[test]
    fn test_none_has_no_columns() {
        assert!(StaticColumns::none().additional_columns().is_empty());
    }
}
