//! Field type inference.
//!
//! A column is classified by an ordered list of predicates, first match wins:
//!
//! 1. forced to `enum` by the dataset config
//! 2. every value is an integer literal → `int`
//! 3. every value is a finite float literal and there are more than
//!    [`FLOAT_MIN_DISTINCT`] distinct values → `float`
//! 4. every value is distinct → `uniqueString`
//! 5. otherwise → `enum`
//!
//! Low-cardinality float columns (a handful of distinct decimals) therefore
//! end up categorical.

use std::collections::HashSet;

use super::types::FieldType;

/// A float column needs more distinct values than this to stay numeric
pub const FLOAT_MIN_DISTINCT: usize = 10;

/// Result of inference, carrying the parsed numbers so the column is not
/// parsed twice.
#[derive(Debug, Clone, PartialEq)]
pub enum InferredColumn {
    /// Integer column with its values
    Int(Vec<i64>),
    /// Float column with its values
    Float(Vec<f64>),
    /// Categorical column
    Enum,
    /// All-distinct string column
    UniqueString,
}

impl InferredColumn {
    /// The field type this inference maps to
    pub fn field_type(&self) -> FieldType {
        match self {
            InferredColumn::Int(_) => FieldType::Int,
            InferredColumn::Float(_) => FieldType::Float,
            InferredColumn::Enum => FieldType::Enum,
            InferredColumn::UniqueString => FieldType::UniqueString,
        }
    }
}

/// Parse an integer literal, tolerating surrounding whitespace.
pub fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Parse a finite float literal; `nan` and `inf` are not numbers here.
pub fn parse_float(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_all<T>(values: &[String], parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    values.iter().map(|v| parse(v.as_str())).collect()
}

/// Classify a column of raw values.
pub fn infer_column(values: &[String], force_enum: bool) -> InferredColumn {
    if force_enum {
        return InferredColumn::Enum;
    }

    if let Some(ints) = parse_all(values, parse_int) {
        return InferredColumn::Int(ints);
    }

    let distinct = values.iter().map(String::as_str).collect::<HashSet<_>>().len();

    if distinct > FLOAT_MIN_DISTINCT {
        if let Some(floats) = parse_all(values, parse_float) {
            return InferredColumn::Float(floats);
        }
    }

    if distinct == values.len() {
        InferredColumn::UniqueString
    } else {
        InferredColumn::Enum
    }
}

/// Classify a column and return only its type.
pub fn infer_field_type(values: &[String], force_enum: bool) -> FieldType {
    infer_column(values, force_enum).field_type()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_force_enum_wins() {
        let col = strings(&["1", "2", "3"]);
        assert_eq!(infer_field_type(&col, true), FieldType::Enum);
    }

    #[test]
    fn test_int_column() {
        let col = strings(&["1", "2", "3", "3", " -4"]);
        assert_eq!(
            infer_column(&col, false),
            InferredColumn::Int(vec![1, 2, 3, 3, -4])
        );
    }

    #[test]
    fn test_low_cardinality_int_stays_int() {
        let col = strings(&["0", "1", "0", "1"]);
        assert_eq!(infer_field_type(&col, false), FieldType::Int);
    }

    #[test]
    fn test_float_column_needs_more_than_ten_values() {
        let many: Vec<String> = (0..11).map(|i| format!("{}.5", i)).collect();
        assert_eq!(infer_field_type(&many, false), FieldType::Float);

        let ten: Vec<String> = (0..10).map(|i| format!("{}.5", i)).collect();
        // all distinct, so unique string rather than float
        assert_eq!(infer_field_type(&ten, false), FieldType::UniqueString);

        let mut repeated = ten.clone();
        repeated.push("0.5".to_string());
        assert_eq!(infer_field_type(&repeated, false), FieldType::Enum);
    }

    #[test]
    fn test_mixed_int_and_float() {
        let mut col: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        col.push("0.25".to_string());
        match infer_column(&col, false) {
            InferredColumn::Float(values) => assert_eq!(values.len(), 13),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_is_not_numeric() {
        let mut col: Vec<String> = (0..12).map(|i| format!("{}.1", i)).collect();
        col.push("nan".to_string());
        assert_eq!(infer_field_type(&col, false), FieldType::UniqueString);
    }

    #[test]
    fn test_unique_and_enum_strings() {
        assert_eq!(
            infer_field_type(&strings(&["c1", "c2", "c3"]), false),
            FieldType::UniqueString
        );
        assert_eq!(
            infer_field_type(&strings(&["a", "a", "b"]), false),
            FieldType::Enum
        );
    }

    #[test]
    fn test_empty_value_is_not_numeric() {
        assert_eq!(
            infer_field_type(&strings(&["1", "", "1"]), false),
            FieldType::Enum
        );
    }
}
