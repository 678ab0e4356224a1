use std::cmp::Ordering;

use super::types::SqlValue;

/// Anything a predicate can be evaluated against in memory.
pub trait Record {
    /// Value of `column`, or `None` when the record has no such column.
    fn field(&self, column: &str) -> Option<SqlValue>;
}

/// Composable query condition. Column names are compile-time constants, so
/// rendering them into SQL never involves caller input.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    True,
    And(Vec<Predicate>),
    Eq(&'static str, SqlValue),
    ContainsIgnoreCase(&'static str, String),
    Gte(&'static str, SqlValue),
    Lte(&'static str, SqlValue),
    In(&'static str, Vec<SqlValue>),
    IsNull(&'static str),
    IsNotNull(&'static str),
}

impl Predicate {
    /// Conjunction that collapses to `True` when nothing remains and to the
    /// single conjunct when only one does.
    pub fn and(parts: Vec<Predicate>) -> Predicate {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Predicate::True => {}
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::True,
            1 => flat.remove(0),
            _ => Predicate::And(flat),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Predicate::True)
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::True => true,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
            Predicate::Eq(column, value) => {
                compare(record, column, value) == Some(Ordering::Equal)
            }
            Predicate::ContainsIgnoreCase(column, needle) => match record.field(column) {
                Some(SqlValue::Text(Some(text))) => {
                    text.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
            Predicate::Gte(column, value) => matches!(
                compare(record, column, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Predicate::Lte(column, value) => matches!(
                compare(record, column, value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Predicate::In(column, values) => values
                .iter()
                .any(|v| compare(record, column, v) == Some(Ordering::Equal)),
            Predicate::IsNull(column) => record.field(column).map(|v| v.is_null()).unwrap_or(false),
            Predicate::IsNotNull(column) => {
                record.field(column).map(|v| !v.is_null()).unwrap_or(false)
            }
        }
    }
}

fn compare<R: Record + ?Sized>(record: &R, column: &str, value: &SqlValue) -> Option<Ordering> {
    record.field(column)?.compare(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: &'static str,
        qty: Option<i64>,
    }

    impl Record for Row {
        fn field(&self, column: &str) -> Option<SqlValue> {
            match column {
                "name" => Some(self.name.into()),
                "qty" => Some(self.qty.into()),
                _ => None,
            }
        }
    }

    #[test]
    fn and_flattens_and_collapses() {
        assert_eq!(Predicate::and(vec![]), Predicate::True);
        assert_eq!(Predicate::and(vec![Predicate::True, Predicate::True]), Predicate::True);
        assert_eq!(
            Predicate::and(vec![Predicate::True, Predicate::IsNull("qty")]),
            Predicate::IsNull("qty")
        );
        let nested = Predicate::and(vec![
            Predicate::and(vec![Predicate::IsNull("a"), Predicate::IsNull("b")]),
            Predicate::IsNull("c"),
        ]);
        assert_eq!(
            nested,
            Predicate::And(vec![
                Predicate::IsNull("a"),
                Predicate::IsNull("b"),
                Predicate::IsNull("c")
            ])
        );
    }

    #[test]
    fn null_columns_fail_comparisons_but_match_is_null() {
        let row = Row { name: "Widget", qty: None };
        assert!(!Predicate::Eq("qty", 1i64.into()).matches(&row));
        assert!(!Predicate::Gte("qty", 1i64.into()).matches(&row));
        assert!(Predicate::IsNull("qty").matches(&row));
        assert!(!Predicate::IsNotNull("qty").matches(&row));
    }

    #[test]
    fn contains_ignores_case() {
        let row = Row { name: "Blue Widget", qty: Some(3) };
        assert!(Predicate::ContainsIgnoreCase("name", "WIDG".into()).matches(&row));
        assert!(!Predicate::ContainsIgnoreCase("name", "gadget".into()).matches(&row));
    }

    #[test]
    fn unknown_column_never_matches() {
        let row = Row { name: "x", qty: Some(1) };
        assert!(!Predicate::IsNull("missing").matches(&row));
        assert!(!Predicate::In("missing", vec![1i64.into()]).matches(&row));
    }

    #[test]
    fn empty_in_matches_nothing() {
        let row = Row { name: "x", qty: Some(1) };
        assert!(!Predicate::In("qty", vec![]).matches(&row));
        assert!(Predicate::In("qty", vec![2i64.into(), 1i64.into()]).matches(&row));
    }
}
