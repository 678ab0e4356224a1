use std::cmp::Ordering;

use super::error::FilterError;
use super::predicate::Record;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses `"price desc, name"` style sort specs, accepting only whitelisted columns.
    pub fn parse(spec: &str, allowed: &'static [&'static str]) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let Some(col) = it.next() else { continue };
            let column = allowed
                .iter()
                .copied()
                .find(|c| *c == col)
                .ok_or_else(|| FilterError::InvalidSortColumn(col.to_string()))?;
            let sort = match it.next() {
                None => SortDirection::Asc,
                Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(d) => return Err(FilterError::InvalidSortDirection(d.to_string())),
            };
            out.push(FilterOrderInfo { column, sort });
        }
        Ok(out)
    }

    /// ORDER BY clause with `id` appended as a tiebreaker so pages stay stable.
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        if !infos.iter().any(|i| i.column == "id") {
            parts.push("\"id\" ASC".to_string());
        }
        format!("ORDER BY {}", parts.join(", "))
    }

    /// In-memory equivalent of [`FilterOrder::generate`]; NULLs sort last.
    pub fn compare<R: Record>(infos: &[FilterOrderInfo], a: &R, b: &R) -> Ordering {
        let tiebreak = FilterOrderInfo { column: "id", sort: SortDirection::Asc };
        for info in infos.iter().chain(std::iter::once(&tiebreak)) {
            let left = a.field(info.column);
            let right = b.field(info.column);
            let left_null = left.as_ref().map(|v| v.is_null()).unwrap_or(true);
            let right_null = right.as_ref().map(|v| v.is_null()).unwrap_or(true);
            let ord = match (left_null, right_null) {
                (true, true) => Ordering::Equal,
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                (false, false) => match (left, right) {
                    (Some(l), Some(r)) => l.compare(&r).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                },
            };
            let ord = match info.sort {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["id", "name", "price"];

    #[test]
    fn parses_columns_and_directions() {
        let infos = FilterOrder::parse("price desc, name", COLUMNS).unwrap();
        assert_eq!(
            infos,
            vec![
                FilterOrderInfo { column: "price", sort: SortDirection::Desc },
                FilterOrderInfo { column: "name", sort: SortDirection::Asc },
            ]
        );
        assert_eq!(
            FilterOrder::generate(&infos),
            "ORDER BY \"price\" DESC, \"name\" ASC, \"id\" ASC"
        );
    }

    #[test]
    fn rejects_unknown_columns_and_directions() {
        assert_eq!(
            FilterOrder::parse("password", COLUMNS),
            Err(FilterError::InvalidSortColumn("password".to_string()))
        );
        assert!(FilterOrder::parse("name sideways", COLUMNS).is_err());
    }

    #[test]
    fn empty_spec_orders_by_id() {
        let infos = FilterOrder::parse("", COLUMNS).unwrap();
        assert!(infos.is_empty());
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"id\" ASC");
    }
}
