use super::predicate::Predicate;
use super::types::SqlValue;

/// Renders a [`Predicate`] into a parameterised Postgres WHERE fragment.
pub struct FilterWhere {
    param_values: Vec<SqlValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(predicate: &Predicate, starting_param_index: usize) -> (String, Vec<SqlValue>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build(predicate);
        (sql, filter_where.param_values)
    }

    fn build(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::True => "1=1".to_string(),
            Predicate::And(parts) => {
                if parts.is_empty() {
                    return "1=1".to_string();
                }
                parts
                    .iter()
                    .map(|p| format!("({})", self.build(p)))
                    .collect::<Vec<_>>()
                    .join(" AND ")
            }
            Predicate::Eq(column, value) => {
                if value.is_null() {
                    format!("{} IS NULL", quote(column))
                } else {
                    format!("{} = {}", quote(column), self.param(value.clone()))
                }
            }
            Predicate::ContainsIgnoreCase(column, needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                format!("{} ILIKE {}", quote(column), self.param(pattern.into()))
            }
            Predicate::Gte(column, value) => {
                format!("{} >= {}", quote(column), self.param(value.clone()))
            }
            Predicate::Lte(column, value) => {
                format!("{} <= {}", quote(column), self.param(value.clone()))
            }
            Predicate::In(column, values) => {
                if values.is_empty() {
                    return "1=0".to_string();
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                format!("{} IN ({})", quote(column), params.join(", "))
            }
            Predicate::IsNull(column) => format!("{} IS NULL", quote(column)),
            Predicate::IsNotNull(column) => format!("{} IS NOT NULL", quote(column)),
        }
    }

    fn param(&mut self, value: SqlValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

fn quote(column: &str) -> String {
    format!("\"{}\"", column)
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
