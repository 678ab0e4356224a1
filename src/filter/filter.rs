use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::predicate::Predicate;
use super::types::{FilterOrderInfo, PageRequest, SqlResult};

/// A predicate plus ordering and paging, ready to run against one table.
#[derive(Debug, Clone)]
pub struct Filter {
    pub predicate: Predicate,
    pub order: Vec<FilterOrderInfo>,
    pub page: PageRequest,
}

impl Filter {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            order: vec![],
            page: PageRequest::unpaged(),
        }
    }

    pub fn order(mut self, order: Vec<FilterOrderInfo>) -> Self {
        self.order = order;
        self
    }

    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    pub fn to_sql(&self, table_name: &str, columns: &[&str]) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.predicate, 0);
        let order_clause = FilterOrder::generate(&self.order);
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", select_clause(columns)),
            format!("FROM \"{}\"", table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self, table_name: &str) -> SqlResult {
        count_sql(table_name, &self.predicate)
    }

    fn build_limit_clause(&self) -> String {
        if self.page.size == i64::MAX {
            return String::new();
        }
        format!("LIMIT {} OFFSET {}", self.page.size, self.page.offset())
    }
}

pub fn count_sql(table_name: &str, predicate: &Predicate) -> SqlResult {
    let (where_clause, params) = FilterWhere::generate(predicate, 0);
    SqlResult {
        query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", table_name, where_clause),
        params,
    }
}

fn select_clause(columns: &[&str]) -> String {
    std::iter::once("id")
        .chain(columns.iter().copied())
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::SortDirection;

    #[test]
    fn builds_paged_select() {
        let filter = Filter::new(Predicate::Eq("username", "bob".into()))
            .order(vec![FilterOrderInfo { column: "created_at", sort: SortDirection::Desc }])
            .page(PageRequest { page: 2, size: 10 });
        let sql = filter.to_sql("orders", &["username", "created_at"]);
        assert_eq!(
            sql.query,
            "SELECT \"id\", \"username\", \"created_at\" FROM \"orders\" WHERE \"username\" = $1 \
             ORDER BY \"created_at\" DESC, \"id\" ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn unpaged_select_has_no_limit() {
        let sql = Filter::new(Predicate::True).to_sql("categories", &["name", "parent_id"]);
        assert_eq!(
            sql.query,
            "SELECT \"id\", \"name\", \"parent_id\" FROM \"categories\" WHERE 1=1 ORDER BY \"id\" ASC"
        );
    }

    #[test]
    fn count_shares_where_clause() {
        let sql = Filter::new(Predicate::IsNull("completed_at")).to_count_sql("orders");
        assert_eq!(sql.query, "SELECT COUNT(*) AS count FROM \"orders\" WHERE \"completed_at\" IS NULL");
    }
}
