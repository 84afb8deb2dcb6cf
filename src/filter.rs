//! Directory search helpers.
//!
//! Category-style filters are plain equality predicates pushed into SQL; the free-text
//! `q` parameter is a case-insensitive substring match applied to the fetched rows.

/// Anything a directory listing can run a text search over.
pub trait Searchable {
    fn haystacks(&self) -> Vec<&str>;
}

/// Keeps the items where any haystack contains `query`, ignoring case.
/// A missing or blank query keeps everything.
pub fn search<T: Searchable>(items: Vec<T>, query: Option<&str>) -> Vec<T> {
    let Some(needle) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return items;
    };
    let needle = needle.to_lowercase();

    items
        .into_iter()
        .filter(|item| item.haystacks().iter().any(|hay| hay.to_lowercase().contains(&needle)))
        .collect()
}

/// Accumulates `column = ?` predicates for a listing query.
#[derive(Debug, Default)]
pub struct EqFilters {
    clauses: Vec<&'static str>,
    values: Vec<FilterValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    Id(uuid::Uuid),
}

impl EqFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.clauses.push(column);
            self.values.push(FilterValue::Text(value.to_owned()));
        }
        self
    }

    pub fn flag(mut self, column: &'static str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.clauses.push(column);
            self.values.push(FilterValue::Bool(value));
        }
        self
    }

    pub fn id(mut self, column: &'static str, value: Option<uuid::Uuid>) -> Self {
        if let Some(value) = value {
            self.clauses.push(column);
            self.values.push(FilterValue::Id(value));
        }
        self
    }

    /// Renders `SELECT * FROM {table} [WHERE ...] ORDER BY {order}`.
    pub fn select(&self, table: &str, order: &str) -> String {
        let mut sql = format!("SELECT * FROM {table}");
        if !self.clauses.is_empty() {
            let predicates: Vec<String> = self.clauses.iter().map(|c| format!("{c}=?")).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
        sql
    }

    pub fn bind_all<'q, O>(
        &'q self,
        mut query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
        for value in &self.values {
            query = match value {
                FilterValue::Text(text) => query.bind(text.as_str()),
                FilterValue::Bool(flag) => query.bind(*flag),
                FilterValue::Id(id) => query.bind(*id),
            };
        }
        query
    }
}
