use chrono::{DateTime, NaiveDate, Utc};
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqliteExecutor};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Null,
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::DateTime(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

pub fn bind_query<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Text(v) => query.bind(v),
        SqlValue::I64(v) => query.bind(v),
        SqlValue::F64(v) => query.bind(v),
        SqlValue::Bool(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::DateTime(v) => query.bind(v),
        SqlValue::Null => query.bind(None::<String>),
    }
}

pub fn bind_query_as<'q, O>(
    query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    value: SqlValue,
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    match value {
        SqlValue::Text(v) => query.bind(v),
        SqlValue::I64(v) => query.bind(v),
        SqlValue::F64(v) => query.bind(v),
        SqlValue::Bool(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::DateTime(v) => query.bind(v),
        SqlValue::Null => query.bind(None::<String>),
    }
}

/// ===============================
/// Dynamic UPDATE over a fixed column set
/// ===============================
///
/// Column names are `'static` so only identifiers chosen in code ever reach
/// the SQL text; values always travel as bind parameters.
#[derive(Debug)]
pub struct SqlUpdate {
    table: &'static str,
    assignments: Vec<(&'static str, SqlValue)>,
}

impl SqlUpdate {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Adds the assignment only when a value was supplied.
    pub fn set_if<T: Into<SqlValue>>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn sql(&self, id_column: &str) -> String {
        let set_clause = self
            .assignments
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.table, set_clause, id_column
        )
    }

    /// Runs the update and returns the number of affected rows.
    pub async fn execute<'e>(
        self,
        executor: impl SqliteExecutor<'e>,
        id_column: &str,
        id: i64,
    ) -> Result<u64, sqlx::Error> {
        let sql = self.sql(id_column);

        let mut query = sqlx::query(&sql);
        for (_, value) in self.assignments {
            query = bind_query(query, value);
        }
        query = query.bind(id);

        let result = query.execute(executor).await?;
        Ok(result.rows_affected())
    }
}

/// ===============================
/// WHERE clause built from optional filters
/// ===============================
#[derive(Debug, Default)]
pub struct SqlFilter {
    conditions: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl SqlFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition with no parameters.
    pub fn push(&mut self, condition: &'static str) {
        self.conditions.push(condition);
    }

    /// Adds a condition whose `?` placeholders are filled by `values`, in order.
    pub fn push_with(&mut self, condition: &'static str, values: impl IntoIterator<Item = SqlValue>) {
        self.conditions.push(condition);
        self.values.extend(values);
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Escapes backslashes and the `%` and `_` wildcards so `term` matches
/// literally inside a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
