use sea_orm::{ConnectionTrait, DatabaseTransaction, QueryResult, Statement, TryGetable, Value};

use super::pool::DatabaseError;

/// Connection checked out of a [`DatabasePool`](super::DatabasePool)
///
/// Holds one physical connection from the pool until it is released, so
/// every statement runs in the same session. Work is not autocommitted:
/// [`commit`](Self::commit) keeps it, while [`close`](Self::close) and
/// dropping the connection roll it back. All three hand the slot back.
pub struct Connection {
    session: DatabaseTransaction,
}

impl Connection {
    pub(crate) fn new(session: DatabaseTransaction) -> Self {
        Self { session }
    }

    /// Execute a query and collect every row
    ///
    /// Placeholders follow the backend's syntax (`$1` for postgres, `?` for
    /// sqlite).
    #[tracing::instrument(skip(self, values), level = "debug")]
    pub async fn execute<I>(&self, sql: &str, values: I) -> Result<ResultSet, DatabaseError>
    where
        I: IntoIterator<Item = Value>,
    {
        let statement = Statement::from_sql_and_values(self.session.get_database_backend(), sql, values);
        let rows = self.session.query_all(statement).await?;

        tracing::debug!(rows = rows.len(), "Query executed");

        Ok(ResultSet {
            rows: rows.into_iter().map(Row).collect(),
        })
    }

    /// Execute a statement that returns no rows, yielding the affected row count
    #[tracing::instrument(skip(self, values), level = "debug")]
    pub async fn run<I>(&self, sql: &str, values: I) -> Result<u64, DatabaseError>
    where
        I: IntoIterator<Item = Value>,
    {
        let statement = Statement::from_sql_and_values(self.session.get_database_backend(), sql, values);
        let result = self.session.execute(statement).await?;

        Ok(result.rows_affected())
    }

    /// Commit the work done on this connection and release it to the pool
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.session.commit().await?;
        Ok(())
    }

    /// Release the connection to the pool, discarding uncommitted work
    pub async fn close(self) -> Result<(), DatabaseError> {
        self.session.rollback().await?;
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("backend", &self.session.get_database_backend())
            .finish()
    }
}

/// Rows returned by [`Connection::execute`]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// One result row, addressed by column name
pub struct Row(QueryResult);

impl Row {
    /// Decode column `column`; names are matched exactly as the database reports them
    pub fn get<T: TryGetable>(&self, column: &str) -> Result<T, DatabaseError> {
        Ok(self.0.try_get::<T>("", column)?)
    }
}
