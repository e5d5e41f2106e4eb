//! Metadata repository for the four document categories.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::record::{
    AssignmentRecord, NewRecord, NoteRecord, QuestionPaperRecord, Record, RecordFilter,
    UploadRecord,
};
use super::Category;
use crate::{Result, StudySyncError};

/// Repository for document records.
pub struct RecordRepository<'a> {
    pool: &'a SqlitePool,
}

fn select_prefix(category: Category) -> String {
    format!(
        "SELECT id, {}, file, created_at FROM {}",
        category.columns().join(", "),
        category.table()
    )
}

/// Map a client-supplied column to the category's own column name.
fn filter_column(category: Category, column: &str) -> Result<&'static str> {
    category
        .filterable()
        .find(|c| *c == column)
        .ok_or_else(|| {
            StudySyncError::Validation(format!("cannot filter {} by '{column}'", category.table()))
        })
}

impl<'a> RecordRepository<'a> {
    /// Create a new RecordRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a record on its own connection.
    pub async fn create(&self, record: &NewRecord) -> Result<Record> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, record).await
    }

    /// Insert a record on `conn`, which may be inside a transaction.
    pub async fn insert(conn: &mut SqliteConnection, record: &NewRecord) -> Result<Record> {
        let category = record.category();

        let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        qb.push(category.table()).push(" (");
        let mut columns = qb.separated(", ");
        for column in category.columns() {
            columns.push(*column);
        }
        columns.push("file");
        qb.push(") VALUES (");
        let mut values = qb.separated(", ");
        for value in record.fields.values() {
            values.push_bind(value);
        }
        values.push_bind(record.file.as_str());
        qb.push(")");

        let id = qb.build().execute(&mut *conn).await?.last_insert_rowid();
        Self::fetch_by_id(conn, category, id)
            .await?
            .ok_or_else(|| StudySyncError::NotFound(format!("{} record {id}", category)))
    }

    async fn fetch_by_id(
        conn: &mut SqliteConnection,
        category: Category,
        id: i64,
    ) -> Result<Option<Record>> {
        let sql = format!("{} WHERE id = ?", select_prefix(category));
        let record = match category {
            Category::Upload => sqlx::query_as::<_, UploadRecord>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .map(Record::Upload),
            Category::Assignment => sqlx::query_as::<_, AssignmentRecord>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .map(Record::Assignment),
            Category::Note => sqlx::query_as::<_, NoteRecord>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .map(Record::Note),
            Category::QuestionPaper => sqlx::query_as::<_, QuestionPaperRecord>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .map(Record::QuestionPaper),
        };
        Ok(record)
    }

    /// List records of a category matching every condition of `filter`, in
    /// insertion order.
    pub async fn query(&self, category: Category, filter: &RecordFilter) -> Result<Vec<Record>> {
        let mut qb = QueryBuilder::<Sqlite>::new(select_prefix(category));

        for (i, (column, value)) in filter.conditions().iter().enumerate() {
            let column = filter_column(category, column)?;
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            qb.push(column).push(" = ").push_bind(value.as_str());
        }
        qb.push(" ORDER BY id");

        let records = match category {
            Category::Upload => qb
                .build_query_as::<UploadRecord>()
                .fetch_all(self.pool)
                .await?
                .into_iter()
                .map(Record::Upload)
                .collect(),
            Category::Assignment => qb
                .build_query_as::<AssignmentRecord>()
                .fetch_all(self.pool)
                .await?
                .into_iter()
                .map(Record::Assignment)
                .collect(),
            Category::Note => qb
                .build_query_as::<NoteRecord>()
                .fetch_all(self.pool)
                .await?
                .into_iter()
                .map(Record::Note)
                .collect(),
            Category::QuestionPaper => qb
                .build_query_as::<QuestionPaperRecord>()
                .fetch_all(self.pool)
                .await?
                .into_iter()
                .map(Record::QuestionPaper)
                .collect(),
        };

        Ok(records)
    }

    /// Count records of a category.
    pub async fn count(&self, category: Category) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", category.table());
        let count: (i64,) = sqlx::query_as(&sql).fetch_one(self.pool).await?;
        Ok(count.0)
    }

    /// Delete every record of `category` that points at `filename`.
    ///
    /// Returns the number of records deleted.
    pub async fn remove_by_file(
        conn: &mut SqliteConnection,
        category: Category,
        filename: &str,
    ) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE file = ?", category.table());
        let result = sqlx::query(&sql).bind(filename).execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    /// Whether any record of `category` points at `filename`.
    pub async fn references(
        conn: &mut SqliteConnection,
        category: Category,
        filename: &str,
    ) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE file = ?)",
            category.table()
        );
        let exists: (bool,) = sqlx::query_as(&sql)
            .bind(filename)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists.0)
    }
}
