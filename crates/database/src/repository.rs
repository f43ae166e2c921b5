use crate::DbError;
use crate::connection::connect;
use async_trait::async_trait;
use core_types::Student;
use sqlx::Connection;

const INSERT_STUDENT: &str = r#"
    INSERT INTO students (roll_no, name, subject1, subject2, subject3, total, percentage)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// Where student records are mirrored for durability.
///
/// Writes are best-effort: callers get the outcome back but are free to
/// carry on regardless of it.
#[async_trait]
pub trait StudentGateway: Send + Sync {
    /// Writes one record. Updating, deleting and reading back are not
    /// supported.
    async fn insert_student(&self, student: &Student) -> Result<(), DbError>;
}

/// A `StudentGateway` that opens a fresh connection for every insert and
/// closes it again before returning.
#[derive(Debug, Clone)]
pub struct SqlStudentGateway {
    database_url: String,
}

impl SqlStudentGateway {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

#[async_trait]
impl StudentGateway for SqlStudentGateway {
    async fn insert_student(&self, student: &Student) -> Result<(), DbError> {
        let mut conn = connect(&self.database_url).await?;

        let result = sqlx::query(INSERT_STUDENT)
            .bind(student.roll_no)
            .bind(student.name.as_str())
            .bind(student.subject1)
            .bind(student.subject2)
            .bind(student.subject3)
            .bind(student.total)
            .bind(student.percentage)
            .execute(&mut conn)
            .await;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close database connection cleanly.");
        }

        result.map_err(DbError::QueryError)?;
        tracing::info!(roll_no = student.roll_no, name = %student.name, "Student inserted successfully.");
        Ok(())
    }
}
