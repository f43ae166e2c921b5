use crate::structs::Student;
use tokio::sync::RwLock;

/// The in-memory, insertion-ordered collection of student records.
///
/// Owned by whoever drives the application and handed to request handlers,
/// rather than living in a global.
#[derive(Debug, Default)]
pub struct StudentStore {
    students: RwLock<Vec<Student>>,
}

impl StudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every record in insertion order.
    pub async fn all(&self) -> Vec<Student> {
        self.students.read().await.clone()
    }

    /// First record with the given roll number.
    pub async fn find(&self, roll_no: i32) -> Option<Student> {
        self.students
            .read()
            .await
            .iter()
            .find(|s| s.roll_no == roll_no)
            .cloned()
    }

    /// Appends `student` unless its roll number is already present.
    ///
    /// The duplicate check and the append happen under one write lock, so
    /// concurrent inserts of the same roll number admit exactly one.
    pub async fn insert_if_absent(&self, student: Student) -> bool {
        let mut students = self.students.write().await;
        if students.iter().any(|s| s.roll_no == student.roll_no) {
            return false;
        }
        tracing::debug!(roll_no = student.roll_no, "Student added to memory.");
        students.push(student);
        true
    }

    pub async fn len(&self) -> usize {
        self.students.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.students.read().await.is_empty()
    }
}
