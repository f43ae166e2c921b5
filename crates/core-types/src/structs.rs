use crate::enums::Grade;
use crate::grading;
use serde::Serialize;

/// A single student record together with its derived result.
///
/// Field order matters: it is the key order of the JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub roll_no: i32,
    pub name: String,
    pub subject1: i32,
    pub subject2: i32,
    pub subject3: i32,
    pub total: i32,
    pub percentage: f32,
    pub grade: Grade,
}

impl Student {
    /// Builds a record and immediately runs the grade calculator, so the
    /// derived fields always match the marks.
    pub fn new(
        roll_no: i32,
        name: impl Into<String>,
        subject1: i32,
        subject2: i32,
        subject3: i32,
    ) -> Self {
        let summary = grading::calculate(subject1, subject2, subject3);
        Self {
            roll_no,
            name: name.into(),
            subject1,
            subject2,
            subject3,
            total: summary.total,
            percentage: summary.percentage,
            grade: summary.grade,
        }
    }
}

/// The caller-supplied part of a record, as received from a request body or
/// the console.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub roll_no: i32,
    pub name: String,
    pub subject1: i32,
    pub subject2: i32,
    pub subject3: i32,
}

impl NewStudent {
    pub fn into_student(self) -> Student {
        Student::new(
            self.roll_no,
            self.name,
            self.subject1,
            self.subject2,
            self.subject3,
        )
    }
}
