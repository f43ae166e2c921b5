use crate::enums::Grade;

/// The derived half of a student record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultSummary {
    pub total: i32,
    pub percentage: f32,
    pub grade: Grade,
}

/// Computes total, percentage and grade for three subject marks.
///
/// Marks are taken as given: negative or out-of-range values simply flow
/// through the arithmetic, and a total past the `i32` range wraps around.
pub fn calculate(subject1: i32, subject2: i32, subject3: i32) -> ResultSummary {
    let total = subject1.wrapping_add(subject2).wrapping_add(subject3);
    let percentage = total as f32 / 3.0;

    ResultSummary {
        total,
        percentage,
        grade: Grade::from_percentage(percentage),
    }
}
