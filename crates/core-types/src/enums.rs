use serde::Serialize;
use std::fmt;

/// Letter grade derived from a student's percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    F,
}

impl Grade {
    /// Applies the fixed threshold table, highest band first.
    /// Each threshold is an inclusive lower bound.
    pub fn from_percentage(percentage: f32) -> Self {
        if percentage >= 90.0 {
            Grade::APlus
        } else if percentage >= 75.0 {
            Grade::A
        } else if percentage >= 60.0 {
            Grade::B
        } else if percentage >= 40.0 {
            Grade::C
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
