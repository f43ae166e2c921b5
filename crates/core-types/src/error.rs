use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Field {field} is not a valid {expected}")]
    WrongType { field: String, expected: &'static str },
}
