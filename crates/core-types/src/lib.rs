pub mod codec;
pub mod enums;
pub mod error;
pub mod grading;
pub mod store;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::Grade;
pub use error::CoreError;
pub use grading::ResultSummary;
pub use store::StudentStore;
pub use structs::{NewStudent, Student};
