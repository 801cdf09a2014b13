pub mod options;

pub use options::{PatternKind, RunOptions};
