//! Persistence collaborators: array files, the sink's result log, and image
//! enumeration for the pipeline source.

pub mod arrays;
pub mod images;
pub mod results;

pub use arrays::{generate_random, load, save};
pub use images::collect_work_items;
pub use results::ResultLog;
