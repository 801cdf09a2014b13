//! Local sorting primitives shared by the distributed patterns.

pub mod exchange;
pub mod merge;
pub mod partition;

pub use exchange::exchange_sort;
pub use merge::merge;
pub use partition::{even_ranges, split};
