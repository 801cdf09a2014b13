//! The three coordination patterns.

pub mod phase_sort;
pub mod pipeline;
pub mod tree_sort;

pub use phase_sort::{PhaseSorter, PhaseStats};
pub use pipeline::{Classifier, PipelineCoordinator, PipelineSummary, Role};
pub use tree_sort::TreeSorter;
