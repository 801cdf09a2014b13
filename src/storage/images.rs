//! Image enumeration for the pipeline source: recursive directory walk over
//! `.jpg` files, reading each file's bytes into one `WorkItem`.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;
use crate::message::WorkItem;

/// Collects every `.jpg` under `dir` (recursively), sorted by path so runs
/// are deterministic. The path relative to the caller is the source id.
pub fn collect_work_items(dir: &Path) -> Result<Vec<WorkItem>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| crate::error::PatternError::Io(e.into()))?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg"))
        {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let bytes = fs::read(&path)?;
            Ok(WorkItem { source_id: path.display().to_string(), bytes })
        })
        .collect()
}
