//! Integer array persistence: one JSON array per file, keyed by run size.

use std::fs;
use std::path::Path;

use rand::Rng;

use crate::error::Result;

pub fn save(path: &Path, values: &[i32]) -> Result<()> {
    fs::write(path, serde_json::to_string(values)?)?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<i32>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Uniform integers in `[0, n)`; empty for `n == 0`.
pub fn generate_random(n: usize) -> Vec<i32> {
    if n == 0 {
        return Vec::new();
    }
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.gen_range(0..n as i32)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input-5.json");
        save(&path, &[5, 3, 4, 1, 2]).unwrap();
        assert_eq!(load(&path).unwrap(), vec![5, 3, 4, 1, 2]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[5,3,4,1,2]");
    }

    #[test]
    fn generated_values_stay_in_range() {
        let values = generate_random(100);
        assert_eq!(values.len(), 100);
        assert!(values.iter().all(|&v| (0..100).contains(&v)));
    }

    #[test]
    fn zero_size_yields_empty_array() {
        assert!(generate_random(0).is_empty());
    }
}
