//! The sink's append-only result log: one JSON object per line, truncated at
//! role start. Only the sink rank writes it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

pub struct ResultLog {
    writer: BufWriter<File>,
}

impl ResultLog {
    /// Truncates or creates the log file.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(ResultLog { writer: BufWriter::new(File::create(path)?) })
    }

    pub fn append(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        {
            let mut log = ResultLog::create(&path).unwrap();
            log.append("stale").unwrap();
            log.flush().unwrap();
        }
        {
            let mut log = ResultLog::create(&path).unwrap();
            log.append(r#"{"file":"a.jpg"}"#).unwrap();
            log.flush().unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\"file\":\"a.jpg\"}\n");
    }
}
