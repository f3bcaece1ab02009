//! Plain-text report file.
//!
//! The engine composes the content (title block, option echo,
//! mass-balance and time-step summaries, fault and warning lines); this
//! type only owns the file handle and line discipline.

use crate::ResultsResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct ReportFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportFile {
    pub fn create(path: &Path) -> ResultsResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_line(&mut self, line: &str) -> ResultsResult<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Underlined section heading.
    pub fn write_section(&mut self, title: &str) -> ResultsResult<()> {
        self.write_line("")?;
        self.write_line(title)?;
        self.write_line(&"-".repeat(title.len()))
    }

    pub fn flush(&mut self) -> ResultsResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lines_reach_disk() {
        let path = std::env::temp_dir().join(format!(
            "stormflow-report-test-{}.txt",
            std::process::id()
        ));
        let mut report = ReportFile::create(&path).unwrap();
        report.write_section("Mass Balance").unwrap();
        report.write_line("runoff error: 0.00%").unwrap();
        report.flush().unwrap();
        drop(report);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Mass Balance"));
        assert!(content.contains("------------"));
        assert!(content.contains("runoff error"));
        std::fs::remove_file(path).ok();
    }
}
