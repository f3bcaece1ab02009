//! Incremental results artifact writer.

use crate::types::{ArtifactHeader, ArtifactRecord, EndRecord, PeriodRecord};
use crate::{ResultsError, ResultsResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Streams artifact records to disk as the run progresses.
///
/// Created with a caller-supplied path, or in scratch mode with a
/// generated temp file that `discard` removes again.
pub struct SnapshotWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    scratch: bool,
    lines: usize,
    periods: usize,
}

impl SnapshotWriter {
    pub fn create(path: Option<&Path>) -> ResultsResult<Self> {
        let (path, scratch) = match path {
            Some(p) => (p.to_path_buf(), false),
            None => (scratch_path(), true),
        };
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            scratch,
            lines: 0,
            periods: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_scratch(&self) -> bool {
        self.scratch
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn write_header(&mut self, header: &ArtifactHeader) -> ResultsResult<()> {
        self.write_record(&ArtifactRecord::Header(header.clone()))
    }

    pub fn write_period(&mut self, record: &PeriodRecord) -> ResultsResult<()> {
        self.write_record(&ArtifactRecord::Period(record.clone()))?;
        self.periods += 1;
        Ok(())
    }

    pub fn write_end(&mut self, end: &EndRecord) -> ResultsResult<()> {
        self.write_record(&ArtifactRecord::End(end.clone()))
    }

    /// Consistency check run before the report phase reads the artifact
    /// back: everything written must actually have reached the file.
    pub fn check(&mut self) -> ResultsResult<()> {
        self.writer.flush()?;
        let len = fs::metadata(&self.path)?.len();
        if self.lines > 0 && len == 0 {
            return Err(ResultsError::Artifact {
                message: format!("results artifact {} is empty after writes", self.path.display()),
            });
        }
        Ok(())
    }

    /// Flush and close, keeping the file. Returns its path.
    pub fn finish(mut self) -> ResultsResult<PathBuf> {
        self.writer.flush()?;
        Ok(self.path)
    }

    /// Close and delete the file (scratch cleanup).
    pub fn discard(self) {
        let path = self.path.clone();
        drop(self);
        fs::remove_file(path).ok();
    }

    fn write_record(&mut self, record: &ArtifactRecord) -> ResultsResult<()> {
        let line = serde_json::to_string(record)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }
}

fn scratch_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("stormflow-{}-{nanos}.jsonl", std::process::id()))
}

/// Read a whole artifact back: header, periods, and the end record if
/// the run got that far.
pub fn read_artifact(
    path: &Path,
) -> ResultsResult<(ArtifactHeader, Vec<PeriodRecord>, Option<EndRecord>)> {
    let content = fs::read_to_string(path)?;
    let mut header = None;
    let mut periods = Vec::new();
    let mut end = None;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ArtifactRecord>(line)? {
            ArtifactRecord::Header(h) => header = Some(h),
            ArtifactRecord::Period(p) => periods.push(p),
            ArtifactRecord::End(e) => end = Some(e),
        }
    }
    let header = header.ok_or_else(|| ResultsError::Artifact {
        message: format!("results artifact {} has no header", path.display()),
    })?;
    Ok((header, periods, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SystemRecord;

    fn header() -> ArtifactHeader {
        ArtifactHeader {
            schema_version: 1,
            title: "t".into(),
            engine_version: 1_000,
            flow_units: "CFS".into(),
            start_date: "2000-01-01 00:00:00".into(),
            report_step_s: 900.0,
            node_ids: vec!["J1".into()],
            link_ids: vec![],
        }
    }

    fn period(elapsed_ms: f64) -> PeriodRecord {
        PeriodRecord {
            elapsed_ms,
            nodes: vec![],
            links: vec![],
            system: SystemRecord::default(),
        }
    }

    #[test]
    fn writes_and_reads_back() {
        let mut writer = SnapshotWriter::create(None).unwrap();
        writer.write_header(&header()).unwrap();
        writer.write_period(&period(900_000.0)).unwrap();
        writer.write_period(&period(1_800_000.0)).unwrap();
        writer
            .write_end(&EndRecord { periods: 2, steps: 4, error_code: 0 })
            .unwrap();
        assert_eq!(writer.periods(), 2);
        writer.check().unwrap();
        let path = writer.finish().unwrap();

        let (h, periods, end) = read_artifact(&path).unwrap();
        assert_eq!(h.node_ids, vec!["J1".to_string()]);
        assert_eq!(periods.len(), 2);
        assert_eq!(end.unwrap().error_code, 0);
        fs::remove_file(path).ok();
    }

    #[test]
    fn scratch_discard_removes_file() {
        let writer = SnapshotWriter::create(None).unwrap();
        assert!(writer.is_scratch());
        let path = writer.path().to_path_buf();
        writer.discard();
        assert!(!path.exists());
    }

    #[test]
    fn artifact_without_header_is_error() {
        let path = scratch_path();
        fs::write(&path, "\n").unwrap();
        assert!(matches!(
            read_artifact(&path),
            Err(ResultsError::Artifact { .. })
        ));
        fs::remove_file(path).ok();
    }
}
