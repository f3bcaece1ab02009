//! Results artifact sink.
//!
//! Adapts the sf-results snapshot writer to the `OutputSink` contract:
//! the session hands it the network at each reporting instant and it
//! extracts the per-node, per-link, and system records.

use sf_network::Network;
use sf_results::{
    ArtifactHeader, EndRecord, LinkRecord, NodeRecord, PeriodRecord, SnapshotWriter, SystemRecord,
};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};
use crate::traits::OutputSink;

/// File-backed output sink. With no path the artifact is a scratch file
/// removed at close.
#[derive(Default)]
pub struct ArtifactSink {
    path: Option<PathBuf>,
    writer: Option<SnapshotWriter>,
}

impl ArtifactSink {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            writer: None,
        }
    }

    /// Path of the open artifact, if any.
    pub fn artifact_path(&self) -> Option<&Path> {
        self.writer.as_ref().map(SnapshotWriter::path)
    }

    fn writer_mut(&mut self) -> EngineResult<&mut SnapshotWriter> {
        self.writer.as_mut().ok_or(EngineError::Output {
            message: "output sink is not open".to_string(),
        })
    }
}

fn period_record(network: &Network, elapsed_ms: f64) -> PeriodRecord {
    let nodes = network
        .nodes
        .iter()
        .map(|n| NodeRecord {
            depth_ft: n.depth_ft,
            head_ft: n.head_ft(),
            volume_ft3: n.volume_ft3,
            lateral_inflow_cfs: n.lateral_inflow_cfs,
            total_inflow_cfs: n.inflow_cfs,
            overflow_cfs: n.overflow_cfs,
        })
        .collect();
    let links = network
        .links
        .iter()
        .map(|l| LinkRecord {
            flow_cfs: l.flow_cfs * l.direction,
            depth_ft: l.depth_ft,
            velocity_fps: l.velocity_fps(l.flow_cfs, l.depth_ft) * l.direction,
            volume_ft3: l.volume_ft3,
            capacity_frac: if l.capacity_cfs > 0.0 {
                l.flow_cfs.abs() / l.capacity_cfs
            } else {
                0.0
            },
        })
        .collect();
    let system = SystemRecord {
        total_lateral_inflow_cfs: network.nodes.iter().map(|n| n.lateral_inflow_cfs).sum(),
        total_outflow_cfs: network
            .nodes
            .iter()
            .filter(|n| n.degree == 0)
            .map(|n| n.outflow_cfs)
            .sum(),
        total_overflow_cfs: network.nodes.iter().map(|n| n.overflow_cfs).sum(),
        total_stored_ft3: network.total_stored_volume_ft3(),
    };
    PeriodRecord {
        elapsed_ms,
        nodes,
        links,
        system,
    }
}

impl OutputSink for ArtifactSink {
    fn open(&mut self, _network: &Network, header: &ArtifactHeader) -> EngineResult<()> {
        let mut writer = SnapshotWriter::create(self.path.as_deref())?;
        writer.write_header(header)?;
        self.writer = Some(writer);
        Ok(())
    }

    fn save_snapshot(&mut self, network: &Network, elapsed_ms: f64) -> EngineResult<()> {
        let record = period_record(network, elapsed_ms);
        self.writer_mut()?.write_period(&record)?;
        Ok(())
    }

    fn write_end(&mut self, steps: u64, error_code: i32) -> EngineResult<()> {
        let periods = self.periods();
        self.writer_mut()?.write_end(&EndRecord {
            periods,
            steps,
            error_code,
        })?;
        Ok(())
    }

    fn check(&mut self) -> EngineResult<()> {
        self.writer_mut()?.check()?;
        Ok(())
    }

    fn periods(&self) -> usize {
        self.writer.as_ref().map_or(0, SnapshotWriter::periods)
    }

    fn is_scratch(&self) -> bool {
        self.writer.as_ref().is_some_and(SnapshotWriter::is_scratch)
    }

    fn close(&mut self, keep_artifact: bool) -> EngineResult<()> {
        if let Some(writer) = self.writer.take() {
            if keep_artifact {
                writer.finish()?;
            } else {
                writer.discard();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_network::{LinkKind, NodeKind, XSection};
    use sf_results::read_artifact;

    fn header() -> ArtifactHeader {
        ArtifactHeader {
            schema_version: 1,
            title: "sink test".into(),
            engine_version: sf_core::ENGINE_VERSION,
            flow_units: "CFS".into(),
            start_date: "2000-01-01 00:00:00".into(),
            report_step_s: 900.0,
            node_ids: vec!["A".into(), "B".into()],
            link_ids: vec!["A-B".into()],
        }
    }

    fn net() -> Network {
        let mut net = Network::new();
        let a = net.add_node("A", NodeKind::Junction);
        let b = net.add_node("B", NodeKind::Outfall);
        net.add_link(
            "A-B",
            LinkKind::Conduit,
            a,
            b,
            XSection::Rectangular {
                width_ft: 2.0,
                height_ft: 2.0,
            },
        )
        .unwrap();
        net.finalize().unwrap();
        net.nodes[0].lateral_inflow_cfs = 3.0;
        net.links[0].flow_cfs = 3.0;
        net.links[0].depth_ft = 0.5;
        net
    }

    #[test]
    fn snapshots_round_trip_through_the_artifact() {
        let path = std::env::temp_dir().join(format!("sf-sink-{}.jsonl", std::process::id()));
        let mut sink = ArtifactSink::new(Some(&path));
        let net = net();
        sink.open(&net, &header()).unwrap();
        sink.save_snapshot(&net, 900_000.0).unwrap();
        sink.write_end(12, 0).unwrap();
        sink.check().unwrap();
        assert!(!sink.is_scratch());
        sink.close(true).unwrap();

        let (h, periods, end) = read_artifact(&path).unwrap();
        assert_eq!(h.node_ids.len(), 2);
        assert_eq!(periods.len(), 1);
        assert!((periods[0].nodes[0].lateral_inflow_cfs - 3.0).abs() < 1e-12);
        assert!((periods[0].links[0].flow_cfs - 3.0).abs() < 1e-12);
        assert_eq!(end.unwrap().steps, 12);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn scratch_artifact_is_deleted_on_close() {
        let mut sink = ArtifactSink::new(None);
        let net = net();
        sink.open(&net, &header()).unwrap();
        assert!(sink.is_scratch());
        let path = sink.artifact_path().unwrap().to_path_buf();
        sink.close(false).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn snapshot_before_open_is_an_error() {
        let mut sink = ArtifactSink::new(None);
        assert!(matches!(
            sink.save_snapshot(&net(), 0.0),
            Err(EngineError::Output { .. })
        ));
    }
}
