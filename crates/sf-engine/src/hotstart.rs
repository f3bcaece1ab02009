//! Hot-start persistence: saved node/link state applied in place of
//! default initial conditions.
//!
//! The payload is a JSON document with a sha256 digest over the state
//! block, so a truncated or edited file is rejected instead of silently
//! seeding a run with garbage.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sf_network::Network;
use std::path::PathBuf;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::traits::HotstartStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HotstartPayload {
    digest: String,
    state: HotstartState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HotstartState {
    nodes: Vec<NodeState>,
    links: Vec<LinkState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeState {
    id: String,
    depth_ft: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinkState {
    id: String,
    flow_cfs: f64,
    depth_ft: f64,
}

/// File-backed hot-start store. Either path may be absent: no use-file
/// means `restore` applies nothing, no save-file means `save` is a
/// no-op.
#[derive(Debug, Clone, Default)]
pub struct FileHotstart {
    use_file: Option<PathBuf>,
    save_file: Option<PathBuf>,
}

impl FileHotstart {
    pub fn new(use_file: Option<PathBuf>, save_file: Option<PathBuf>) -> Self {
        Self {
            use_file,
            save_file,
        }
    }
}

fn state_digest(state: &HotstartState) -> EngineResult<String> {
    let bytes = serde_json::to_vec(state).map_err(|e| EngineError::Hotstart {
        message: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

fn capture_state(network: &Network) -> HotstartState {
    HotstartState {
        nodes: network
            .nodes
            .iter()
            .map(|n| NodeState {
                id: n.name.clone(),
                depth_ft: n.depth_ft,
            })
            .collect(),
        links: network
            .links
            .iter()
            .map(|l| LinkState {
                id: l.name.clone(),
                flow_cfs: l.flow_cfs,
                depth_ft: l.depth_ft,
            })
            .collect(),
    }
}

fn apply_state(state: &HotstartState, network: &mut Network) -> EngineResult<()> {
    for node_state in &state.nodes {
        let index = network
            .node_index(&node_state.id)
            .ok_or_else(|| EngineError::Hotstart {
                message: format!("hot-start node '{}' is not in the network", node_state.id),
            })?;
        let node = &mut network.nodes[index];
        node.depth_ft = node_state.depth_ft.clamp(0.0, node.full_depth_ft);
        node.volume_ft3 = node.geometry.volume_of_depth_ft3(node.depth_ft);
    }
    for link_state in &state.links {
        let index = network
            .link_index(&link_state.id)
            .ok_or_else(|| EngineError::Hotstart {
                message: format!("hot-start link '{}' is not in the network", link_state.id),
            })?;
        let link = &mut network.links[index];
        link.flow_cfs = link_state.flow_cfs;
        link.depth_ft = link_state.depth_ft.clamp(0.0, link.y_full_ft());
    }
    Ok(())
}

impl HotstartStore for FileHotstart {
    fn restore(&mut self, network: &mut Network) -> EngineResult<bool> {
        let Some(path) = &self.use_file else {
            return Ok(false);
        };
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::Hotstart {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let payload: HotstartPayload =
            serde_json::from_str(&content).map_err(|e| EngineError::Hotstart {
                message: format!("bad hot-start file {}: {e}", path.display()),
            })?;
        let digest = state_digest(&payload.state)?;
        if digest != payload.digest {
            return Err(EngineError::Hotstart {
                message: format!("digest mismatch in {}", path.display()),
            });
        }
        apply_state(&payload.state, network)?;
        info!(path = %path.display(), "hot-start state restored");
        Ok(true)
    }

    fn save(&mut self, network: &Network) -> EngineResult<()> {
        let Some(path) = &self.save_file else {
            return Ok(());
        };
        let state = capture_state(network);
        let payload = HotstartPayload {
            digest: state_digest(&state)?,
            state,
        };
        let content = serde_json::to_string_pretty(&payload).map_err(|e| EngineError::Hotstart {
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| EngineError::Hotstart {
            message: format!("cannot write {}: {e}", path.display()),
        })?;
        info!(path = %path.display(), "hot-start state saved");
        Ok(())
    }

    fn close(&mut self) -> EngineResult<()> {
        Ok(())
    }
}
