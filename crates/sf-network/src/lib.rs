//! sf-network: drainage network data model for stormflow.
//!
//! Provides:
//! - Node/link entity tables with stable integer indexing
//! - Cross-section and storage geometry (depth <-> volume)
//! - Catchments and rain gages (the runoff-producing entities)
//! - Name lookup, outflow degrees, topological ordering
//!
//! # Example
//!
//! ```
//! use sf_network::{Network, NodeKind, LinkKind, XSection};
//!
//! let mut net = Network::new();
//! let a = net.add_node("A", NodeKind::Junction);
//! let b = net.add_node("B", NodeKind::Outfall);
//! net.add_link("A-B", LinkKind::Conduit, a, b,
//!              XSection::Circular { diameter_ft: 1.0 }).unwrap();
//! net.finalize().unwrap();
//!
//! assert_eq!(net.node_count(), 2);
//! assert_eq!(net.nodes[a].degree, 1);
//! ```

pub mod catchment;
pub mod error;
pub mod geometry;
pub mod link;
pub mod network;
pub mod node;
pub mod xsect;

// Re-exports for ergonomics
pub use catchment::{Catchment, RainGage};
pub use error::{NetworkError, NetworkResult};
pub use geometry::NodeGeometry;
pub use link::{Link, LinkKind};
pub use network::Network;
pub use node::{Node, NodeKind};
pub use xsect::XSection;
