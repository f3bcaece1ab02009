use thiserror::Error;

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Unknown node index {index} (network has {len} nodes)")]
    NodeIndex { index: usize, len: usize },

    #[error("Unknown link index {index} (network has {len} links)")]
    LinkIndex { index: usize, len: usize },

    #[error("Duplicate {what} name: {name}")]
    DuplicateName { what: &'static str, name: String },

    #[error("Bad geometry for {name}: {what}")]
    BadGeometry { name: String, what: &'static str },
}
