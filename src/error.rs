use crate::body::SegmentId;
use thiserror::Error;

/// Reasons a chain mutation did not happen. None of them leave the chain half-modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("head or tail segment has no physical body")]
    MissingEndpoints,

    #[error("no segment prefab configured")]
    MissingPrefab,

    #[error("spawned object {0} has no physical body")]
    NoPhysicalBody(SegmentId),

    #[error("segment {0} not found in scene")]
    SegmentNotFound(SegmentId),

    #[error("scene rejected joint from segment {owner} to {connected}")]
    JointRejected {
        owner: SegmentId,
        connected: SegmentId,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse creature config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize creature config: {0}")]
    Serialize(#[from] ron::Error),
}
