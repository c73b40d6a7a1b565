use super::config::ConfigError;
use std::error::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Atom index {index} in {group} is out of range for a topology of {num_atoms} atoms")]
    AtomIndexOutOfRange {
        group: &'static str,
        index: usize,
        num_atoms: usize,
    },

    #[error("Frame {frame} has {found} atoms but the topology has {expected}")]
    FrameSize {
        frame: usize,
        expected: usize,
        found: usize,
    },

    #[error("Failed to read frame {frame}: {source}")]
    Trajectory {
        frame: usize,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}
