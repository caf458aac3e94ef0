//! File collaborators around the engine: CSV export, CSV frame import, and
//! carry-forward state files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod export;
/// Long-format measurement frames.
pub mod frames;
pub mod state;

/// Failure reading or writing one of the engine's files.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot access \"{}\": {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("frame row {row}: {message}")]
    Frame { row: usize, message: String },
    #[error("invalid state file: {0}")]
    StateDecode(#[from] toml::de::Error),
    #[error("cannot encode state: {0}")]
    StateEncode(#[from] toml::ser::Error),
}
