use thiserror::Error;

use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::{ReportError, TreeError};

/// Unified error type covering tree building, configuration, history
/// backends, report runs and I/O.
///
/// Returned by convenience functions like [`run_configured()`](crate::run_configured),
/// and convertible from every error the crate's individual operations return.
#[derive(Debug, Error)]
pub enum DocqueryError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
