use std::path::Path;

use serde::Deserialize;

use crate::error::{CommEvalError, Result};

/// Buffer capacity for graph file readers.
pub(crate) const READ_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Where the process logger pipes its records.
pub(crate) const LOG_DIR: &str = "logs";
pub(crate) const LOG_FILE: &str = "logs/comm_eval.log";

/// One experiment: a ground-truth and a predicted assignment file, with an
/// optional graph to score the predicted communities against.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentConfig {
    pub truth_file: String,
    pub pred_file: String,
    #[serde(default)]
    pub graph_file: Option<String>,
}

impl ExperimentConfig {
    /// Read an experiment description from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<ExperimentConfig> {
        let text = std::fs::read_to_string(path.as_ref())?;
        serde_yaml::from_str(&text).map_err(|err| CommEvalError::MalformedInput {
            detail: format!("experiment config: {}", err),
        })
    }
}
