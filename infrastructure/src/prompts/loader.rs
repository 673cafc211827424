use polyllm_domain::{ConsensusPromptTemplate, ConversionPromptTemplate};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Cannot read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Template {} is missing: {}", path.display(), missing.join(", "))]
    MissingMarkers { path: PathBuf, missing: Vec<String> },
}

fn read(path: &Path) -> Result<String, TemplateError> {
    debug!("Loading prompt template {}", path.display());
    std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the consensus template from `path`, or the built-in one.
///
/// A file must contain every placeholder and section marker.
pub fn load_consensus_template(
    path: Option<&Path>,
) -> Result<ConsensusPromptTemplate, TemplateError> {
    let Some(path) = path else {
        return Ok(ConsensusPromptTemplate::builtin());
    };
    let template = ConsensusPromptTemplate::new(read(path)?);
    let missing = template.missing_markers();
    if !missing.is_empty() {
        return Err(TemplateError::MissingMarkers {
            path: path.to_path_buf(),
            missing,
        });
    }
    Ok(template)
}

/// Load a standard conversion template from `path`.
///
/// `None` without a path, so the use case keeps its built-in template.
pub fn load_conversion_template(
    path: Option<&Path>,
) -> Result<Option<ConversionPromptTemplate>, TemplateError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let template = ConversionPromptTemplate::new(read(path)?);
    let missing = template.missing_markers();
    if !missing.is_empty() {
        return Err(TemplateError::MissingMarkers {
            path: path.to_path_buf(),
            missing,
        });
    }
    Ok(Some(template))
}
