//! Skill catalog loading.

use std::path::{Path, PathBuf};

use questarena_domain::{CatalogError, Skill, SkillCatalog};

#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("Failed to read skill catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse skill catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid skill catalog: {0}")]
    Invalid(#[from] CatalogError),
}

/// Load the catalog from a JSON array of skills, or the built-in catalog
/// when no path is configured.
pub fn load_skill_catalog(path: Option<&Path>) -> Result<SkillCatalog, CatalogLoadError> {
    let Some(path) = path else {
        return Ok(SkillCatalog::standard());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let skills: Vec<Skill> = serde_json::from_str(&raw).map_err(|source| CatalogLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = SkillCatalog::from_skills(skills)?;
    tracing::info!(path = %path.display(), skills = catalog.len(), "Loaded skill catalog");
    Ok(catalog)
}
