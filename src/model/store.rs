//! On-disk persistence of model artifacts.
//!
//! Layout: one file per blob under `blobs/`, plus `manifest.json` holding
//! the descriptive attributes and a SHA-256 digest per blob.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::artifact::ModelArtifact;
use super::types::{ModelFormat, ModelOptimizationType, ModelPrecision, OptimizationMethod};
use crate::{Error, Result};

const MANIFEST_FILE: &str = "manifest.json";
const BLOB_DIR: &str = "blobs";
const EXPORTABLE_CODE_FILE: &str = "exportable_code.zip";

#[derive(Debug, Serialize, Deserialize)]
struct BlobEntry {
    file: String,
    sha256: String,
    size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    model_format: ModelFormat,
    optimization_type: ModelOptimizationType,
    optimization_methods: Vec<OptimizationMethod>,
    precision: Vec<ModelPrecision>,
    blobs: BTreeMap<String, BlobEntry>,
    #[serde(default)]
    exportable_code: Option<BlobEntry>,
}

/// SHA-256 digest of a blob as lowercase hex.
pub fn blob_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Blob keys may contain characters that are not valid in file names.
fn blob_file_name(index: usize, key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("{index:03}_{sanitized}")
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data).map_err(|e| Error::io(format!("writing {}", path.display()), e))
}

fn read_verified(dir: &Path, key: &str, entry: &BlobEntry) -> Result<Vec<u8>> {
    let path = dir.join(&entry.file);
    let data = std::fs::read(&path).map_err(|e| Error::io(format!("reading {}", path.display()), e))?;
    let actual = blob_digest(&data);
    if actual != entry.sha256 {
        return Err(Error::InvalidBlob {
            key: key.to_string(),
            message: format!("expected SHA256 {}, got {actual}", entry.sha256),
        });
    }
    Ok(data)
}

impl ModelArtifact {
    /// Write the artifact into `dir`, creating it if needed.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        let blob_dir = dir.join(BLOB_DIR);
        std::fs::create_dir_all(&blob_dir)
            .map_err(|e| Error::io(format!("creating {}", blob_dir.display()), e))?;

        let mut blobs = BTreeMap::new();
        for (index, (key, data)) in self.entries().enumerate() {
            let file = format!("{BLOB_DIR}/{}", blob_file_name(index, key));
            write_file(&dir.join(&file), data)?;
            blobs.insert(
                key.clone(),
                BlobEntry {
                    file,
                    sha256: blob_digest(data),
                    size: data.len(),
                },
            );
        }

        let exportable_code = match &self.exportable_code {
            Some(code) => {
                write_file(&dir.join(EXPORTABLE_CODE_FILE), code)?;
                Some(BlobEntry {
                    file: EXPORTABLE_CODE_FILE.to_string(),
                    sha256: blob_digest(code),
                    size: code.len(),
                })
            }
            None => None,
        };

        let manifest = Manifest {
            model_format: self.model_format,
            optimization_type: self.optimization_type,
            optimization_methods: self.optimization_methods.clone(),
            precision: self.precision.clone(),
            blobs,
            exportable_code,
        };
        write_file(
            &dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?.as_bytes(),
        )?;

        Ok(dir.to_path_buf())
    }

    /// Load an artifact previously written by [`ModelArtifact::save`].
    ///
    /// Every blob is checked against its recorded digest.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&manifest_path)
            .map_err(|e| Error::io(format!("reading {}", manifest_path.display()), e))?;
        let manifest: Manifest = serde_json::from_str(&content).map_err(|e| Error::ConfigParsing {
            path: manifest_path.clone(),
            message: e.to_string(),
        })?;

        let mut artifact = ModelArtifact::default();
        artifact.model_format = manifest.model_format;
        artifact.optimization_type = manifest.optimization_type;
        artifact.optimization_methods = manifest.optimization_methods;
        artifact.precision = manifest.precision;
        for (key, entry) in &manifest.blobs {
            let data = read_verified(dir, key, entry)?;
            artifact.set_data(key.clone(), data);
        }
        if let Some(entry) = &manifest.exportable_code {
            artifact.exportable_code = Some(read_verified(dir, EXPORTABLE_CODE_FILE, entry)?);
        }

        Ok(artifact)
    }
}
