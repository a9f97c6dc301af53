//! Scoped on-disk workspace for IR files.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::graph::IrModel;
use crate::{Error, Result};

/// A temporary directory holding `model.xml` and `model.bin`.
///
/// The directory and its contents are removed when the value is dropped,
/// whether the surrounding operation succeeded or returned early.
#[derive(Debug)]
pub struct ScopedIrDir {
    dir: TempDir,
}

impl ScopedIrDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("ir-")
            .tempdir()
            .map_err(|e| Error::io("creating temporary IR directory", e))?;
        Ok(Self { dir })
    }

    /// Create the directory and write the IR blobs into it.
    pub fn with_blobs(xml: &[u8], bin: &[u8]) -> Result<Self> {
        let scoped = Self::new()?;
        let xml_path = scoped.xml_path();
        std::fs::write(&xml_path, xml)
            .map_err(|e| Error::io(format!("writing {}", xml_path.display()), e))?;
        let bin_path = scoped.bin_path();
        std::fs::write(&bin_path, bin)
            .map_err(|e| Error::io(format!("writing {}", bin_path.display()), e))?;
        Ok(scoped)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn xml_path(&self) -> PathBuf {
        self.dir.path().join("model.xml")
    }

    pub fn bin_path(&self) -> PathBuf {
        IrModel::weights_path(&self.xml_path())
    }

    /// Read back both files as raw bytes.
    pub fn read_blobs(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let xml_path = self.xml_path();
        let xml = std::fs::read(&xml_path)
            .map_err(|e| Error::io(format!("reading {}", xml_path.display()), e))?;
        let bin_path = self.bin_path();
        let bin = std::fs::read(&bin_path)
            .map_err(|e| Error::io(format!("reading {}", bin_path.display()), e))?;
        Ok((xml, bin))
    }
}
