//! Auxiliary files shipped next to the model.

use std::path::Path;

use crate::{Error, Result};

/// Runtime and documentation files copied into every deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportableCodeTemplate {
    pub requirements: Vec<u8>,
    pub license: Vec<u8>,
    pub demo: Vec<u8>,
    pub readme: Vec<u8>,
}

impl Default for ExportableCodeTemplate {
    fn default() -> Self {
        Self {
            requirements: include_bytes!("../../assets/exportable_code/requirements.txt").to_vec(),
            license: include_bytes!("../../assets/exportable_code/LICENSE").to_vec(),
            demo: include_bytes!("../../assets/exportable_code/demo.py").to_vec(),
            readme: include_bytes!("../../assets/exportable_code/README.md").to_vec(),
        }
    }
}

impl ExportableCodeTemplate {
    /// Read the four files from a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read(&path).map_err(|e| Error::io(format!("reading {}", path.display()), e))
        };
        Ok(Self {
            requirements: read("requirements.txt")?,
            license: read("LICENSE")?,
            demo: read("demo.py")?,
            readme: read("README.md")?,
        })
    }

    /// Archive path and contents of each file.
    pub fn entries(&self) -> [(&'static str, &[u8]); 4] {
        [
            ("python/requirements.txt", self.requirements.as_slice()),
            ("python/LICENSE", self.license.as_slice()),
            ("python/demo.py", self.demo.as_slice()),
            ("README.md", self.readme.as_slice()),
        ]
    }
}
