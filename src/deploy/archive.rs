//! In-memory zip archive of a deployment.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;

use super::config::DeploymentConfig;
use super::template::ExportableCodeTemplate;
use crate::{Error, Result};

pub const ENTRY_MODEL_XML: &str = "model/model.xml";
pub const ENTRY_MODEL_BIN: &str = "model/model.bin";
pub const ENTRY_CONFIG: &str = "model/config.json";

/// Entries of a deployment archive, by path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeploymentArchive {
    entries: BTreeMap<String, Vec<u8>>,
}

impl DeploymentArchive {
    /// Build the archive bytes.
    pub fn build(
        xml: &[u8],
        bin: &[u8],
        config: &DeploymentConfig,
        template: &ExportableCodeTemplate,
    ) -> Result<Vec<u8>> {
        let config_json = config.to_json_bytes()?;
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            let model_entries = [
                (ENTRY_MODEL_XML, xml),
                (ENTRY_MODEL_BIN, bin),
                (ENTRY_CONFIG, config_json.as_slice()),
            ];
            for (path, content) in model_entries.into_iter().chain(template.entries()) {
                debug!(path, bytes = content.len(), "Adding archive entry");
                zip.start_file(path, options)?;
                zip.write_all(content)
                    .map_err(|e| Error::io(format!("writing archive entry {path}"), e))?;
            }
            zip.finish()?;
        }
        Ok(buffer.into_inner())
    }

    /// Read every entry of an archive.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
            file.read_to_end(&mut content)
                .map_err(|e| Error::io(format!("reading archive entry {name}"), e))?;
            entries.insert(name, content);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn config(&self) -> Result<DeploymentConfig> {
        let bytes = self.get(ENTRY_CONFIG).ok_or_else(|| Error::MissingData {
            key: ENTRY_CONFIG.to_string(),
        })?;
        DeploymentConfig::from_json_bytes(bytes)
    }
}
