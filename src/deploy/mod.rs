//! Deployment packaging
//!
//! A deployment is a single zip archive built in memory:
//!
//! ```text
//! model/model.xml
//! model/model.bin
//! model/config.json
//! python/requirements.txt
//! python/LICENSE
//! python/demo.py
//! README.md
//! ```

mod archive;
mod config;
mod template;

#[cfg(test)]
mod tests;

pub use archive::{DeploymentArchive, ENTRY_CONFIG, ENTRY_MODEL_BIN, ENTRY_MODEL_XML};
pub use config::DeploymentConfig;
pub use template::ExportableCodeTemplate;
