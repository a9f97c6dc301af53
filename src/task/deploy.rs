//! Packaging of the attached model.

use tracing::info;

use super::openvino::OpenVinoTask;
use crate::deploy::{DeploymentArchive, DeploymentConfig};
use crate::model::{ModelArtifact, KEY_IR_BIN, KEY_IR_XML};
use crate::Result;

impl OpenVinoTask {
    /// Package the attached model into a zip and store it as
    /// `output_model.exportable_code`.
    pub fn deploy(&self, output_model: &mut ModelArtifact) -> Result<()> {
        let _guard = self.span.enter();
        info!("Deploying model");

        let model = self.model("load weights")?;
        let config = DeploymentConfig::new(self.task_type(), self.openvino_configuration()?);
        let archive = DeploymentArchive::build(
            model.get_data(KEY_IR_XML)?,
            model.get_data(KEY_IR_BIN)?,
            &config,
            &self.exportable_code,
        )?;

        info!(bytes = archive.len(), "Deployment completed");
        output_model.exportable_code = Some(archive);
        Ok(())
    }
}
