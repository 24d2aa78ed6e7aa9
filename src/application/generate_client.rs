//! Use case for generating client implementations

use crate::application::{
    ApplicationError, GenerateClientRequest, GenerateClientResponse, OutputService,
};
use crate::generation::{ClassRenderer, Mapper, OpenApiLoader};
use std::sync::Arc;
use tracing::{info, warn};

/// Use case for generating client implementations
pub struct GenerateClientUseCase {
    loader: Arc<dyn OpenApiLoader>,
    renderer: Arc<dyn ClassRenderer>,
    output_service: Arc<dyn OutputService>,
}

impl GenerateClientUseCase {
    pub fn new(
        loader: Arc<dyn OpenApiLoader>,
        renderer: Arc<dyn ClassRenderer>,
        output_service: Arc<dyn OutputService>,
    ) -> Self {
        Self {
            loader,
            renderer,
            output_service,
        }
    }

    pub async fn execute(
        &self,
        request: GenerateClientRequest,
    ) -> Result<GenerateClientResponse, ApplicationError> {
        // 1. Validate request
        request.validate()?;

        // 2. Load the document
        let spec = self.loader.load(&request.schema_source).await?;

        // 3. Map it into classes
        let mut mapper = Mapper::new(request.config.into_mapper_config(spec))?;
        let report = mapper.generate()?;
        for failure in &report.failures {
            warn!(source = %failure.source, "Skipped: {}", failure.error);
        }

        // 4. Render and write
        let artifacts = mapper
            .write_files(self.renderer.as_ref(), self.output_service.as_ref())
            .await?;

        info!(
            classes = report.generated.len(),
            failures = report.failures.len(),
            "Client generation finished"
        );

        Ok(GenerateClientResponse::new(
            report,
            artifacts.len(),
            mapper.base_path().to_path_buf(),
        ))
    }
}
