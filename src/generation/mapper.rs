//! Generation orchestrator
//!
//! The `Mapper` owns the document and the run's registries, runs each
//! resource mapper in turn, and collects what they produce into a
//! `NamespaceCollection`. Classes that fail are reported and left out; a
//! class is either complete or absent.

use openapiv3::{OpenAPI, ReferenceOr};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::application::{ApplicationError, OutputService};

use super::collection::{NamespaceCollection, NamespaceIndex};
use super::endpoint::EndpointGenerator;
use super::errors::GenerationError;
use super::model::ModelGenerator;
use super::rules;
use super::sanitizers::Sanitize;
use super::traits::ClassRenderer;
use super::type_map::TypeMap;
use super::types::{Artifact, GeneratedClass, HttpVerb, Namespace};

/// Base type generated endpoints wrap unless configured otherwise
pub const DEFAULT_BASE_TYPE: &str = "clientgen::runtime::Endpoint";
/// Media type whose schemas are used for bodies and responses
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
/// Namespace, relative to the base, that holds model classes
pub const DEFAULT_MODELS_NAMESPACE: &str = "models";

/// Everything the orchestrator is constructed from
#[derive(Debug, Clone)]
pub struct MapperConfig {
    pub spec: OpenAPI,
    /// Output root, resolved against the working directory
    pub base_path: PathBuf,
    pub base_namespace: String,
    pub base_type: String,
    pub content_type: String,
    pub models_namespace: String,
    pub verbs: Vec<HttpVerb>,
    /// Abort on the first failed class instead of reporting it
    pub fail_fast: bool,
}

impl MapperConfig {
    pub fn new(spec: OpenAPI, base_path: impl Into<PathBuf>, base_namespace: impl Into<String>) -> Self {
        Self {
            spec,
            base_path: base_path.into(),
            base_namespace: base_namespace.into(),
            base_type: DEFAULT_BASE_TYPE.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            models_namespace: DEFAULT_MODELS_NAMESPACE.to_string(),
            verbs: HttpVerb::ALL.to_vec(),
            fail_fast: false,
        }
    }
}

/// Validated settings shared by every resource mapper and the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct MapperSettings {
    pub base_namespace: Namespace,
    /// Fully-qualified models namespace
    pub models_namespace: Namespace,
    pub base_type: String,
    /// Module of the base type; runtime items are imported from here
    pub runtime_module: String,
    pub content_type: String,
    pub verbs: Vec<HttpVerb>,
}

impl MapperSettings {
    fn from_config(config: &MapperConfig) -> Result<Self, GenerationError> {
        let base_namespace = rules::validate_base_namespace(&config.base_namespace)?;
        let models =
            rules::validate_relative_namespace("models_namespace", &config.models_namespace)?;
        let runtime_module = rules::validate_base_type(&config.base_type)?;
        rules::validate_content_type(&config.content_type)?;
        rules::validate_verbs(&config.verbs)?;

        let mut verbs: Vec<HttpVerb> = Vec::with_capacity(config.verbs.len());
        for verb in &config.verbs {
            if !verbs.contains(verb) {
                verbs.push(*verb);
            }
        }

        Ok(Self {
            models_namespace: base_namespace.join(models.segments()),
            base_namespace,
            base_type: config.base_type.trim().to_string(),
            runtime_module,
            content_type: config.content_type.trim().to_string(),
            verbs,
        })
    }
}

/// What a resource mapper sees while it runs
pub struct MapContext<'a> {
    pub spec: &'a OpenAPI,
    pub settings: &'a MapperSettings,
    pub sanitize: &'a Sanitize,
    pub type_map: &'a mut TypeMap,
}

/// Outcome for one path or schema
#[derive(Debug)]
pub struct Mapped {
    pub source: String,
    pub result: Result<GeneratedClass, GenerationError>,
}

/// A family of resources sharing one mapping policy
pub trait ResourceMapper: Send + Sync {
    fn name(&self) -> &'static str;

    /// Verbs this mapper turns into methods
    fn supported_verbs(&self) -> &[HttpVerb];

    /// Media type whose schemas this mapper reads
    fn expected_content_type(&self) -> &str;

    fn map(&self, ctx: &mut MapContext<'_>) -> Vec<Mapped>;
}

/// Maps `paths` to endpoint classes
pub struct EndpointMapper {
    verbs: Vec<HttpVerb>,
    content_type: String,
}

impl EndpointMapper {
    pub fn new(verbs: Vec<HttpVerb>, content_type: impl Into<String>) -> Self {
        Self {
            verbs,
            content_type: content_type.into(),
        }
    }
}

impl ResourceMapper for EndpointMapper {
    fn name(&self) -> &'static str {
        "endpoints"
    }

    fn supported_verbs(&self) -> &[HttpVerb] {
        &self.verbs
    }

    fn expected_content_type(&self) -> &str {
        &self.content_type
    }

    fn map(&self, ctx: &mut MapContext<'_>) -> Vec<Mapped> {
        let generator = EndpointGenerator::new(
            ctx.spec,
            ctx.sanitize,
            &ctx.settings.base_namespace,
            &ctx.settings.base_type,
            self.supported_verbs(),
            self.expected_content_type(),
        );

        ctx.spec
            .paths
            .paths
            .iter()
            .map(|(url, item)| {
                debug!(path = %url, "Mapping path");
                let result = match item {
                    ReferenceOr::Item(item) => generator.generate(url, item, ctx.type_map),
                    ReferenceOr::Reference { reference } => Err(GenerationError::generator(
                        format!("{url}: path item reference `{reference}` is not supported"),
                    )),
                };
                Mapped {
                    source: url.clone(),
                    result,
                }
            })
            .collect()
    }
}

/// Maps `components.schemas` to model classes
pub struct ModelMapper {
    content_type: String,
}

impl ModelMapper {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
        }
    }
}

impl ResourceMapper for ModelMapper {
    fn name(&self) -> &'static str {
        "models"
    }

    fn supported_verbs(&self) -> &[HttpVerb] {
        &[]
    }

    fn expected_content_type(&self) -> &str {
        &self.content_type
    }

    fn map(&self, ctx: &mut MapContext<'_>) -> Vec<Mapped> {
        let generator = ModelGenerator::new(ctx.sanitize);
        let Some(components) = &ctx.spec.components else {
            return Vec::new();
        };

        components
            .schemas
            .iter()
            .map(|(name, schema)| {
                debug!(schema = %name, "Mapping schema");
                let source = format!("#/components/schemas/{name}");
                Mapped {
                    result: generator
                        .generate(name, schema, ctx.type_map)
                        .map_err(|e| e.at(&source)),
                    source,
                }
            })
            .collect()
    }
}

/// A class that was left out, and why
#[derive(Debug)]
pub struct GenerationFailure {
    pub source: String,
    pub error: GenerationError,
}

/// Summary of one `generate` run
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Fully-qualified names, in collection order
    pub generated: Vec<String>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The orchestrator
pub struct Mapper {
    spec: OpenAPI,
    settings: MapperSettings,
    base_path: PathBuf,
    fail_fast: bool,
    sanitize: Sanitize,
    type_map: TypeMap,
    mappers: Vec<Box<dyn ResourceMapper>>,
    classes: NamespaceCollection,
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("settings", &self.settings)
            .field("base_path", &self.base_path)
            .field("classes", &self.classes.len())
            .finish()
    }
}

impl Mapper {
    /// Validates the configuration and prepares the output root.
    ///
    /// The default mapper set generates models first, then endpoints.
    pub fn new(config: MapperConfig) -> Result<Self, GenerationError> {
        let settings = MapperSettings::from_config(&config)?;
        let base_path = canonical_base_path(&config.base_path)?;
        let sanitize = Sanitize::new();
        let type_map = TypeMap::for_spec(&config.spec, sanitize, settings.models_namespace.clone());

        let mappers: Vec<Box<dyn ResourceMapper>> = vec![
            Box::new(ModelMapper::new(settings.content_type.clone())),
            Box::new(EndpointMapper::new(
                settings.verbs.clone(),
                settings.content_type.clone(),
            )),
        ];

        debug!(base_path = %base_path.display(), namespace = %settings.base_namespace, "Mapper ready");
        Ok(Self {
            classes: NamespaceCollection::new(settings.base_namespace.clone()),
            spec: config.spec,
            settings,
            base_path,
            fail_fast: config.fail_fast,
            sanitize,
            type_map,
            mappers,
        })
    }

    /// Replaces the resource mappers, e.g. to generate endpoints only.
    pub fn with_mappers(mut self, mappers: Vec<Box<dyn ResourceMapper>>) -> Self {
        self.mappers = mappers;
        self
    }

    pub fn settings(&self) -> &MapperSettings {
        &self.settings
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn classes(&self) -> &NamespaceCollection {
        &self.classes
    }

    pub fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    /// Runs every resource mapper and fills the collection.
    ///
    /// Per-class failures are reported and skipped unless `fail_fast` is
    /// set. A class that imports a class missing from the final collection
    /// is dropped as well. Running again starts from an empty collection.
    pub fn generate(&mut self) -> Result<GenerationReport, GenerationError> {
        self.classes = NamespaceCollection::new(self.settings.base_namespace.clone());
        self.type_map = TypeMap::for_spec(
            &self.spec,
            self.sanitize,
            self.settings.models_namespace.clone(),
        );

        let mut report = GenerationReport::default();
        let mut pending: Vec<GeneratedClass> = Vec::new();

        for mapper in &self.mappers {
            info!(mapper = mapper.name(), "Running resource mapper");
            let mut ctx = MapContext {
                spec: &self.spec,
                settings: &self.settings,
                sanitize: &self.sanitize,
                type_map: &mut self.type_map,
            };
            for mapped in mapper.map(&mut ctx) {
                match mapped.result {
                    Ok(class) => pending.push(class),
                    Err(error) => reject(&mut report, self.fail_fast, mapped.source, error)?,
                }
            }
        }

        // Dropping a class can strand the classes that import it, so repeat
        // until nothing else falls out.
        loop {
            let known: HashSet<String> = pending.iter().map(|c| c.qualified_name()).collect();
            let (ready, dangling): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|c| c.uses.iter().all(|u| known.contains(&u.to_string())));
            pending = ready;
            if dangling.is_empty() {
                break;
            }
            for class in dangling {
                let missing = class
                    .uses
                    .iter()
                    .map(|u| u.to_string())
                    .find(|u| !known.contains(u))
                    .unwrap_or_default();
                let error = GenerationError::generator(format!(
                    "class `{}` uses `{missing}`, which was not generated",
                    class.name
                ));
                reject(&mut report, self.fail_fast, class.source, error)?;
            }
        }

        for class in pending {
            let source = class.source.clone();
            let name = class.qualified_name();
            match self.classes.insert(class) {
                Ok(()) => report.generated.push(name),
                Err(error) => reject(&mut report, self.fail_fast, source, error)?,
            }
        }

        info!(
            generated = report.generated.len(),
            failed = report.failures.len(),
            "Generation finished"
        );
        Ok(report)
    }

    /// Output file of a class: `<base_path>/<namespace dirs>/<ShortName>.rs`
    pub fn file_path(&self, class: &GeneratedClass) -> PathBuf {
        let mut path = self.namespace_dir(&class.name.namespace);
        path.push(format!("{}.rs", class.name.short_name));
        path
    }

    /// Output file of a namespace's module index
    pub fn index_path(&self, index: &NamespaceIndex) -> PathBuf {
        self.namespace_dir(&index.namespace).join("mod.rs")
    }

    fn namespace_dir(&self, namespace: &Namespace) -> PathBuf {
        let mut path = self.base_path.clone();
        for segment in namespace
            .relative_to(&self.settings.base_namespace)
            .unwrap_or_default()
        {
            path.push(segment);
        }
        path
    }

    /// Renders every class, then every namespace index.
    pub fn render_files(&self, renderer: &dyn ClassRenderer) -> Result<Vec<Artifact>, GenerationError> {
        let mut artifacts = Vec::with_capacity(self.classes.len());
        for class in self.classes.classes() {
            artifacts.push(Artifact {
                path: self.file_path(class),
                content: renderer
                    .render_class(class, &self.settings)
                    .map_err(|e| e.at(&class.qualified_name()))?,
            });
        }
        for index in self.classes.namespaces() {
            artifacts.push(Artifact {
                path: self.index_path(&index),
                content: renderer.render_index(&index, &self.settings)?,
            });
        }
        Ok(artifacts)
    }

    /// Renders and writes all files. Existing files are never overwritten:
    /// the output service refuses the whole batch if any target exists.
    pub async fn write_files(
        &self,
        renderer: &dyn ClassRenderer,
        output: &dyn OutputService,
    ) -> Result<Vec<Artifact>, ApplicationError> {
        let artifacts = self.render_files(renderer)?;
        output.ensure_directory(&self.base_path).await?;
        output.write_artifacts(&artifacts).await?;
        info!(files = artifacts.len(), base_path = %self.base_path.display(), "Wrote generated files");
        Ok(artifacts)
    }
}

fn reject(
    report: &mut GenerationReport,
    fail_fast: bool,
    source: String,
    error: GenerationError,
) -> Result<(), GenerationError> {
    if fail_fast || !error.is_per_class() {
        return Err(error);
    }
    warn!(source = %source, error = %error, "Discarded class");
    report.failures.push(GenerationFailure { source, error });
    Ok(())
}

fn canonical_base_path(path: &Path) -> Result<PathBuf, GenerationError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    std::fs::create_dir_all(&absolute)?;
    Ok(absolute.canonicalize()?)
}
