//! Model generation pipeline
//!
//! Stages run strictly in order, each reading only what earlier stages produced:
//! interfaces → components → assembly/wiring → environment → allocation → usage.
//! Every stage is a plain function over a [`GenerationContext`], which owns the run's
//! random source and identifier registry.

pub mod components;
pub mod deployment;
pub mod interfaces;
pub mod literals;
pub mod usage;
pub mod wiring;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::catalog::StandardCatalog;
use crate::config::GenerationConfig;
use crate::error::{ConfigError, GenerationResult};
use crate::model::{Model, Repository};
use crate::names::{NameKind, NameRegistry};
use crate::validate;

/// Per-run state: random source, name registry and read-only inputs
pub struct GenerationContext<'a> {
    pub rng: ChaCha8Rng,
    pub names: NameRegistry<'a>,
    pub catalog: &'a StandardCatalog,
    pub config: &'a GenerationConfig,
}

impl<'a> GenerationContext<'a> {
    pub fn new(seed: u64, catalog: &'a StandardCatalog, config: &'a GenerationConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            names: NameRegistry::new(seed, catalog),
            catalog,
            config,
        }
    }
}

/// Builds complete models from a validated configuration
#[derive(Debug, Clone)]
pub struct ModelGenerator<'c> {
    catalog: &'c StandardCatalog,
    config: GenerationConfig,
}

impl<'c> ModelGenerator<'c> {
    /// Validate `config` up front; a generator never sees impossible bounds
    pub fn new(
        catalog: &'c StandardCatalog,
        config: &GenerationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            catalog,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate one model. The same seed always yields the same model.
    pub fn generate(&self, seed: u64) -> GenerationResult<Model<'c>> {
        let mut ctx = GenerationContext::new(seed, self.catalog, &self.config);

        let repository = build_repository(&mut ctx);
        debug!(
            "Repository {}: {} interfaces, {} components",
            repository.name,
            repository.interfaces.len(),
            repository.components.len()
        );

        let system = wiring::assemble(&mut ctx, &repository);
        let environment = deployment::environment(&mut ctx);
        let allocation = deployment::allocate(&mut ctx, &system, &environment)?;
        let usage = usage::generate(&mut ctx, &repository, &system);

        let model = Model {
            catalog: self.catalog,
            seed,
            repository,
            environment,
            system,
            allocation,
            usage,
        };
        validate::resolve_references(&model)?;

        info!(
            "Generated model (seed {}): {} components, {} connectors, {} endpoints, {} containers",
            seed,
            model.repository.components.len(),
            model.system.connectors.len(),
            model.system.endpoints.len(),
            model.environment.containers.len()
        );
        Ok(model)
    }
}

fn build_repository(ctx: &mut GenerationContext<'_>) -> Repository {
    let name = ctx.names.next(NameKind::Repository);
    let interfaces = interfaces::generate(ctx);
    let components = components::generate(ctx, &interfaces);
    Repository {
        name,
        interfaces,
        components,
    }
}
