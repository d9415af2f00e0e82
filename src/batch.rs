//! Batch generation
//!
//! Runs are independent: each owns its generator context and writes its own files, so
//! a batch is a plain parallel map over run indices on a rayon pool. Run `i` uses seed
//! `master_seed + i`; a failed run is reported and does not stop the others.

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::catalog::StandardCatalog;
use crate::config::GenerationConfig;
use crate::error::GenerationResult;
use crate::export;
use crate::generate::ModelGenerator;
use crate::model::ModelStats;
use crate::output::{self, ModelMetadata, WrittenModel};

/// Offset of the shape-variation stream from a run's seed
const SHAPE_SEED_OFFSET: u64 = 1000;

#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub config: GenerationConfig,
    pub models: usize,
    pub jobs: usize,
    pub master_seed: u64,
    pub output_dir: PathBuf,
    pub name_prefix: String,
    /// Sample each run's counts up to the configured maxima
    pub vary_shape: bool,
}

impl BatchPlan {
    pub fn run_name(&self, index: usize) -> String {
        format!("{}_{:04}", self.name_prefix, index)
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub index: usize,
    pub seed: u64,
    pub name: String,
    pub outcome: Result<WrittenModel>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub fn derive_seed(master_seed: u64, index: usize) -> u64 {
    master_seed.wrapping_add(index as u64)
}

/// Per-run shape: counts drawn up to the configured values from `seed + 1000`,
/// kept within what validation accepts
pub fn vary_shape(config: &GenerationConfig, seed: u64) -> GenerationConfig {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(SHAPE_SEED_OFFSET));
    let mut shaped = config.clone();

    let min_interfaces =
        (config.min_provided_per_component + config.min_required_per_component).max(1);
    shaped.interface_count =
        rng.gen_range(min_interfaces..=config.interface_count.max(min_interfaces));
    shaped.component_count = rng.gen_range(1..=config.component_count.max(1));
    shaped.container_count = config.container_count.map(|n| rng.gen_range(1..=n.max(1)));

    let slots = shaped
        .component_count
        .saturating_mul(shaped.min_provided_per_component);
    shaped.wiring.min_exposed_provided = shaped.wiring.min_exposed_provided.min(slots);
    shaped
}

/// Generate and serialize one model
pub fn render(
    catalog: &StandardCatalog,
    config: &GenerationConfig,
    seed: u64,
) -> GenerationResult<(String, ModelStats)> {
    let generator = ModelGenerator::new(catalog, config)?;
    let model = generator.generate(seed)?;
    let text = export::to_tpcm(&model)?;
    Ok((text, model.stats()))
}

/// Generate one model and write it (plus metadata) into `dir`
pub fn run_single(
    catalog: &StandardCatalog,
    config: &GenerationConfig,
    seed: u64,
    name: &str,
    dir: &Path,
) -> Result<WrittenModel> {
    let (text, stats) = render(catalog, config, seed)
        .with_context(|| format!("Run {} (seed {}) failed", name, seed))?;
    let metadata = ModelMetadata::new(name, seed, &text, stats, config);
    output::write_model(dir, &text, &metadata)
}

pub fn run_batch(plan: &BatchPlan, catalog: &StandardCatalog) -> Result<Vec<RunReport>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.jobs.max(1))
        .build()
        .context("Failed to build batch thread pool")?;

    info!(
        "Generating {} models with {} jobs into {}",
        plan.models,
        plan.jobs.max(1),
        plan.output_dir.display()
    );

    let reports: Vec<RunReport> = pool.install(|| {
        (0..plan.models)
            .into_par_iter()
            .map(|index| {
                let seed = derive_seed(plan.master_seed, index);
                let name = plan.run_name(index);
                let config = if plan.vary_shape {
                    vary_shape(&plan.config, seed)
                } else {
                    plan.config.clone()
                };
                let outcome = run_single(catalog, &config, seed, &name, &plan.output_dir);
                if let Err(e) = &outcome {
                    error!("{:#}", e);
                }
                RunReport {
                    index,
                    seed,
                    name,
                    outcome,
                }
            })
            .collect()
    });

    let ok = reports.iter().filter(|r| r.succeeded()).count();
    info!("Batch finished: {} of {} runs succeeded", ok, reports.len());
    Ok(reports)
}
