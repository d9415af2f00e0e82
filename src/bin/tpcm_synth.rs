//! tpcm-synth command line interface
//!
//! # Usage
//!
//! ```bash
//! # One model with a fixed seed into ./out
//! tpcm-synth generate --seed 42 --output out
//!
//! # Print a model to stdout
//! tpcm-synth generate --interfaces 5 --components 10 --containers 3 --seed 42 --stdout
//!
//! # 100 models on 8 threads, shape varied per run
//! tpcm-synth generate --config gen.yaml --models 100 --jobs 8 --vary-shape
//!
//! # Validate a config file
//! tpcm-synth check-config --config gen.yaml
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tpcm_synth::batch::{self, BatchPlan};
use tpcm_synth::config::{ConfigLoader, CONFIG_ENV_VAR};
use tpcm_synth::{catalog, export, validate, GenerationConfig, ModelGenerator};

#[derive(Parser)]
#[command(name = "tpcm-synth")]
#[command(version)]
#[command(about = "Generate random, internally consistent component-architecture models")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for summaries: pretty (default) or json
    #[arg(long, short = 'f', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// Log progress (RUST_LOG still takes precedence per target)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one model, or a batch with --models
    Generate(GenerateArgs),

    /// Load and validate a configuration file
    CheckConfig {
        /// YAML config (defaults to $TPCM_SYNTH_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the fixed resourcetypes block
    Catalog,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// YAML config (defaults to $TPCM_SYNTH_CONFIG, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    shape: ShapeArgs,

    /// Seed; a batch uses seed + index per run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Model name, or name prefix for a batch
    #[arg(short, long, default_value = "model")]
    name: String,

    /// Number of models
    #[arg(short, long, default_value_t = 1)]
    models: usize,

    /// Worker threads for a batch
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Sample each run's counts up to the configured values
    #[arg(long)]
    vary_shape: bool,

    /// Let one provided role serve several required roles
    #[arg(long)]
    fan_out: bool,

    /// Print a single model to stdout instead of writing files
    #[arg(long, conflicts_with = "models")]
    stdout: bool,

    /// Run the full invariant check on a single model before writing it
    #[arg(long, conflicts_with = "models")]
    validate: bool,
}

/// Overrides for the count settings of the config
#[derive(clap::Args)]
struct ShapeArgs {
    #[arg(long)]
    interfaces: Option<usize>,
    #[arg(long)]
    min_operations: Option<usize>,
    #[arg(long)]
    max_operations: Option<usize>,
    #[arg(long)]
    min_parameters: Option<usize>,
    #[arg(long)]
    max_parameters: Option<usize>,
    #[arg(long)]
    components: Option<usize>,
    #[arg(long)]
    min_provided: Option<usize>,
    #[arg(long)]
    max_provided: Option<usize>,
    #[arg(long)]
    min_required: Option<usize>,
    #[arg(long)]
    max_required: Option<usize>,
    #[arg(long)]
    containers: Option<usize>,
}

impl ShapeArgs {
    fn apply(&self, config: &mut GenerationConfig) {
        fn set(target: &mut usize, value: Option<usize>) {
            if let Some(v) = value {
                *target = v;
            }
        }
        set(&mut config.interface_count, self.interfaces);
        set(&mut config.min_operations_per_interface, self.min_operations);
        set(&mut config.max_operations_per_interface, self.max_operations);
        set(&mut config.min_parameters_per_operation, self.min_parameters);
        set(&mut config.max_parameters_per_operation, self.max_parameters);
        set(&mut config.component_count, self.components);
        set(&mut config.min_provided_per_component, self.min_provided);
        set(&mut config.max_provided_per_component, self.max_provided);
        set(&mut config.min_required_per_component, self.min_required);
        set(&mut config.max_required_per_component, self.max_required);
        if self.containers.is_some() {
            config.container_count = self.containers;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate(args) => cmd_generate(args, cli.format),
        Commands::CheckConfig { config } => cmd_check_config(config, cli.format),
        Commands::Catalog => cmd_catalog(),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": e }));
            } else {
                eprintln!("{}: {}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_generate(args: GenerateArgs, format: OutputFormat) -> Result<(), String> {
    let mut config = resolve_config(args.config.as_deref())?;
    args.shape.apply(&mut config);
    if args.fan_out {
        config.wiring.fan_out = true;
    }
    if args.seed.is_some() {
        config.random_seed = args.seed;
    }
    config.validate().map_err(|e| format!("Invalid configuration: {}", e))?;
    let seed = config.resolve_seed();

    if args.models > 1 {
        return generate_batch(&args, config, seed, format);
    }

    let generator = ModelGenerator::new(catalog::standard(), &config).map_err(|e| e.to_string())?;
    let model = generator.generate(seed).map_err(|e| e.to_string())?;

    if args.validate {
        let violations = validate::validate_model(&model);
        if !violations.is_empty() {
            for v in &violations {
                eprintln!("  {} {}", "✗".red(), v);
            }
            return Err(format!("{} invariant violation(s)", violations.len()));
        }
    }

    let text = export::to_tpcm(&model).map_err(|e| e.to_string())?;
    if args.stdout {
        print!("{}", text);
        return Ok(());
    }

    let metadata =
        tpcm_synth::output::ModelMetadata::new(&args.name, seed, &text, model.stats(), &config);
    let written = tpcm_synth::output::write_model(&args.output, &text, &metadata)
        .map_err(|e| format!("{:#}", e))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "model": written.model,
                "metadata": written.metadata,
                "seed": seed,
                "sha256": metadata.sha256,
                "stats": metadata.stats,
            });
            println!("{}", output);
        }
        OutputFormat::Pretty => {
            println!("{} {}", "✓".green(), written.model.display());
            println!("  seed:       {}", seed);
            println!("  components: {}", metadata.stats.components);
            println!("  connectors: {}", metadata.stats.connectors);
            println!("  endpoints:  {}", metadata.stats.endpoints);
            println!("  sha256:     {}", metadata.sha256.dimmed());
        }
    }
    Ok(())
}

fn generate_batch(
    args: &GenerateArgs,
    config: GenerationConfig,
    master_seed: u64,
    format: OutputFormat,
) -> Result<(), String> {
    let plan = BatchPlan {
        config,
        models: args.models,
        jobs: args.jobs,
        master_seed,
        output_dir: args.output.clone(),
        name_prefix: args.name.clone(),
        vary_shape: args.vary_shape,
    };
    let reports = batch::run_batch(&plan, catalog::standard()).map_err(|e| format!("{:#}", e))?;
    let failed: Vec<_> = reports.iter().filter(|r| !r.succeeded()).collect();

    match format {
        OutputFormat::Json => {
            let runs: Vec<_> = reports
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "index": r.index,
                        "seed": r.seed,
                        "name": r.name,
                        "ok": r.succeeded(),
                        "error": r.outcome.as_ref().err().map(|e| format!("{:#}", e)),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({ "masterSeed": master_seed, "runs": runs })
            );
        }
        OutputFormat::Pretty => {
            for report in &reports {
                match &report.outcome {
                    Ok(written) => println!("{} {}", "✓".green(), written.model.display()),
                    Err(e) => {
                        println!("{} {} (seed {}): {:#}", "✗".red(), report.name, report.seed, e)
                    }
                }
            }
            println!(
                "\n{} of {} models written to {} (master seed {})",
                reports.len() - failed.len(),
                reports.len(),
                plan.output_dir.display(),
                master_seed
            );
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(format!("{} run(s) failed", failed.len()))
    }
}

fn cmd_check_config(path: Option<PathBuf>, format: OutputFormat) -> Result<(), String> {
    let config = resolve_config(path.as_deref())?;
    match format {
        OutputFormat::Json => {
            let output = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
            println!("{}", output);
        }
        OutputFormat::Pretty => {
            println!("{} configuration is valid", "✓".green());
            let output = serde_yaml::to_string(&config).map_err(|e| e.to_string())?;
            print!("{}", output);
        }
    }
    Ok(())
}

fn cmd_catalog() -> Result<(), String> {
    let text = export::resource_types(catalog::standard()).map_err(|e| e.to_string())?;
    print!("{}", text);
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// Explicit path, then $TPCM_SYNTH_CONFIG, then defaults
fn resolve_config(path: Option<&Path>) -> Result<GenerationConfig, String> {
    let loader = match path {
        Some(path) => ConfigLoader::new(path),
        None => {
            let loader = ConfigLoader::from_env();
            if let Some(path) = loader.path() {
                tracing::info!("Using {} from {}", path.display(), CONFIG_ENV_VAR);
            }
            loader
        }
    };
    loader.load().map_err(|e| format!("{:#}", e))
}
