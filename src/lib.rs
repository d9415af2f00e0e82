//! tpcm-synth: random, internally consistent component-architecture models
//!
//! The crate builds a layered object graph and renders it in the textual model format
//! consumed by the external converter:
//! - Interfaces with typed operation signatures
//! - Components with provided/required roles and one behavior spec per provided operation
//! - A system wiring assembly units together, exposing unmatched roles at its boundary
//! - A resource environment, an allocation of assembly units onto it
//! - A usage scenario calling system boundary operations
//!
//! Data flows strictly downward (catalog → interfaces → components → system →
//! deployment/usage → serializer). Entities reference each other through integer
//! handles into append-only tables, so nothing can point at an entity that does not
//! exist yet.
//!
//! # Usage
//!
//! ```
//! use tpcm_synth::{catalog, export, GenerationConfig, ModelGenerator};
//!
//! let config = GenerationConfig::default();
//! let generator = ModelGenerator::new(catalog::standard(), &config).unwrap();
//! let model = generator.generate(42).unwrap();
//! let text = export::to_tpcm(&model).unwrap();
//! assert!(text.starts_with("resourcetypes {"));
//! assert!(tpcm_synth::validate::validate_model(&model).is_empty());
//! ```

pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod model;
pub mod names;
pub mod output;
pub mod validate;

// Re-export commonly used types
pub use catalog::StandardCatalog;
pub use config::GenerationConfig;
pub use error::{ConfigError, GenerationError, SerializationError, UnresolvableReference};
pub use generate::ModelGenerator;
pub use model::Model;
