//! Generation configuration
//!
//! Every knob a run reads, with defaults matching the classic generator settings.
//! Keys are camelCase in YAML. `validate` rejects impossible or contradictory bounds
//! before any entity is created; generators assume a validated config.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use loader::{load_config, ConfigLoader, CONFIG_ENV_VAR};

/// Shape and distribution settings for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    pub interface_count: usize,
    pub min_operations_per_interface: usize,
    pub max_operations_per_interface: usize,
    pub min_parameters_per_operation: usize,
    pub max_parameters_per_operation: usize,
    pub component_count: usize,
    pub min_provided_per_component: usize,
    pub max_provided_per_component: usize,
    pub min_required_per_component: usize,
    pub max_required_per_component: usize,
    /// Absent: reuse the catalog's two-container environment
    pub container_count: Option<usize>,
    /// Absent: draw one from OS entropy
    pub random_seed: Option<u64>,

    pub values: ValueConfig,
    pub behavior: BehaviorConfig,
    pub wiring: WiringConfig,
    pub deployment: DeploymentConfig,
    pub usage: UsageConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            interface_count: 5,
            min_operations_per_interface: 1,
            max_operations_per_interface: 5,
            min_parameters_per_operation: 0,
            max_parameters_per_operation: 3,
            component_count: 10,
            min_provided_per_component: 1,
            max_provided_per_component: 2,
            min_required_per_component: 1,
            max_required_per_component: 2,
            container_count: None,
            random_seed: None,
            values: ValueConfig::default(),
            behavior: BehaviorConfig::default(),
            wiring: WiringConfig::default(),
            deployment: DeploymentConfig::default(),
            usage: UsageConfig::default(),
        }
    }
}

/// Literal value ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueConfig {
    pub int_min: i64,
    pub int_max: i64,
    pub double_min: f64,
    pub double_max: f64,
    pub string_min_length: usize,
    pub string_max_length: usize,
    /// Resource demand amounts
    pub demand_min: f64,
    pub demand_max: f64,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            int_min: 0,
            int_max: 100,
            double_min: 0.0,
            double_max: 100.0,
            string_min_length: 5,
            string_max_length: 15,
            demand_min: 1.0,
            demand_max: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BehaviorConfig {
    /// Chance that an action delegates instead of demanding a resource
    pub delegate_probability: f64,
    pub min_actions: usize,
    pub max_actions: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            delegate_probability: 0.5,
            min_actions: 1,
            max_actions: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WiringConfig {
    /// Let one provided role serve several required roles
    pub fan_out: bool,
    /// Provided roles held back from wiring as system entry points
    pub min_exposed_provided: usize,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            fan_out: false,
            min_exposed_provided: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkTopology {
    /// One link joining every container
    #[default]
    Backbone,
    /// One link per neighbouring pair
    Chain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllocationPolicy {
    #[default]
    RoundRobin,
    Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub link_topology: LinkTopology,
    pub allocation_policy: AllocationPolicy,
    pub processing_rate_min: f64,
    pub processing_rate_max: f64,
    pub throughput_min: f64,
    pub throughput_max: f64,
    pub latency_min: f64,
    pub latency_max: f64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            link_topology: LinkTopology::default(),
            allocation_policy: AllocationPolicy::default(),
            processing_rate_min: 50.0e6,
            processing_rate_max: 2.0e9,
            throughput_min: 1.0e6,
            throughput_max: 12.5e6,
            latency_min: 0.01,
            latency_max: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkloadKind {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageConfig {
    pub min_calls: usize,
    pub max_calls: usize,
    pub workload: WorkloadKind,
    /// Open workload: arrival rate, inverted into the inter-arrival time
    pub arrival_rate_min: f64,
    pub arrival_rate_max: f64,
    /// Closed workload
    pub think_time_min: f64,
    pub think_time_max: f64,
    pub max_population: u32,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            min_calls: 1,
            max_calls: 3,
            workload: WorkloadKind::default(),
            arrival_rate_min: 0.01,
            arrival_rate_max: 0.1,
            think_time_min: 0.5,
            think_time_max: 5.0,
            max_population: 20,
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

impl GenerationConfig {
    /// Reject impossible configurations before generation starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero("interfaceCount", self.interface_count)?;
        non_zero("componentCount", self.component_count)?;
        non_zero("minProvidedPerComponent", self.min_provided_per_component)?;
        if let Some(containers) = self.container_count {
            non_zero("containerCount", containers)?;
        }

        ordered(
            "operationsPerInterface",
            self.min_operations_per_interface,
            self.max_operations_per_interface,
        )?;
        ordered(
            "parametersPerOperation",
            self.min_parameters_per_operation,
            self.max_parameters_per_operation,
        )?;
        ordered(
            "providedPerComponent",
            self.min_provided_per_component,
            self.max_provided_per_component,
        )?;
        ordered(
            "requiredPerComponent",
            self.min_required_per_component,
            self.max_required_per_component,
        )?;

        // Required interfaces are drawn outside the provided set
        let needed = self
            .min_provided_per_component
            .saturating_add(self.min_required_per_component);
        if needed > self.interface_count {
            return Err(ConfigError::InsufficientInterfaces {
                interfaces: self.interface_count,
                needed,
            });
        }

        let guaranteed_slots = self
            .component_count
            .saturating_mul(self.min_provided_per_component);
        if self.wiring.min_exposed_provided > guaranteed_slots {
            return Err(ConfigError::OutOfRange {
                field: "wiring.minExposedProvided",
                value: to_i64(self.wiring.min_exposed_provided),
                min: 0,
                max: to_i64(guaranteed_slots),
            });
        }

        self.values.validate()?;
        self.behavior.validate()?;
        self.deployment.validate()?;
        self.usage.validate()
    }

    /// The configured seed, or a fresh one from OS entropy
    pub fn resolve_seed(&self) -> u64 {
        self.random_seed.unwrap_or_else(rand::random)
    }

    /// True when the run reuses the catalog's template environment
    pub fn uses_default_environment(&self) -> bool {
        match self.container_count {
            None => true,
            Some(n) => n == crate::catalog::DEFAULT_CONTAINER_COUNT,
        }
    }
}

impl ValueConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.int_min > self.int_max {
            return Err(ConfigError::InvalidRange {
                field: "values.int",
                min: self.int_min as f64,
                max: self.int_max as f64,
            });
        }
        span("values.double", self.double_min, self.double_max)?;
        ordered(
            "values.stringLength",
            self.string_min_length,
            self.string_max_length,
        )?;
        positive_span("values.demand", self.demand_min, self.demand_max)
    }
}

impl BehaviorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        probability("behavior.delegateProbability", self.delegate_probability)?;
        non_zero("behavior.minActions", self.min_actions)?;
        ordered("behavior.actions", self.min_actions, self.max_actions)
    }
}

impl DeploymentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive_span(
            "deployment.processingRate",
            self.processing_rate_min,
            self.processing_rate_max,
        )?;
        positive_span(
            "deployment.throughput",
            self.throughput_min,
            self.throughput_max,
        )?;
        if self.latency_min < 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "deployment.latency",
                min: self.latency_min,
                max: self.latency_max,
            });
        }
        span("deployment.latency", self.latency_min, self.latency_max)
    }
}

impl UsageConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ordered("usage.calls", self.min_calls, self.max_calls)?;
        positive_span("usage.arrivalRate", self.arrival_rate_min, self.arrival_rate_max)?;
        if self.think_time_min < 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "usage.thinkTime",
                min: self.think_time_min,
                max: self.think_time_max,
            });
        }
        span("usage.thinkTime", self.think_time_min, self.think_time_max)?;
        non_zero("usage.maxPopulation", self.max_population as usize)
    }
}

fn non_zero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroCount { field });
    }
    Ok(())
}

fn ordered(field: &'static str, min: usize, max: usize) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedBounds { field, min, max });
    }
    Ok(())
}

fn span(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    // Sampling needs a finite width too
    if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    Ok(())
}

fn positive_span(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    span(field, min, max)?;
    if min <= 0.0 {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    Ok(())
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidProbability { field, value });
    }
    Ok(())
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
