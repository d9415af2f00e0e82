//! Model entities
//!
//! Every cross-layer reference is an index handle into an append-only table owned by an
//! earlier layer. A handle can only be minted after its target was pushed, so the
//! construction order itself rules out forward references.

pub mod allocation;
pub mod environment;
pub mod literal;
pub mod repository;
pub mod system;
pub mod usage;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::StandardCatalog;

pub use allocation::{Allocation, AllocationEntry};
pub use environment::{
    LinkingResource, ProcessingResourceSpec, ResourceContainer, ResourceEnvironment,
};
pub use literal::Literal;
pub use repository::{
    Action, BehaviorSpec, Component, Interface, Operation, OperationRef, Parameter, ProvidedRole,
    Repository, RequiredRole, ResourceRole,
};
pub use system::{
    AssemblyUnit, BoundaryEndpoint, Connector, EndpointDirection, RequirementResolution, RoleSlot,
    System, WiringOutcome,
};
pub use usage::{SystemCall, UsageModel, UsageScenario, Workload};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Handle into `Repository::interfaces`
    InterfaceId,
    "interface"
);
define_id!(
    /// Handle into `Repository::components`
    ComponentId,
    "component"
);
define_id!(
    /// Handle into `System::assemblies`
    AssemblyId,
    "assembly"
);
define_id!(ConnectorId, "connector");
define_id!(EndpointId, "endpoint");
define_id!(
    /// Handle into `ResourceEnvironment::containers`
    ContainerId,
    "container"
);

/// A complete generated model.
///
/// Built once, layer by layer, then only read (validated, serialized, discarded).
#[derive(Debug, Clone)]
pub struct Model<'c> {
    pub catalog: &'c StandardCatalog,
    pub seed: u64,
    pub repository: Repository,
    pub environment: ResourceEnvironment,
    pub system: System,
    pub allocation: Allocation,
    pub usage: UsageModel,
}

impl Model<'_> {
    pub fn stats(&self) -> ModelStats {
        let components = &self.repository.components;
        ModelStats {
            interfaces: self.repository.interfaces.len(),
            operations: self
                .repository
                .interfaces
                .iter()
                .map(|i| i.operations.len())
                .sum(),
            components: components.len(),
            provided_roles: components.iter().map(|c| c.provided.len()).sum(),
            required_roles: components.iter().map(|c| c.required.len()).sum(),
            behaviors: components.iter().map(|c| c.behaviors.len()).sum(),
            assemblies: self.system.assemblies.len(),
            connectors: self.system.connectors.len(),
            endpoints: self.system.endpoints.len(),
            containers: self.environment.containers.len(),
            links: self.environment.links.len(),
            allocations: self.allocation.entries.len(),
            usage_calls: self
                .usage
                .scenarios
                .iter()
                .map(|s| s.calls.len())
                .sum(),
        }
    }
}

/// Entity counts, recorded in the metadata sidecar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub interfaces: usize,
    pub operations: usize,
    pub components: usize,
    pub provided_roles: usize,
    pub required_roles: usize,
    pub behaviors: usize,
    pub assemblies: usize,
    pub connectors: usize,
    pub endpoints: usize,
    pub containers: usize,
    pub links: usize,
    pub allocations: usize,
    pub usage_calls: usize,
}
