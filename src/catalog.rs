//! Standard Catalog - fixed definitions shared by every generated model
//!
//! The catalog holds everything a model may reference but never generates:
//! - Primitive datatypes (Integer, Double, Boolean, String)
//! - Failure types
//! - Resource-type interfaces (ICPU, IHDD) that back the implicit component requirements
//! - Scheduling-policy enumerants
//! - Processing resource types, the Ethernet link type and the passive-resource interface
//! - A reusable two-node resource environment template
//!
//! It is built once per process and handed to every run by reference.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::environment::{
    LinkingResource, ProcessingResourceSpec, ResourceContainer, ResourceEnvironment,
};
use crate::model::ContainerId;

/// Number of containers in the catalog's default environment.
pub const DEFAULT_CONTAINER_COUNT: usize = 2;

static STANDARD: Lazy<StandardCatalog> = Lazy::new(StandardCatalog::new);

/// The process-wide catalog instance.
pub fn standard() -> &'static StandardCatalog {
    &STANDARD
}

// =============================================================================
// ENUMERANTS
// =============================================================================

/// Primitive datatype kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Integer,
    Double,
    Boolean,
    String,
}

impl Primitive {
    pub const ALL: [Primitive; 4] = [
        Primitive::Integer,
        Primitive::Double,
        Primitive::Boolean,
        Primitive::String,
    ];

    /// Declared datatype name in the repository
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Integer => "Integer",
            Primitive::Double => "Double",
            Primitive::Boolean => "Boolean",
            Primitive::String => "String",
        }
    }

    /// Built-in kind keyword of the textual format
    pub fn keyword(&self) -> &'static str {
        match self {
            Primitive::Integer => "INT",
            Primitive::Double => "DOUBLE",
            Primitive::Boolean => "BOOL",
            Primitive::String => "STRING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchedulingPolicy {
    FirstComeFirstServe,
    ProcessorSharing,
    Delay,
}

impl SchedulingPolicy {
    pub const ALL: [SchedulingPolicy; 3] = [
        SchedulingPolicy::FirstComeFirstServe,
        SchedulingPolicy::ProcessorSharing,
        SchedulingPolicy::Delay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SchedulingPolicy::FirstComeFirstServe => "FirstComeFirstServe",
            SchedulingPolicy::ProcessorSharing => "ProcessorSharing",
            SchedulingPolicy::Delay => "Delay",
        }
    }
}

/// Infrastructure resources every component implicitly requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Cpu,
    Hdd,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Cpu, ResourceKind::Hdd];

    /// Name of the implicit required role on every component
    pub fn role_name(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Hdd => "hdd",
        }
    }

    /// Resource-type interface the role is bound to
    pub fn interface_name(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "ICPU",
            ResourceKind::Hdd => "IHDD",
        }
    }

    /// Processing resource type providing the interface
    pub fn processing_type(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "CPUResource",
            ResourceKind::Hdd => "HDDResource",
        }
    }

    /// Name of the processing resource inside a container
    pub fn resource_name(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "CPU",
            ResourceKind::Hdd => "HDD",
        }
    }

    pub fn operations(&self) -> &'static [ResourceOperation] {
        match self {
            ResourceKind::Cpu => &[ResourceOperation::Process],
            ResourceKind::Hdd => &[ResourceOperation::Read, ResourceOperation::Write],
        }
    }
}

/// Operations of the resource-type interfaces; each takes a single `amount : DOUBLE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceOperation {
    Process,
    Read,
    Write,
}

impl ResourceOperation {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceOperation::Process => ResourceKind::Cpu,
            ResourceOperation::Read | ResourceOperation::Write => ResourceKind::Hdd,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceOperation::Process => "process",
            ResourceOperation::Read => "read",
            ResourceOperation::Write => "write",
        }
    }
}

// =============================================================================
// DEFINITIONS
// =============================================================================

/// A typed property slot of a resource or link type
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: &'static str,
    pub type_name: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingTypeDef {
    pub name: &'static str,
    pub provides: Option<ResourceKind>,
    pub failure: Option<&'static str>,
    pub properties: Vec<PropertyDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkTypeDef {
    pub name: &'static str,
    pub properties: Vec<PropertyDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InternalInterfaceDef {
    pub name: &'static str,
    pub properties: Vec<PropertyDef>,
    pub operations: Vec<&'static str>,
}

/// Read-only definitions shared by all generated models in a process
#[derive(Debug, Clone)]
pub struct StandardCatalog {
    pub datatypes: Vec<Primitive>,
    pub failure_types: Vec<&'static str>,
    pub policy_type: &'static str,
    pub scheduling_policies: Vec<SchedulingPolicy>,
    pub resource_interfaces: Vec<ResourceKind>,
    pub processing_types: Vec<ProcessingTypeDef>,
    pub link_types: Vec<LinkTypeDef>,
    pub internal_interfaces: Vec<InternalInterfaceDef>,
    default_environment: ResourceEnvironment,
    reserved: BTreeSet<&'static str>,
}

impl StandardCatalog {
    pub fn new() -> Self {
        let rate_and_policy = || {
            vec![
                PropertyDef {
                    name: "processingRate",
                    type_name: Primitive::Double.keyword(),
                },
                PropertyDef {
                    name: "schedulingPolicy",
                    type_name: "SchedulingPolicy",
                },
            ]
        };

        let processing_types = vec![
            ProcessingTypeDef {
                name: ResourceKind::Cpu.processing_type(),
                provides: Some(ResourceKind::Cpu),
                failure: Some("CPUFailure"),
                properties: rate_and_policy(),
            },
            ProcessingTypeDef {
                name: ResourceKind::Hdd.processing_type(),
                provides: Some(ResourceKind::Hdd),
                failure: None,
                properties: rate_and_policy(),
            },
            ProcessingTypeDef {
                name: "DelayResource",
                provides: None,
                failure: None,
                properties: rate_and_policy(),
            },
        ];

        let link_types = vec![LinkTypeDef {
            name: "Ethernet",
            properties: vec![
                PropertyDef {
                    name: "throughput",
                    type_name: Primitive::Double.keyword(),
                },
                PropertyDef {
                    name: "latency",
                    type_name: Primitive::Double.keyword(),
                },
            ],
        }];

        let internal_interfaces = vec![InternalInterfaceDef {
            name: "PassiveResource",
            properties: vec![PropertyDef {
                name: "capacity",
                type_name: Primitive::Integer.keyword(),
            }],
            operations: vec!["acquire", "release"],
        }];

        let mut catalog = Self {
            datatypes: Primitive::ALL.to_vec(),
            failure_types: vec!["CPUFailure"],
            policy_type: "SchedulingPolicy",
            scheduling_policies: SchedulingPolicy::ALL.to_vec(),
            resource_interfaces: ResourceKind::ALL.to_vec(),
            processing_types,
            link_types,
            internal_interfaces,
            default_environment: default_environment(),
            reserved: BTreeSet::new(),
        };
        catalog.reserved = catalog.declared_names();
        catalog
    }

    /// Every name the catalog declares; generated names must avoid these.
    fn declared_names(&self) -> BTreeSet<&'static str> {
        let mut names: BTreeSet<&'static str> = BTreeSet::new();
        names.extend(self.datatypes.iter().map(Primitive::name));
        names.extend(self.failure_types.iter().copied());
        names.insert(self.policy_type);
        names.extend(self.scheduling_policies.iter().map(SchedulingPolicy::name));
        for kind in &self.resource_interfaces {
            names.insert(kind.interface_name());
            names.insert(kind.role_name());
        }
        names.extend(self.processing_types.iter().map(|t| t.name));
        names.extend(self.link_types.iter().map(|t| t.name));
        names.extend(self.internal_interfaces.iter().map(|t| t.name));
        names.extend(DEFAULT_ENVIRONMENT_NAMES);
        names
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    pub fn link_type(&self) -> &'static str {
        self.link_types.first().map(|t| t.name).unwrap_or("Ethernet")
    }

    /// Fresh copy of the two-container / one-link template environment
    pub fn default_environment(&self) -> ResourceEnvironment {
        self.default_environment.clone()
    }
}

impl Default for StandardCatalog {
    fn default() -> Self {
        Self::new()
    }
}

const DEFAULT_ENVIRONMENT_NAMES: [&str; 4] =
    ["Environment", "ApplicationServer", "DatabaseServer", "LAN"];

fn default_environment() -> ResourceEnvironment {
    let cpu = |rate: f64| ProcessingResourceSpec {
        name: ResourceKind::Cpu.resource_name().to_string(),
        kind: ResourceKind::Cpu,
        processing_rate: rate,
        policy: SchedulingPolicy::ProcessorSharing,
    };
    let hdd = |rate: f64| ProcessingResourceSpec {
        name: ResourceKind::Hdd.resource_name().to_string(),
        kind: ResourceKind::Hdd,
        processing_rate: rate,
        policy: SchedulingPolicy::FirstComeFirstServe,
    };

    ResourceEnvironment {
        name: DEFAULT_ENVIRONMENT_NAMES[0].to_string(),
        containers: vec![
            ResourceContainer {
                name: DEFAULT_ENVIRONMENT_NAMES[1].to_string(),
                resources: vec![cpu(1000.0 * 1000.0 * 1000.0), hdd(50.0 * 1000.0 * 1000.0)],
            },
            ResourceContainer {
                name: DEFAULT_ENVIRONMENT_NAMES[2].to_string(),
                resources: vec![cpu(1000.0 * 1000.0 * 1000.0), hdd(600.0 * 1000.0 * 1000.0)],
            },
        ],
        links: vec![LinkingResource {
            name: DEFAULT_ENVIRONMENT_NAMES[3].to_string(),
            link_type: "Ethernet".to_string(),
            connects: vec![ContainerId(0), ContainerId(1)],
            throughput: 6.25 * 1000.0 * 1000.0,
            latency: 0.07,
        }],
    }
}
