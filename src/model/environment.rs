//! Resource environment: containers with processing resources, joined by links

use serde::{Deserialize, Serialize};

use super::ContainerId;
use crate::catalog::{ResourceKind, SchedulingPolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEnvironment {
    pub name: String,
    pub containers: Vec<ResourceContainer>,
    pub links: Vec<LinkingResource>,
}

impl ResourceEnvironment {
    pub fn container(&self, id: ContainerId) -> Option<&ResourceContainer> {
        self.containers.get(id.0)
    }

    pub fn container_ids(&self) -> impl Iterator<Item = ContainerId> {
        (0..self.containers.len()).map(ContainerId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceContainer {
    pub name: String,
    pub resources: Vec<ProcessingResourceSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResourceSpec {
    pub name: String,
    pub kind: ResourceKind,
    pub processing_rate: f64,
    pub policy: SchedulingPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkingResource {
    pub name: String,
    pub link_type: String,
    pub connects: Vec<ContainerId>,
    pub throughput: f64,
    pub latency: f64,
}
