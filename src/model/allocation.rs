//! Allocation of assembly units onto resource containers

use serde::{Deserialize, Serialize};

use super::{AssemblyId, ContainerId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub name: String,
    pub entries: Vec<AllocationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub name: String,
    pub assembly: AssemblyId,
    pub container: ContainerId,
}
