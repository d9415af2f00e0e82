//! Assembled system: assembly units, connectors and boundary endpoints

use serde::{Deserialize, Serialize};

use super::{AssemblyId, ComponentId, ConnectorId, EndpointId, InterfaceId};

#[derive(Debug, Clone, Default)]
pub struct System {
    pub name: String,
    pub assemblies: Vec<AssemblyUnit>,
    pub connectors: Vec<Connector>,
    pub endpoints: Vec<BoundaryEndpoint>,
    /// One entry per (assembly, required role), in wiring order
    pub resolutions: Vec<RequirementResolution>,
}

impl System {
    pub fn assembly(&self, id: AssemblyId) -> Option<&AssemblyUnit> {
        self.assemblies.get(id.0)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(id.0)
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&BoundaryEndpoint> {
        self.endpoints.get(id.0)
    }

    pub fn assembly_ids(&self) -> impl Iterator<Item = AssemblyId> {
        (0..self.assemblies.len()).map(AssemblyId)
    }

    pub fn provided_endpoints(&self) -> impl Iterator<Item = (EndpointId, &BoundaryEndpoint)> {
        self.endpoints
            .iter()
            .enumerate()
            .filter(|(_, e)| e.direction == EndpointDirection::Provided)
            .map(|(i, e)| (EndpointId(i), e))
    }

    pub fn required_endpoints(&self) -> impl Iterator<Item = (EndpointId, &BoundaryEndpoint)> {
        self.endpoints
            .iter()
            .enumerate()
            .filter(|(_, e)| e.direction == EndpointDirection::Required)
            .map(|(i, e)| (EndpointId(i), e))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyUnit {
    pub name: String,
    pub component: ComponentId,
}

/// A role of one assembly unit; `role` indexes the component's provided or required list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleSlot {
    pub assembly: AssemblyId,
    pub role: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub name: String,
    /// Required side
    pub from: RoleSlot,
    /// Provided side
    pub to: RoleSlot,
    pub interface: InterfaceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointDirection {
    Provided,
    Required,
}

impl EndpointDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            EndpointDirection::Provided => "provides",
            EndpointDirection::Required => "requires",
        }
    }
}

/// A role left unwired and re-exposed on the system with its own name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryEndpoint {
    pub name: String,
    pub direction: EndpointDirection,
    pub slot: RoleSlot,
    pub interface: InterfaceId,
}

/// How one required role was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WiringOutcome {
    Connected(ConnectorId),
    BoundaryExposed(EndpointId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementResolution {
    pub slot: RoleSlot,
    pub outcome: WiringOutcome,
}
