//! Declaration ordering
//!
//! Every declared entity is a node, every reference an edge from the referenced entity
//! to the referencing one. The graph must be acyclic, and no edge may point from a
//! later output section back into an earlier one.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::catalog::{Primitive, ResourceKind};
use crate::error::SerializationError;
use crate::model::{
    Action, AssemblyId, ComponentId, ConnectorId, ContainerId, EndpointId, InterfaceId, Model,
};

/// Top-level blocks of the textual format, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    ResourceTypes,
    Repository,
    ResourceEnvironment,
    System,
    Allocation,
    Usage,
}

impl Section {
    pub const EMIT_ORDER: [Section; 6] = [
        Section::ResourceTypes,
        Section::Repository,
        Section::ResourceEnvironment,
        Section::System,
        Section::Allocation,
        Section::Usage,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Section::ResourceTypes => "resourcetypes",
            Section::Repository => "repository",
            Section::ResourceEnvironment => "resourceenvironment",
            Section::System => "system",
            Section::Allocation => "allocation",
            Section::Usage => "usage",
        }
    }

    fn position(&self) -> usize {
        Self::EMIT_ORDER
            .iter()
            .position(|s| s == self)
            .unwrap_or(usize::MAX)
    }
}

/// A declared entity of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Decl {
    ResourceInterface(ResourceKind),
    Datatype(Primitive),
    Interface(InterfaceId),
    Component(ComponentId),
    Container(ContainerId),
    Link(usize),
    Assembly(AssemblyId),
    Connector(ConnectorId),
    Endpoint(EndpointId),
    AllocationEntry(usize),
    Scenario(usize),
}

impl Decl {
    pub fn section(&self) -> Section {
        match self {
            Decl::ResourceInterface(_) => Section::ResourceTypes,
            Decl::Datatype(_) | Decl::Interface(_) | Decl::Component(_) => Section::Repository,
            Decl::Container(_) | Decl::Link(_) => Section::ResourceEnvironment,
            Decl::Assembly(_) | Decl::Connector(_) | Decl::Endpoint(_) => Section::System,
            Decl::AllocationEntry(_) => Section::Allocation,
            Decl::Scenario(_) => Section::Usage,
        }
    }

    /// Human-readable name for error reports
    pub fn label(&self, model: &Model<'_>) -> String {
        let name = match self {
            Decl::ResourceInterface(kind) => Some(kind.interface_name().to_string()),
            Decl::Datatype(p) => Some(p.name().to_string()),
            Decl::Interface(id) => model.repository.interface(*id).map(|i| i.name.clone()),
            Decl::Component(id) => model.repository.component(*id).map(|c| c.name.clone()),
            Decl::Container(id) => model.environment.container(*id).map(|c| c.name.clone()),
            Decl::Link(i) => model.environment.links.get(*i).map(|l| l.name.clone()),
            Decl::Assembly(id) => model.system.assembly(*id).map(|a| a.name.clone()),
            Decl::Connector(id) => model.system.connector(*id).map(|c| c.name.clone()),
            Decl::Endpoint(id) => model.system.endpoint(*id).map(|e| e.name.clone()),
            Decl::AllocationEntry(i) => model.allocation.entries.get(*i).map(|e| e.name.clone()),
            Decl::Scenario(i) => model.usage.scenarios.get(*i).map(|s| s.name.clone()),
        };
        name.unwrap_or_else(|| format!("{:?}", self))
    }
}

#[derive(Default)]
pub struct DeclarationGraph {
    graph: DiGraph<Decl, ()>,
    index: HashMap<Decl, NodeIndex>,
}

impl DeclarationGraph {
    pub fn build(model: &Model<'_>) -> Self {
        let mut g = Self::default();
        let repo = &model.repository;
        let system = &model.system;

        for kind in &model.catalog.resource_interfaces {
            g.node(Decl::ResourceInterface(*kind));
        }
        for primitive in &model.catalog.datatypes {
            g.node(Decl::Datatype(*primitive));
        }

        for (i, interface) in repo.interfaces.iter().enumerate() {
            let decl = Decl::Interface(InterfaceId(i));
            g.node(decl);
            for operation in &interface.operations {
                g.depends(decl, Decl::Datatype(operation.returns));
                for parameter in &operation.parameters {
                    g.depends(decl, Decl::Datatype(parameter.datatype));
                }
            }
        }

        for (i, component) in repo.components.iter().enumerate() {
            let decl = Decl::Component(ComponentId(i));
            g.node(decl);
            for role in &component.provided {
                g.depends(decl, Decl::Interface(role.interface));
            }
            for role in &component.required {
                g.depends(decl, Decl::Interface(role.interface));
            }
            for role in &component.resource_roles {
                g.depends(decl, Decl::ResourceInterface(role.kind));
            }
            for action in component.behaviors.iter().flat_map(|b| &b.actions) {
                if let Action::Delegate { operation, .. } = action {
                    g.depends(decl, Decl::Interface(operation.interface));
                }
            }
        }

        for i in 0..model.environment.containers.len() {
            g.node(Decl::Container(ContainerId(i)));
        }
        for (i, link) in model.environment.links.iter().enumerate() {
            for container in &link.connects {
                g.depends(Decl::Link(i), Decl::Container(*container));
            }
        }

        for (i, unit) in system.assemblies.iter().enumerate() {
            g.depends(Decl::Assembly(AssemblyId(i)), Decl::Component(unit.component));
        }
        for (i, connector) in system.connectors.iter().enumerate() {
            let decl = Decl::Connector(ConnectorId(i));
            g.depends(decl, Decl::Assembly(connector.from.assembly));
            g.depends(decl, Decl::Assembly(connector.to.assembly));
        }
        for (i, endpoint) in system.endpoints.iter().enumerate() {
            let decl = Decl::Endpoint(EndpointId(i));
            g.depends(decl, Decl::Assembly(endpoint.slot.assembly));
            g.depends(decl, Decl::Interface(endpoint.interface));
        }

        for (i, entry) in model.allocation.entries.iter().enumerate() {
            let decl = Decl::AllocationEntry(i);
            g.depends(decl, Decl::Assembly(entry.assembly));
            g.depends(decl, Decl::Container(entry.container));
        }

        for (i, scenario) in model.usage.scenarios.iter().enumerate() {
            g.node(Decl::Scenario(i));
            for call in &scenario.calls {
                g.depends(Decl::Scenario(i), Decl::Endpoint(call.endpoint));
            }
        }

        g
    }

    fn node(&mut self, decl: Decl) -> NodeIndex {
        if let Some(&idx) = self.index.get(&decl) {
            return idx;
        }
        let idx = self.graph.add_node(decl);
        self.index.insert(decl, idx);
        idx
    }

    /// Record that `dependent` references `dependency`
    pub fn depends(&mut self, dependent: Decl, dependency: Decl) {
        let from = self.node(dependency);
        let to = self.node(dependent);
        self.graph.update_edge(from, to, ());
    }

    /// Declarations with every dependency ahead of its dependents
    pub fn topological_order(&self, model: &Model<'_>) -> Result<Vec<Decl>, SerializationError> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|idx| self.graph[idx]).collect())
            .map_err(|cycle| SerializationError::Cycle {
                entity: self.graph[cycle.node_id()].label(model),
            })
    }

    /// Every reference must point into the same or an earlier section
    pub fn check_sections(&self, model: &Model<'_>) -> Result<(), SerializationError> {
        for edge in self.graph.raw_edges() {
            let dependency = self.graph[edge.source()];
            let dependent = self.graph[edge.target()];
            if dependency.section().position() > dependent.section().position() {
                return Err(SerializationError::ForwardReference {
                    entity: dependent.label(model),
                    reference: dependency.label(model),
                });
            }
        }
        Ok(())
    }
}

/// Check the model can be emitted in section order without forward references
pub fn check(model: &Model<'_>) -> Result<Vec<Decl>, SerializationError> {
    let graph = DeclarationGraph::build(model);
    let order = graph.topological_order(model)?;
    graph.check_sections(model)?;
    Ok(order)
}
