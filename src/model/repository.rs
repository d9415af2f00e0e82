//! Repository layer: interfaces, operation signatures and components

use serde::{Deserialize, Serialize};

use super::{ComponentId, InterfaceId, Literal};
use crate::catalog::{Primitive, ResourceKind, ResourceOperation};

#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub name: String,
    pub interfaces: Vec<Interface>,
    pub components: Vec<Component>,
}

impl Repository {
    pub fn interface(&self, id: InterfaceId) -> Option<&Interface> {
        self.interfaces.get(id.0)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    pub fn operation(&self, reference: OperationRef) -> Option<&Operation> {
        self.interface(reference.interface)?
            .operations
            .get(reference.operation)
    }

    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> {
        (0..self.components.len()).map(ComponentId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub operations: Vec<Operation>,
}

impl Interface {
    pub fn has_operations(&self) -> bool {
        !self.operations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub returns: Primitive,
}

impl Operation {
    /// Parameter kinds in positional order
    pub fn signature(&self) -> Vec<Primitive> {
        self.parameters.iter().map(|p| p.datatype).collect()
    }

    /// True when `arguments` match the parameter list exactly, in order
    pub fn accepts(&self, arguments: &[Literal]) -> bool {
        arguments.len() == self.parameters.len()
            && arguments
                .iter()
                .zip(&self.parameters)
                .all(|(arg, param)| arg.primitive() == param.datatype)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub datatype: Primitive,
}

/// Reference to one operation of one interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationRef {
    pub interface: InterfaceId,
    pub operation: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidedRole {
    pub name: String,
    pub interface: InterfaceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredRole {
    pub name: String,
    pub interface: InterfaceId,
}

/// Implicit requirement on a catalog resource-type interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRole {
    pub kind: ResourceKind,
}

impl ResourceRole {
    pub fn name(&self) -> &'static str {
        self.kind.role_name()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub provided: Vec<ProvidedRole>,
    pub required: Vec<RequiredRole>,
    pub resource_roles: Vec<ResourceRole>,
    pub behaviors: Vec<BehaviorSpec>,
}

impl Component {
    pub fn provides(&self, interface: InterfaceId) -> bool {
        self.provided.iter().any(|r| r.interface == interface)
    }

    pub fn requires_resource(&self, kind: ResourceKind) -> bool {
        self.resource_roles.iter().any(|r| r.kind == kind)
    }

    pub fn delegates(&self) -> bool {
        self.behaviors
            .iter()
            .flat_map(|b| &b.actions)
            .any(|a| matches!(a, Action::Delegate { .. }))
    }
}

/// Behavior of one provided operation, bound through the provided role that exposes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSpec {
    /// Index into `Component::provided`
    pub role: usize,
    pub operation: OperationRef,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Consume an infrastructure resource through the implicit resource role
    ResourceDemand {
        operation: ResourceOperation,
        amount: f64,
    },
    /// Call an operation on one of the component's required roles
    Delegate {
        /// Index into `Component::required`
        role: usize,
        operation: OperationRef,
        arguments: Vec<Literal>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(params: &[Primitive]) -> Operation {
        Operation {
            name: "op".into(),
            parameters: params
                .iter()
                .enumerate()
                .map(|(i, p)| Parameter {
                    name: format!("param{i}"),
                    datatype: *p,
                })
                .collect(),
            returns: Primitive::Boolean,
        }
    }

    #[test]
    fn accepts_requires_positional_kind_match() {
        let op = op(&[Primitive::Integer, Primitive::String]);
        assert!(op.accepts(&[Literal::Integer(3), Literal::String("x".into())]));
        assert!(!op.accepts(&[Literal::String("x".into()), Literal::Integer(3)]));
        assert!(!op.accepts(&[Literal::Integer(3)]));
    }

    #[test]
    fn empty_signature_accepts_no_arguments() {
        let op = op(&[]);
        assert!(op.accepts(&[]));
        assert!(!op.accepts(&[Literal::Boolean(true)]));
    }

    #[test]
    fn operation_lookup_is_bounds_checked() {
        let repository = Repository {
            name: "repo".into(),
            interfaces: vec![Interface {
                name: "I".into(),
                operations: vec![op(&[])],
            }],
            components: Vec::new(),
        };
        let present = OperationRef {
            interface: InterfaceId(0),
            operation: 0,
        };
        let missing = OperationRef {
            interface: InterfaceId(0),
            operation: 1,
        };
        assert!(repository.operation(present).is_some());
        assert!(repository.operation(missing).is_none());
        assert!(repository
            .operation(OperationRef {
                interface: InterfaceId(4),
                operation: 0
            })
            .is_none());
    }
}
