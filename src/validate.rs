//! Whole-model invariant checks
//!
//! A full pass over a finished model, reporting every violation found. Generation runs
//! the reference rules (R1) as a fatal post-condition; the full pass backs the test
//! suite and `tpcm-synth generate --validate`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::UnresolvableReference;
use crate::model::{Action, EndpointDirection, InterfaceId, Model, RoleSlot, WiringOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    /// Every handle resolves to an existing entity of the right layer
    DanglingReference,
    /// Call arguments match the target parameter list in count and kind
    ArgumentMismatch,
    /// Both ends of a connector share one interface
    ConnectorInterface,
    /// Every assembly unit is allocated exactly once
    AllocationTotal,
    /// Names are unique within their namespace
    DuplicateName,
    /// Exactly one behavior spec per provided operation
    BehaviorCoverage,
    /// A component never requires an interface it provides
    SelfRequirement,
    /// Every required role has exactly one wiring outcome
    WiringCoverage,
}

impl Rule {
    pub fn code(&self) -> &'static str {
        match self {
            Rule::DanglingReference => "R1",
            Rule::ArgumentMismatch => "R2",
            Rule::ConnectorInterface => "R3",
            Rule::AllocationTotal => "R4",
            Rule::DuplicateName => "R5",
            Rule::BehaviorCoverage => "R6",
            Rule::SelfRequirement => "R7",
            Rule::WiringCoverage => "R8",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: Rule,
    pub entity: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.rule.code(), self.entity, self.message)
    }
}

struct Report {
    violations: Vec<Violation>,
}

impl Report {
    fn push(&mut self, rule: Rule, entity: &str, message: impl Into<String>) {
        self.violations.push(Violation {
            rule,
            entity: entity.to_string(),
            message: message.into(),
        });
    }
}

/// Check every invariant. Returns all violations found.
pub fn validate_model(model: &Model<'_>) -> Vec<Violation> {
    let mut report = Report {
        violations: Vec::new(),
    };
    check_references(model, &mut report);
    check_arguments(model, &mut report);
    check_connectors(model, &mut report);
    check_allocation(model, &mut report);
    check_names(model, &mut report);
    check_behaviors(model, &mut report);
    check_wiring(model, &mut report);
    report.violations
}

/// Fail on the first dangling reference
pub fn resolve_references(model: &Model<'_>) -> Result<(), UnresolvableReference> {
    let mut report = Report {
        violations: Vec::new(),
    };
    check_references(model, &mut report);
    match report.violations.into_iter().next() {
        Some(v) => Err(UnresolvableReference {
            entity: v.entity,
            reference: v.message,
        }),
        None => Ok(()),
    }
}

// R1: references resolve, and each reference points into the layer it claims
fn check_references(model: &Model<'_>, report: &mut Report) {
    let repo = &model.repository;
    let system = &model.system;
    let rule = Rule::DanglingReference;

    for component in &repo.components {
        let entity = component.name.as_str();
        for role in &component.provided {
            if repo.interface(role.interface).is_none() {
                let msg = format!("provided role {} -> {}", role.name, role.interface);
                report.push(rule, entity, msg);
            }
        }
        for role in &component.required {
            if repo.interface(role.interface).is_none() {
                let msg = format!("required role {} -> {}", role.name, role.interface);
                report.push(rule, entity, msg);
            }
        }
        for behavior in &component.behaviors {
            match component.provided.get(behavior.role) {
                Some(role) if role.interface == behavior.operation.interface => {}
                _ => report.push(
                    rule,
                    entity,
                    format!("behavior bound to provided role #{}", behavior.role),
                ),
            }
            if repo.operation(behavior.operation).is_none() {
                let msg = format!("behavior for missing operation {:?}", behavior.operation);
                report.push(rule, entity, msg);
            }
            for action in &behavior.actions {
                if let Action::Delegate { role, operation, .. } = action {
                    match component.required.get(*role) {
                        Some(r) if r.interface == operation.interface => {}
                        _ => {
                            let msg = format!("delegate through required role #{}", role);
                            report.push(rule, entity, msg);
                        }
                    }
                    if repo.operation(*operation).is_none() {
                        let msg = format!("delegate to missing operation {:?}", operation);
                        report.push(rule, entity, msg);
                    }
                }
            }
        }
    }

    for unit in &system.assemblies {
        if repo.component(unit.component).is_none() {
            report.push(rule, &unit.name, format!("instantiates missing {}", unit.component));
        }
    }
    for connector in &system.connectors {
        if required_interface(model, connector.from).is_none() {
            report.push(rule, &connector.name, format!("required side {:?}", connector.from));
        }
        if provided_interface(model, connector.to).is_none() {
            report.push(rule, &connector.name, format!("provided side {:?}", connector.to));
        }
    }
    for endpoint in &system.endpoints {
        let role_interface = match endpoint.direction {
            EndpointDirection::Provided => provided_interface(model, endpoint.slot),
            EndpointDirection::Required => required_interface(model, endpoint.slot),
        };
        if role_interface != Some(endpoint.interface) {
            let msg = format!("exposes {:?} with a mismatched role", endpoint.slot);
            report.push(rule, &endpoint.name, msg);
        }
    }
    for resolution in &system.resolutions {
        let slot = resolution.slot;
        let resolved = match resolution.outcome {
            WiringOutcome::Connected(id) => system.connector(id).is_some_and(|c| c.from == slot),
            WiringOutcome::BoundaryExposed(id) => system
                .endpoint(id)
                .is_some_and(|e| e.direction == EndpointDirection::Required && e.slot == slot),
        };
        if !resolved {
            let entity = system
                .assembly(slot.assembly)
                .map_or("<unknown assembly>", |a| a.name.as_str());
            let msg = format!("required role #{} resolved by {:?}", slot.role, resolution.outcome);
            report.push(rule, entity, msg);
        }
    }

    for link in &model.environment.links {
        for container in &link.connects {
            if model.environment.container(*container).is_none() {
                report.push(rule, &link.name, format!("connects missing {}", container));
            }
        }
    }
    for entry in &model.allocation.entries {
        if system.assembly(entry.assembly).is_none() {
            report.push(rule, &entry.name, format!("allocates missing {}", entry.assembly));
        }
        if model.environment.container(entry.container).is_none() {
            report.push(rule, &entry.name, format!("targets missing {}", entry.container));
        }
    }

    for scenario in &model.usage.scenarios {
        for call in &scenario.calls {
            let target = system
                .endpoint(call.endpoint)
                .filter(|e| e.direction == EndpointDirection::Provided);
            let operation = target
                .and_then(|e| repo.interface(e.interface))
                .and_then(|i| i.operations.get(call.operation));
            if operation.is_none() {
                let msg = format!("calls {} operation #{}", call.endpoint, call.operation);
                report.push(rule, &scenario.name, msg);
            }
        }
    }
}

// R2: argument lists match their target signatures
fn check_arguments(model: &Model<'_>, report: &mut Report) {
    let repo = &model.repository;
    for component in &repo.components {
        for action in component.behaviors.iter().flat_map(|b| &b.actions) {
            if let Action::Delegate { operation, arguments, .. } = action {
                if let Some(target) = repo.operation(*operation) {
                    if !target.accepts(arguments) {
                        report.push(
                            Rule::ArgumentMismatch,
                            &component.name,
                            format!(
                                "arguments for {} do not match {:?}",
                                target.name,
                                target.signature()
                            ),
                        );
                    }
                }
            }
        }
    }

    for scenario in &model.usage.scenarios {
        for call in &scenario.calls {
            let target = model
                .system
                .endpoint(call.endpoint)
                .and_then(|e| repo.interface(e.interface))
                .and_then(|i| i.operations.get(call.operation));
            if let Some(target) = target {
                if !target.accepts(&call.arguments) {
                    report.push(
                        Rule::ArgumentMismatch,
                        &scenario.name,
                        format!(
                            "arguments for {} do not match {:?}",
                            target.name,
                            target.signature()
                        ),
                    );
                }
            }
        }
    }
}

// R3: connectors join roles of one interface on two different assemblies
fn check_connectors(model: &Model<'_>, report: &mut Report) {
    for connector in &model.system.connectors {
        let from = required_interface(model, connector.from);
        let to = provided_interface(model, connector.to);
        if from != Some(connector.interface) || to != Some(connector.interface) {
            report.push(
                Rule::ConnectorInterface,
                &connector.name,
                format!("joins {:?} to {:?} as {}", from, to, connector.interface),
            );
        }
        if connector.from.assembly == connector.to.assembly {
            report.push(
                Rule::ConnectorInterface,
                &connector.name,
                "connects an assembly to itself",
            );
        }
    }
}

// R4: allocation is a total function on assembly units
fn check_allocation(model: &Model<'_>, report: &mut Report) {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for entry in &model.allocation.entries {
        *counts.entry(entry.assembly.0).or_default() += 1;
    }
    for (id, unit) in model.system.assemblies.iter().enumerate() {
        match counts.get(&id).copied().unwrap_or(0) {
            1 => {}
            n => report.push(Rule::AllocationTotal, &unit.name, format!("allocated {} times", n)),
        }
    }
}

// R5: unique names per namespace
fn check_names(model: &Model<'_>, report: &mut Report) {
    let repo = &model.repository;
    let system = &model.system;

    unique(report, "interfaces", repo.interfaces.iter().map(|i| i.name.as_str()));
    for interface in &repo.interfaces {
        unique(report, &interface.name, interface.operations.iter().map(|o| o.name.as_str()));
    }
    unique(report, "components", repo.components.iter().map(|c| c.name.as_str()));
    for component in &repo.components {
        let roles = component
            .provided
            .iter()
            .map(|r| r.name.as_str())
            .chain(component.required.iter().map(|r| r.name.as_str()))
            .chain(component.resource_roles.iter().map(|r| r.name()));
        unique(report, &component.name, roles);
    }
    unique(report, "assemblies", system.assemblies.iter().map(|a| a.name.as_str()));
    unique(report, "connectors", system.connectors.iter().map(|c| c.name.as_str()));
    unique(report, "endpoints", system.endpoints.iter().map(|e| e.name.as_str()));
    unique(report, "containers", model.environment.containers.iter().map(|c| c.name.as_str()));
}

fn unique<'a>(report: &mut Report, namespace: &str, names: impl Iterator<Item = &'a str>) {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            report.push(Rule::DuplicateName, namespace, format!("'{}' declared twice", name));
        }
    }
}

// R6 + R7: behavior coverage, no self-requirement
fn check_behaviors(model: &Model<'_>, report: &mut Report) {
    let repo = &model.repository;
    for component in &repo.components {
        let mut expected = BTreeSet::new();
        for (index, role) in component.provided.iter().enumerate() {
            let operations = repo.interface(role.interface).map_or(0, |i| i.operations.len());
            expected.extend((0..operations).map(|op| (index, role.interface, op)));
        }
        let mut actual = BTreeSet::new();
        for behavior in &component.behaviors {
            let key = (behavior.role, behavior.operation.interface, behavior.operation.operation);
            if !actual.insert(key) {
                let msg = format!("duplicate behavior {:?}", key);
                report.push(Rule::BehaviorCoverage, &component.name, msg);
            }
        }
        if expected != actual {
            report.push(
                Rule::BehaviorCoverage,
                &component.name,
                format!("{} behaviors for {} provided operations", actual.len(), expected.len()),
            );
        }

        let provided: BTreeSet<InterfaceId> =
            component.provided.iter().map(|r| r.interface).collect();
        for role in &component.required {
            if provided.contains(&role.interface) {
                let msg = format!("requires its own {}", role.interface);
                report.push(Rule::SelfRequirement, &component.name, msg);
            }
        }
    }
}

// R8: every required role is connected or exposed, exactly once
fn check_wiring(model: &Model<'_>, report: &mut Report) {
    let system = &model.system;
    let mut seen: BTreeMap<RoleSlot, usize> = BTreeMap::new();
    for resolution in &system.resolutions {
        *seen.entry(resolution.slot).or_default() += 1;
    }
    for (index, unit) in system.assemblies.iter().enumerate() {
        let Some(component) = model.repository.component(unit.component) else {
            continue;
        };
        for role in 0..component.required.len() {
            let slot = RoleSlot {
                assembly: crate::model::AssemblyId(index),
                role,
            };
            match seen.get(&slot).copied().unwrap_or(0) {
                1 => {}
                n => report.push(
                    Rule::WiringCoverage,
                    &unit.name,
                    format!("required role #{} has {} wiring outcomes", role, n),
                ),
            }
        }
    }
}

fn required_interface(model: &Model<'_>, slot: RoleSlot) -> Option<InterfaceId> {
    let unit = model.system.assembly(slot.assembly)?;
    let component = model.repository.component(unit.component)?;
    component.required.get(slot.role).map(|r| r.interface)
}

fn provided_interface(model: &Model<'_>, slot: RoleSlot) -> Option<InterfaceId> {
    let unit = model.system.assembly(slot.assembly)?;
    let component = model.repository.component(unit.component)?;
    component.provided.get(slot.role).map(|r| r.interface)
}
