//! Serializer for the textual model format
//!
//! Output is a sequence of top-level blocks: `resourcetypes`, `repository`,
//! `resourceenvironment`, `system`, `allocation`, `usage`. Catalog resource types come
//! first because component resource roles reference them. Every declaration carries a
//! unique name; references use `assembly.role` and `role::operation` paths; literals
//! are wrapped in guillemets.
//!
//! Serialization is a pure function of the model: the same model always renders to the
//! same bytes.

pub mod order;

use std::collections::HashSet;
use std::fmt::Write;

use crate::catalog::StandardCatalog;
use crate::error::SerializationError;
use crate::model::{
    Action, AssemblyId, ComponentId, ConnectorId, ContainerId, EndpointDirection, EndpointId,
    InterfaceId, Literal, Model, Operation, RoleSlot, Workload,
};

use order::Decl;

/// Render a complete model
pub fn to_tpcm(model: &Model<'_>) -> Result<String, SerializationError> {
    order::check(model)?;

    let mut writer = TpcmWriter {
        model,
        out: String::new(),
        declared: HashSet::new(),
    };
    writer.resource_types()?;
    writer.repository()?;
    writer.environment()?;
    writer.system()?;
    writer.allocation()?;
    writer.usage()?;
    Ok(writer.out)
}

/// Render only the catalog's `resourcetypes` block
pub fn resource_types(catalog: &StandardCatalog) -> Result<String, SerializationError> {
    let mut out = String::new();
    write_resource_types(&mut out, catalog)?;
    Ok(out)
}

struct TpcmWriter<'m, 'c> {
    model: &'m Model<'c>,
    out: String,
    declared: HashSet<Decl>,
}

impl TpcmWriter<'_, '_> {
    fn declare(&mut self, decl: Decl) {
        self.declared.insert(decl);
    }

    /// Name of `target`, provided it was already declared
    fn reference(&self, owner: Decl, target: Decl) -> Result<String, SerializationError> {
        if !self.declared.contains(&target) {
            return Err(SerializationError::ForwardReference {
                entity: owner.label(self.model),
                reference: target.label(self.model),
            });
        }
        Ok(target.label(self.model))
    }

    /// A handle inside `owner` that resolves to nothing
    fn dangling(&self, owner: Decl, reference: String) -> SerializationError {
        SerializationError::ForwardReference {
            entity: owner.label(self.model),
            reference,
        }
    }

    // ── resourcetypes ──

    fn resource_types(&mut self) -> Result<(), SerializationError> {
        let catalog = self.model.catalog;
        write_resource_types(&mut self.out, catalog)?;
        for kind in &catalog.resource_interfaces {
            self.declare(Decl::ResourceInterface(*kind));
        }
        Ok(())
    }

    // ── repository ──

    fn repository(&mut self) -> Result<(), SerializationError> {
        let model = self.model;
        let repo = &model.repository;
        writeln!(self.out, "repository {} {{", repo.name)?;

        for primitive in &model.catalog.datatypes {
            writeln!(self.out, "    datatype {} : {};", primitive.name(), primitive.keyword())?;
            self.declare(Decl::Datatype(*primitive));
        }

        for (i, interface) in repo.interfaces.iter().enumerate() {
            let decl = Decl::Interface(InterfaceId(i));
            writeln!(self.out, "    interface {} {{", interface.name)?;
            for operation in &interface.operations {
                let signature = self.signature(decl, operation)?;
                writeln!(self.out, "        op {};", signature)?;
            }
            writeln!(self.out, "    }}")?;
            self.declare(decl);
        }

        for (i, component) in repo.components.iter().enumerate() {
            let decl = Decl::Component(ComponentId(i));
            writeln!(self.out, "    component {} {{", component.name)?;
            for role in &component.provided {
                let interface = self.reference(decl, Decl::Interface(role.interface))?;
                writeln!(self.out, "        provides {} : {};", role.name, interface)?;
            }
            for role in &component.required {
                let interface = self.reference(decl, Decl::Interface(role.interface))?;
                writeln!(self.out, "        requires {} : {};", role.name, interface)?;
            }
            for role in &component.resource_roles {
                let interface = self.reference(decl, Decl::ResourceInterface(role.kind))?;
                writeln!(self.out, "        requires {} : {};", role.name(), interface)?;
            }

            for behavior in &component.behaviors {
                let role = component
                    .provided
                    .get(behavior.role)
                    .map(|r| r.name.as_str())
                    .ok_or_else(|| {
                        self.dangling(decl, format!("provided role #{}", behavior.role))
                    })?;
                let operation = repo
                    .operation(behavior.operation)
                    .map(|o| o.name.as_str())
                    .ok_or_else(|| self.dangling(decl, format!("{:?}", behavior.operation)))?;
                writeln!(self.out, "        seff {}::{} {{", role, operation)?;
                for action in &behavior.actions {
                    match action {
                        Action::ResourceDemand { operation, amount } => {
                            writeln!(
                                self.out,
                                "            demand {}::{}({});",
                                operation.kind().role_name(),
                                operation.name(),
                                Literal::Double(*amount)
                            )?;
                        }
                        Action::Delegate {
                            role,
                            operation,
                            arguments,
                        } => {
                            self.reference(decl, Decl::Interface(operation.interface))?;
                            let role = component
                                .required
                                .get(*role)
                                .map(|r| r.name.as_str())
                                .ok_or_else(|| {
                                    self.dangling(decl, format!("required role #{}", role))
                                })?;
                            let target = repo
                                .operation(*operation)
                                .map(|o| o.name.as_str())
                                .ok_or_else(|| self.dangling(decl, format!("{:?}", operation)))?;
                            writeln!(
                                self.out,
                                "            call {}::{}({});",
                                role,
                                target,
                                join_literals(arguments)
                            )?;
                        }
                    }
                }
                writeln!(self.out, "        }}")?;
            }
            writeln!(self.out, "    }}")?;
            self.declare(decl);
        }

        writeln!(self.out, "}}")?;
        writeln!(self.out)?;
        Ok(())
    }

    fn signature(&self, owner: Decl, operation: &Operation) -> Result<String, SerializationError> {
        let mut params = Vec::with_capacity(operation.parameters.len());
        for parameter in &operation.parameters {
            let datatype = self.reference(owner, Decl::Datatype(parameter.datatype))?;
            params.push(format!("{} : {}", parameter.name, datatype));
        }
        let returns = self.reference(owner, Decl::Datatype(operation.returns))?;
        Ok(format!("{}({}) : {}", operation.name, params.join(", "), returns))
    }

    // ── resourceenvironment ──

    fn environment(&mut self) -> Result<(), SerializationError> {
        let model = self.model;
        let env = &model.environment;
        writeln!(self.out, "resourceenvironment {} {{", env.name)?;

        for (i, container) in env.containers.iter().enumerate() {
            writeln!(self.out, "    container {} {{", container.name)?;
            for resource in &container.resources {
                writeln!(
                    self.out,
                    "        processing {} : {} {{",
                    resource.name,
                    resource.kind.processing_type()
                )?;
                writeln!(
                    self.out,
                    "            processingRate {};",
                    Literal::Double(resource.processing_rate)
                )?;
                writeln!(self.out, "            schedulingPolicy {};", resource.policy.name())?;
                writeln!(self.out, "        }}")?;
            }
            writeln!(self.out, "    }}")?;
            self.declare(Decl::Container(ContainerId(i)));
        }

        for (i, link) in env.links.iter().enumerate() {
            let decl = Decl::Link(i);
            let mut ends = Vec::with_capacity(link.connects.len());
            for container in &link.connects {
                ends.push(self.reference(decl, Decl::Container(*container))?);
            }
            writeln!(
                self.out,
                "    link {} : {} ({}) {{",
                link.name,
                link.link_type,
                ends.join(", ")
            )?;
            writeln!(self.out, "        throughput {};", Literal::Double(link.throughput))?;
            writeln!(self.out, "        latency {};", Literal::Double(link.latency))?;
            writeln!(self.out, "    }}")?;
            self.declare(decl);
        }

        writeln!(self.out, "}}")?;
        writeln!(self.out)?;
        Ok(())
    }

    // ── system ──

    fn system(&mut self) -> Result<(), SerializationError> {
        let model = self.model;
        let system = &model.system;
        writeln!(self.out, "system {} {{", system.name)?;

        for (i, unit) in system.assemblies.iter().enumerate() {
            let decl = Decl::Assembly(AssemblyId(i));
            let component = self.reference(decl, Decl::Component(unit.component))?;
            writeln!(self.out, "    assembly {} : {};", unit.name, component)?;
            self.declare(decl);
        }

        for (i, connector) in system.connectors.iter().enumerate() {
            let decl = Decl::Connector(ConnectorId(i));
            let from = self.role_path(decl, connector.from, false)?;
            let to = self.role_path(decl, connector.to, true)?;
            writeln!(self.out, "    connector {} : {} -> {};", connector.name, from, to)?;
            self.declare(decl);
        }

        for (i, endpoint) in system.endpoints.iter().enumerate() {
            let decl = Decl::Endpoint(EndpointId(i));
            let provided = endpoint.direction == EndpointDirection::Provided;
            let interface = self.reference(decl, Decl::Interface(endpoint.interface))?;
            let path = self.role_path(decl, endpoint.slot, provided)?;
            writeln!(
                self.out,
                "    {} {} : {} -> {};",
                endpoint.direction.keyword(),
                endpoint.name,
                interface,
                path
            )?;
            self.declare(decl);
        }

        writeln!(self.out, "}}")?;
        writeln!(self.out)?;
        Ok(())
    }

    /// `assemblyName.roleName`
    fn role_path(
        &self,
        owner: Decl,
        slot: RoleSlot,
        provided: bool,
    ) -> Result<String, SerializationError> {
        let assembly = self.reference(owner, Decl::Assembly(slot.assembly))?;
        let role = self
            .model
            .system
            .assembly(slot.assembly)
            .and_then(|a| self.model.repository.component(a.component))
            .and_then(|c| {
                if provided {
                    c.provided.get(slot.role).map(|r| r.name.clone())
                } else {
                    c.required.get(slot.role).map(|r| r.name.clone())
                }
            })
            .ok_or_else(|| SerializationError::ForwardReference {
                entity: owner.label(self.model),
                reference: format!("{}#{}", assembly, slot.role),
            })?;
        Ok(format!("{}.{}", assembly, role))
    }

    // ── allocation ──

    fn allocation(&mut self) -> Result<(), SerializationError> {
        let model = self.model;
        let allocation = &model.allocation;
        writeln!(self.out, "allocation {} {{", allocation.name)?;
        for (i, entry) in allocation.entries.iter().enumerate() {
            let decl = Decl::AllocationEntry(i);
            let assembly = self.reference(decl, Decl::Assembly(entry.assembly))?;
            let container = self.reference(decl, Decl::Container(entry.container))?;
            writeln!(self.out, "    alloc {} : {} -> {};", entry.name, assembly, container)?;
            self.declare(decl);
        }
        writeln!(self.out, "}}")?;
        writeln!(self.out)?;
        Ok(())
    }

    // ── usage ──

    fn usage(&mut self) -> Result<(), SerializationError> {
        let model = self.model;
        let usage = &model.usage;
        writeln!(self.out, "usage {} {{", usage.name)?;
        for (i, scenario) in usage.scenarios.iter().enumerate() {
            let decl = Decl::Scenario(i);
            writeln!(self.out, "    scenario {} {{", scenario.name)?;
            match scenario.workload {
                Workload::Open { inter_arrival_time } => writeln!(
                    self.out,
                    "        interArrivalTime({});",
                    Literal::Double(inter_arrival_time)
                )?,
                Workload::Closed {
                    population,
                    think_time,
                } => writeln!(
                    self.out,
                    "        closed(population {}, thinkTime {});",
                    Literal::Integer(i64::from(population)),
                    Literal::Double(think_time)
                )?,
            }
            for call in &scenario.calls {
                let endpoint = self.reference(decl, Decl::Endpoint(call.endpoint))?;
                let operation = model
                    .system
                    .endpoint(call.endpoint)
                    .and_then(|e| model.repository.interface(e.interface))
                    .and_then(|i| i.operations.get(call.operation))
                    .map(|o| o.name.as_str())
                    .ok_or_else(|| {
                        let target = format!("{}::#{}", endpoint, call.operation);
                        self.dangling(decl, target)
                    })?;
                writeln!(
                    self.out,
                    "        call {}::{}({});",
                    endpoint,
                    operation,
                    join_literals(&call.arguments)
                )?;
            }
            writeln!(self.out, "    }}")?;
            self.declare(decl);
        }
        writeln!(self.out, "}}")?;
        Ok(())
    }
}

fn write_resource_types(
    out: &mut String,
    catalog: &StandardCatalog,
) -> Result<(), SerializationError> {
    writeln!(out, "resourcetypes {{")?;
    for failure in &catalog.failure_types {
        writeln!(out, "    failure {};", failure)?;
    }

    let policies: Vec<&str> = catalog.scheduling_policies.iter().map(|p| p.name()).collect();
    writeln!(out, "    enum {} {{ {} }}", catalog.policy_type, policies.join(", "))?;

    for kind in &catalog.resource_interfaces {
        writeln!(out, "    interface {} {{", kind.interface_name())?;
        for operation in kind.operations() {
            writeln!(out, "        op {}(amount : DOUBLE);", operation.name())?;
        }
        writeln!(out, "    }}")?;
    }

    for processing in &catalog.processing_types {
        write!(out, "    processing {}", processing.name)?;
        if let Some(kind) = processing.provides {
            write!(out, " provides {}", kind.interface_name())?;
        }
        if let Some(failure) = processing.failure {
            write!(out, " fails {}", failure)?;
        }
        writeln!(out, " {{")?;
        for property in &processing.properties {
            writeln!(out, "        property {} : {};", property.name, property.type_name)?;
        }
        writeln!(out, "    }}")?;
    }

    for link in &catalog.link_types {
        writeln!(out, "    link {} {{", link.name)?;
        for property in &link.properties {
            writeln!(out, "        property {} : {};", property.name, property.type_name)?;
        }
        writeln!(out, "    }}")?;
    }

    for internal in &catalog.internal_interfaces {
        writeln!(out, "    internal {} {{", internal.name)?;
        for property in &internal.properties {
            writeln!(out, "        property {} : {};", property.name, property.type_name)?;
        }
        for operation in &internal.operations {
            writeln!(out, "        op {}();", operation)?;
        }
        writeln!(out, "    }}")?;
    }

    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn join_literals(literals: &[Literal]) -> String {
    literals
        .iter()
        .map(Literal::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::GenerationConfig;
    use crate::generate::ModelGenerator;
    use pretty_assertions::assert_eq;

    fn model(config: &GenerationConfig, seed: u64) -> Model<'static> {
        ModelGenerator::new(catalog::standard(), config)
            .unwrap()
            .generate(seed)
            .unwrap()
    }

    fn section_starts(text: &str) -> Vec<&str> {
        text.lines()
            .filter(|l| !l.starts_with(' ') && l.ends_with('{'))
            .filter_map(|l| l.split_whitespace().next())
            .collect()
    }

    #[test]
    fn sections_emitted_in_order() {
        let text = to_tpcm(&model(&GenerationConfig::default(), 1)).unwrap();
        assert_eq!(
            section_starts(&text),
            vec![
                "resourcetypes",
                "repository",
                "resourceenvironment",
                "system",
                "allocation",
                "usage"
            ]
        );
    }

    #[test]
    fn serialization_is_idempotent() {
        let m = model(&GenerationConfig::default(), 2);
        assert_eq!(to_tpcm(&m).unwrap(), to_tpcm(&m).unwrap());
    }

    #[test]
    fn braces_balance() {
        let text = to_tpcm(&model(&GenerationConfig::default(), 3)).unwrap();
        let open = text.matches('{').count();
        let close = text.matches('}').count();
        assert_eq!(open, close);
    }

    #[test]
    fn every_assembly_allocated_in_text() {
        let m = model(&GenerationConfig::default(), 4);
        let text = to_tpcm(&m).unwrap();
        for unit in &m.system.assemblies {
            let line = format!(" : {} -> ", unit.name);
            assert_eq!(text.matches(&line).count(), 1, "{}", unit.name);
        }
    }

    #[test]
    fn component_roles_reference_catalog_interfaces() {
        let text = to_tpcm(&model(&GenerationConfig::default(), 5)).unwrap();
        assert!(text.contains("        requires cpu : ICPU;"));
        assert!(text.contains("        requires hdd : IHDD;"));
    }

    #[test]
    fn literals_use_guillemets() {
        let text = to_tpcm(&model(&GenerationConfig::default(), 6)).unwrap();
        assert!(text.contains("interArrivalTime(«"));
        assert!(text.contains("processingRate «"));
    }

    #[test]
    fn resource_types_block_is_stable() {
        let text = resource_types(catalog::standard()).unwrap();
        let expected = "\
resourcetypes {
    failure CPUFailure;
    enum SchedulingPolicy { FirstComeFirstServe, ProcessorSharing, Delay }
    interface ICPU {
        op process(amount : DOUBLE);
    }
    interface IHDD {
        op read(amount : DOUBLE);
        op write(amount : DOUBLE);
    }
    processing CPUResource provides ICPU fails CPUFailure {
        property processingRate : DOUBLE;
        property schedulingPolicy : SchedulingPolicy;
    }
    processing HDDResource provides IHDD {
        property processingRate : DOUBLE;
        property schedulingPolicy : SchedulingPolicy;
    }
    processing DelayResource {
        property processingRate : DOUBLE;
        property schedulingPolicy : SchedulingPolicy;
    }
    link Ethernet {
        property throughput : DOUBLE;
        property latency : DOUBLE;
    }
    internal PassiveResource {
        property capacity : INT;
        op acquire();
        op release();
    }
}

";
        assert_eq!(text, expected);
    }

    #[test]
    fn dangling_allocation_target_is_a_forward_reference() {
        let mut m = model(&GenerationConfig::default(), 7);
        m.allocation.entries[0].container = ContainerId(42);
        assert!(to_tpcm(&m).is_err());
    }

    #[test]
    fn dangling_behavior_role_names_its_component() {
        let mut m = model(&GenerationConfig::default(), 8);
        let component = m
            .repository
            .components
            .iter_mut()
            .find(|c| !c.behaviors.is_empty())
            .unwrap();
        component.behaviors[0].role = 99;
        let name = component.name.clone();
        match to_tpcm(&m) {
            Err(SerializationError::ForwardReference { entity, reference }) => {
                assert_eq!(entity, name);
                assert_eq!(reference, "provided role #99");
            }
            other => panic!("expected a forward reference, got {other:?}"),
        }
    }

    #[test]
    fn dangling_delegate_role_is_rejected() {
        let mut config = GenerationConfig::default();
        config.behavior.delegate_probability = 1.0;
        let mut m = model(&config, 9);
        let delegate = m
            .repository
            .components
            .iter_mut()
            .flat_map(|c| c.behaviors.iter_mut())
            .flat_map(|b| b.actions.iter_mut())
            .find_map(|a| match a {
                Action::Delegate { role, .. } => Some(role),
                Action::ResourceDemand { .. } => None,
            })
            .unwrap();
        *delegate = 99;
        assert!(matches!(
            to_tpcm(&m),
            Err(SerializationError::ForwardReference { .. })
        ));
    }

    #[test]
    fn dangling_call_operation_names_its_scenario() {
        let mut m = model(&GenerationConfig::default(), 10);
        let scenario = &mut m.usage.scenarios[0];
        scenario.calls[0].operation = 99;
        let name = scenario.name.clone();
        match to_tpcm(&m) {
            Err(SerializationError::ForwardReference { entity, .. }) => assert_eq!(entity, name),
            other => panic!("expected a forward reference, got {other:?}"),
        }
    }
}
