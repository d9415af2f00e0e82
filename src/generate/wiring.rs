//! Assembly & wiring
//!
//! One assembly unit per component. Each required role is connected to a provided role
//! of the same interface on a different assembly, picked uniformly among the eligible
//! candidates; with no candidate it is exposed on the system boundary instead. Provided
//! roles that end up unused are exposed as well, and so are the reserved entry points,
//! whether or not a connector also targets them.
//!
//! Without fan-out a provided role serves at most one connector.

use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::debug;

use super::GenerationContext;
use crate::model::{
    AssemblyId, AssemblyUnit, BoundaryEndpoint, Connector, ConnectorId, EndpointDirection,
    EndpointId, InterfaceId, Repository, RequirementResolution, RoleSlot, System, WiringOutcome,
};
use crate::names::NameKind;

pub fn assemble(ctx: &mut GenerationContext<'_>, repository: &Repository) -> System {
    let name = ctx.names.next(NameKind::System);
    let assemblies: Vec<AssemblyUnit> = repository
        .component_ids()
        .map(|component| AssemblyUnit {
            name: ctx.names.next(NameKind::Assembly),
            component,
        })
        .collect();

    let mut system = System {
        name,
        assemblies,
        ..Default::default()
    };

    let provided = provided_slots(repository, &system);
    let reserved = reserve_entry_points(ctx, repository, &provided);
    let mut consumed: BTreeSet<RoleSlot> = BTreeSet::new();
    let fan_out = ctx.config.wiring.fan_out;

    for assembly in system.assembly_ids() {
        let Some(component) = system
            .assembly(assembly)
            .and_then(|a| repository.component(a.component))
        else {
            continue;
        };

        for (role, required) in component.required.iter().enumerate() {
            let slot = RoleSlot { assembly, role };
            let candidates: Vec<RoleSlot> = provided
                .iter()
                .filter(|(target, interface)| {
                    *interface == required.interface
                        && target.assembly != assembly
                        && (fan_out || !consumed.contains(target))
                })
                .map(|(target, _)| *target)
                .collect();

            let outcome = match candidates.choose(&mut ctx.rng) {
                Some(&target) => {
                    consumed.insert(target);
                    let id = ConnectorId(system.connectors.len());
                    system.connectors.push(Connector {
                        name: ctx.names.next(NameKind::Connector),
                        from: slot,
                        to: target,
                        interface: required.interface,
                    });
                    WiringOutcome::Connected(id)
                }
                None => {
                    let id = expose(
                        ctx,
                        &mut system,
                        EndpointDirection::Required,
                        slot,
                        required.interface,
                    );
                    debug!(
                        "No provider for {}.{}, exposed as boundary requirement",
                        component.name, required.name
                    );
                    WiringOutcome::BoundaryExposed(id)
                }
            };
            system
                .resolutions
                .push(RequirementResolution { slot, outcome });
        }
    }

    for (slot, interface) in &provided {
        if reserved.contains(slot) || !consumed.contains(slot) {
            expose(ctx, &mut system, EndpointDirection::Provided, *slot, *interface);
        }
    }

    debug!(
        "Wired system {}: {} connectors, {} boundary endpoints",
        system.name,
        system.connectors.len(),
        system.endpoints.len()
    );
    system
}

/// Every (assembly, provided role) with its interface, in assembly order
fn provided_slots(repository: &Repository, system: &System) -> Vec<(RoleSlot, InterfaceId)> {
    system
        .assemblies
        .iter()
        .enumerate()
        .filter_map(|(i, unit)| Some((AssemblyId(i), repository.component(unit.component)?)))
        .flat_map(|(assembly, component)| {
            component
                .provided
                .iter()
                .enumerate()
                .map(move |(role, p)| (RoleSlot { assembly, role }, p.interface))
        })
        .collect()
}

/// Pick `minExposedProvided` provided roles as system entry points, preferring
/// interfaces that have operations to call
fn reserve_entry_points(
    ctx: &mut GenerationContext<'_>,
    repository: &Repository,
    provided: &[(RoleSlot, InterfaceId)],
) -> BTreeSet<RoleSlot> {
    let callable = |interface: InterfaceId| {
        repository
            .interface(interface)
            .is_some_and(|i| i.has_operations())
    };
    let mut preferred: Vec<RoleSlot> = provided
        .iter()
        .filter(|(_, i)| callable(*i))
        .map(|(s, _)| *s)
        .collect();
    let mut fallback: Vec<RoleSlot> = provided
        .iter()
        .filter(|(_, i)| !callable(*i))
        .map(|(s, _)| *s)
        .collect();
    preferred.shuffle(&mut ctx.rng);
    fallback.shuffle(&mut ctx.rng);

    preferred
        .into_iter()
        .chain(fallback)
        .take(ctx.config.wiring.min_exposed_provided)
        .collect()
}

fn expose(
    ctx: &mut GenerationContext<'_>,
    system: &mut System,
    direction: EndpointDirection,
    slot: RoleSlot,
    interface: InterfaceId,
) -> EndpointId {
    let id = EndpointId(system.endpoints.len());
    system.endpoints.push(BoundaryEndpoint {
        name: ctx.names.next(NameKind::Endpoint),
        direction,
        slot,
        interface,
    });
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::GenerationConfig;
    use crate::generate::{components, interfaces};
    use std::collections::BTreeMap;

    fn wire(config: &GenerationConfig, seed: u64) -> (Repository, System) {
        let mut ctx = GenerationContext::new(seed, catalog::standard(), config);
        let interfaces = interfaces::generate(&mut ctx);
        let components = components::generate(&mut ctx, &interfaces);
        let repository = Repository {
            name: "repo".into(),
            interfaces,
            components,
        };
        let system = assemble(&mut ctx, &repository);
        (repository, system)
    }

    fn required_interface(repository: &Repository, system: &System, slot: RoleSlot) -> InterfaceId {
        let component = system.assemblies[slot.assembly.0].component;
        repository.components[component.0].required[slot.role].interface
    }

    fn provided_interface(repository: &Repository, system: &System, slot: RoleSlot) -> InterfaceId {
        let component = system.assemblies[slot.assembly.0].component;
        repository.components[component.0].provided[slot.role].interface
    }

    #[test]
    fn one_assembly_per_component() {
        let (repository, system) = wire(&GenerationConfig::default(), 1);
        assert_eq!(system.assemblies.len(), repository.components.len());
    }

    #[test]
    fn every_required_role_has_exactly_one_outcome() {
        let (repository, system) = wire(&GenerationConfig::default(), 2);
        let total: usize = repository.components.iter().map(|c| c.required.len()).sum();
        assert_eq!(system.resolutions.len(), total);
        let slots: BTreeSet<_> = system.resolutions.iter().map(|r| r.slot).collect();
        assert_eq!(slots.len(), total);
    }

    #[test]
    fn connectors_join_matching_interfaces_across_assemblies() {
        let (repository, system) = wire(&GenerationConfig::default(), 3);
        assert!(!system.connectors.is_empty());
        for connector in &system.connectors {
            assert_ne!(connector.from.assembly, connector.to.assembly);
            assert_eq!(
                required_interface(&repository, &system, connector.from),
                provided_interface(&repository, &system, connector.to)
            );
        }
    }

    #[test]
    fn without_fan_out_targets_are_used_once() {
        let (_, system) = wire(&GenerationConfig::default(), 4);
        let mut uses: BTreeMap<RoleSlot, usize> = BTreeMap::new();
        for connector in &system.connectors {
            *uses.entry(connector.to).or_default() += 1;
        }
        assert!(uses.values().all(|&n| n == 1));
    }

    /// Three interfaces, six components: each interface has two providers and four
    /// requirers
    fn scarce_providers(fan_out: bool) -> GenerationConfig {
        let mut config = GenerationConfig {
            interface_count: 3,
            component_count: 6,
            min_provided_per_component: 1,
            max_provided_per_component: 1,
            min_required_per_component: 2,
            max_required_per_component: 2,
            ..Default::default()
        };
        config.wiring.fan_out = fan_out;
        config
    }

    fn target_uses(system: &System) -> BTreeMap<RoleSlot, usize> {
        let mut uses: BTreeMap<RoleSlot, usize> = BTreeMap::new();
        for connector in &system.connectors {
            *uses.entry(connector.to).or_default() += 1;
        }
        uses
    }

    #[test]
    fn fan_out_shares_provided_roles() {
        for seed in 0..10 {
            let (_, system) = wire(&scarce_providers(true), seed);
            assert_eq!(system.connectors.len(), 12, "seed {seed}");
            assert!(target_uses(&system).values().any(|&n| n > 1), "seed {seed}");
        }
    }

    #[test]
    fn without_fan_out_scarce_providers_leave_requirements_on_the_boundary() {
        for seed in 0..10 {
            let (_, system) = wire(&scarce_providers(false), seed);
            assert!(target_uses(&system).values().all(|&n| n == 1), "seed {seed}");
            assert_eq!(system.connectors.len(), 6, "seed {seed}");
            assert_eq!(system.required_endpoints().count(), 6, "seed {seed}");
        }
    }

    fn peer_provides(repository: &Repository, system: &System, slot: RoleSlot) -> bool {
        let wanted = required_interface(repository, system, slot);
        provided_slots(repository, system)
            .iter()
            .any(|(target, interface)| target.assembly != slot.assembly && *interface == wanted)
    }

    #[test]
    fn reserved_entry_point_still_serves_its_only_requirer() {
        let config = GenerationConfig {
            interface_count: 2,
            component_count: 2,
            min_provided_per_component: 1,
            max_provided_per_component: 1,
            min_required_per_component: 1,
            max_required_per_component: 1,
            ..Default::default()
        };
        for seed in 0..20 {
            let (repository, system) = wire(&config, seed);
            assert_eq!(system.connectors.len(), 2, "seed {seed}");
            for resolution in &system.resolutions {
                assert!(
                    matches!(resolution.outcome, WiringOutcome::Connected(_)),
                    "seed {seed}: {:?} exposed although a peer provides it",
                    resolution.slot
                );
                assert!(peer_provides(&repository, &system, resolution.slot));
            }
            // The entry point is exposed on top of its connector
            assert_eq!(system.provided_endpoints().count(), 1, "seed {seed}");
        }
    }

    #[test]
    fn with_fan_out_only_unmatched_requirements_reach_the_boundary() {
        let mut config = GenerationConfig::default();
        config.wiring.fan_out = true;
        for seed in 0..20 {
            let (repository, system) = wire(&config, seed);
            for resolution in &system.resolutions {
                if let WiringOutcome::BoundaryExposed(_) = resolution.outcome {
                    assert!(
                        !peer_provides(&repository, &system, resolution.slot),
                        "seed {seed}: {:?} exposed although a peer provides it",
                        resolution.slot
                    );
                }
            }
        }
    }

    #[test]
    fn sole_component_exposes_all_requirements() {
        let config = GenerationConfig {
            component_count: 1,
            ..Default::default()
        };
        let (repository, system) = wire(&config, 6);
        assert!(system.connectors.is_empty());
        assert_eq!(
            system.required_endpoints().count(),
            repository.components[0].required.len()
        );
        assert_eq!(
            system.provided_endpoints().count(),
            repository.components[0].provided.len()
        );
    }

    #[test]
    fn reserved_entry_point_is_exposed() {
        let (_, system) = wire(&GenerationConfig::default(), 7);
        assert!(system.provided_endpoints().count() >= 1);
    }

    #[test]
    fn outcomes_point_at_existing_entities() {
        let (_, system) = wire(&GenerationConfig::default(), 8);
        for resolution in &system.resolutions {
            match resolution.outcome {
                WiringOutcome::Connected(id) => {
                    assert_eq!(system.connector(id).map(|c| c.from), Some(resolution.slot))
                }
                WiringOutcome::BoundaryExposed(id) => {
                    assert_eq!(system.endpoint(id).map(|e| e.slot), Some(resolution.slot))
                }
            }
        }
    }
}
