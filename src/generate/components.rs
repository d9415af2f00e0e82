//! Component generation
//!
//! Components provide a subset of the interfaces and require a disjoint subset, plus
//! the implicit `cpu`/`hdd` resource roles. Each provided operation gets a behavior
//! spec: a short action sequence that either demands a resource or delegates to an
//! operation of one of the component's required roles.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{literals, GenerationContext};
use crate::catalog::{ResourceKind, ResourceOperation};
use crate::model::{
    Action, BehaviorSpec, Component, Interface, InterfaceId, OperationRef, ProvidedRole,
    RequiredRole, ResourceRole,
};
use crate::names::NameKind;

/// Hands out provided interfaces, cycling through those no earlier component provides
/// before repeating any. This keeps most interfaces provided by someone, so required
/// roles usually find a peer to wire to.
pub struct InterfacePool {
    all: Vec<InterfaceId>,
    remaining: Vec<InterfaceId>,
}

impl InterfacePool {
    pub fn new(count: usize) -> Self {
        let all: Vec<InterfaceId> = (0..count).map(InterfaceId).collect();
        Self {
            remaining: all.clone(),
            all,
        }
    }

    /// `provided` distinct interfaces for one component, then `required` distinct
    /// interfaces drawn from the rest
    pub fn sample<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        provided: usize,
        required: usize,
    ) -> (Vec<InterfaceId>, Vec<InterfaceId>) {
        let mut fresh = self.remaining.clone();
        fresh.shuffle(rng);
        let mut seen: Vec<InterfaceId> = self
            .all
            .iter()
            .copied()
            .filter(|id| !self.remaining.contains(id))
            .collect();
        seen.shuffle(rng);

        let chosen: Vec<InterfaceId> = fresh.into_iter().chain(seen).take(provided).collect();
        self.remaining.retain(|id| !chosen.contains(id));
        if self.remaining.is_empty() {
            self.remaining = self.all.clone();
        }

        let mut others: Vec<InterfaceId> = self
            .all
            .iter()
            .copied()
            .filter(|id| !chosen.contains(id))
            .collect();
        others.shuffle(rng);
        others.truncate(required);

        (chosen, others)
    }
}

pub fn generate(ctx: &mut GenerationContext<'_>, interfaces: &[Interface]) -> Vec<Component> {
    let config = ctx.config;
    let n = interfaces.len();
    let mut pool = InterfacePool::new(n);

    (0..config.component_count)
        .map(|_| {
            let max_provided = config
                .max_provided_per_component
                .min(n - config.min_required_per_component);
            let provided_count = ctx
                .rng
                .gen_range(config.min_provided_per_component..=max_provided);
            let max_required = config.max_required_per_component.min(n - provided_count);
            let required_count = ctx
                .rng
                .gen_range(config.min_required_per_component..=max_required);

            let (provided_ids, required_ids) =
                pool.sample(&mut ctx.rng, provided_count, required_count);

            let name = ctx.names.next(NameKind::Component);
            let provided: Vec<ProvidedRole> = provided_ids
                .into_iter()
                .map(|interface| ProvidedRole {
                    name: ctx.names.next_scoped(NameKind::ProvidedRole, &name),
                    interface,
                })
                .collect();
            let required: Vec<RequiredRole> = required_ids
                .into_iter()
                .map(|interface| RequiredRole {
                    name: ctx.names.next_scoped(NameKind::RequiredRole, &name),
                    interface,
                })
                .collect();
            let behaviors = behaviors(ctx, interfaces, &provided, &required);

            Component {
                name,
                provided,
                required,
                resource_roles: ResourceKind::ALL
                    .iter()
                    .map(|&kind| ResourceRole { kind })
                    .collect(),
                behaviors,
            }
        })
        .collect()
}

/// One behavior spec per (provided role, operation of its interface)
fn behaviors(
    ctx: &mut GenerationContext<'_>,
    interfaces: &[Interface],
    provided: &[ProvidedRole],
    required: &[RequiredRole],
) -> Vec<BehaviorSpec> {
    // Only roles with something to call can be delegated to
    let delegatable: Vec<usize> = required
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            interfaces
                .get(r.interface.0)
                .is_some_and(Interface::has_operations)
        })
        .map(|(i, _)| i)
        .collect();

    let mut specs = Vec::new();
    for (role_index, role) in provided.iter().enumerate() {
        let Some(interface) = interfaces.get(role.interface.0) else {
            continue;
        };
        for operation in 0..interface.operations.len() {
            let actions = actions(ctx, interfaces, required, &delegatable);
            specs.push(BehaviorSpec {
                role: role_index,
                operation: OperationRef {
                    interface: role.interface,
                    operation,
                },
                actions,
            });
        }
    }
    specs
}

fn actions(
    ctx: &mut GenerationContext<'_>,
    interfaces: &[Interface],
    required: &[RequiredRole],
    delegatable: &[usize],
) -> Vec<Action> {
    let config = ctx.config;
    let behavior = &config.behavior;
    let count = ctx
        .rng
        .gen_range(behavior.min_actions..=behavior.max_actions);

    (0..count)
        .map(|_| {
            let delegate_to = if ctx.rng.gen_bool(behavior.delegate_probability) {
                delegatable.choose(&mut ctx.rng).copied()
            } else {
                None
            };
            match delegate_to {
                Some(role) => delegate(ctx, interfaces, required, role),
                None => resource_demand(ctx),
            }
        })
        .collect()
}

fn delegate(
    ctx: &mut GenerationContext<'_>,
    interfaces: &[Interface],
    required: &[RequiredRole],
    role: usize,
) -> Action {
    let interface_id = required[role].interface;
    let interface = &interfaces[interface_id.0];
    let operation = ctx.rng.gen_range(0..interface.operations.len());
    let arguments = literals::arguments(
        &mut ctx.rng,
        &ctx.config.values,
        &interface.operations[operation],
    );
    Action::Delegate {
        role,
        operation: OperationRef {
            interface: interface_id,
            operation,
        },
        arguments,
    }
}

fn resource_demand(ctx: &mut GenerationContext<'_>) -> Action {
    let kind = if ctx.rng.gen_bool(0.5) {
        ResourceKind::Cpu
    } else {
        ResourceKind::Hdd
    };
    let operation = kind
        .operations()
        .choose(&mut ctx.rng)
        .copied()
        .unwrap_or(ResourceOperation::Process);
    Action::ResourceDemand {
        operation,
        amount: literals::demand(&mut ctx.rng, &ctx.config.values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::GenerationConfig;
    use crate::generate::interfaces;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn components_for(config: &GenerationConfig, seed: u64) -> (Vec<Interface>, Vec<Component>) {
        let mut ctx = GenerationContext::new(seed, catalog::standard(), config);
        let interfaces = interfaces::generate(&mut ctx);
        let components = generate(&mut ctx, &interfaces);
        (interfaces, components)
    }

    #[test]
    fn pool_cycles_before_repeating() {
        let mut pool = InterfacePool::new(4);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let (first, _) = pool.sample(&mut rng, 2, 0);
        let (second, _) = pool.sample(&mut rng, 2, 0);
        let mut all: Vec<_> = first.iter().chain(&second).copied().collect();
        all.sort();
        assert_eq!(all, (0..4).map(InterfaceId).collect::<Vec<_>>());
    }

    #[test]
    fn required_never_overlaps_provided() {
        let (_, components) = components_for(&GenerationConfig::default(), 21);
        for component in &components {
            for role in &component.required {
                assert!(!component.provides(role.interface), "{}", component.name);
            }
        }
    }

    #[test]
    fn every_component_requires_cpu_and_hdd() {
        let (_, components) = components_for(&GenerationConfig::default(), 4);
        for component in &components {
            assert!(component.requires_resource(ResourceKind::Cpu));
            assert!(component.requires_resource(ResourceKind::Hdd));
        }
    }

    #[test]
    fn one_behavior_per_provided_operation() {
        let (interfaces, components) = components_for(&GenerationConfig::default(), 5);
        for component in &components {
            let expected: usize = component
                .provided
                .iter()
                .map(|r| interfaces[r.interface.0].operations.len())
                .sum();
            assert_eq!(component.behaviors.len(), expected);
        }
    }

    #[test]
    fn delegates_target_the_required_role_interface() {
        let mut config = GenerationConfig::default();
        config.behavior.delegate_probability = 1.0;
        let (interfaces, components) = components_for(&config, 77);
        let mut delegations = 0;
        for component in &components {
            for action in component.behaviors.iter().flat_map(|b| &b.actions) {
                if let Action::Delegate {
                    role,
                    operation,
                    arguments,
                } = action
                {
                    delegations += 1;
                    assert_eq!(component.required[*role].interface, operation.interface);
                    let target = &interfaces[operation.interface.0].operations[operation.operation];
                    assert!(target.accepts(arguments));
                }
            }
        }
        assert!(delegations > 0);
    }

    #[test]
    fn zero_required_roles_only_demand_resources() {
        let mut config = GenerationConfig {
            min_required_per_component: 0,
            max_required_per_component: 0,
            ..Default::default()
        };
        config.behavior.delegate_probability = 1.0;
        let (_, components) = components_for(&config, 9);
        for component in &components {
            assert!(component.required.is_empty());
            assert!(!component.delegates());
        }
    }
}
