//! Resource environment and allocation
//!
//! Without an explicit container count (or with the default of two) the catalog's
//! template environment is reused. Otherwise `containerCount` containers are created,
//! each with a CPU and an HDD, and joined by links in the configured topology.

use rand::Rng;
use tracing::{debug, warn};

use super::{literals, GenerationContext};
use crate::catalog::{ResourceKind, SchedulingPolicy};
use crate::config::{AllocationPolicy, LinkTopology};
use crate::error::UnresolvableReference;
use crate::model::{
    Allocation, AllocationEntry, ContainerId, LinkingResource, ProcessingResourceSpec,
    ResourceContainer, ResourceEnvironment, System,
};
use crate::names::NameKind;

pub fn environment(ctx: &mut GenerationContext<'_>) -> ResourceEnvironment {
    let config = ctx.config;
    let count = match config.container_count {
        Some(n) if !config.uses_default_environment() => n,
        _ => {
            debug!("Reusing template resource environment");
            return ctx.catalog.default_environment();
        }
    };

    let name = ctx.names.next(NameKind::Environment);
    let containers: Vec<ResourceContainer> = (0..count)
        .map(|_| ResourceContainer {
            name: ctx.names.next(NameKind::Container),
            resources: vec![
                processing(ctx, ResourceKind::Cpu, SchedulingPolicy::ProcessorSharing),
                processing(ctx, ResourceKind::Hdd, SchedulingPolicy::FirstComeFirstServe),
            ],
        })
        .collect();

    let ids: Vec<ContainerId> = (0..count).map(ContainerId).collect();
    let groups: Vec<Vec<ContainerId>> = match (count, config.deployment.link_topology) {
        (0..=1, _) => Vec::new(),
        (_, LinkTopology::Backbone) => vec![ids],
        (_, LinkTopology::Chain) => ids.windows(2).map(<[ContainerId]>::to_vec).collect(),
    };
    let links = groups
        .into_iter()
        .map(|connects| link(ctx, connects))
        .collect();

    ResourceEnvironment {
        name,
        containers,
        links,
    }
}

fn processing(
    ctx: &mut GenerationContext<'_>,
    kind: ResourceKind,
    policy: SchedulingPolicy,
) -> ProcessingResourceSpec {
    let deployment = &ctx.config.deployment;
    let rate = literals::uniform(
        &mut ctx.rng,
        deployment.processing_rate_min,
        deployment.processing_rate_max,
    );
    ProcessingResourceSpec {
        name: kind.resource_name().to_string(),
        kind,
        processing_rate: rate.round(),
        policy,
    }
}

fn link(ctx: &mut GenerationContext<'_>, connects: Vec<ContainerId>) -> LinkingResource {
    let deployment = &ctx.config.deployment;
    let throughput = literals::uniform(
        &mut ctx.rng,
        deployment.throughput_min,
        deployment.throughput_max,
    );
    let latency = literals::uniform(&mut ctx.rng, deployment.latency_min, deployment.latency_max);
    LinkingResource {
        name: ctx.names.next(NameKind::Link),
        link_type: ctx.catalog.link_type().to_string(),
        connects,
        throughput: throughput.round(),
        latency: (latency * 1000.0).round() / 1000.0,
    }
}

/// Place every assembly unit on exactly one container
pub fn allocate(
    ctx: &mut GenerationContext<'_>,
    system: &System,
    environment: &ResourceEnvironment,
) -> Result<Allocation, UnresolvableReference> {
    let containers = environment.containers.len();
    if containers == 0 {
        return Err(UnresolvableReference {
            entity: system.name.clone(),
            reference: format!("container in empty environment {}", environment.name),
        });
    }

    let policy = ctx.config.deployment.allocation_policy;
    let name = ctx.names.next(NameKind::Allocation);
    let entries: Vec<AllocationEntry> = system
        .assembly_ids()
        .map(|assembly| {
            let container = match policy {
                AllocationPolicy::RoundRobin => ContainerId(assembly.0 % containers),
                AllocationPolicy::Random => ContainerId(ctx.rng.gen_range(0..containers)),
            };
            AllocationEntry {
                name: ctx.names.next(NameKind::AllocationEntry),
                assembly,
                container,
            }
        })
        .collect();

    let used = environment
        .container_ids()
        .filter(|&c| entries.iter().any(|e| e.container == c))
        .count();
    if used < containers {
        warn!(
            "Allocation {} leaves {} of {} containers empty",
            name,
            containers - used,
            containers
        );
    }

    Ok(Allocation { name, entries })
}
