//! Usage scenario generation
//!
//! A single scenario with an open (or closed) workload that calls operations on
//! provided system boundary endpoints. With no callable endpoint the usage model stays
//! empty: a scenario without calls would not exercise the system at all.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use super::{literals, GenerationContext};
use crate::config::WorkloadKind;
use crate::model::{
    EndpointId, Repository, System, SystemCall, UsageModel, UsageScenario, Workload,
};
use crate::names::NameKind;

pub fn generate(
    ctx: &mut GenerationContext<'_>,
    repository: &Repository,
    system: &System,
) -> UsageModel {
    let name = ctx.names.next(NameKind::Usage);

    let callable: Vec<EndpointId> = system
        .provided_endpoints()
        .filter(|(_, e)| {
            repository
                .interface(e.interface)
                .is_some_and(|i| i.has_operations())
        })
        .map(|(id, _)| id)
        .collect();

    if callable.is_empty() {
        warn!(
            "System {} exposes no callable operation; usage model {} has no scenario",
            system.name, name
        );
        return UsageModel {
            name,
            scenarios: Vec::new(),
        };
    }

    let scenario_name = ctx.names.next(NameKind::Scenario);
    let workload = workload(ctx);
    let usage = &ctx.config.usage;
    let count = ctx.rng.gen_range(usage.min_calls..=usage.max_calls);

    let mut calls = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(&endpoint) = callable.choose(&mut ctx.rng) else {
            break;
        };
        let Some(interface) = system
            .endpoint(endpoint)
            .and_then(|e| repository.interface(e.interface))
        else {
            continue;
        };
        let operation = ctx.rng.gen_range(0..interface.operations.len());
        let arguments = literals::arguments(
            &mut ctx.rng,
            &ctx.config.values,
            &interface.operations[operation],
        );
        calls.push(SystemCall {
            endpoint,
            operation,
            arguments,
        });
    }

    UsageModel {
        name,
        scenarios: vec![UsageScenario {
            name: scenario_name,
            workload,
            calls,
        }],
    }
}

fn workload(ctx: &mut GenerationContext<'_>) -> Workload {
    let usage = &ctx.config.usage;
    match usage.workload {
        WorkloadKind::Open => {
            let rate =
                literals::uniform(&mut ctx.rng, usage.arrival_rate_min, usage.arrival_rate_max);
            Workload::Open {
                inter_arrival_time: literals::round2(1.0 / rate),
            }
        }
        WorkloadKind::Closed => Workload::Closed {
            population: ctx.rng.gen_range(1..=usage.max_population),
            think_time: literals::round2(literals::uniform(
                &mut ctx.rng,
                usage.think_time_min,
                usage.think_time_max,
            )),
        },
    }
}
