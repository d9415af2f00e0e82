//! Model invariant tests
//!
//! Exercises the generator end to end through the public API:
//! - References resolve, arguments match signatures, connectors match interfaces
//! - Allocation is total
//! - Determinism per seed, sensitivity to the seed, idempotent serialization
//! - Boundary shapes: a single component, components without requirements

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use tpcm_synth::catalog;
use tpcm_synth::export;
use tpcm_synth::model::{Action, EndpointDirection, Model, WiringOutcome};
use tpcm_synth::validate::validate_model;
use tpcm_synth::{GenerationConfig, ModelGenerator};

fn generate(config: &GenerationConfig, seed: u64) -> Model<'static> {
    ModelGenerator::new(catalog::standard(), config)
        .expect("valid config")
        .generate(seed)
        .expect("generation succeeds")
}

fn scenario_config() -> GenerationConfig {
    GenerationConfig {
        interface_count: 5,
        component_count: 10,
        container_count: Some(3),
        random_seed: Some(42),
        ..Default::default()
    }
}

// =============================================================================
// SCENARIO
// =============================================================================

#[test]
fn test_reference_scenario_shape() {
    let config = scenario_config();
    let model = generate(&config, 42);

    assert_eq!(model.repository.interfaces.len(), 5);
    assert_eq!(model.repository.components.len(), 10);
    for component in &model.repository.components {
        assert!(!component.provided.is_empty(), "{} provides nothing", component.name);
    }

    assert_eq!(model.environment.containers.len(), 3);
    assert_eq!(model.allocation.entries.len(), 10);

    let calls: Vec<_> = model.usage.scenarios.iter().flat_map(|s| &s.calls).collect();
    assert!(!calls.is_empty());
    for call in calls {
        let endpoint = model.system.endpoint(call.endpoint).expect("endpoint exists");
        assert_eq!(endpoint.direction, EndpointDirection::Provided);
    }
}

#[test]
fn test_reference_scenario_is_clean() {
    let model = generate(&scenario_config(), 42);
    let violations = validate_model(&model);
    assert!(violations.is_empty(), "violations: {:#?}", violations);
}

// =============================================================================
// INVARIANTS
// =============================================================================

#[test]
fn test_delegate_arguments_match_targets() {
    let mut config = GenerationConfig::default();
    config.behavior.delegate_probability = 0.9;
    config.max_parameters_per_operation = 5;
    for seed in 0..20 {
        let model = generate(&config, seed);
        for component in &model.repository.components {
            for action in component.behaviors.iter().flat_map(|b| &b.actions) {
                if let Action::Delegate {
                    role,
                    operation,
                    arguments,
                } = action
                {
                    assert_eq!(component.required[*role].interface, operation.interface);
                    let target = model.repository.operation(*operation).expect("operation exists");
                    assert!(target.accepts(arguments), "seed {seed}: {}", target.name);
                }
            }
        }
    }
}

#[test]
fn test_connectors_share_interface() {
    for seed in 0..20 {
        let model = generate(&GenerationConfig::default(), seed);
        for connector in &model.system.connectors {
            let from = &model.system.assemblies[connector.from.assembly.index()];
            let to = &model.system.assemblies[connector.to.assembly.index()];
            let required = &model.repository.components[from.component.index()].required
                [connector.from.role];
            let provided = &model.repository.components[to.component.index()].provided
                [connector.to.role];
            assert_eq!(required.interface, provided.interface);
        }
    }
}

#[test]
fn test_allocation_is_total() {
    let config = GenerationConfig {
        container_count: Some(4),
        component_count: 13,
        ..Default::default()
    };
    let model = generate(&config, 8);
    let allocated: Vec<usize> =
        model.allocation.entries.iter().map(|e| e.assembly.index()).collect();
    let unique: BTreeSet<_> = allocated.iter().copied().collect();
    assert_eq!(allocated.len(), model.system.assemblies.len());
    assert_eq!(unique.len(), model.system.assemblies.len());
    for entry in &model.allocation.entries {
        assert!(model.environment.container(entry.container).is_some());
    }
}

#[test]
fn test_every_requirement_has_an_outcome() {
    let model = generate(&GenerationConfig::default(), 17);
    let required: usize = model.repository.components.iter().map(|c| c.required.len()).sum();
    assert_eq!(model.system.resolutions.len(), required);
    for resolution in &model.system.resolutions {
        match resolution.outcome {
            WiringOutcome::Connected(id) => assert!(model.system.connector(id).is_some()),
            WiringOutcome::BoundaryExposed(id) => {
                let endpoint = model.system.endpoint(id).expect("endpoint exists");
                assert_eq!(endpoint.direction, EndpointDirection::Required);
            }
        }
    }
}

// =============================================================================
// DETERMINISM
// =============================================================================

#[test]
fn test_same_seed_same_text() {
    let config = scenario_config();
    let a = export::to_tpcm(&generate(&config, 42)).unwrap();
    let b = export::to_tpcm(&generate(&config, 42)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_different_seeds_differ() {
    let config = scenario_config();
    let a = export::to_tpcm(&generate(&config, 1)).unwrap();
    let b = export::to_tpcm(&generate(&config, 2)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_serialization_idempotent() {
    let model = generate(&scenario_config(), 99);
    let first = export::to_tpcm(&model).unwrap();
    let second = export::to_tpcm(&model).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// BOUNDARY CASES
// =============================================================================

#[test]
fn test_single_component_exposes_everything() {
    let config = GenerationConfig {
        component_count: 1,
        ..Default::default()
    };
    let model = generate(&config, 3);
    let component = &model.repository.components[0];

    assert!(model.system.connectors.is_empty());
    assert_eq!(model.system.required_endpoints().count(), component.required.len());
    assert!(model
        .system
        .resolutions
        .iter()
        .all(|r| matches!(r.outcome, WiringOutcome::BoundaryExposed(_))));
    assert!(validate_model(&model).is_empty());
    assert!(export::to_tpcm(&model).is_ok());
}

#[test]
fn test_components_without_requirements_only_demand() {
    let mut config = GenerationConfig {
        min_required_per_component: 0,
        max_required_per_component: 0,
        ..Default::default()
    };
    config.behavior.delegate_probability = 1.0;
    let model = generate(&config, 4);
    for component in &model.repository.components {
        assert!(component.required.is_empty());
        for action in component.behaviors.iter().flat_map(|b| &b.actions) {
            assert!(matches!(action, Action::ResourceDemand { .. }));
        }
    }
    assert!(model.system.connectors.is_empty());
}

#[test]
fn test_template_environment_reused_by_default() {
    let model = generate(&GenerationConfig::default(), 5);
    let names: Vec<_> = model.environment.containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["ApplicationServer", "DatabaseServer"]);
    let text = export::to_tpcm(&model).unwrap();
    assert!(text.contains("link LAN : Ethernet (ApplicationServer, DatabaseServer) {"));
}

#[test]
fn test_invalid_bounds_rejected_up_front() {
    let config = GenerationConfig {
        min_provided_per_component: 3,
        max_provided_per_component: 1,
        ..Default::default()
    };
    assert!(ModelGenerator::new(catalog::standard(), &config).is_err());
}
