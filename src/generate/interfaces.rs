//! Interface & signature generation

use rand::seq::SliceRandom;
use rand::Rng;

use super::GenerationContext;
use crate::catalog::Primitive;
use crate::model::{Interface, Operation, Parameter};
use crate::names::NameKind;

/// `interfaceCount` interfaces, each with a random number of typed operations
pub fn generate(ctx: &mut GenerationContext<'_>) -> Vec<Interface> {
    let config = ctx.config;
    (0..config.interface_count)
        .map(|_| {
            let name = ctx.names.next(NameKind::Interface);
            let count = ctx.rng.gen_range(
                config.min_operations_per_interface..=config.max_operations_per_interface,
            );
            let operations = (0..count).map(|_| operation(ctx, &name)).collect();
            Interface { name, operations }
        })
        .collect()
}

fn operation(ctx: &mut GenerationContext<'_>, interface: &str) -> Operation {
    let config = ctx.config;
    let name = ctx.names.next_scoped(NameKind::Operation, interface);
    let returns = random_primitive(ctx);
    let count = ctx.rng.gen_range(
        config.min_parameters_per_operation..=config.max_parameters_per_operation,
    );
    let parameters = (0..count)
        .map(|i| Parameter {
            name: format!("param{i}"),
            datatype: random_primitive(ctx),
        })
        .collect();
    Operation {
        name,
        parameters,
        returns,
    }
}

fn random_primitive(ctx: &mut GenerationContext<'_>) -> Primitive {
    ctx.catalog
        .datatypes
        .choose(&mut ctx.rng)
        .copied()
        .unwrap_or(Primitive::Integer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::GenerationConfig;
    use std::collections::BTreeSet;

    #[test]
    fn counts_stay_within_bounds() {
        let config = GenerationConfig {
            interface_count: 8,
            min_operations_per_interface: 2,
            max_operations_per_interface: 4,
            min_parameters_per_operation: 1,
            max_parameters_per_operation: 2,
            ..Default::default()
        };
        let mut ctx = GenerationContext::new(3, catalog::standard(), &config);
        let interfaces = generate(&mut ctx);
        assert_eq!(interfaces.len(), 8);
        for interface in &interfaces {
            assert!((2..=4).contains(&interface.operations.len()));
            for op in &interface.operations {
                assert!((1..=2).contains(&op.parameters.len()));
            }
        }
    }

    #[test]
    fn operation_names_unique_per_interface() {
        let config = GenerationConfig {
            min_operations_per_interface: 5,
            max_operations_per_interface: 5,
            ..Default::default()
        };
        let mut ctx = GenerationContext::new(17, catalog::standard(), &config);
        for interface in generate(&mut ctx) {
            let names: BTreeSet<_> = interface.operations.iter().map(|o| &o.name).collect();
            assert_eq!(names.len(), interface.operations.len());
        }
    }

    #[test]
    fn parameters_named_by_position() {
        let config = GenerationConfig {
            min_parameters_per_operation: 3,
            max_parameters_per_operation: 3,
            ..Default::default()
        };
        let mut ctx = GenerationContext::new(8, catalog::standard(), &config);
        let interfaces = generate(&mut ctx);
        let names: Vec<_> = interfaces[0].operations[0]
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["param0", "param1", "param2"]);
    }
}
