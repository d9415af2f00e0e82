//! Literal synthesis
//!
//! One literal per target parameter, drawn from the configured value ranges.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::catalog::Primitive;
use crate::config::ValueConfig;
use crate::model::{Literal, Operation};

/// A literal of the given kind
pub fn literal<R: Rng + ?Sized>(rng: &mut R, values: &ValueConfig, kind: Primitive) -> Literal {
    match kind {
        Primitive::Integer => Literal::Integer(rng.gen_range(values.int_min..=values.int_max)),
        Primitive::Double => Literal::Double(round2(
            uniform(rng, values.double_min, values.double_max),
        )),
        Primitive::Boolean => Literal::Boolean(rng.gen_bool(0.5)),
        Primitive::String => {
            let len = rng.gen_range(values.string_min_length..=values.string_max_length);
            Literal::String((0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect())
        }
    }
}

/// Arguments for `operation`, matching its parameter list in order
pub fn arguments<R: Rng + ?Sized>(
    rng: &mut R,
    values: &ValueConfig,
    operation: &Operation,
) -> Vec<Literal> {
    operation
        .parameters
        .iter()
        .map(|p| literal(rng, values, p.datatype))
        .collect()
}

/// Resource demand amount, rounded to two decimals and kept positive
pub fn demand<R: Rng + ?Sized>(rng: &mut R, values: &ValueConfig) -> f64 {
    let amount = round2(uniform(rng, values.demand_min, values.demand_max));
    if amount > 0.0 {
        amount
    } else {
        values.demand_min
    }
}

/// Uniform draw in `[min, max]`; a degenerate range yields `min`
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
