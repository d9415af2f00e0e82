//! Identifier Registry
//!
//! Issues names of the form `<prefix>_<8 uppercase letters>`. Suffixes come from a
//! ChaCha stream of their own (same seed, stream 1), so naming never shifts the
//! structural draws made by the generators. A name is never issued twice within its
//! namespace, and never collides with a catalog declaration.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::StandardCatalog;

const SUFFIX_LEN: usize = 8;

/// Namespaces the registry keeps apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NameKind {
    Repository,
    Interface,
    Operation,
    Component,
    ProvidedRole,
    RequiredRole,
    System,
    Assembly,
    Connector,
    Endpoint,
    Environment,
    Container,
    Link,
    Allocation,
    AllocationEntry,
    Usage,
    Scenario,
}

impl NameKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            NameKind::Repository => "repository",
            NameKind::Interface => "interface",
            NameKind::Operation => "operation",
            NameKind::Component => "component",
            NameKind::ProvidedRole => "provided",
            NameKind::RequiredRole => "required",
            NameKind::System => "system",
            NameKind::Assembly => "assembly",
            NameKind::Connector => "connector",
            NameKind::Endpoint => "endpoint",
            NameKind::Environment => "environment",
            NameKind::Container => "container",
            NameKind::Link => "link",
            NameKind::Allocation => "allocation",
            NameKind::AllocationEntry => "alloc",
            NameKind::Usage => "usage",
            NameKind::Scenario => "scenario",
        }
    }
}

pub struct NameRegistry<'c> {
    rng: ChaCha8Rng,
    catalog: &'c StandardCatalog,
    issued: BTreeMap<(NameKind, String), BTreeSet<String>>,
}

impl<'c> NameRegistry<'c> {
    pub fn new(seed: u64, catalog: &'c StandardCatalog) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(1);
        Self {
            rng,
            catalog,
            issued: BTreeMap::new(),
        }
    }

    /// Next unused name in the run-wide namespace of `kind`
    pub fn next(&mut self, kind: NameKind) -> String {
        self.next_scoped(kind, "")
    }

    /// Next unused name within `scope` (e.g. operations per interface)
    pub fn next_scoped(&mut self, kind: NameKind, scope: &str) -> String {
        loop {
            let candidate = format!("{}_{}", kind.prefix(), self.suffix());
            if self.catalog.is_reserved(&candidate) {
                continue;
            }
            let namespace = self
                .issued
                .entry((kind, scope.to_string()))
                .or_default();
            if namespace.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Number of names issued so far, across all namespaces
    pub fn issued(&self) -> usize {
        self.issued.values().map(BTreeSet::len).sum()
    }

    fn suffix(&mut self) -> String {
        (0..SUFFIX_LEN)
            .map(|_| char::from(self.rng.gen_range(b'A'..=b'Z')))
            .collect()
    }
}
