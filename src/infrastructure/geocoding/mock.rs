//! Offline resolvers: a fabricated Paris address generator and a
//! resolver that always fails.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{AddressResolver, DomainError, DomainResult};

const PARIS_STREETS: &[&str] = &[
    "Rue de Rivoli",
    "Avenue des Champs-Élysées",
    "Boulevard Saint-Germain",
    "Rue du Faubourg Saint-Honoré",
    "Avenue Montaigne",
    "Rue de la Paix",
    "Boulevard Haussmann",
    "Rue de Vaugirard",
    "Avenue de l'Opéra",
    "Rue Mouffetard",
];

/// Generates a plausible-looking Paris address, ignoring the coordinates.
#[derive(Debug, Default, Clone)]
pub struct MockAddressResolver;

impl MockAddressResolver {
    pub fn new() -> Self {
        Self
    }

    fn fabricate<R: Rng + ?Sized>(rng: &mut R) -> String {
        let number = rng.gen_range(1..=200);
        let street = PARIS_STREETS.choose(rng).copied().unwrap_or("Rue de Rivoli");
        let arrondissement = rng.gen_range(1..=20);
        format!("{} {}, 750{:02} Paris, France", number, street, arrondissement)
    }
}

#[async_trait]
impl AddressResolver for MockAddressResolver {
    async fn resolve(&self, _latitude: f64, _longitude: f64) -> DomainResult<String> {
        Ok(Self::fabricate(&mut rand::thread_rng()))
    }
}

/// Resolver that reports every lookup as failed with a fixed error.
#[derive(Debug, Clone)]
pub struct FailingAddressResolver {
    error: DomainError,
}

impl FailingAddressResolver {
    pub fn new(error: DomainError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl AddressResolver for FailingAddressResolver {
    async fn resolve(&self, _latitude: f64, _longitude: f64) -> DomainResult<String> {
        Err(self.error.clone())
    }
}
