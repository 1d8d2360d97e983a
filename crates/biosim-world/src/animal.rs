//! Individual animal state and behaviour.

use biosim_core::{fitness, Parameters, Species, SpeciesParams};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// An animal on the island.
///
/// Fitness is derived from age and weight and recomputed every time either
/// changes; it cannot be set from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    has_moved: bool,
}

impl Animal {
    pub fn new(species: Species, age: u32, weight: f64, params: &Parameters) -> Self {
        let mut animal = Self {
            species,
            age,
            weight,
            fitness: 0.0,
            has_moved: false,
        };
        animal.update_fitness(params);
        animal
    }

    /// A newborn with a birth weight drawn from the species' normal distribution
    pub fn newborn(species: Species, params: &Parameters, rng: &mut ChaCha8Rng) -> Self {
        let p = params.species(species);
        let z: f64 = rng.sample(StandardNormal);
        Self::new(species, 0, p.w_birth + p.sigma_birth * z, params)
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn is_herbivore(&self) -> bool {
        self.species == Species::Herbivore
    }

    pub fn is_carnivore(&self) -> bool {
        self.species == Species::Carnivore
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    fn params<'a>(&self, params: &'a Parameters) -> &'a SpeciesParams {
        params.species(self.species)
    }

    /// Recompute the cached fitness from age and weight under `params`
    pub(crate) fn update_fitness(&mut self, params: &Parameters) {
        self.fitness = fitness(self.age, self.weight, self.params(params));
    }

    fn gain_weight(&mut self, food: f64, params: &Parameters) {
        self.weight += food * self.params(params).beta;
        self.update_fitness(params);
    }

    pub fn age_one_year(&mut self, params: &Parameters) {
        self.age = self.age.saturating_add(1);
        self.update_fitness(params);
    }

    pub fn lose_weight(&mut self, params: &Parameters) {
        self.weight -= self.weight * self.params(params).eta;
        self.update_fitness(params);
    }

    /// Yearly death check
    pub fn dies(&self, params: &Parameters, rng: &mut ChaCha8Rng) -> bool {
        if self.fitness <= 0.0 {
            return true;
        }
        rng.gen::<f64>() < biosim_core::death_probability(self.fitness, self.params(params))
    }

    /// Graze on a cell holding `available` fodder. Returns the amount eaten.
    pub fn feed(&mut self, available: f64, params: &Parameters) -> f64 {
        let eaten = self.params(params).f.min(available.max(0.0));
        self.gain_weight(eaten, params);
        eaten
    }

    /// Hunt through `prey`, which must be sorted by descending fitness.
    ///
    /// Every herbivore is attempted at most once, and hunting stops as soon
    /// as the carnivore has eaten its appetite `F`. Returns the indices into
    /// `prey` of the animals that were killed.
    pub fn kill(&mut self, prey: &[Animal], params: &Parameters, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let p = self.params(params);
        let (appetite, Some(delta_phi_max)) = (p.f, p.delta_phi_max) else {
            return Vec::new();
        };

        let mut eaten = 0.0;
        let mut killed = Vec::new();
        for (index, herbivore) in prey.iter().enumerate() {
            if eaten >= appetite {
                break;
            }

            let chance = biosim_core::kill_probability(self.fitness, herbivore.fitness, delta_phi_max);
            if rng.gen::<f64>() < chance {
                self.gain_weight(herbivore.weight, params);
                eaten += herbivore.weight;
                killed.push(index);
            }
        }

        killed
    }

    /// Possibly give birth, given `same_species` animals in the cell (self included).
    ///
    /// No birth happens if the mother is below the species' birth threshold.
    /// A sampled birth weight of zero or less is a stillbirth: nothing is
    /// returned and the mother keeps her weight.
    pub fn gives_birth(
        &mut self,
        same_species: usize,
        params: &Parameters,
        rng: &mut ChaCha8Rng,
    ) -> Option<Animal> {
        let p = self.params(params);
        if self.weight < p.birth_threshold() {
            return None;
        }

        let chance = biosim_core::birth_probability(self.fitness, same_species, p);
        if rng.gen::<f64>() >= chance {
            return None;
        }

        let xi = p.xi;
        let newborn = Animal::newborn(self.species, params, rng);
        if newborn.weight <= 0.0 {
            return None;
        }

        self.weight -= xi * newborn.weight;
        self.update_fitness(params);
        Some(newborn)
    }

    /// Decide whether and where to migrate.
    ///
    /// `relative_fodder` holds one entry per neighbouring cell, `None` for
    /// cells that cannot be entered. Returns the index of the chosen
    /// neighbour. The animal is marked as moved whenever the decision is
    /// evaluated, whatever the outcome.
    pub fn migrate(
        &mut self,
        relative_fodder: &[Option<f64>],
        params: &Parameters,
        rng: &mut ChaCha8Rng,
    ) -> Option<usize> {
        if self.has_moved {
            return None;
        }
        self.has_moved = true;

        let p = self.params(params);
        if rng.gen::<f64>() >= p.mu * self.fitness {
            return None;
        }

        let scale = p.lambda.exp();
        let propensities: Vec<f64> = relative_fodder
            .iter()
            .map(|abundance| abundance.map_or(0.0, |e| (scale * e).max(0.0)))
            .collect();

        if propensities.iter().sum::<f64>() <= 0.0 {
            return None;
        }

        let choice = WeightedIndex::new(&propensities).ok()?;
        Some(choice.sample(rng))
    }

    pub fn reset_migration(&mut self) {
        self.has_moved = false;
    }

    #[cfg(test)]
    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn herbivore(age: u32, weight: f64) -> Animal {
        Animal::new(Species::Herbivore, age, weight, &Parameters::default())
    }

    fn carnivore(age: u32, weight: f64) -> Animal {
        Animal::new(Species::Carnivore, age, weight, &Parameters::default())
    }

    #[test]
    fn test_animal_creation() {
        let animal = herbivore(10, 8.0);
        assert_eq!(animal.age(), 10);
        assert_eq!(animal.weight(), 8.0);
        assert!(animal.fitness() > 0.0 && animal.fitness() < 1.0);
        assert!(!animal.has_moved());
    }

    #[test]
    fn test_newborn() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let weights: Vec<f64> = (0..200)
            .map(|_| Animal::newborn(Species::Carnivore, &params, &mut rng))
            .inspect(|baby| assert_eq!(baby.age(), 0))
            .map(|baby| baby.weight())
            .collect();
        let mean = weights.iter().sum::<f64>() / weights.len() as f64;
        assert!((mean - 6.0).abs() < 0.5);
    }

    #[test]
    fn test_zero_weight_means_zero_fitness() {
        let animal = herbivore(3, 0.0);
        assert_eq!(animal.fitness(), 0.0);
        let animal = carnivore(3, -1.0);
        assert_eq!(animal.fitness(), 0.0);
    }

    #[test]
    fn test_feed_full_appetite() {
        let params = Parameters::default();
        let mut animal = herbivore(0, 2.0);
        let eaten = animal.feed(500.0, &params);
        assert_eq!(eaten, 10.0);
        assert!((animal.weight() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_feed_limited_fodder() {
        let params = Parameters::default();
        let mut animal = herbivore(0, 2.0);
        let eaten = animal.feed(2.0, &params);
        assert_eq!(eaten, 2.0);
        assert!((animal.weight() - 3.8).abs() < 1e-12);
    }

    #[test]
    fn test_feed_updates_fitness() {
        let params = Parameters::default();
        let mut animal = herbivore(5, 5.0);
        let before = animal.fitness();
        animal.feed(10.0, &params);
        assert!(animal.fitness() > before);

        let mut starving = herbivore(5, 5.0);
        assert_eq!(starving.feed(0.0, &params), 0.0);
        assert_eq!(starving.weight(), 5.0);
    }

    #[test]
    fn test_kill_certain_when_difference_exceeds_threshold() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut hunter = carnivore(5, 20.0);
        let mut prey = herbivore(5, 10.0);
        prey.set_fitness(0.5);
        hunter.set_fitness(11.0);

        let weight_before = hunter.weight();
        let killed = hunter.kill(&[prey], &params, &mut rng);

        assert_eq!(killed, vec![0]);
        assert!(hunter.weight() > weight_before);
        assert!(hunter.fitness() > 0.0 && hunter.fitness() < 1.0);
    }

    #[test]
    fn test_kill_impossible_against_fitter_prey() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut hunter = carnivore(5, 20.0);
        hunter.set_fitness(0.2);
        let mut prey = herbivore(5, 10.0);
        prey.set_fitness(0.9);

        let killed = hunter.kill(&[prey.clone(), prey], &params, &mut rng);
        assert!(killed.is_empty());
        assert_eq!(hunter.weight(), 20.0);
    }

    #[test]
    fn test_kill_stops_when_full() {
        let mut params = Parameters::default();
        params.carnivore.delta_phi_max = Some(0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut hunter = carnivore(5, 20.0);
        let prey: Vec<Animal> = (0..10)
            .map(|_| {
                let mut h = herbivore(5, 30.0);
                h.set_fitness(0.0);
                h
            })
            .collect();

        // A fit carnivore against zero-fitness prey with a small threshold
        // kills on every attempt, so appetite is the only limit.
        let killed = hunter.kill(&prey, &params, &mut rng);
        assert_eq!(killed, vec![0, 1]);
        let eaten: f64 = killed.iter().map(|&i| prey[i].weight()).sum();
        assert!(eaten >= params.carnivore.f);
        assert!(eaten < params.carnivore.f + 30.0);
    }

    #[test]
    fn test_herbivore_never_kills() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut grazer = herbivore(5, 50.0);
        let mut prey = herbivore(5, 5.0);
        prey.set_fitness(0.0);
        assert!(grazer.kill(&[prey], &params, &mut rng).is_empty());
    }

    #[test]
    fn test_no_birth_below_threshold() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut animal = herbivore(5, 3.0);
        assert!(params.herbivore.birth_threshold() > 3.0);
        assert!(animal.gives_birth(2, &params, &mut rng).is_none());
        assert_eq!(animal.weight(), 3.0);
    }

    #[test]
    fn test_no_birth_when_alone() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut animal = herbivore(5, 80.0);
        for _ in 0..100 {
            assert!(animal.gives_birth(1, &params, &mut rng).is_none());
        }
    }

    #[test]
    fn test_birth_reduces_mother_weight() {
        let mut params = Parameters::default();
        params.herbivore.gamma = 100.0;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut mother = herbivore(5, 80.0);

        let baby = mother
            .gives_birth(10, &params, &mut rng)
            .expect("birth is certain");
        assert_eq!(baby.species(), Species::Herbivore);
        assert_eq!(baby.age(), 0);
        let expected = 80.0 - params.herbivore.xi * baby.weight();
        assert!((mother.weight() - expected).abs() < 1e-9);
        assert_eq!(
            mother.fitness(),
            fitness(mother.age(), mother.weight(), &params.herbivore)
        );
    }

    #[test]
    fn test_stillbirth_produces_nothing() {
        let mut params = Parameters::default();
        params.herbivore.gamma = 100.0;
        params.herbivore.w_birth = -5.0;
        params.herbivore.sigma_birth = 0.0;
        params.herbivore.zeta = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut mother = herbivore(5, 40.0);

        for _ in 0..20 {
            assert!(mother.gives_birth(10, &params, &mut rng).is_none());
        }
        assert_eq!(mother.weight(), 40.0);
    }

    #[test]
    fn test_birth_cost_always_charged() {
        let mut params = Parameters::default();
        params.herbivore.gamma = 100.0;
        params.herbivore.zeta = 0.0;
        params.herbivore.sigma_birth = 0.0;
        params.herbivore.xi = 2.0;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut mother = herbivore(5, 10.0);

        let baby = mother
            .gives_birth(10, &params, &mut rng)
            .expect("birth is certain");
        assert_eq!(baby.weight(), 8.0);
        assert_eq!(mother.weight(), -6.0);
        assert_eq!(mother.fitness(), 0.0);
    }

    #[test]
    fn test_aging_and_weight_loss() {
        let params = Parameters::default();
        let mut animal = carnivore(4, 16.0);
        animal.age_one_year(&params);
        assert_eq!(animal.age(), 5);
        animal.lose_weight(&params);
        assert!((animal.weight() - 14.0).abs() < 1e-12);
        assert_eq!(animal.fitness(), fitness(5, 14.0, &params.carnivore));
    }

    #[test]
    fn test_zero_fitness_always_dies() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let animal = herbivore(1, 0.0);
        for _ in 0..50 {
            assert!(animal.dies(&params, &mut rng));
        }
    }

    #[test]
    fn test_death_rate_matches_probability() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let animal = herbivore(10, 20.0);
        let expected = params.herbivore.omega * (1.0 - animal.fitness());
        let trials = 20_000;
        let deaths = (0..trials).filter(|_| animal.dies(&params, &mut rng)).count();
        let rate = deaths as f64 / trials as f64;
        assert!((rate - expected).abs() < 0.02);
    }

    #[test]
    fn test_migration_only_once() {
        let mut params = Parameters::default();
        params.herbivore.mu = 100.0;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut animal = herbivore(5, 30.0);
        let neighbours = [Some(1.0), Some(1.0), None, Some(2.0)];

        let first = animal.migrate(&neighbours, &params, &mut rng);
        assert!(matches!(first, Some(0 | 1 | 3)));
        assert!(animal.has_moved());
        assert_eq!(animal.migrate(&neighbours, &params, &mut rng), None);

        animal.reset_migration();
        assert!(animal.migrate(&neighbours, &params, &mut rng).is_some());
    }

    #[test]
    fn test_migration_flag_set_even_when_staying() {
        let params = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut animal = herbivore(5, 0.0);
        assert_eq!(animal.migrate(&[Some(5.0)], &params, &mut rng), None);
        assert!(animal.has_moved());
    }

    #[test]
    fn test_migration_never_targets_closed_cells() {
        let mut params = Parameters::default();
        params.carnivore.mu = 100.0;
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..200 {
            let mut animal = carnivore(5, 30.0);
            let choice = animal.migrate(&[None, Some(0.0), Some(3.0), None], &params, &mut rng);
            assert_eq!(choice, Some(2));
        }

        let mut animal = carnivore(5, 30.0);
        assert_eq!(animal.migrate(&[None, None, Some(0.0)], &params, &mut rng), None);
    }

    #[test]
    fn test_migration_ignores_negative_abundance() {
        let mut params = Parameters::default();
        params.carnivore.mu = 100.0;
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..100 {
            let mut animal = carnivore(5, 30.0);
            let choice = animal.migrate(&[Some(-2.0), Some(1.5), None], &params, &mut rng);
            assert_eq!(choice, Some(1));
        }

        let mut animal = carnivore(5, 30.0);
        assert_eq!(animal.migrate(&[Some(-1.0), None], &params, &mut rng), None);
    }
}
