//! A single map cell and the per-cell phases of the annual cycle.

use crate::animal::Animal;
use biosim_core::{Landscape, Location, Parameters, Species, SpeciesCounts};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::trace;

/// Food abundance a neighbouring cell offers each species, as seen by a
/// migrating animal. `None` means the cell cannot be entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborFodder {
    pub herbivore: Option<f64>,
    pub carnivore: Option<f64>,
}

impl NeighborFodder {
    pub fn of(cell: &Cell, params: &Parameters) -> Self {
        Self {
            herbivore: cell.relative_fodder(Species::Herbivore, params),
            carnivore: cell.relative_fodder(Species::Carnivore, params),
        }
    }

    pub fn for_species(&self, species: Species) -> Option<f64> {
        match species {
            Species::Herbivore => self.herbivore,
            Species::Carnivore => self.carnivore,
        }
    }
}

/// Outcome of the feeding phase in one cell
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedingOutcome {
    pub fodder_eaten: f64,
    pub kills: usize,
}

/// One tile of the island
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    landscape: Landscape,
    location: Location,
    fodder: f64,
    population: Vec<Animal>,
    /// Animals born this year, joining the population once the year is over
    newborns: Vec<Animal>,
    /// Grid indices of the adjacent cells, in up/left/down/right order
    neighbors: Vec<usize>,
}

fn by_fitness_descending(a: &Animal, b: &Animal) -> Ordering {
    b.fitness().total_cmp(&a.fitness())
}

impl Cell {
    /// A cell with no animals. Vegetated landscapes start at full fodder.
    pub fn new(landscape: Landscape, location: Location, params: &Parameters) -> Self {
        Self {
            landscape,
            location,
            fodder: params.f_max(landscape),
            population: Vec::new(),
            newborns: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    pub fn landscape(&self) -> Landscape {
        self.landscape
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn fodder(&self) -> f64 {
        self.fodder
    }

    pub fn population(&self) -> &[Animal] {
        &self.population
    }

    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<usize>) {
        self.neighbors = neighbors;
    }

    /// Place an animal here. Callers check that the landscape is traversable.
    pub(crate) fn add_animal(&mut self, animal: Animal) {
        debug_assert!(self.landscape.is_traversable());
        self.population.push(animal);
    }

    pub fn count(&self, species: Species) -> usize {
        self.population
            .iter()
            .filter(|animal| animal.species() == species)
            .count()
    }

    pub fn herbivore_count(&self) -> usize {
        self.count(Species::Herbivore)
    }

    pub fn carnivore_count(&self) -> usize {
        self.count(Species::Carnivore)
    }

    pub fn species_counts(&self) -> SpeciesCounts {
        let mut counts = SpeciesCounts::default();
        for animal in &self.population {
            counts.record(animal.species());
        }
        counts
    }

    /// Total weight of the herbivores in this cell
    pub fn herbivore_biomass(&self) -> f64 {
        self.population
            .iter()
            .filter(|animal| animal.is_herbivore())
            .map(Animal::weight)
            .sum()
    }

    /// Relative abundance of food for `species`, or `None` if the cell
    /// cannot be entered.
    ///
    /// Food (plant fodder for herbivores, herbivore biomass for carnivores)
    /// is divided by the appetite of the animals that would share it.
    pub fn relative_fodder(&self, species: Species, params: &Parameters) -> Option<f64> {
        if !self.landscape.is_traversable() {
            return None;
        }

        let food = match species {
            Species::Herbivore => self.fodder,
            Species::Carnivore => self.herbivore_biomass(),
        };
        let competitors = self.count(species) as f64 + 1.0;
        Some(food / (competitors * params.species(species).f))
    }

    pub fn grow_fodder(&mut self, params: &Parameters) {
        match (self.landscape, params.landscape(self.landscape)) {
            (Landscape::Jungle, Some(jungle)) => self.fodder = jungle.f_max,
            (Landscape::Savannah, Some(savannah)) => {
                let grown = self.fodder + savannah.alpha * (savannah.f_max - self.fodder);
                self.fodder = grown.clamp(0.0, savannah.f_max);
            }
            _ => {}
        }
    }

    /// Herbivores graze, fittest first, then carnivores hunt, fittest first.
    /// Prey are attempted in the order ranked before grazing.
    pub fn feeding(&mut self, params: &Parameters, rng: &mut ChaCha8Rng) -> FeedingOutcome {
        if self.population.is_empty() {
            return FeedingOutcome::default();
        }

        let (mut herbivores, mut carnivores): (Vec<Animal>, Vec<Animal>) =
            self.population.drain(..).partition(Animal::is_herbivore);
        herbivores.sort_by(by_fitness_descending);
        carnivores.sort_by(by_fitness_descending);

        let mut outcome = FeedingOutcome::default();
        for herbivore in &mut herbivores {
            if self.fodder <= 0.0 {
                break;
            }
            let eaten = herbivore.feed(self.fodder, params);
            self.fodder = (self.fodder - eaten).max(0.0);
            outcome.fodder_eaten += eaten;
        }

        for carnivore in &mut carnivores {
            if herbivores.is_empty() {
                break;
            }
            let killed = carnivore.kill(&herbivores, params, rng);
            outcome.kills += killed.len();

            let mut index = 0;
            herbivores.retain(|_| {
                let keep = !killed.contains(&index);
                index += 1;
                keep
            });
        }

        self.population = herbivores;
        self.population.append(&mut carnivores);

        trace!(
            location = %self.location,
            fodder_eaten = outcome.fodder_eaten,
            kills = outcome.kills,
            "Feeding done"
        );
        outcome
    }

    /// Every animal may give birth once. Newborns wait in the nursery until
    /// [`Cell::settle_newborns`] is called.
    pub fn procreation(&mut self, params: &Parameters, rng: &mut ChaCha8Rng) -> SpeciesCounts {
        let counts = self.species_counts();
        let mut births = SpeciesCounts::default();

        for animal in &mut self.population {
            let same_species = counts.get(animal.species());
            if let Some(newborn) = animal.gives_birth(same_species, params, rng) {
                births.record(newborn.species());
                self.newborns.push(newborn);
            }
        }

        births
    }

    /// Every animal that has not moved this year considers moving to a
    /// neighbour. `neighbor_fodder` lines up with [`Cell::neighbors`].
    ///
    /// Emigrants are removed from this cell and returned together with the
    /// grid index of their destination.
    pub fn migration(
        &mut self,
        neighbor_fodder: &[NeighborFodder],
        params: &Parameters,
        rng: &mut ChaCha8Rng,
    ) -> Vec<(Animal, usize)> {
        if self.population.is_empty() {
            return Vec::new();
        }

        let by_species = |species: Species| -> Vec<Option<f64>> {
            neighbor_fodder
                .iter()
                .map(|fodder| fodder.for_species(species))
                .collect()
        };
        let herbivore_view = by_species(Species::Herbivore);
        let carnivore_view = by_species(Species::Carnivore);

        let mut destinations = Vec::with_capacity(self.population.len());
        for animal in &mut self.population {
            let view = match animal.species() {
                Species::Herbivore => &herbivore_view,
                Species::Carnivore => &carnivore_view,
            };
            let choice = animal
                .migrate(view, params, rng)
                .and_then(|slot| self.neighbors.get(slot).copied());
            destinations.push(choice);
        }

        let mut emigrants = Vec::new();
        let mut stayers = Vec::with_capacity(self.population.len());
        for (animal, destination) in self.population.drain(..).zip(destinations) {
            match destination {
                Some(target) => emigrants.push((animal, target)),
                None => stayers.push(animal),
            }
        }
        self.population = stayers;

        emigrants
    }

    /// Recompute every resident's fitness, e.g. after a parameter change
    pub fn refresh_fitness(&mut self, params: &Parameters) {
        for animal in self.population.iter_mut().chain(self.newborns.iter_mut()) {
            animal.update_fitness(params);
        }
    }

    pub fn reset_migration(&mut self) {
        for animal in &mut self.population {
            animal.reset_migration();
        }
    }

    pub fn aging(&mut self, params: &Parameters) {
        for animal in &mut self.population {
            animal.age_one_year(params);
        }
    }

    pub fn loss_of_weight(&mut self, params: &Parameters) {
        for animal in &mut self.population {
            animal.lose_weight(params);
        }
    }

    /// Remove the animals that die this year. Each animal is checked exactly once.
    pub fn deaths(&mut self, params: &Parameters, rng: &mut ChaCha8Rng) -> SpeciesCounts {
        let mut dead = SpeciesCounts::default();
        self.population.retain(|animal| {
            let dies = animal.dies(params, rng);
            if dies {
                dead.record(animal.species());
            }
            !dies
        });
        dead
    }

    /// Move this year's newborns into the population
    pub fn settle_newborns(&mut self) {
        self.population.append(&mut self.newborns);
    }
}
