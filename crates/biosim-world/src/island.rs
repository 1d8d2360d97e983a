//! The island: grid-wide orchestration of the annual cycle.

use crate::animal::Animal;
use crate::cell::{Cell, NeighborFodder};
use crate::grid::Grid;
use biosim_core::{
    CellCount, CycleStats, Error, Location, Parameters, Result, Species, SpeciesCounts,
};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, trace};

/// One animal in a population record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalRecord {
    pub species: Species,
    pub age: u32,
    pub weight: f64,
}

/// Animals to place in the cell at `loc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopulationRecord {
    pub loc: Location,
    pub pop: Vec<AnimalRecord>,
}

impl PopulationRecord {
    pub fn new(loc: Location, pop: Vec<AnimalRecord>) -> Self {
        Self { loc, pop }
    }

    /// Parse a JSON list of `{"loc": [row, col], "pop": [...]}` records
    pub fn list_from_json(value: &Value) -> Result<Vec<Self>> {
        Vec::<Self>::deserialize(value).map_err(|err| {
            Error::InvalidPopulation(format!("malformed population records: {}", err))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Island {
    grid: Grid,
}

impl Island {
    /// Build the island from a map of landscape letters
    pub fn from_map(map: &str, params: &Parameters) -> Result<Self> {
        let grid = Grid::from_map(map, params)?;
        debug!(
            height = grid.height,
            width = grid.width,
            "Island constructed"
        );
        Ok(Self { grid })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, location: Location) -> Option<&Cell> {
        self.grid.get(location)
    }

    /// Place the animals described by `records`.
    ///
    /// The whole batch is checked first, so either every animal is placed or
    /// none is. Locations must be inside the map and habitable, ages and
    /// weights must describe a living animal.
    pub fn add_population(&mut self, records: &[PopulationRecord], params: &Parameters) -> Result<()> {
        for record in records {
            let cell = self.grid.get(record.loc).ok_or_else(|| {
                Error::InvalidPopulation(format!("location {} is outside the island", record.loc))
            })?;
            if !cell.landscape().is_traversable() {
                return Err(Error::InvalidPopulation(format!(
                    "location {} is {}, animals cannot live there",
                    record.loc,
                    cell.landscape()
                )));
            }
            if let Some(animal) = record
                .pop
                .iter()
                .find(|animal| !(animal.weight.is_finite() && animal.weight > 0.0))
            {
                return Err(Error::InvalidPopulation(format!(
                    "{} at {} has invalid weight {}",
                    animal.species, record.loc, animal.weight
                )));
            }
        }

        let mut added = SpeciesCounts::default();
        for record in records {
            if let Some(cell) = self.grid.get_mut(record.loc) {
                for animal in &record.pop {
                    cell.add_animal(Animal::new(animal.species, animal.age, animal.weight, params));
                    added.record(animal.species);
                }
            }
        }

        debug!(
            herbivores = added.herbivores,
            carnivores = added.carnivores,
            "Population added"
        );
        Ok(())
    }

    /// JSON variant of [`Island::add_population`]
    pub fn add_population_json(&mut self, records: &Value, params: &Parameters) -> Result<()> {
        let records = PopulationRecord::list_from_json(records)?;
        self.add_population(&records, params)
    }

    /// Every animal on the island, cell by cell in row-major order
    pub fn total_population(&self) -> Vec<&Animal> {
        self.grid.iter().flat_map(|cell| cell.population()).collect()
    }

    pub fn num_animals(&self) -> usize {
        self.grid.iter().map(|cell| cell.population().len()).sum()
    }

    pub fn species_counts(&self) -> SpeciesCounts {
        let mut counts = SpeciesCounts::default();
        for cell in self.grid.iter() {
            counts += cell.species_counts();
        }
        counts
    }

    /// Per-cell species counts, row-major
    pub fn distribution(&self) -> Vec<CellCount> {
        self.grid
            .iter()
            .map(|cell| {
                let counts = cell.species_counts();
                CellCount {
                    location: cell.location(),
                    landscape: cell.landscape(),
                    fodder: cell.fodder(),
                    herbivores: counts.herbivores,
                    carnivores: counts.carnivores,
                }
            })
            .collect()
    }

    /// Bring every cached fitness in line with `params`
    pub fn refresh_fitness(&mut self, params: &Parameters) {
        for cell in self.grid.iter_mut() {
            cell.refresh_fitness(params);
        }
    }

    pub fn fodder_growth(&mut self, params: &Parameters) {
        for cell in self.grid.iter_mut() {
            cell.grow_fodder(params);
        }
    }

    pub fn feeding(&mut self, params: &Parameters, rng: &mut ChaCha8Rng, stats: &mut CycleStats) {
        for cell in self.grid.iter_mut() {
            let outcome = cell.feeding(params, rng);
            stats.fodder_eaten += outcome.fodder_eaten;
            stats.kills += outcome.kills;
        }
    }

    pub fn procreation(&mut self, params: &Parameters, rng: &mut ChaCha8Rng, stats: &mut CycleStats) {
        for cell in self.grid.iter_mut() {
            stats.births += cell.procreation(params, rng);
        }
    }

    /// Migration sweeps the grid row-major. Each cell sees its neighbours as
    /// they are when its turn comes, arrivals from earlier cells included.
    /// Movement flags are cleared only after the whole sweep.
    pub fn migration(&mut self, params: &Parameters, rng: &mut ChaCha8Rng, stats: &mut CycleStats) {
        for index in 0..self.grid.len() {
            if self.grid.cell(index).population().is_empty() {
                continue;
            }

            let neighbor_fodder: Vec<NeighborFodder> = self
                .grid
                .cell(index)
                .neighbors()
                .iter()
                .map(|&neighbor| NeighborFodder::of(self.grid.cell(neighbor), params))
                .collect();

            let emigrants = self.grid.cell_mut(index).migration(&neighbor_fodder, params, rng);
            if !emigrants.is_empty() {
                trace!(
                    location = %self.grid.index_to_location(index),
                    emigrants = emigrants.len(),
                    "Animals migrated"
                );
            }
            stats.migrations += emigrants.len();
            for (animal, destination) in emigrants {
                self.grid.cell_mut(destination).add_animal(animal);
            }
        }

        for cell in self.grid.iter_mut() {
            cell.reset_migration();
        }
    }

    pub fn aging(&mut self, params: &Parameters) {
        for cell in self.grid.iter_mut() {
            cell.aging(params);
        }
    }

    pub fn loss_of_weight(&mut self, params: &Parameters) {
        for cell in self.grid.iter_mut() {
            cell.loss_of_weight(params);
        }
    }

    pub fn deaths(&mut self, params: &Parameters, rng: &mut ChaCha8Rng, stats: &mut CycleStats) {
        for cell in self.grid.iter_mut() {
            stats.deaths += cell.deaths(params, rng);
        }
    }

    fn settle_newborns(&mut self) {
        for cell in self.grid.iter_mut() {
            cell.settle_newborns();
        }
    }

    /// Run one year. Each phase completes over the whole grid before the
    /// next one starts; newborns join the population once the year is over.
    #[instrument(skip_all)]
    pub fn annual_cycle(&mut self, params: &Parameters, rng: &mut ChaCha8Rng) -> CycleStats {
        let mut stats = CycleStats::new();

        self.fodder_growth(params);
        self.feeding(params, rng, &mut stats);
        self.procreation(params, rng, &mut stats);
        self.migration(params, rng, &mut stats);
        self.aging(params);
        self.loss_of_weight(params);
        self.deaths(params, rng, &mut stats);
        self.settle_newborns();

        stats
    }
}
