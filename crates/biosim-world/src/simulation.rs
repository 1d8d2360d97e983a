//! Simulation façade: configuration, run control and queries.

use crate::island::{Island, PopulationRecord};
use biosim_core::{
    CellCount, CycleStats, Landscape, Location, Parameters, Result, SimulationConfig, Species,
    SpeciesCounts, YearRecord,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Years between periodic population log lines
const LOG_INTERVAL: u32 = 100;

pub struct Simulation {
    island: Island,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    year: u32,
    history: Vec<YearRecord>,
    totals: CycleStats,
}

impl Simulation {
    /// Build an island from `island_map`, place `ini_pop` and seed the
    /// random number generator with `seed`.
    pub fn new(island_map: &str, ini_pop: &[PopulationRecord], seed: u64) -> Result<Self> {
        Self::with_config(
            island_map,
            ini_pop,
            SimulationConfig {
                seed,
                ..Default::default()
            },
        )
    }

    pub fn with_config(
        island_map: &str,
        ini_pop: &[PopulationRecord],
        config: SimulationConfig,
    ) -> Result<Self> {
        config.parameters.validate()?;

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut island = Island::from_map(island_map, &config.parameters)?;
        island.add_population(ini_pop, &config.parameters)?;

        let mut sim = Self {
            island,
            config,
            rng,
            year: 0,
            history: Vec::new(),
            totals: CycleStats::new(),
        };
        sim.record_year();

        Ok(sim)
    }

    /// Override parameters of the named species (`"Herbivore"` or `"Carnivore"`).
    /// Affects every animal of that species from now on.
    pub fn set_species_parameters(&mut self, species: &str, params: &Value) -> Result<()> {
        let species: Species = species.parse()?;
        self.config.parameters.set_species_parameters(species, params)?;
        self.island.refresh_fitness(&self.config.parameters);
        Ok(())
    }

    /// Override fodder parameters of a landscape, by letter (`"J"`) or name (`"Savannah"`)
    pub fn set_landscape_parameters(&mut self, landscape: &str, params: &Value) -> Result<()> {
        let landscape: Landscape = landscape.parse()?;
        self.config.parameters.set_landscape_parameters(landscape, params)
    }

    pub fn add_population(&mut self, population: &[PopulationRecord]) -> Result<()> {
        self.island.add_population(population, &self.config.parameters)?;
        self.refresh_current_year();
        Ok(())
    }

    pub fn add_population_json(&mut self, population: &Value) -> Result<()> {
        self.island.add_population_json(population, &self.config.parameters)?;
        self.refresh_current_year();
        Ok(())
    }

    /// Advance the simulation by exactly `num_years` annual cycles
    #[instrument(skip(self), fields(start_year = self.year))]
    pub fn run(&mut self, num_years: u32) -> CycleStats {
        info!(
            num_years,
            animals = self.island.num_animals(),
            "Starting simulation"
        );

        let mut run_stats = CycleStats::new();
        for _ in 0..num_years {
            let stats = self.step();
            run_stats += stats;

            if self.year % LOG_INTERVAL == 0 {
                let counts = self.num_animals_per_species();
                info!(
                    year = self.year,
                    herbivores = counts.herbivores,
                    carnivores = counts.carnivores,
                    "Population snapshot"
                );
            }
        }

        let counts = self.num_animals_per_species();
        info!(
            year = self.year,
            herbivores = counts.herbivores,
            carnivores = counts.carnivores,
            births = run_stats.births.total(),
            deaths = run_stats.deaths.total(),
            kills = run_stats.kills,
            "Simulation finished"
        );

        run_stats
    }

    /// Run a single annual cycle
    pub fn step(&mut self) -> CycleStats {
        let stats = self
            .island
            .annual_cycle(&self.config.parameters, &mut self.rng);
        self.year += 1;
        self.record_year();

        debug!(
            year = self.year,
            fodder_eaten = stats.fodder_eaten,
            kills = stats.kills,
            births = stats.births.total(),
            migrations = stats.migrations,
            deaths = stats.deaths.total(),
            "Annual cycle complete"
        );

        self.totals += stats.clone();
        stats
    }

    fn record_year(&mut self) {
        let counts = self.island.species_counts();
        self.history.push(YearRecord {
            year: self.year,
            herbivores: counts.herbivores,
            carnivores: counts.carnivores,
        });
    }

    /// Keep the latest history entry in line with animals added between runs
    fn refresh_current_year(&mut self) {
        self.history.pop();
        self.record_year();
    }

    /// Last year simulated
    pub fn year(&self) -> u32 {
        self.year
    }

    /// Total number of animals on the island
    pub fn num_animals(&self) -> usize {
        self.island.num_animals()
    }

    pub fn num_animals_per_species(&self) -> SpeciesCounts {
        self.island.species_counts()
    }

    /// Animal count per species for every cell
    pub fn animal_distribution(&self) -> Vec<CellCount> {
        self.island.distribution()
    }

    /// Species counts at the end of every year, year 0 being the initial state
    pub fn history(&self) -> &[YearRecord] {
        &self.history
    }

    /// Accumulated cycle statistics since the simulation was created
    pub fn totals(&self) -> &CycleStats {
        &self.totals
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn parameters(&self) -> &Parameters {
        &self.config.parameters
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            year: self.year,
            counts: self.num_animals_per_species(),
            totals: self.totals.clone(),
            history: self.history.clone(),
        }
    }

    /// Species counts of the cell at `location`, if it exists
    pub fn cell_counts(&self, location: Location) -> Option<SpeciesCounts> {
        self.island.cell(location).map(|cell| cell.species_counts())
    }
}

/// Serializable snapshot of the simulation's results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub year: u32,
    pub counts: SpeciesCounts,
    pub totals: CycleStats,
    pub history: Vec<YearRecord>,
}
