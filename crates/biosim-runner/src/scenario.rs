//! Scenario files describing a simulation run.

use anyhow::{Context, Result};
use biosim_core::Location;
use biosim_world::{AnimalRecord, PopulationRecord, Simulation};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Scenario bundled with the binary
pub const DEFAULT_SCENARIO: &str = include_str!("../scenarios/default.json");

/// Animals placed in one cell, `pop` repeated `repeat` times
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Placement {
    pub loc: Location,
    pub pop: Vec<AnimalRecord>,
    #[serde(default = "one")]
    pub repeat: usize,
}

fn one() -> usize {
    1
}

impl Placement {
    fn to_record(&self) -> PopulationRecord {
        let pop = (0..self.repeat)
            .flat_map(|_| self.pop.iter().cloned())
            .collect();
        PopulationRecord::new(self.loc, pop)
    }
}

/// Animals added once the simulation has reached `year`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Addition {
    pub year: u32,
    pub population: Vec<Placement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub island_map: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_years")]
    pub years: u32,
    #[serde(default)]
    pub ini_pop: Vec<Placement>,
    #[serde(default)]
    pub additions: Vec<Addition>,
    /// Overrides keyed by species name
    #[serde(default)]
    pub species_parameters: BTreeMap<String, Value>,
    /// Overrides keyed by landscape letter or name
    #[serde(default)]
    pub landscape_parameters: BTreeMap<String, Value>,
}

fn default_years() -> u32 {
    100
}

fn records(placements: &[Placement]) -> Vec<PopulationRecord> {
    placements.iter().map(Placement::to_record).collect()
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    /// Build the simulation with all parameter overrides applied
    pub fn build(&self, seed: Option<u64>) -> Result<Simulation> {
        let seed = seed.unwrap_or(self.seed);
        let mut sim = Simulation::new(&self.island_map, &records(&self.ini_pop), seed)
            .context("Failed to build island")?;

        for (species, overrides) in &self.species_parameters {
            sim.set_species_parameters(species, overrides)
                .with_context(|| format!("Bad parameters for species {}", species))?;
        }
        for (landscape, overrides) in &self.landscape_parameters {
            sim.set_landscape_parameters(landscape, overrides)
                .with_context(|| format!("Bad parameters for landscape {}", landscape))?;
        }

        info!(
            seed,
            animals = sim.num_animals(),
            "Scenario loaded"
        );
        Ok(sim)
    }

    /// Run until `years` have passed, injecting additions on schedule
    pub fn run(&self, sim: &mut Simulation, years: u32) -> Result<()> {
        let end = sim.year() + years;
        let mut additions: Vec<&Addition> = self
            .additions
            .iter()
            .filter(|addition| addition.year >= sim.year() && addition.year < end)
            .collect();
        additions.sort_by_key(|addition| addition.year);

        for addition in additions {
            sim.run(addition.year - sim.year());
            sim.add_population(&records(&addition.population))
                .with_context(|| format!("Failed to add population in year {}", addition.year))?;
            info!(
                year = addition.year,
                animals = sim.num_animals(),
                "Population added"
            );
        }

        sim.run(end - sim.year());
        Ok(())
    }
}
