//! Population counts and per-year cycle statistics.

use crate::{Landscape, Location, Species};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Number of animals of each species
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCounts {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl SpeciesCounts {
    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }

    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    pub fn record(&mut self, species: Species) {
        match species {
            Species::Herbivore => self.herbivores += 1,
            Species::Carnivore => self.carnivores += 1,
        }
    }
}

impl AddAssign for SpeciesCounts {
    fn add_assign(&mut self, other: Self) {
        self.herbivores += other.herbivores;
        self.carnivores += other.carnivores;
    }
}

/// One row of the spatial distribution table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellCount {
    pub location: Location,
    pub landscape: Landscape,
    pub fodder: f64,
    pub herbivores: usize,
    pub carnivores: usize,
}

/// Population counts at the end of a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: u32,
    pub herbivores: usize,
    pub carnivores: usize,
}

/// What happened during one annual cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    /// Fodder consumed by herbivores
    pub fodder_eaten: f64,
    /// Herbivores killed by carnivores
    pub kills: usize,
    /// Newborns, per species
    pub births: SpeciesCounts,
    /// Animals that moved to a neighbouring cell
    pub migrations: usize,
    /// Animals that died of age, starvation or chance
    pub deaths: SpeciesCounts,
}

impl CycleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net change of the island population during the cycle
    pub fn net_change(&self) -> i64 {
        self.births.total() as i64 - self.deaths.total() as i64 - self.kills as i64
    }
}

impl AddAssign for CycleStats {
    fn add_assign(&mut self, other: Self) {
        self.fodder_eaten += other.fodder_eaten;
        self.kills += other.kills;
        self.births += other.births;
        self.migrations += other.migrations;
        self.deaths += other.deaths;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_counts() {
        let mut counts = SpeciesCounts::default();
        counts.record(Species::Herbivore);
        counts.record(Species::Herbivore);
        counts.record(Species::Carnivore);
        assert_eq!(counts.get(Species::Herbivore), 2);
        assert_eq!(counts.get(Species::Carnivore), 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_cycle_stats_accumulate() {
        let mut total = CycleStats::new();
        let year = CycleStats {
            fodder_eaten: 12.5,
            kills: 2,
            births: SpeciesCounts {
                herbivores: 4,
                carnivores: 1,
            },
            migrations: 3,
            deaths: SpeciesCounts {
                herbivores: 1,
                carnivores: 0,
            },
        };
        total += year.clone();
        total += year;
        assert_eq!(total.kills, 4);
        assert_eq!(total.births.total(), 10);
        assert_eq!(total.net_change(), 10 - 2 - 4);
    }
}
