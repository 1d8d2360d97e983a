//! Island ecosystem simulation engine.
//!
//! Herbivores and carnivores live on a grid of landscape cells and go through
//! one annual cycle per simulated year: fodder growth, feeding, procreation,
//! migration, aging, weight loss and death.

pub mod animal;
pub mod cell;
pub mod grid;
pub mod island;
pub mod simulation;

pub use animal::Animal;
pub use cell::Cell;
pub use grid::Grid;
pub use island::{AnimalRecord, Island, PopulationRecord};
pub use simulation::{Simulation, SimulationSummary};
