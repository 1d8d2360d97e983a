//! Fitness and predation probability.

use crate::SpeciesParams;

/// Fitness of an animal with the given age and weight, in `[0, 1]`.
///
/// The product of a falling logistic in age and a rising logistic in weight.
/// Animals with no weight left have fitness exactly zero.
pub fn fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }

    let age_factor = 1.0 / (1.0 + (params.phi_age * (age as f64 - params.a_half)).exp());
    let weight_factor = 1.0 / (1.0 + (-params.phi_weight * (weight - params.w_half)).exp());

    (age_factor * weight_factor).clamp(0.0, 1.0)
}

/// Probability that a predator with `predator_fitness` kills a prey with `prey_fitness`
pub fn kill_probability(predator_fitness: f64, prey_fitness: f64, delta_phi_max: f64) -> f64 {
    let difference = predator_fitness - prey_fitness;
    if difference <= 0.0 {
        0.0
    } else if difference <= delta_phi_max {
        difference / delta_phi_max
    } else {
        1.0
    }
}

/// Probability of giving birth with `same_species` animals in the cell, the mother included
pub fn birth_probability(fitness: f64, same_species: usize, params: &SpeciesParams) -> f64 {
    let others = same_species.saturating_sub(1) as f64;
    (params.gamma * fitness * others).min(1.0)
}

/// Probability of dying this year
pub fn death_probability(fitness: f64, params: &SpeciesParams) -> f64 {
    if fitness <= 0.0 {
        1.0
    } else {
        (params.omega * (1.0 - fitness)).clamp(0.0, 1.0)
    }
}
