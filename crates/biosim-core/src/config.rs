//! Configuration types for the simulation.

use crate::{Error, Landscape, Result, Species};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Per-species constants shared by every animal of that species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciesParams {
    /// Mean birth weight
    pub w_birth: f64,
    /// Standard deviation of the birth weight
    pub sigma_birth: f64,
    /// Weight gained per unit of food eaten
    pub beta: f64,
    /// Fraction of weight lost every year
    pub eta: f64,
    /// Age at which the age factor of fitness is one half
    pub a_half: f64,
    /// Steepness of the age factor
    pub phi_age: f64,
    /// Weight at which the weight factor of fitness is one half
    pub w_half: f64,
    /// Steepness of the weight factor
    pub phi_weight: f64,
    /// Migration propensity, scaled by fitness
    pub mu: f64,
    /// Sensitivity to neighbouring food abundance when migrating
    pub lambda: f64,
    /// Birth probability coefficient
    pub gamma: f64,
    /// Minimum weight for giving birth, in units of `w_birth + sigma_birth`
    pub zeta: f64,
    /// Weight lost by the mother per unit of newborn weight
    pub xi: f64,
    /// Death probability coefficient
    pub omega: f64,
    /// Appetite: food wanted per year
    #[serde(rename = "F")]
    pub f: f64,
    /// Fitness difference above which a kill always succeeds (carnivores only)
    #[serde(rename = "DeltaPhiMax")]
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.2,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            lambda: 1.0,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            f: 10.0,
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 60.0,
            phi_age: 0.4,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            lambda: 1.0,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.9,
            f: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    pub fn for_species(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    /// Weight an animal needs before it can give birth
    pub fn birth_threshold(&self) -> f64 {
        self.zeta * (self.w_birth + self.sigma_birth)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("w_birth", self.w_birth),
            ("a_half", self.a_half),
            ("w_half", self.w_half),
            ("phi_age", self.phi_age),
            ("phi_weight", self.phi_weight),
            ("lambda", self.lambda),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(Error::parameter(name, "must be a finite number"));
            }
        }

        let non_negative = [
            ("sigma_birth", self.sigma_birth),
            ("beta", self.beta),
            ("eta", self.eta),
            ("mu", self.mu),
            ("gamma", self.gamma),
            ("zeta", self.zeta),
            ("xi", self.xi),
            ("omega", self.omega),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::parameter(name, "must be a non-negative number"));
            }
        }

        if self.eta > 1.0 {
            return Err(Error::parameter("eta", "must not exceed 1"));
        }
        if !(self.f.is_finite() && self.f > 0.0) {
            return Err(Error::parameter("F", "must be a positive number"));
        }
        if let Some(delta) = self.delta_phi_max {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(Error::parameter("DeltaPhiMax", "must be a positive number"));
            }
        }

        Ok(())
    }
}

/// Fodder parameters for landscapes where plants grow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandscapeParams {
    /// Maximum fodder in a cell
    pub f_max: f64,
    /// Fraction of the missing fodder regrown every year
    #[serde(default)]
    pub alpha: f64,
}

impl LandscapeParams {
    pub fn jungle() -> Self {
        Self {
            f_max: 800.0,
            alpha: 0.0,
        }
    }

    pub fn savannah() -> Self {
        Self {
            f_max: 300.0,
            alpha: 0.3,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.f_max.is_finite() && self.f_max >= 0.0) {
            return Err(Error::parameter("f_max", "must be a non-negative number"));
        }
        if !(self.alpha.is_finite() && (0.0..=1.0).contains(&self.alpha)) {
            return Err(Error::parameter("alpha", "must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Registry of every tunable constant in the model.
///
/// Owned by the simulation and handed down by reference, so changing a value
/// affects every animal of a species or every cell of a landscape at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub jungle: LandscapeParams,
    pub savannah: LandscapeParams,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            jungle: LandscapeParams::jungle(),
            savannah: LandscapeParams::savannah(),
        }
    }
}

impl Parameters {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    /// Fodder parameters, `None` for landscapes without vegetation
    pub fn landscape(&self, landscape: Landscape) -> Option<&LandscapeParams> {
        match landscape {
            Landscape::Jungle => Some(&self.jungle),
            Landscape::Savannah => Some(&self.savannah),
            _ => None,
        }
    }

    /// Maximum fodder a cell of this landscape can hold
    pub fn f_max(&self, landscape: Landscape) -> f64 {
        self.landscape(landscape).map_or(0.0, |params| params.f_max)
    }

    /// Apply a `{name: value}` object to the parameters of one species.
    ///
    /// Fails without modifying anything if the object contains an unknown
    /// key, a non-numeric value or a value outside the parameter's domain.
    pub fn set_species_parameters(&mut self, species: Species, overrides: &Value) -> Result<()> {
        let updated: SpeciesParams = merge_overrides(self.species(species), overrides)?;
        updated.validate()?;
        debug!(%species, ?updated, "Species parameters updated");
        *self.species_mut(species) = updated;
        Ok(())
    }

    /// Apply a `{name: value}` object to the fodder parameters of Jungle or Savannah.
    pub fn set_landscape_parameters(&mut self, landscape: Landscape, overrides: &Value) -> Result<()> {
        let current = self.landscape(landscape).ok_or_else(|| {
            Error::UnknownLandscape(format!("{} has no tunable parameters", landscape))
        })?;
        let updated: LandscapeParams = merge_overrides(current, overrides)?;
        updated.validate()?;
        debug!(%landscape, ?updated, "Landscape parameters updated");
        match landscape {
            Landscape::Jungle => self.jungle = updated,
            _ => self.savannah = updated,
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.herbivore.validate()?;
        self.carnivore.validate()?;
        self.jungle.validate()?;
        self.savannah.validate()
    }
}

fn merge_overrides<T>(current: &T, overrides: &Value) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let Value::Object(overrides) = overrides else {
        return Err(Error::Validation(format!(
            "parameter overrides must be an object, got {}",
            overrides
        )));
    };

    let mut merged = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        _ => return Err(Error::Serialization("parameters are not an object".to_string())),
    };

    for (name, value) in overrides {
        if !merged.contains_key(name) {
            return Err(Error::parameter(name, "unknown parameter"));
        }
        if !value.is_number() {
            return Err(Error::parameter(name, format!("expected a number, got {}", value)));
        }
        merged.insert(name.clone(), value.clone());
    }

    Ok(serde_json::from_value(Value::Object(merged))?)
}

/// Simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Species and landscape constants
    #[serde(default)]
    pub parameters: Parameters,
}
