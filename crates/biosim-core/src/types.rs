//! Core type definitions for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two animal species living on the island
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub fn all() -> [Species; 2] {
        [Species::Herbivore, Species::Carnivore]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(Error::UnknownSpecies(other.to_string())),
        }
    }
}

/// Landscape type of a single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landscape {
    Ocean,
    Mountain,
    Jungle,
    Savannah,
    Desert,
}

impl Landscape {
    pub fn all() -> [Landscape; 5] {
        [
            Landscape::Ocean,
            Landscape::Mountain,
            Landscape::Jungle,
            Landscape::Savannah,
            Landscape::Desert,
        ]
    }

    /// Map letter used in island descriptions
    pub fn code(&self) -> char {
        match self {
            Landscape::Ocean => 'O',
            Landscape::Mountain => 'M',
            Landscape::Jungle => 'J',
            Landscape::Savannah => 'S',
            Landscape::Desert => 'D',
        }
    }

    pub fn from_code(code: char) -> Result<Self> {
        Landscape::all()
            .into_iter()
            .find(|landscape| landscape.code() == code)
            .ok_or_else(|| Error::UnknownLandscape(code.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Landscape::Ocean => "Ocean",
            Landscape::Mountain => "Mountain",
            Landscape::Jungle => "Jungle",
            Landscape::Savannah => "Savannah",
            Landscape::Desert => "Desert",
        }
    }

    /// Whether animals may live in or migrate into this landscape
    pub fn is_traversable(&self) -> bool {
        !matches!(self, Landscape::Ocean | Landscape::Mountain)
    }

    /// Whether fodder grows here at all
    pub fn grows_fodder(&self) -> bool {
        matches!(self, Landscape::Jungle | Landscape::Savannah)
    }
}

impl fmt::Display for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either the map letter (`"J"`) or the full name (`"Jungle"`).
impl FromStr for Landscape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            return Landscape::from_code(code);
        }

        Landscape::all()
            .into_iter()
            .find(|landscape| landscape.name() == s)
            .ok_or_else(|| Error::UnknownLandscape(s.to_string()))
    }
}

/// Grid coordinate of a cell, `(row, col)` with the origin in the top left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step one cell in `direction`, or `None` when that leaves a
    /// `height` x `width` grid.
    pub fn step(&self, direction: Direction, height: usize, width: usize) -> Option<Self> {
        let (d_row, d_col) = direction.to_delta();
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        (row < height && col < width).then_some(Self { row, col })
    }
}

impl From<(usize, usize)> for Location {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl From<Location> for (usize, usize) {
    fn from(loc: Location) -> Self {
        (loc.row, loc.col)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Direction towards a neighbouring cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// `(row, col)` offset
    pub fn to_delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
        }
    }

    /// Neighbour order used when linking cells
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Left, Direction::Down, Direction::Right]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_from_str() {
        assert_eq!("Herbivore".parse::<Species>().unwrap(), Species::Herbivore);
        assert_eq!("Carnivore".parse::<Species>().unwrap(), Species::Carnivore);
        assert!(matches!(
            "Omnivore".parse::<Species>(),
            Err(Error::UnknownSpecies(_))
        ));
    }

    #[test]
    fn test_landscape_codes() {
        for landscape in Landscape::all() {
            assert_eq!(Landscape::from_code(landscape.code()).unwrap(), landscape);
        }
        assert!(matches!(
            Landscape::from_code('X'),
            Err(Error::UnknownLandscape(_))
        ));
    }

    #[test]
    fn test_landscape_from_letter_or_name() {
        assert_eq!("J".parse::<Landscape>().unwrap(), Landscape::Jungle);
        assert_eq!("Savannah".parse::<Landscape>().unwrap(), Landscape::Savannah);
        assert!("Swamp".parse::<Landscape>().is_err());
        assert!("".parse::<Landscape>().is_err());
    }

    #[test]
    fn test_traversability() {
        assert!(!Landscape::Ocean.is_traversable());
        assert!(!Landscape::Mountain.is_traversable());
        assert!(Landscape::Jungle.is_traversable());
        assert!(Landscape::Savannah.is_traversable());
        assert!(Landscape::Desert.is_traversable());
    }

    #[test]
    fn test_location_step() {
        let loc = Location::new(0, 0);
        assert_eq!(loc.step(Direction::Up, 3, 3), None);
        assert_eq!(loc.step(Direction::Left, 3, 3), None);
        assert_eq!(loc.step(Direction::Down, 3, 3), Some(Location::new(1, 0)));
        assert_eq!(loc.step(Direction::Right, 3, 3), Some(Location::new(0, 1)));

        let corner = Location::new(2, 2);
        assert_eq!(corner.step(Direction::Down, 3, 3), None);
        assert_eq!(corner.step(Direction::Right, 3, 3), None);
    }

    #[test]
    fn test_location_serializes_as_pair() {
        let json = serde_json::to_string(&Location::new(1, 3)).unwrap();
        assert_eq!(json, "[1,3]");
        let loc: Location = serde_json::from_str("[4, 10]").unwrap();
        assert_eq!(loc, Location::new(4, 10));
    }
}
