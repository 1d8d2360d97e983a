//! 2D grid of cells built from a map description.

use crate::cell::Cell;
use biosim_core::{Direction, Error, Landscape, Location, Parameters, Result};
use serde::{Deserialize, Serialize};

/// A rectangular grid of cells, stored row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Parse a map of landscape letters, one row per line.
    ///
    /// Rows must all have the same length, every letter must be a known
    /// landscape and the outer ring must be ocean. A single trailing newline
    /// is accepted.
    pub fn from_map(map: &str, params: &Parameters) -> Result<Self> {
        let map = map.strip_suffix('\n').unwrap_or(map);
        let rows: Vec<Vec<char>> = map
            .split('\n')
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();

        if rows.iter().all(Vec::is_empty) {
            return Err(Error::InvalidMap("map is empty".to_string()));
        }
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        if let Some((row, line)) = rows.iter().enumerate().find(|(_, line)| line.len() != width) {
            return Err(Error::InvalidMap(format!(
                "inconsistent line length: row {} has {} cells, expected {}",
                row,
                line.len(),
                width
            )));
        }

        let mut landscapes = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            for (col, &code) in line.iter().enumerate() {
                let landscape = Landscape::from_code(code).map_err(|_| {
                    Error::UnknownLandscape(format!("'{}' at ({}, {})", code, row, col))
                })?;
                landscapes.push(landscape);
            }
        }

        let mut cells = Vec::with_capacity(landscapes.len());
        for (index, landscape) in landscapes.into_iter().enumerate() {
            let location = Location::new(index / width, index % width);
            let on_border = location.row == 0
                || location.col == 0
                || location.row == height - 1
                || location.col == width - 1;
            if on_border && landscape != Landscape::Ocean {
                return Err(Error::InvalidMap(format!(
                    "bad boundary: {} at {} must be Ocean",
                    landscape, location
                )));
            }
            cells.push(Cell::new(landscape, location, params));
        }

        let mut grid = Self {
            width,
            height,
            cells,
        };
        grid.link_neighbors();
        Ok(grid)
    }

    /// Record for every cell the indices of its up, left, down and right
    /// neighbours that lie inside the grid, impassable ones included.
    fn link_neighbors(&mut self) {
        for index in 0..self.cells.len() {
            let location = self.index_to_location(index);
            let neighbors = Direction::all()
                .into_iter()
                .filter_map(|direction| location.step(direction, self.height, self.width))
                .map(|neighbor| self.location_to_index(neighbor))
                .collect();
            self.cells[index].set_neighbors(neighbors);
        }
    }

    fn location_to_index(&self, location: Location) -> usize {
        location.row * self.width + location.col
    }

    /// Index of `location`, or `None` outside the grid
    pub fn index_of(&self, location: Location) -> Option<usize> {
        (location.row < self.height && location.col < self.width)
            .then(|| self.location_to_index(location))
    }

    pub fn index_to_location(&self, index: usize) -> Location {
        Location::new(index / self.width, index % self.width)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, location: Location) -> Option<&Cell> {
        self.index_of(location).map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, location: Location) -> Option<&mut Cell> {
        let index = self.index_of(location)?;
        Some(&mut self.cells[index])
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// Cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "OOOOO\nOJSDO\nOMJJO\nOOOOO";

    #[test]
    fn test_grid_from_map() {
        let grid = Grid::from_map(SAMPLE, &Parameters::default()).unwrap();
        assert_eq!(grid.width, 5);
        assert_eq!(grid.height, 4);
        assert_eq!(grid.len(), 20);

        let cell = grid.get(Location::new(1, 2)).unwrap();
        assert_eq!(cell.landscape(), Landscape::Savannah);
        assert_eq!(cell.location(), Location::new(1, 2));
        assert_eq!(grid.get(Location::new(2, 1)).unwrap().landscape(), Landscape::Mountain);
        assert!(grid.get(Location::new(4, 0)).is_none());
    }

    #[test]
    fn test_trailing_newline_accepted() {
        let grid = Grid::from_map("OOO\nOJO\nOOO\n", &Parameters::default()).unwrap();
        assert_eq!(grid.height, 3);
    }

    #[test]
    fn test_inconsistent_rows_rejected() {
        let result = Grid::from_map("OOOOO\nOJJJJO\nOOOOO", &Parameters::default());
        assert!(matches!(result, Err(Error::InvalidMap(_))));

        let result = Grid::from_map("\nOOO\nOJO\nOOO", &Parameters::default());
        match result {
            Err(Error::InvalidMap(message)) => {
                assert!(message.contains("inconsistent line length"), "{}", message)
            }
            other => panic!("expected InvalidMap, got {:?}", other.map(|grid| grid.len())),
        }
    }

    #[test]
    fn test_non_ocean_border_rejected() {
        let result = Grid::from_map("JJOOOOJJJD\nJJMMMJJDDD\nDDDDDDDDDD", &Parameters::default());
        assert!(matches!(result, Err(Error::InvalidMap(_))));

        let result = Grid::from_map("OOO\nOJD\nOOO", &Parameters::default());
        assert!(matches!(result, Err(Error::InvalidMap(_))));
    }

    #[test]
    fn test_unknown_letter_rejected() {
        let result = Grid::from_map("OOO\nOXO\nOOO", &Parameters::default());
        assert!(matches!(result, Err(Error::UnknownLandscape(_))));
    }

    #[test]
    fn test_empty_map_rejected() {
        for map in ["", "\n", "\n\n"] {
            match Grid::from_map(map, &Parameters::default()) {
                Err(Error::InvalidMap(message)) => assert_eq!(message, "map is empty"),
                other => panic!("expected InvalidMap, got {:?}", other.map(|grid| grid.len())),
            }
        }
    }

    #[test]
    fn test_neighbors() {
        let grid = Grid::from_map(SAMPLE, &Parameters::default()).unwrap();

        // Corner: right and below only.
        let corner = grid.get(Location::new(0, 0)).unwrap();
        assert_eq!(corner.neighbors().len(), 2);

        // Edge: three neighbours.
        let edge = grid.get(Location::new(0, 2)).unwrap();
        assert_eq!(edge.neighbors().len(), 3);

        // Interior: up, left, down, right, mountains included.
        let interior = grid.get(Location::new(1, 1)).unwrap();
        let locations: Vec<Location> = interior
            .neighbors()
            .iter()
            .map(|&index| grid.index_to_location(index))
            .collect();
        assert_eq!(
            locations,
            vec![
                Location::new(0, 1),
                Location::new(1, 0),
                Location::new(2, 1),
                Location::new(1, 2),
            ]
        );
    }
}
