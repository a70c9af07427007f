//! Continuous model space with optional terrain, culture and clutter.

use crate::core::feature::{Area, LineFeature};
use crate::domain::Coordinate;
use crate::utils::error::{RetError, Result};
use crate::utils::validation::validate_file_extension;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ground cover with its own height (for line of sight) and map colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Culture {
    pub name: String,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_colour")]
    pub colour: (u8, u8, u8),
}

fn default_colour() -> (u8, u8, u8) {
    (0, 0, 0)
}

impl Culture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            height: 0.0,
            colour: default_colour(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Clutter {
    pub background_level: f64,
    pub ground_clutter_value: f64,
    pub ground_clutter_height: f64,
}

/// Row-major grid; row 0 is the northern (`y_max`) edge.
#[derive(Debug, Clone, PartialEq)]
struct Grid<T> {
    rows: Vec<Vec<T>>,
}

impl<T> Grid<T> {
    fn new(rows: Vec<Vec<T>>) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return Err(RetError::config(
                "Grid files must be non-empty and rectangular",
            ));
        }
        Ok(Self { rows })
    }

    fn sample(&self, space: &Space, pos: &Coordinate) -> &T {
        let n_rows = self.rows.len();
        let n_cols = self.rows[0].len();
        let fx = (pos.x() - space.x_min) / space.width().max(f64::EPSILON);
        let fy = (space.y_max - pos.y()) / space.height().max(f64::EPSILON);
        let col = ((fx * n_cols as f64).floor() as isize).clamp(0, n_cols as isize - 1) as usize;
        let row = ((fy * n_rows as f64).floor() as isize).clamp(0, n_rows as isize - 1) as usize;
        &self.rows[row][col]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub dimensions: u8,
    pub clutter: Clutter,
    pub areas: Vec<Area>,
    pub boundaries: Vec<LineFeature>,
    terrain: Option<Grid<f64>>,
    culture_map: Option<Grid<Option<usize>>>,
    cultures: Vec<Culture>,
}

impl Space {
    /// Flat 2d space spanning `0..x_max`, `0..y_max`.
    pub fn new_2d(x_max: f64, y_max: f64) -> Self {
        Self::with_bounds(0.0, x_max, 0.0, y_max, 2)
    }

    /// Flat 3d space spanning `0..x_max`, `0..y_max`.
    pub fn new_3d(x_max: f64, y_max: f64) -> Self {
        Self::with_bounds(0.0, x_max, 0.0, y_max, 3)
    }

    pub fn with_bounds(x_min: f64, x_max: f64, y_min: f64, y_max: f64, dimensions: u8) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            dimensions,
            clutter: Clutter::default(),
            areas: Vec::new(),
            boundaries: Vec::new(),
            terrain: None,
            culture_map: None,
            cultures: Vec::new(),
        }
    }

    pub fn with_clutter(mut self, clutter: Clutter) -> Self {
        self.clutter = clutter;
        self
    }

    pub fn with_area(mut self, area: impl Into<Area>) -> Self {
        self.areas.push(area.into());
        self
    }

    pub fn with_boundary(mut self, boundary: LineFeature) -> Self {
        self.boundaries.push(boundary);
        self
    }

    /// Terrain heights, row 0 at `y_max`.
    pub fn with_terrain(mut self, heights: Vec<Vec<f64>>) -> Result<Self> {
        self.terrain = Some(Grid::new(heights)?);
        Ok(self)
    }

    /// Culture grid by culture name; empty strings mean no culture.
    pub fn with_cultures(mut self, cultures: Vec<Culture>, names: Vec<Vec<String>>) -> Result<Self> {
        let mut rows = Vec::with_capacity(names.len());
        for row in names {
            let mut cells = Vec::with_capacity(row.len());
            for name in row {
                let name = name.trim();
                if name.is_empty() {
                    cells.push(None);
                    continue;
                }
                let index = cultures
                    .iter()
                    .position(|c| c.name == name)
                    .ok_or_else(|| RetError::config(format!("Culture map references unknown culture '{}'", name)))?;
                cells.push(Some(index));
            }
            rows.push(cells);
        }
        self.culture_map = Some(Grid::new(rows)?);
        self.cultures = cultures;
        Ok(self)
    }

    /// Declare cultures without a culture map.
    pub fn with_declared_cultures(mut self, cultures: Vec<Culture>) -> Self {
        self.cultures = cultures;
        self
    }

    /// 讀取地形灰階 CSV (0..=255)
    pub fn load_terrain_csv<P: AsRef<Path>>(
        self,
        path: P,
        height_black: f64,
        height_white: f64,
    ) -> Result<Self> {
        let path = path.as_ref();
        validate_file_extension("space.terrain_image_path", &path.to_string_lossy(), &["csv"])?;
        let rows = read_csv_grid(path)?;
        let mut heights = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                let level: f64 = cell.trim().parse().map_err(|_| RetError::InvalidConfigValueError {
                    field: "space.terrain_image_path".to_string(),
                    value: cell.clone(),
                    reason: "Terrain cells must be grey levels between 0 and 255".to_string(),
                })?;
                let level = level.clamp(0.0, 255.0) / 255.0;
                cells.push(height_black + (height_white - height_black) * level);
            }
            heights.push(cells);
        }
        self.with_terrain(heights)
    }

    pub fn load_culture_csv<P: AsRef<Path>>(self, path: P, cultures: Vec<Culture>) -> Result<Self> {
        let path = path.as_ref();
        validate_file_extension("space.culture_image_path", &path.to_string_lossy(), &["csv"])?;
        let rows = read_csv_grid(path)?;
        self.with_cultures(cultures, rows)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn get_cultures(&self) -> &[Culture] {
        &self.cultures
    }

    pub fn contains(&self, pos: &Coordinate) -> bool {
        pos.x() >= self.x_min && pos.x() <= self.x_max && pos.y() >= self.y_min && pos.y() <= self.y_max
    }

    pub fn clamp(&self, pos: Coordinate) -> Coordinate {
        let x = pos.x().clamp(self.x_min, self.x_max);
        let y = pos.y().clamp(self.y_min, self.y_max);
        match pos.z() {
            Some(z) => Coordinate::D3(x, y, z),
            None => Coordinate::D2(x, y),
        }
    }

    pub fn terrain_height(&self, pos: &Coordinate) -> f64 {
        self.terrain
            .as_ref()
            .map(|grid| *grid.sample(self, pos))
            .unwrap_or(0.0)
    }

    pub fn culture_at(&self, pos: &Coordinate) -> Option<&Culture> {
        let grid = self.culture_map.as_ref()?;
        grid.sample(self, pos).map(|index| &self.cultures[index])
    }

    /// Terrain plus culture height; what blocks line of sight.
    pub fn obstruction_height(&self, pos: &Coordinate) -> f64 {
        self.terrain_height(pos) + self.culture_at(pos).map(|c| c.height).unwrap_or(0.0)
    }

    /// Rise over run between two positions on the terrain.
    pub fn gradient_between(&self, from: &Coordinate, to: &Coordinate) -> f64 {
        let run = from.horizontal_distance(to);
        if run == 0.0 {
            return 0.0;
        }
        (self.terrain_height(to) - self.terrain_height(from)) / run
    }

    /// Positions without height are treated as on the ground.
    pub fn clutter_at(&self, pos: &Coordinate) -> f64 {
        let near_ground = match pos.z() {
            Some(z) => z - self.terrain_height(pos) <= self.clutter.ground_clutter_height,
            None => true,
        };
        let ground = if near_ground {
            self.clutter.ground_clutter_value
        } else {
            0.0
        };
        (self.clutter.background_level + ground).max(0.0)
    }

    /// Put a ground agent on the terrain surface in 3d spaces.
    pub fn place_on_ground(&self, pos: Coordinate) -> Coordinate {
        if self.dimensions == 3 {
            pos.with_z(self.terrain_height(&pos))
        } else {
            pos.to_2d()
        }
    }

    pub fn area(&self, name: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.name() == name)
    }
}

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ridge() -> Space {
        // west half at 0, east half at 100
        Space::new_3d(100.0, 100.0)
            .with_terrain(vec![vec![0.0, 100.0], vec![0.0, 100.0]])
            .unwrap()
    }

    #[test]
    fn test_flat_space_defaults() {
        let space = Space::new_2d(1000.0, 1000.0);
        assert_eq!(space.width(), 1000.0);
        assert_eq!(space.terrain_height(&Coordinate::D2(10.0, 10.0)), 0.0);
        assert!(space.get_cultures().is_empty());
        assert!(space.contains(&Coordinate::D2(1000.0, 0.0)));
        assert!(!space.contains(&Coordinate::D2(1000.1, 0.0)));
    }

    #[test]
    fn test_terrain_sampling_and_gradient() {
        let space = ridge();
        assert_eq!(space.terrain_height(&Coordinate::D2(10.0, 90.0)), 0.0);
        assert_eq!(space.terrain_height(&Coordinate::D2(90.0, 10.0)), 100.0);
        let gradient = space.gradient_between(&Coordinate::D2(25.0, 50.0), &Coordinate::D2(75.0, 50.0));
        assert_eq!(gradient, 2.0);
    }

    #[test]
    fn test_culture_grid() {
        let forest = Culture {
            name: "forest".to_string(),
            height: 12.0,
            colour: (0, 128, 0),
        };
        let space = Space::new_2d(10.0, 10.0)
            .with_cultures(
                vec![forest],
                vec![vec!["forest".to_string(), String::new()]],
            )
            .unwrap();
        assert_eq!(space.culture_at(&Coordinate::D2(1.0, 5.0)).map(|c| c.name.as_str()), Some("forest"));
        assert!(space.culture_at(&Coordinate::D2(9.0, 5.0)).is_none());
        assert_eq!(space.obstruction_height(&Coordinate::D2(1.0, 5.0)), 12.0);
    }

    #[test]
    fn test_unknown_culture_is_rejected() {
        let result = Space::new_2d(10.0, 10.0).with_cultures(vec![], vec![vec!["swamp".to_string()]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_terrain_csv() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "0,255").unwrap();
        writeln!(file, "0,255").unwrap();

        let space = Space::new_3d(100.0, 100.0)
            .load_terrain_csv(file.path(), 10.0, 20.0)
            .unwrap();
        assert_eq!(space.terrain_height(&Coordinate::D2(10.0, 10.0)), 10.0);
        assert_eq!(space.terrain_height(&Coordinate::D2(90.0, 10.0)), 20.0);
    }

    #[test]
    fn test_terrain_images_are_rejected() {
        let result = Space::new_3d(100.0, 100.0).load_terrain_csv("terrain.png", 0.0, 1.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_clutter_near_ground() {
        let space = Space::new_3d(100.0, 100.0).with_clutter(Clutter {
            background_level: 0.5,
            ground_clutter_value: 0.25,
            ground_clutter_height: 0.75,
        });
        assert_eq!(space.clutter_at(&Coordinate::D3(1.0, 1.0, 0.5)), 0.75);
        assert_eq!(space.clutter_at(&Coordinate::D3(1.0, 1.0, 50.0)), 0.5);
    }
}
