//! Dense 2D rasters shared by the drift model: a boolean presence mask and a
//! per-cell drift velocity field. Both are row-major, `y * width + x`.
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },
    #[error("cell ({x}, {y}) lies outside the {width}x{height} grid")]
    CellOutOfBounds {
        x: u32,
        y: u32,
        width: usize,
        height: usize,
    },
    #[error("raster data has {actual} cells, expected {expected}")]
    DataLength { expected: usize, actual: usize },
    #[error("drift field is {field_width}x{field_height} but mask is {mask_width}x{mask_height}")]
    DimensionMismatch {
        mask_width: usize,
        mask_height: usize,
        field_width: usize,
        field_height: usize,
    },
    #[error("pixel-flow interval must be positive and finite (got {0})")]
    InvalidInterval(f64),
    #[error("resolution must be positive and finite (got {0})")]
    InvalidResolution(f64),
}

/// Integer grid coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Row-major scan index; the canonical ordering key for cells.
    pub fn row_major_index(self, width: usize) -> usize {
        self.y as usize * width + self.x as usize
    }

    /// Squared Euclidean distance in cells. Exact for any grid that fits in u32.
    pub fn distance_sq(self, other: Cell) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Cell) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }
}

fn check_dims(width: usize, height: usize) -> Result<usize, GridError> {
    match width.checked_mul(height) {
        Some(len) if len > 0 && width <= u32::MAX as usize && height <= u32::MAX as usize => {
            Ok(len)
        }
        _ => Err(GridError::EmptyGrid { width, height }),
    }
}

/// Occupancy raster. Replaced wholesale by advection, cleared cell-by-cell by salvage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresenceMask {
    width: usize,
    height: usize,
    data: Vec<bool>,
    occupied: usize,
}

impl PresenceMask {
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let len = check_dims(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![false; len],
            occupied: 0,
        })
    }

    /// Build a mask from a list of occupied cells. Duplicate cells merge.
    pub fn from_cells(
        width: usize,
        height: usize,
        cells: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, GridError> {
        let mut mask = Self::new(width, height)?;
        for cell in cells {
            if !mask.in_bounds(cell) {
                return Err(GridError::CellOutOfBounds {
                    x: cell.x,
                    y: cell.y,
                    width,
                    height,
                });
            }
            mask.insert(cell);
        }
        Ok(mask)
    }

    /// Build a mask from a row-major boolean raster.
    pub fn from_raster(width: usize, height: usize, data: Vec<bool>) -> Result<Self, GridError> {
        let len = check_dims(width, height)?;
        if data.len() != len {
            return Err(GridError::DataLength {
                expected: len,
                actual: data.len(),
            });
        }
        let occupied = data.iter().filter(|&&v| v).count();
        Ok(Self {
            width,
            height,
            data,
            occupied,
        })
    }

    /// An empty mask with the same dimensions as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: vec![false; self.data.len()],
            occupied: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self.data[cell.row_major_index(self.width)]
    }

    /// Mark `cell` occupied. Returns false if it was already occupied or lies
    /// outside the grid.
    pub fn insert(&mut self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        let slot = &mut self.data[cell.row_major_index(self.width)];
        if *slot {
            return false;
        }
        *slot = true;
        self.occupied += 1;
        true
    }

    /// Clear `cell`. Returns true if it was occupied.
    pub fn clear(&mut self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        let slot = &mut self.data[cell.row_major_index(self.width)];
        if !*slot {
            return false;
        }
        *slot = false;
        self.occupied -= 1;
        true
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Occupied cells in row-major scan order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(move |(idx, _)| Cell::new((idx % width) as u32, (idx / width) as u32))
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.iter_occupied().collect()
    }
}

/// Per-cell drift velocity in meters/second, `[vx, vy]` along the grid axes.
#[derive(Clone, Debug, PartialEq)]
pub struct DriftField {
    width: usize,
    height: usize,
    data: Vec<[f64; 2]>,
}

impl DriftField {
    pub fn zeros(width: usize, height: usize) -> Result<Self, GridError> {
        Self::uniform(width, height, [0.0, 0.0])
    }

    pub fn uniform(width: usize, height: usize, velocity: [f64; 2]) -> Result<Self, GridError> {
        let len = check_dims(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![velocity; len],
        })
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<[f64; 2]>) -> Result<Self, GridError> {
        let len = check_dims(width, height)?;
        if data.len() != len {
            return Err(GridError::DataLength {
                expected: len,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert a per-pixel displacement field, measured between two rasters taken
    /// `interval_seconds` apart, into velocities in m/s.
    pub fn from_pixel_flow(
        width: usize,
        height: usize,
        flow: Vec<[f64; 2]>,
        resolution_m: f64,
        interval_seconds: f64,
    ) -> Result<Self, GridError> {
        if !(resolution_m.is_finite() && resolution_m > 0.0) {
            return Err(GridError::InvalidResolution(resolution_m));
        }
        if !(interval_seconds.is_finite() && interval_seconds > 0.0) {
            return Err(GridError::InvalidInterval(interval_seconds));
        }
        let scale = resolution_m / interval_seconds;
        let data = flow
            .into_iter()
            .map(|[dx, dy]| [dx * scale, dy * scale])
            .collect();
        Self::from_vec(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Velocity at `cell`. Callers must ensure the cell is in bounds.
    pub fn get(&self, cell: Cell) -> [f64; 2] {
        self.data[cell.row_major_index(self.width)]
    }

    pub fn ensure_matches(&self, mask: &PresenceMask) -> Result<(), GridError> {
        if self.dims() != mask.dims() {
            return Err(GridError::DimensionMismatch {
                mask_width: mask.width(),
                mask_height: mask.height(),
                field_width: self.width,
                field_height: self.height,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cells_merges_duplicates() {
        let mask = PresenceMask::from_cells(
            4,
            4,
            [Cell::new(1, 1), Cell::new(1, 1), Cell::new(3, 0)],
        )
        .unwrap();
        assert_eq!(mask.occupied_count(), 2);
        assert!(mask.is_occupied(Cell::new(1, 1)));
    }

    #[test]
    fn from_cells_rejects_out_of_bounds() {
        let err = PresenceMask::from_cells(4, 3, [Cell::new(0, 3)]).unwrap_err();
        assert!(matches!(err, GridError::CellOutOfBounds { x: 0, y: 3, .. }));
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert!(PresenceMask::new(0, 10).is_err());
        assert!(DriftField::zeros(10, 0).is_err());
    }

    #[test]
    fn iteration_is_row_major() {
        let mask = PresenceMask::from_cells(
            5,
            5,
            [Cell::new(4, 0), Cell::new(0, 2), Cell::new(2, 0), Cell::new(1, 1)],
        )
        .unwrap();
        assert_eq!(
            mask.cells(),
            vec![Cell::new(2, 0), Cell::new(4, 0), Cell::new(1, 1), Cell::new(0, 2)]
        );
    }

    #[test]
    fn clear_tracks_occupied_count() {
        let mut mask = PresenceMask::from_cells(3, 3, [Cell::new(0, 0), Cell::new(2, 2)]).unwrap();
        assert!(mask.clear(Cell::new(0, 0)));
        assert!(!mask.clear(Cell::new(0, 0)));
        assert_eq!(mask.occupied_count(), 1);
    }

    #[test]
    fn pixel_flow_converts_to_meters_per_second() {
        let field = DriftField::from_pixel_flow(1, 1, vec![[2141.0, -4282.0]], 50.0, 2141.0).unwrap();
        assert_eq!(field.get(Cell::new(0, 0)), [50.0, -100.0]);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let mask = PresenceMask::new(10, 10).unwrap();
        let field = DriftField::zeros(10, 9).unwrap();
        assert!(matches!(
            field.ensure_matches(&mask),
            Err(GridError::DimensionMismatch { .. })
        ));
    }
}
