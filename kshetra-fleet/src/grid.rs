//! Occupancy grid: a rectangular raster of accessible and blocked cells.
//!
//! Cell codes are opaque to the core: code 0 means accessible, any non-zero
//! code means blocked. The segmentation ingress writes whatever label codes
//! it produces; the planner only asks "is this cell accessible".

use crate::core::GridPoint;
use crate::error::{Error, Result};

/// Rectangular raster with immutable dimensions.
///
/// Storage is a flat row-major array of `width * height` cell codes; all
/// cells start accessible.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl OccupancyGrid {
    /// Create a grid with all cells accessible.
    ///
    /// Fails with `InvalidArgument` when either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            cells: vec![0; width * height],
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width + x as usize
    }

    /// Cell code at (x, y). Fails with `OutOfRange` outside bounds.
    pub fn get(&self, x: i32, y: i32) -> Result<u8> {
        if !self.is_valid_position(x, y) {
            return Err(Error::OutOfRange { x, y });
        }
        Ok(self.cells[self.index(x, y)])
    }

    /// Set the cell code at (x, y). Fails with `OutOfRange` outside bounds.
    pub fn set(&mut self, x: i32, y: i32, code: u8) -> Result<()> {
        if !self.is_valid_position(x, y) {
            return Err(Error::OutOfRange { x, y });
        }
        let idx = self.index(x, y);
        self.cells[idx] = code;
        Ok(())
    }

    /// (x, y) lies within the grid.
    #[inline]
    pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cell is in bounds and carries code 0. Never errors; out-of-range
    /// coordinates are simply not accessible.
    #[inline]
    pub fn is_accessible(&self, x: i32, y: i32) -> bool {
        self.is_valid_position(x, y) && self.cells[self.index(x, y)] == 0
    }

    /// Point form of [`is_accessible`](OccupancyGrid::is_accessible).
    #[inline]
    pub fn is_accessible_point(&self, p: GridPoint) -> bool {
        self.is_accessible(p.x, p.y)
    }
}
