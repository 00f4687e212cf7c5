//! Rasterization of a bounded region into an open/closed cell grid.

use crate::common::{NavError, NavResult};
use super::ports::GroundProbe;
use super::types::CellState;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Region, vertical band and density used to sample a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// One corner of the region, `[x, z]`.
    pub corner_a: [f32; 2],
    /// The opposite corner, `[x, z]`.
    pub corner_b: [f32; 2],
    /// Lowest height a probe may hit.
    pub floor: f32,
    /// Height probes start from.
    pub ceiling: f32,
    /// Cells per world unit.
    pub density: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            corner_a: [-50.0, -50.0],
            corner_b: [50.0, 50.0],
            floor: -10.0,
            ceiling: 10.0,
            density: 1.0,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> NavResult<()> {
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(NavError::InvalidConfig(format!(
                "sampling density must be positive, got {}",
                self.density
            )));
        }
        if !(self.floor.is_finite() && self.ceiling.is_finite()) || self.floor > self.ceiling {
            return Err(NavError::InvalidConfig(format!(
                "invalid vertical band ({}, {})",
                self.floor, self.ceiling
            )));
        }
        if self.corner_a.iter().chain(self.corner_b.iter()).any(|c| !c.is_finite()) {
            return Err(NavError::InvalidConfig("region corners must be finite".to_string()));
        }
        Ok(())
    }
}

/// Write-once grid of sampled cells. Open cells carry the probed ground height.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    min_x: f32,
    min_z: f32,
    step: f32,
    width: usize,
    depth: usize,
    band: (f32, f32),
    cells: Vec<Option<f32>>,
}

impl SampleGrid {
    /// Builds a grid from explicit cell heights, row-major with `x` fastest.
    pub fn from_cells(
        min_x: f32,
        min_z: f32,
        step: f32,
        width: usize,
        band: (f32, f32),
        cells: Vec<Option<f32>>,
    ) -> NavResult<Self> {
        if width == 0 || cells.len() % width != 0 {
            return Err(NavError::InvalidConfig(format!(
                "{} cells do not form rows of width {}",
                cells.len(),
                width
            )));
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(NavError::InvalidConfig(format!("invalid cell step {}", step)));
        }
        Ok(Self {
            min_x,
            min_z,
            step,
            width,
            depth: cells.len() / width,
            band,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn band(&self) -> (f32, f32) {
        self.band
    }

    fn slot(&self, ix: i64, iz: i64) -> Option<usize> {
        if ix < 0 || iz < 0 {
            return None;
        }
        let (ix, iz) = (ix as usize, iz as usize);
        if ix >= self.width || iz >= self.depth {
            return None;
        }
        Some(iz * self.width + ix)
    }

    /// Out-of-range coordinates read as closed.
    pub fn state(&self, ix: i64, iz: i64) -> CellState {
        match self.height(ix, iz) {
            Some(_) => CellState::Open,
            None => CellState::Closed,
        }
    }

    pub fn is_open(&self, ix: i64, iz: i64) -> bool {
        self.state(ix, iz) == CellState::Open
    }

    pub fn height(&self, ix: i64, iz: i64) -> Option<f32> {
        self.slot(ix, iz).and_then(|s| self.cells[s])
    }

    /// World `(x, z)` of a cell's grid point.
    pub fn world(&self, ix: i64, iz: i64) -> (f32, f32) {
        (
            self.min_x + ix as f32 * self.step,
            self.min_z + iz as f32 * self.step,
        )
    }

    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Probes every grid point of a region from the ceiling down to the floor.
pub struct SpatialSampler<'a, G: GroundProbe + ?Sized> {
    probe: &'a G,
    config: SamplerConfig,
}

impl<'a, G: GroundProbe + ?Sized> SpatialSampler<'a, G> {
    pub fn new(probe: &'a G, config: SamplerConfig) -> Self {
        Self { probe, config }
    }

    pub fn sample(&self) -> NavResult<SampleGrid> {
        self.config.validate()?;
        let cfg = &self.config;
        let min_x = cfg.corner_a[0].min(cfg.corner_b[0]);
        let max_x = cfg.corner_a[0].max(cfg.corner_b[0]);
        let min_z = cfg.corner_a[1].min(cfg.corner_b[1]);
        let max_z = cfg.corner_a[1].max(cfg.corner_b[1]);
        let step = 1.0 / cfg.density;
        let width = ((max_x - min_x) * cfg.density).floor() as usize + 1;
        let depth = ((max_z - min_z) * cfg.density).floor() as usize + 1;
        let band = (cfg.floor, cfg.ceiling);

        let mut cells = vec![None; width * depth];
        cells
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(iz, row)| {
                let z = min_z + iz as f32 * step;
                for (ix, cell) in row.iter_mut().enumerate() {
                    let x = min_x + ix as f32 * step;
                    *cell = self
                        .probe
                        .ground_height(x, z, band)
                        .filter(|h| *h >= band.0 && *h <= band.1);
                }
            });

        let grid = SampleGrid::from_cells(min_x, min_z, step, width, band, cells)?;
        debug!(
            "sampled {}x{} grid, {} open cells",
            grid.width(),
            grid.depth(),
            grid.open_count()
        );
        Ok(grid)
    }
}
