// Copyright 2025 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Gridded accumulation of the metadynamics bias potential.
//!
//! The bias is tabulated on a dense D-dimensional grid, one axis per
//! collective variable. Depositing a Gaussian hill updates every grid
//! point; evaluation between grid points uses multilinear interpolation
//! and derivatives are obtained by finite differences. Memory is fixed at
//! construction, the trade-off against the exact but unbounded
//! [`HillHistory`](crate::history::HillHistory).

use crate::auxiliary::{self, fmt_float};
use crate::collective_variable::GridAxis;
use crate::grid_index::GridIndex;
use crate::Info;
use anyhow::{bail, ensure, Context, Result};
use itertools::izip;
use std::io::{BufRead, Write};
use std::path::Path;

/// Dense grid of accumulated bias-potential samples.
///
/// Axis order matches the engine's CV registry order and is fixed for the
/// lifetime of the grid; hill deposition mutates the samples in place and
/// the grid is never resized.
#[derive(Debug, Clone)]
pub struct BiasGrid {
    axes: Vec<GridAxis>,
    index: GridIndex,
    values: Vec<f64>,
}

impl BiasGrid {
    /// Create a zero-initialized grid over the given axes.
    pub fn new(axes: Vec<GridAxis>) -> Result<Self> {
        ensure!(
            !axes.is_empty(),
            "A bias grid requires at least one collective variable axis"
        );
        for axis in &axes {
            axis.validate()?;
        }
        let index = GridIndex::new(axes.iter().map(|axis| axis.num_points).collect());
        let values = vec![0.0; index.num_elements()];
        Ok(Self {
            axes,
            index,
            values,
        })
    }

    /// Number of collective variable axes.
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn grid_index(&self) -> &GridIndex {
        &self.index
    }

    /// Stored bias value at a flat grid offset.
    pub fn value(&self, offset: usize) -> f64 {
        self.values[offset]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Add a Gaussian hill of the given height centered at `center`.
    ///
    /// Every grid point is updated with
    /// `height · exp(-Σ_i (center_i - coord_i)² / (2σ_i²))`. The full-grid
    /// scan is O(grid size × D) per deposition.
    pub fn deposit(&mut self, center: &[f64], sigmas: &[f64], height: f64) {
        debug_assert_eq!(center.len(), self.dimension());
        debug_assert_eq!(sigmas.len(), self.dimension());

        let mut coords = vec![0; self.index.dimension()];
        for offset in 0..self.index.num_elements() {
            self.index.unflatten(offset, &mut coords);
            let exponent: f64 = izip!(&self.axes, &coords, center, sigmas)
                .map(|(axis, &coord, &x, &sigma)| {
                    let distance = x - axis.coord(coord);
                    distance * distance / (2.0 * sigma * sigma)
                })
                .sum();
            self.values[offset] += height * (-exponent).exp();
        }
    }

    /// Bracketing interval and fractional offset of `x` along one axis, or
    /// `None` if `x` lies outside `[min, max]`. A value exactly at `max`
    /// belongs to the last interval, so grid points on the upper boundary
    /// interpolate exactly.
    fn locate(axis: &GridAxis, x: f64) -> Option<(usize, f64)> {
        if !axis.contains(x) {
            return None;
        }
        let interval = (((x - axis.min) / axis.delta()) as usize).min(axis.num_points - 2);
        let fraction = (x - axis.coord(interval)) / axis.delta();
        Some((interval, fraction))
    }

    /// Multilinear interpolation of the bias potential at `point`, or `None`
    /// if any component is outside its axis range.
    ///
    /// Sums all 2^D corner values of the bracketing cell weighted by the
    /// per-axis fractional offsets. Exact at grid points, continuous
    /// everywhere, but not differentiable in closed form; derivatives use
    /// finite differences ([`derivative`](Self::derivative)).
    pub fn try_potential(&self, point: &[f64]) -> Option<f64> {
        debug_assert_eq!(point.len(), self.dimension());

        let dimension = self.dimension();
        let mut lower = Vec::with_capacity(dimension);
        let mut fraction = Vec::with_capacity(dimension);
        for (axis, &x) in self.axes.iter().zip(point) {
            let (interval, t) = Self::locate(axis, x)?;
            lower.push(interval);
            fraction.push(t);
        }

        let mut corner = vec![0; dimension];
        let mut result = 0.0;
        for bits in 0..(1usize << dimension) {
            let mut weight = 1.0;
            for (i, (&low, &t)) in lower.iter().zip(&fraction).enumerate() {
                if bits & (1 << i) != 0 {
                    corner[i] = low + 1;
                    weight *= t;
                } else {
                    corner[i] = low;
                    weight *= 1.0 - t;
                }
            }
            result += weight * self.values[self.index.flatten(&corner)];
        }
        Some(result)
    }

    /// Bias potential at `point`.
    ///
    /// An out-of-range point is a recoverable runtime condition: a warning
    /// is logged and zero is returned, allowing the simulation to proceed.
    pub fn potential(&self, point: &[f64]) -> f64 {
        self.try_potential(point).unwrap_or_else(|| {
            log::warn!(
                "Collective variable value {:?} out of grid bounds; assuming zero bias potential",
                point
            );
            0.0
        })
    }

    /// Partial derivative of the interpolated potential along `axis`,
    /// by finite differences with the grid spacing as step size.
    ///
    /// Within one spacing of the lower domain edge a forward difference is
    /// used, within one spacing of the upper edge a backward difference,
    /// and a central difference otherwise, so that no probe point leaves
    /// the domain. Each probe is a full interpolation.
    pub fn derivative(&self, point: &[f64], axis: usize) -> f64 {
        let delta = self.axes[axis].delta();
        let x = point[axis];
        let mut probe = point.to_vec();

        if x - delta < self.axes[axis].min {
            probe[axis] = x + delta;
            (self.potential(&probe) - self.potential(point)) / delta
        } else if x + delta > self.axes[axis].max {
            probe[axis] = x - delta;
            (self.potential(point) - self.potential(&probe)) / delta
        } else {
            let mut lower_probe = point.to_vec();
            probe[axis] = x + delta;
            lower_probe[axis] = x - delta;
            (self.potential(&probe) - self.potential(&lower_probe)) / (2.0 * delta)
        }
    }

    /// Write the grid as a text table: a three-line header (dimensionality,
    /// per-axis lengths, column names) followed by one row per flattened
    /// grid point with the stored value and the reconstructed coordinates.
    pub fn write(&self, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "#n_cv: {}", self.dimension())?;
        write!(writer, "#dim:")?;
        for length in self.index.lengths() {
            write!(writer, " {}", length)?;
        }
        writeln!(writer)?;

        write!(writer, "grid_value")?;
        for i in 0..self.dimension() {
            write!(writer, "\tcv{}", i)?;
        }
        writeln!(writer)?;

        let mut coords = vec![0; self.index.dimension()];
        for offset in 0..self.index.num_elements() {
            self.index.unflatten(offset, &mut coords);
            write!(writer, "{}", fmt_float(self.values[offset]))?;
            for (axis, &coord) in self.axes.iter().zip(&coords) {
                write!(writer, "\t{}", fmt_float(axis.coord(coord)))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Dump the grid to a file (gzip-compressed if the extension is `.gz`).
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("Dumping bias grid to {:?}", path);
        let mut writer = auxiliary::open_compressed(path)?;
        self.write(&mut writer)
            .with_context(|| format!("Failed to write grid file {:?}", path))
    }

    /// Overwrite the grid contents from a previously dumped table.
    ///
    /// The header's dimensionality and per-axis lengths must match the live
    /// configuration; a mismatch or a premature end of input is a fatal
    /// error and may leave the grid partially overwritten.
    pub fn load(&mut self, reader: &mut dyn BufRead) -> Result<()> {
        let mut line = String::new();

        let mut read_line = |line: &mut String| -> Result<()> {
            line.clear();
            ensure!(
                reader.read_line(line)? > 0,
                "Premature end of grid file"
            );
            Ok(())
        };

        read_line(&mut line)?;
        let n_cv: usize = line
            .trim()
            .strip_prefix("#n_cv:")
            .context("Grid file header is missing '#n_cv:'")?
            .trim()
            .parse()
            .context("Invalid dimensionality in grid file header")?;
        ensure!(
            n_cv == self.dimension(),
            "Grid file has {} collective variables but the configuration has {}",
            n_cv,
            self.dimension()
        );

        read_line(&mut line)?;
        let lengths = line
            .trim()
            .strip_prefix("#dim:")
            .context("Grid file header is missing '#dim:'")?
            .split_whitespace()
            .map(|token| token.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid axis length in grid file header")?;
        ensure!(
            lengths == self.index.lengths(),
            "Grid file dimensions {:?} do not match the configured grid {:?}",
            lengths,
            self.index.lengths()
        );

        // Column header carries no data.
        read_line(&mut line)?;

        for offset in 0..self.index.num_elements() {
            read_line(&mut line)
                .with_context(|| format!("Grid file ends after {} of {} values", offset, self.index.num_elements()))?;
            let value = match line.split_whitespace().next() {
                Some(token) => token
                    .parse::<f64>()
                    .with_context(|| format!("Invalid grid value '{}'", token))?,
                None => bail!("Empty line in grid file at value {}", offset),
            };
            self.values[offset] = value;
        }
        Ok(())
    }

    /// Restore the grid from a dumped file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("Reading bias grid from {:?}", path);
        let mut reader = auxiliary::open_compressed_read(path)?;
        self.load(&mut reader)
            .with_context(|| format!("Failed to read grid file {:?}", path))
    }
}

impl Info for BiasGrid {
    fn short_name(&self) -> Option<&'static str> {
        Some("bias_grid")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Gridded metadynamics bias potential")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_grid() -> BiasGrid {
        // Domain [0, 10] with unit spacing.
        BiasGrid::new(vec![GridAxis::new(0.0, 10.0, 11).unwrap()]).unwrap()
    }

    #[test]
    fn single_hill_values() {
        let mut grid = unit_grid();
        grid.deposit(&[5.0], &[1.0], 1.0);

        assert_relative_eq!(grid.value(5), 1.0, epsilon = 1e-12);
        assert_relative_eq!(grid.value(4), (-0.5f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(grid.value(6), (-0.5f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(grid.value(0), (-12.5f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn interpolation_exact_at_grid_points() {
        let mut grid = unit_grid();
        grid.deposit(&[3.0], &[2.0], 0.7);
        for i in 0..11 {
            assert_relative_eq!(
                grid.potential(&[i as f64]),
                grid.value(i),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn deposition_symmetry() {
        let mut grid = unit_grid();
        grid.deposit(&[5.0], &[1.0], 1.0);
        assert_relative_eq!(grid.potential(&[5.0]), 1.0, epsilon = 1e-12);
        // Symmetric neighbors cancel in the central difference.
        assert_relative_eq!(grid.derivative(&[5.0], 0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn interpolation_is_linear_between_points() {
        let mut grid = unit_grid();
        grid.deposit(&[5.0], &[1.0], 1.0);
        let midpoint = grid.potential(&[4.5]);
        assert_relative_eq!(
            midpoint,
            0.5 * (grid.value(4) + grid.value(5)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn out_of_bounds_yields_zero() {
        let mut grid = unit_grid();
        grid.deposit(&[5.0], &[1.0], 1.0);
        assert_eq!(grid.try_potential(&[-0.1]), None);
        assert_eq!(grid.try_potential(&[10.1]), None);
        assert_relative_eq!(grid.potential(&[-0.1]), 0.0);
        // The domain is closed: both boundaries evaluate.
        assert!(grid.try_potential(&[0.0]).is_some());
        assert!(grid.try_potential(&[10.0]).is_some());
        assert_relative_eq!(grid.potential(&[10.0]), grid.value(10), epsilon = 1e-12);
    }

    #[test]
    fn boundary_derivative_policy() {
        let mut grid = unit_grid();
        // Off-center hill so forward/backward/central formulas all differ.
        grid.deposit(&[3.0], &[2.0], 1.0);
        let f = |x: f64| grid.potential(&[x]);

        // Within one spacing of the lower edge: forward difference.
        let x = 0.5;
        assert_relative_eq!(
            grid.derivative(&[x], 0),
            (f(x + 1.0) - f(x)) / 1.0,
            epsilon = 1e-12
        );

        // Within one spacing of the upper edge: backward difference.
        let x = 9.5;
        assert_relative_eq!(
            grid.derivative(&[x], 0),
            (f(x) - f(x - 1.0)) / 1.0,
            epsilon = 1e-12
        );

        // Interior: central difference.
        let x = 5.25;
        assert_relative_eq!(
            grid.derivative(&[x], 0),
            (f(x + 1.0) - f(x - 1.0)) / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn two_dimensional_bilinear() {
        let axes = vec![
            GridAxis::new(0.0, 4.0, 5).unwrap(),
            GridAxis::new(-1.0, 1.0, 3).unwrap(),
        ];
        let mut grid = BiasGrid::new(axes).unwrap();
        grid.deposit(&[2.0, 0.0], &[1.0, 0.5], 1.0);

        // Exact at the deposition center (a grid point).
        assert_relative_eq!(grid.potential(&[2.0, 0.0]), 1.0, epsilon = 1e-12);

        // Bilinear average at the cell center.
        let corners = [
            grid.value(grid.grid_index().flatten(&[2, 1])),
            grid.value(grid.grid_index().flatten(&[2, 2])),
            grid.value(grid.grid_index().flatten(&[3, 1])),
            grid.value(grid.grid_index().flatten(&[3, 2])),
        ];
        let center = grid.potential(&[2.5, 0.5]);
        assert_relative_eq!(
            center,
            corners.iter().sum::<f64>() / 4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn dump_restart_roundtrip_is_idempotent() {
        let mut grid = unit_grid();
        grid.deposit(&[5.0], &[1.0], 1.0);
        grid.deposit(&[2.5], &[0.7], 0.3);

        let mut first = Vec::new();
        grid.write(&mut first).unwrap();

        let mut restored = unit_grid();
        restored.load(&mut first.as_slice()).unwrap();

        let mut second = Vec::new();
        restored.write(&mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dump_restart_via_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.dat");

        let mut grid = unit_grid();
        grid.deposit(&[5.0], &[1.0], 1.0);
        grid.to_file(&path).unwrap();

        let mut restored = unit_grid();
        restored.load_file(&path).unwrap();
        for offset in 0..11 {
            assert_relative_eq!(restored.value(offset), grid.value(offset));
        }
    }

    #[test]
    fn restart_rejects_mismatched_dimensions() {
        let mut grid = unit_grid();
        grid.deposit(&[5.0], &[1.0], 1.0);
        let mut dump = Vec::new();
        grid.write(&mut dump).unwrap();

        // Same dimensionality, different axis length.
        let mut other = BiasGrid::new(vec![GridAxis::new(0.0, 10.0, 21).unwrap()]).unwrap();
        assert!(other.load(&mut dump.as_slice()).is_err());

        // Different dimensionality.
        let mut two_dim = BiasGrid::new(vec![
            GridAxis::new(0.0, 10.0, 11).unwrap(),
            GridAxis::new(0.0, 1.0, 2).unwrap(),
        ])
        .unwrap();
        assert!(two_dim.load(&mut dump.as_slice()).is_err());
    }

    #[test]
    fn restart_rejects_short_file() {
        let mut grid = unit_grid();
        grid.deposit(&[5.0], &[1.0], 1.0);
        let mut dump = Vec::new();
        grid.write(&mut dump).unwrap();

        // Drop the last data line.
        let text = String::from_utf8(dump).unwrap();
        let truncated: String = text.lines().take(13).map(|l| format!("{l}\n")).collect();

        let mut restored = unit_grid();
        assert!(restored.load(&mut truncated.as_bytes()).is_err());
    }

    #[test]
    fn empty_axes_rejected() {
        assert!(BiasGrid::new(Vec::new()).is_err());
    }
}
