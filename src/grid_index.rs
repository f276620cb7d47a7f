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

//! Flat storage addressing for dense multi-dimensional grids.

/// Row-major mapping between D-dimensional grid coordinates and flat offsets.
///
/// The last axis varies fastest: `offset = Σ_i c_i · Π_{j>i} L_j`.
/// Coordinates must satisfy `c_i < L_i` and offsets must be below
/// [`num_elements`](Self::num_elements); violations are caller errors,
/// guarded by `debug_assert!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridIndex {
    lengths: Vec<usize>,
}

impl GridIndex {
    /// Create an index over the given per-axis lengths. All lengths must be nonzero.
    pub fn new(lengths: Vec<usize>) -> Self {
        debug_assert!(lengths.iter().all(|&len| len > 0));
        Self { lengths }
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.lengths.len()
    }

    /// Number of grid points along the given axis.
    pub fn length(&self, axis: usize) -> usize {
        self.lengths[axis]
    }

    /// Per-axis lengths.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Total number of grid points (product of all lengths).
    pub fn num_elements(&self) -> usize {
        self.lengths.iter().product()
    }

    /// Linearize a coordinate tuple into a flat offset.
    pub fn flatten(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.lengths.len());
        debug_assert!(coords.iter().zip(&self.lengths).all(|(&c, &len)| c < len));
        coords
            .iter()
            .zip(&self.lengths)
            .fold(0, |offset, (&coord, &length)| offset * length + coord)
    }

    /// Recover the coordinate tuple for a flat offset.
    pub fn unflatten(&self, offset: usize, coords: &mut [usize]) {
        debug_assert_eq!(coords.len(), self.lengths.len());
        debug_assert!(offset < self.num_elements());
        let mut remainder = offset;
        for (coord, &length) in coords.iter_mut().zip(&self.lengths).rev() {
            *coord = remainder % length;
            remainder /= length;
        }
    }

    /// Convenience variant of [`unflatten`](Self::unflatten) that allocates.
    pub fn coordinates(&self, offset: usize) -> Vec<usize> {
        let mut coords = vec![0; self.dimension()];
        self.unflatten(offset, &mut coords);
        coords
    }
}
