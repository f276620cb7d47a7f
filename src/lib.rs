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

//! Well-tempered metadynamics for molecular simulation.
//!
//! Metadynamics flattens free-energy landscapes by depositing a
//! history-dependent bias potential along one or more *collective
//! variables* (CVs), scalar observables of the simulation state.
//! On a fixed deposition cadence a Gaussian "hill" is added at the
//! current point in CV space; forces derived from the accumulated bias
//! discourage revisiting already-sampled regions.
//!
//! Two accumulation strategies are provided:
//! - [`HillHistory`]: exact resummation over every past hill.
//!   Memory and per-step cost grow linearly with the number of
//!   depositions.
//! - [`BiasGrid`]: the bias tabulated on a dense multi-dimensional
//!   grid with multilinear interpolation. Fixed memory footprint,
//!   and the grid can be dumped to a text file and restarted from.
//!
//! The [`MetaDynamics`] engine advances one step at a time in
//! lock-step with an external integrator: it pulls the current value
//! from each registered CV, evaluates the bias potential and its
//! partial derivatives, deposits a hill when due (rescaled by the
//! well-tempered factor `exp(-V/ΔT)`), and pushes the resulting bias
//! factor back into each CV for the subsequent force evaluation.

mod auxiliary;
pub mod bias_grid;
pub mod cli;
pub mod collective_variable;
pub mod engine;
pub mod grid_index;
pub mod history;

pub use bias_grid::BiasGrid;
pub use collective_variable::{
    CollectiveVariable, CoordinateVariable, CvBinding, CvHandle, GridAxis,
};
pub use engine::{MetaDynamics, MetaDynamicsBuilder};
pub use grid_index::GridIndex;
pub use history::HillHistory;

/// Short and long descriptive names for identifying objects in logs and reports.
pub trait Info {
    /// Lowercase identifier without spaces.
    fn short_name(&self) -> Option<&'static str> {
        None
    }
    /// Human-readable description.
    fn long_name(&self) -> Option<&'static str> {
        None
    }
}
