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

//! Collective variables for enhanced sampling.
//!
//! A collective variable (CV) maps the simulation state to a single scalar
//! value. The engine treats each CV as opaque: it reads the current value,
//! and writes back a *bias factor*, the partial derivative of the bias
//! potential with respect to the CV, by which the CV's force contribution
//! must be multiplied.
//!
//! CVs are shared between the engine and the integrator through
//! [`CvHandle`] (`Rc<RefCell<..>>`); the whole stack is single-threaded,
//! advanced once per step from one coordinating caller.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A scalar observable of the simulation state that can receive a bias factor.
pub trait CollectiveVariable: std::fmt::Debug {
    /// Current value of the collective variable at the given timestep.
    fn current_value(&mut self, timestep: usize) -> f64;

    /// Set the bias factor, the derivative of the bias potential with
    /// respect to this variable. Must be called before force evaluation.
    fn set_bias_factor(&mut self, bias: f64);

    /// Most recently set bias factor.
    fn bias_factor(&self) -> f64;

    /// Stable name, used for log-file column headers.
    fn name(&self) -> &str;
}

/// Shared handle to a collective variable.
///
/// The engine and the integrator both hold handles; neither owns the CV.
pub type CvHandle = Rc<RefCell<dyn CollectiveVariable>>;

/// Grid discretization of one collective variable axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridAxis {
    pub min: f64,
    pub max: f64,
    pub num_points: usize,
}

impl GridAxis {
    pub fn new(min: f64, max: f64, num_points: usize) -> Result<Self> {
        let axis = Self {
            min,
            max,
            num_points,
        };
        axis.validate()?;
        Ok(axis)
    }

    /// Check the axis invariants: `min < max` and at least two grid points.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min < self.max,
            "Maximum grid value ({}) must be greater than minimum value ({})",
            self.max,
            self.min
        );
        ensure!(
            self.num_points >= 2,
            "Number of grid points must be at least two, got {}",
            self.num_points
        );
        Ok(())
    }

    /// Grid spacing.
    pub fn delta(&self) -> f64 {
        (self.max - self.min) / (self.num_points - 1) as f64
    }

    /// Coordinate of the i-th grid point.
    pub fn coord(&self, i: usize) -> f64 {
        self.min + i as f64 * self.delta()
    }

    /// Whether `value` lies within the closed interval `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One collective variable registered with the engine: the shared handle,
/// the Gaussian deposition width along this axis, and (for grid mode) the
/// grid discretization.
///
/// The order of bindings in the engine's registry is significant: it fixes
/// the grid axis order, the hill-log column order, and the restart-file
/// layout, and is frozen once the engine initializes.
#[derive(Debug, Clone)]
pub struct CvBinding {
    pub cv: CvHandle,
    pub sigma: f64,
    pub axis: Option<GridAxis>,
}

impl CvBinding {
    pub fn new(cv: CvHandle, sigma: f64, axis: Option<GridAxis>) -> Result<Self> {
        ensure!(
            sigma > 0.0,
            "Gaussian width for collective variable '{}' must be positive, got {}",
            cv.borrow().name(),
            sigma
        );
        if let Some(axis) = &axis {
            axis.validate()?;
        }
        Ok(Self { cv, sigma, axis })
    }

    /// Name of the bound collective variable.
    pub fn name(&self) -> String {
        self.cv.borrow().name().to_string()
    }
}

/// Collective variable backed by a shared scalar coordinate.
///
/// The integrator updates the coordinate through its own `Rc<Cell<f64>>`
/// clone; the engine reads it here. Doubles as the standard test CV.
#[derive(Debug, Clone)]
pub struct CoordinateVariable {
    name: String,
    coordinate: Rc<Cell<f64>>,
    bias: f64,
}

impl CoordinateVariable {
    pub fn new(name: impl Into<String>, coordinate: Rc<Cell<f64>>) -> Self {
        Self {
            name: name.into(),
            coordinate,
            bias: 0.0,
        }
    }

    /// Wrap into a shared handle for registration with the engine.
    pub fn into_handle(self) -> CvHandle {
        Rc::new(RefCell::new(self))
    }
}

impl CollectiveVariable for CoordinateVariable {
    fn current_value(&mut self, _timestep: usize) -> f64 {
        self.coordinate.get()
    }

    fn set_bias_factor(&mut self, bias: f64) {
        self.bias = bias;
    }

    fn bias_factor(&self) -> f64 {
        self.bias
    }

    fn name(&self) -> &str {
        &self.name
    }
}
