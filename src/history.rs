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

//! Exact bias accumulation by resummation over all past hills.
//!
//! Stores the full time series of every collective variable plus the bias
//! potential recorded at each deposition event, and evaluates the current
//! potential and its gradient analytically by summing over every hill.
//! Memory and per-step cost grow without bound, the trade-off against the
//! fixed-footprint [`BiasGrid`](crate::bias_grid::BiasGrid).

use crate::Info;
use itertools::izip;

/// Per-variable sample history and per-deposition potential record.
#[derive(Debug, Clone, Default)]
pub struct HillHistory {
    /// One series per collective variable, appended every step
    /// (not only on deposition steps).
    samples: Vec<Vec<f64>>,
    /// Bias potential at each deposition event, in deposition order.
    /// Fixes the well-tempered scale factor of the corresponding hill.
    deposited: Vec<f64>,
}

impl HillHistory {
    pub fn new(num_variables: usize) -> Self {
        Self {
            samples: vec![Vec::new(); num_variables],
            deposited: Vec::new(),
        }
    }

    /// Append the current CV values, one per variable.
    pub fn record(&mut self, values: &[f64]) {
        debug_assert_eq!(values.len(), self.samples.len());
        for (series, &value) in self.samples.iter_mut().zip(values) {
            series.push(value);
        }
    }

    /// Record a deposition event at the current bias potential.
    pub fn push_deposition(&mut self, potential: f64) {
        self.deposited.push(potential);
    }

    pub fn num_depositions(&self) -> usize {
        self.deposited.len()
    }

    /// Number of recorded steps.
    pub fn num_samples(&self) -> usize {
        self.samples.first().map_or(0, Vec::len)
    }

    /// Bias potential and its per-variable partial derivatives at `current`,
    /// by direct summation over every past hill.
    ///
    /// Hill `k` was deposited at recorded step `k·stride` with effective
    /// height `w·exp(-deposited[k]/t_shift)`; the gradient is analytic, so
    /// no finite differences are involved. O(num_depositions) per call.
    pub fn evaluate(
        &self,
        current: &[f64],
        sigmas: &[f64],
        w: f64,
        t_shift: f64,
        stride: usize,
    ) -> (f64, Vec<f64>) {
        debug_assert_eq!(current.len(), self.samples.len());
        debug_assert_eq!(sigmas.len(), self.samples.len());

        let mut potential = 0.0;
        let mut derivatives = vec![0.0; current.len()];

        for (hill, &recorded_potential) in self.deposited.iter().enumerate() {
            let step = hill * stride;
            let exponent: f64 = izip!(current, sigmas, &self.samples)
                .map(|(&x, &sigma, series)| {
                    let distance = x - series[step];
                    distance * distance / (2.0 * sigma * sigma)
                })
                .sum();
            let gauss = (-exponent).exp();
            let scale = (-recorded_potential / t_shift).exp();

            for (derivative, &x, &sigma, series) in
                izip!(&mut derivatives, current, sigmas, &self.samples)
            {
                *derivative -= w * scale / (sigma * sigma) * (x - series[step]) * gauss;
            }
            potential += w * scale * gauss;
        }
        (potential, derivatives)
    }
}

impl Info for HillHistory {
    fn short_name(&self) -> Option<&'static str> {
        Some("hill_history")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Exact hill-by-hill metadynamics bias potential")
    }
}
