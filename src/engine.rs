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

//! Well-tempered metadynamics driver.
//!
//! [`MetaDynamics`] advances in lock-step with an external integrator,
//! exactly one [`advance`](MetaDynamics::advance) call per simulation step.
//! Each step it pulls the current value from every registered collective
//! variable, evaluates the accumulated bias potential and its per-variable
//! derivatives, deposits a new Gaussian hill when the stride is due, logs
//! the hill, and pushes the derivatives back into the variables as bias
//! factors for the subsequent force evaluation.
//!
//! The engine is a two-state machine. Until the first `advance` call it is
//! *uninitialized*: collective variables may be registered and the
//! accumulation mode changed. The first `advance` allocates the chosen
//! accumulator (grid or history), opens the hill log, applies a pending
//! grid restart, and freezes the registry; structural mutation afterwards
//! is a configuration error.

use crate::auxiliary::fmt_float;
use crate::bias_grid::BiasGrid;
use crate::collective_variable::{CvBinding, CvHandle, GridAxis};
use crate::history::HillHistory;
use crate::Info;
use anyhow::{anyhow, bail, ensure, Context, Result};
use average::{Estimate, Mean};
use derive_more::Debug;
use itertools::izip;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// The active bias accumulation strategy, chosen at initialization.
#[derive(Debug, Clone)]
enum Accumulator {
    Grid(BiasGrid),
    History(HillHistory),
}

/// Append-aware writer for the hill log file.
///
/// One tab-delimited row per deposition: timestep, effective hill height,
/// then value and width per collective variable. If the file already
/// exists and overwrite was not requested, rows are appended and the
/// header is skipped.
#[derive(Debug)]
struct HillsLog {
    #[debug(skip)]
    stream: BufWriter<File>,
}

impl HillsLog {
    fn open(path: &Path, overwrite: bool, bindings: &[CvBinding]) -> Result<Self> {
        let append = path.exists() && !overwrite;
        let file = if append {
            log::info!("Appending hills to existing file {:?}", path);
            OpenOptions::new()
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open hills file {:?}", path))?
        } else {
            log::info!("Creating hills file {:?}", path);
            File::create(path)
                .with_context(|| format!("Failed to create hills file {:?}", path))?
        };
        let mut hills = Self {
            stream: BufWriter::new(file),
        };
        if !append {
            hills.write_header(bindings)?;
        }
        Ok(hills)
    }

    fn write_header(&mut self, bindings: &[CvBinding]) -> Result<()> {
        write!(self.stream, "timestep\tW")?;
        for binding in bindings {
            let name = binding.name();
            write!(self.stream, "\t{name}\tsigma_{name}")?;
        }
        writeln!(self.stream)?;
        Ok(())
    }

    fn record(
        &mut self,
        timestep: usize,
        height: f64,
        values: &[f64],
        sigmas: &[f64],
    ) -> Result<()> {
        write!(self.stream, "{timestep}\t{}", fmt_float(height))?;
        for (&value, &sigma) in values.iter().zip(sigmas) {
            write!(self.stream, "\t{}\t{}", fmt_float(value), fmt_float(sigma))?;
        }
        writeln!(self.stream)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }
}

/// Running statistics over deposited hills.
#[derive(Debug, Clone)]
pub struct DepositionStatistics {
    num_hills: usize,
    mean_height: Mean,
    last_height: Option<f64>,
}

impl Default for DepositionStatistics {
    fn default() -> Self {
        Self {
            num_hills: 0,
            mean_height: Mean::new(),
            last_height: None,
        }
    }
}

impl DepositionStatistics {
    fn add(&mut self, height: f64) {
        self.num_hills += 1;
        self.mean_height.add(height);
        self.last_height = Some(height);
    }

    pub fn num_hills(&self) -> usize {
        self.num_hills
    }

    /// Mean effective hill height over all depositions.
    pub fn mean_height(&self) -> f64 {
        self.mean_height.mean()
    }

    /// Effective height of the most recent hill.
    pub fn last_height(&self) -> Option<f64> {
        self.last_height
    }

    pub fn to_yaml(&self) -> Option<serde_yaml::Value> {
        let mut map = serde_yaml::Mapping::new();
        map.insert("num_hills".into(), self.num_hills.into());
        if self.num_hills > 0 {
            map.insert("mean_height".into(), self.mean_height().into());
            map.insert("last_height".into(), self.last_height?.into());
        }
        Some(serde_yaml::Value::Mapping(map))
    }
}

/// YAML builder for [`MetaDynamics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetaDynamicsBuilder {
    /// Hill height before well-tempered rescaling (energy units).
    pub w: f64,
    /// Well-tempered temperature shift ΔT; the effective hill height decays
    /// as `exp(-V/ΔT)`. Large values approximate standard metadynamics.
    pub t_shift: f64,
    /// Number of steps between hill depositions.
    pub stride: usize,
    /// Hill log file; no log is written when absent.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hills_file: Option<PathBuf>,
    /// Overwrite an existing hill log instead of appending to it.
    #[serde(default)]
    pub overwrite: bool,
    /// Deposit new hills; disable to run an existing bias forward unchanged.
    #[serde(default = "default_add_hills")]
    pub add_hills: bool,
    /// Accumulate on a grid instead of the exact hill history.
    #[serde(default)]
    pub use_grid: bool,
}

fn default_add_hills() -> bool {
    true
}

impl MetaDynamicsBuilder {
    pub fn build(&self) -> Result<MetaDynamics> {
        let mut engine = MetaDynamics::new(self.w, self.t_shift, self.stride)?;
        if let Some(path) = &self.hills_file {
            engine.set_hills_file(path, self.overwrite)?;
        }
        engine.set_use_grid(self.use_grid)?;
        engine.set_deposition_enabled(self.add_hills);
        Ok(engine)
    }
}

/// Metadynamics bias-accumulation engine.
#[derive(Debug)]
pub struct MetaDynamics {
    w: f64,
    t_shift: f64,
    stride: usize,
    deposition_enabled: bool,
    use_grid: bool,
    bindings: Vec<CvBinding>,
    /// `None` until the first `advance` call; allocation marks initialization.
    accumulator: Option<Accumulator>,
    bias_potential: f64,
    step_counter: usize,
    hills_path: Option<PathBuf>,
    overwrite_hills: bool,
    #[debug(skip)]
    hills: Option<HillsLog>,
    restart_path: Option<PathBuf>,
    statistics: DepositionStatistics,
    gave_empty_warning: bool,
}

impl MetaDynamics {
    /// Create an engine with hill height `w`, well-tempered temperature
    /// shift `t_shift`, and deposition stride (in steps).
    pub fn new(w: f64, t_shift: f64, stride: usize) -> Result<Self> {
        ensure!(w > 0.0, "Hill height W must be positive, got {}", w);
        ensure!(
            t_shift > 0.0,
            "Temperature shift must be positive, got {}",
            t_shift
        );
        ensure!(stride >= 1, "Deposition stride must be at least one step");
        Ok(Self {
            w,
            t_shift,
            stride,
            deposition_enabled: true,
            use_grid: false,
            bindings: Vec::new(),
            accumulator: None,
            bias_potential: 0.0,
            step_counter: 0,
            hills_path: None,
            overwrite_hills: false,
            hills: None,
            restart_path: None,
            statistics: DepositionStatistics::default(),
            gave_empty_warning: false,
        })
    }

    fn ensure_uninitialized(&self, operation: &str) -> Result<()> {
        ensure!(
            self.accumulator.is_none(),
            "Cannot {} after initialization",
            operation
        );
        Ok(())
    }

    /// Register a collective variable with its Gaussian width and, for grid
    /// mode, its grid discretization. Registration order fixes the grid
    /// axis order and the hill-log column order.
    pub fn register(
        &mut self,
        cv: CvHandle,
        sigma: f64,
        axis: Option<GridAxis>,
    ) -> Result<()> {
        self.ensure_uninitialized("register a collective variable")?;
        self.bindings.push(CvBinding::new(cv, sigma, axis)?);
        Ok(())
    }

    /// Switch between grid and history accumulation.
    pub fn set_use_grid(&mut self, use_grid: bool) -> Result<()> {
        self.ensure_uninitialized("change the accumulation mode")?;
        if use_grid {
            for binding in &self.bindings {
                let axis = binding.axis.as_ref().ok_or_else(|| {
                    anyhow!(
                        "Collective variable '{}' has no grid discretization; \
                         grid mode requires one for every variable",
                        binding.name()
                    )
                })?;
                axis.validate()?;
            }
        }
        self.use_grid = use_grid;
        Ok(())
    }

    /// Write hill depositions to `path`. Appends if the file exists,
    /// unless `overwrite` is set.
    pub fn set_hills_file(&mut self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        self.ensure_uninitialized("change the hills file")?;
        self.hills_path = Some(path.as_ref().to_path_buf());
        self.overwrite_hills = overwrite;
        Ok(())
    }

    /// Initialize the grid from a previously dumped grid file. The file is
    /// read during lazy initialization on the first `advance` call.
    pub fn restart_from_grid(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_uninitialized("restart from a grid file")?;
        self.restart_path = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    /// Enable or disable deposition of new hills. Legal at any time;
    /// disabling lets an existing bias act on the dynamics without growing.
    pub fn set_deposition_enabled(&mut self, enabled: bool) {
        log::debug!("Hill deposition enabled: {}", enabled);
        self.deposition_enabled = enabled;
    }

    /// Whether the first `advance` call has frozen the configuration.
    pub fn is_initialized(&self) -> bool {
        self.accumulator.is_some()
    }

    /// Bias potential at the most recently sampled point in CV space.
    pub fn bias_potential(&self) -> f64 {
        self.bias_potential
    }

    /// Number of completed `advance` calls.
    pub fn num_steps(&self) -> usize {
        self.step_counter
    }

    pub fn statistics(&self) -> &DepositionStatistics {
        &self.statistics
    }

    /// The grid accumulator, if initialized in grid mode.
    pub fn grid(&self) -> Option<&BiasGrid> {
        match &self.accumulator {
            Some(Accumulator::Grid(grid)) => Some(grid),
            _ => None,
        }
    }

    /// The history accumulator, if initialized in history mode.
    pub fn history(&self) -> Option<&HillHistory> {
        match &self.accumulator {
            Some(Accumulator::History(history)) => Some(history),
            _ => None,
        }
    }

    /// Registered collective variables, in registration order.
    pub fn bindings(&self) -> &[CvBinding] {
        &self.bindings
    }

    /// Allocate the accumulator, open the hill log, and apply a pending
    /// grid restart. Called once, from the first `advance`.
    fn initialize(&mut self) -> Result<()> {
        ensure!(
            self.use_grid || self.restart_path.is_none(),
            "Grid information can only be read if grid mode is enabled"
        );
        let accumulator = if self.use_grid {
            let axes = self
                .bindings
                .iter()
                .map(|binding| {
                    binding.axis.clone().ok_or_else(|| {
                        anyhow!(
                            "Collective variable '{}' has no grid discretization; \
                             grid mode requires one for every variable",
                            binding.name()
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let mut grid = BiasGrid::new(axes)?;
            if let Some(path) = self.restart_path.take() {
                grid.load_file(&path)?;
            }
            Accumulator::Grid(grid)
        } else {
            Accumulator::History(HillHistory::new(self.bindings.len()))
        };

        if let Some(path) = self.hills_path.clone() {
            self.hills = Some(HillsLog::open(&path, self.overwrite_hills, &self.bindings)?);
        }
        self.accumulator = Some(accumulator);
        log::info!(
            "Metadynamics initialized: {} collective variable(s), {} accumulation",
            self.bindings.len(),
            if self.use_grid { "grid" } else { "history" }
        );
        Ok(())
    }

    /// Advance the bias potential by one simulation step.
    ///
    /// Pulls current CV values, evaluates the potential and its per-CV
    /// derivatives, deposits a well-tempered hill if the stride is due,
    /// appends to the hill log, and pushes each derivative back into its
    /// CV as the bias factor. With no registered CVs this is a no-op.
    pub fn advance(&mut self, timestep: usize) -> Result<()> {
        if self.bindings.is_empty() {
            if !self.gave_empty_warning {
                log::warn!("No collective variables registered; metadynamics is inactive");
                self.gave_empty_warning = true;
            }
            return Ok(());
        }
        if self.accumulator.is_none() {
            self.initialize()?;
        }

        let values: Vec<f64> = self
            .bindings
            .iter()
            .map(|binding| binding.cv.borrow_mut().current_value(timestep))
            .collect();
        let sigmas: Vec<f64> = self.bindings.iter().map(|binding| binding.sigma).collect();

        let (w, t_shift, stride) = (self.w, self.t_shift, self.stride);
        let depositing = self.deposition_enabled && self.step_counter % stride == 0;
        // Height after well-tempered rescaling at bias potential `v`.
        let hill_height = |v: f64| w * (-v / t_shift).exp();

        let (potential, derivatives) = match self.accumulator.as_mut() {
            Some(Accumulator::Grid(grid)) => {
                let potential = grid.potential(&values);
                let derivatives: Vec<f64> = (0..values.len())
                    .map(|axis| grid.derivative(&values, axis))
                    .collect();
                if depositing {
                    grid.deposit(&values, &sigmas, hill_height(potential));
                }
                (potential, derivatives)
            }
            Some(Accumulator::History(history)) => {
                history.record(&values);
                let (potential, derivatives) =
                    history.evaluate(&values, &sigmas, w, t_shift, stride);
                if depositing {
                    history.push_deposition(potential);
                }
                (potential, derivatives)
            }
            None => unreachable!("accumulator allocated above"),
        };
        self.bias_potential = potential;

        if depositing {
            let height = hill_height(potential);
            self.statistics.add(height);
            if let Some(hills) = &mut self.hills {
                hills.record(timestep, height, &values, &sigmas)?;
            }
        }

        for (binding, &derivative) in izip!(&self.bindings, &derivatives) {
            binding.cv.borrow_mut().set_bias_factor(derivative);
        }
        self.step_counter += 1;
        Ok(())
    }

    /// Dump the grid accumulator to a text file for later restart.
    pub fn dump_grid(&self, path: impl AsRef<Path>) -> Result<()> {
        match &self.accumulator {
            Some(Accumulator::Grid(grid)) => grid.to_file(path),
            Some(Accumulator::History(_)) => {
                bail!("Grid information can only be dumped if grid mode is enabled")
            }
            None => bail!("Cannot dump grid before the first step"),
        }
    }

    /// Flush the hill log, if any.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(hills) = &mut self.hills {
            hills.flush()?;
        }
        Ok(())
    }

    /// Summarize parameters and deposition statistics as a YAML value.
    pub fn to_yaml(&self) -> serde_yaml::Value {
        let mut map = serde_yaml::Mapping::new();
        map.insert("w".into(), self.w.into());
        map.insert("t_shift".into(), self.t_shift.into());
        map.insert("stride".into(), self.stride.into());
        map.insert("use_grid".into(), self.use_grid.into());
        map.insert("steps".into(), self.step_counter.into());
        map.insert("bias_potential".into(), self.bias_potential.into());
        if let Some(statistics) = self.statistics.to_yaml() {
            map.insert("hills".into(), statistics);
        }
        serde_yaml::Value::Mapping(map)
    }
}

impl Info for MetaDynamics {
    fn short_name(&self) -> Option<&'static str> {
        Some("metadynamics")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Well-tempered metadynamics bias accumulation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collective_variable::CoordinateVariable;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn coordinate_cv(value: f64) -> (Rc<Cell<f64>>, CvHandle) {
        let coordinate = Rc::new(Cell::new(value));
        let handle = CoordinateVariable::new("position", coordinate.clone()).into_handle();
        (coordinate, handle)
    }

    fn grid_engine(value: f64) -> (Rc<Cell<f64>>, MetaDynamics) {
        let (coordinate, cv) = coordinate_cv(value);
        let mut engine = MetaDynamics::new(1.0, 10.0, 1).unwrap();
        engine
            .register(cv, 1.0, Some(GridAxis::new(0.0, 10.0, 11).unwrap()))
            .unwrap();
        engine.set_use_grid(true).unwrap();
        (coordinate, engine)
    }

    #[test]
    fn builder_from_yaml() {
        let yaml = r#"
w: 1.0
t_shift: 7.0
stride: 5000
hills_file: hills.dat
use_grid: true
"#;
        let builder: MetaDynamicsBuilder = serde_yaml::from_str(yaml).unwrap();
        assert_relative_eq!(builder.t_shift, 7.0);
        assert_eq!(builder.stride, 5000);
        assert!(builder.add_hills, "deposition defaults to enabled");
        assert!(!builder.overwrite);
        assert!(builder.use_grid);
    }

    #[test]
    fn builder_rejects_unknown_fields() {
        let yaml = "{ w: 1.0, t_shift: 7.0, stride: 10, no_such_field: 1 }";
        assert!(serde_yaml::from_str::<MetaDynamicsBuilder>(yaml).is_err());
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(MetaDynamics::new(0.0, 10.0, 1).is_err());
        assert!(MetaDynamics::new(1.0, -1.0, 1).is_err());
        assert!(MetaDynamics::new(1.0, 10.0, 0).is_err());
    }

    #[test]
    fn structural_mutation_after_initialization_fails() {
        let (_, mut engine) = grid_engine(5.0);
        engine.advance(0).unwrap();
        assert!(engine.is_initialized());

        let (_, other) = coordinate_cv(0.0);
        assert!(engine.register(other, 1.0, None).is_err());
        assert!(engine.set_use_grid(false).is_err());
        assert!(engine.set_hills_file("hills.dat", true).is_err());
        assert!(engine.restart_from_grid("grid.dat").is_err());

        // Toggling deposition stays legal.
        engine.set_deposition_enabled(false);
        engine.advance(1).unwrap();
    }

    #[test]
    fn advance_without_variables_is_noop() {
        let mut engine = MetaDynamics::new(1.0, 10.0, 1).unwrap();
        engine.advance(0).unwrap();
        engine.advance(1).unwrap();
        assert!(!engine.is_initialized());
        assert_relative_eq!(engine.bias_potential(), 0.0);
    }

    #[test]
    fn grid_mode_requires_axes() {
        let (_, cv) = coordinate_cv(0.0);
        let mut engine = MetaDynamics::new(1.0, 10.0, 1).unwrap();
        engine.register(cv, 1.0, None).unwrap();
        assert!(engine.set_use_grid(true).is_err());
    }

    #[test]
    fn restart_requires_grid_mode() {
        let (_, cv) = coordinate_cv(0.0);
        let mut engine = MetaDynamics::new(1.0, 10.0, 1).unwrap();
        engine.register(cv, 1.0, None).unwrap();
        engine.restart_from_grid("grid.dat").unwrap();
        assert!(engine.advance(0).is_err());
    }

    #[test]
    fn well_tempered_heights_decay() {
        let (_, mut engine) = grid_engine(5.0);
        let mut heights = Vec::new();
        for step in 0..20 {
            engine.advance(step).unwrap();
            heights.push(engine.statistics().last_height().unwrap());
        }
        assert_relative_eq!(heights[0], 1.0, epsilon = 1e-12);
        for pair in heights.windows(2) {
            assert!(
                pair[1] < pair[0],
                "hill heights must strictly decrease: {:?}",
                pair
            );
        }
        // Sublinear growth: far below the untempered sum of 20 unit hills.
        assert!(engine.bias_potential() < 20.0 * 0.9);
        assert!(engine.bias_potential() > 0.0);
    }

    #[test]
    fn grid_and_history_agree_at_grid_points() {
        let (_, mut grid_engine) = grid_engine(5.0);

        let (_, cv) = coordinate_cv(5.0);
        let mut history_engine = MetaDynamics::new(1.0, 10.0, 1).unwrap();
        history_engine.register(cv, 1.0, None).unwrap();

        for step in 0..10 {
            grid_engine.advance(step).unwrap();
            history_engine.advance(step).unwrap();
            assert_relative_eq!(
                grid_engine.bias_potential(),
                history_engine.bias_potential(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn derivative_pushes_away_from_hill() {
        let (coordinate, mut engine) = grid_engine(5.0);
        engine.advance(0).unwrap();

        // Move to the downhill side of the deposited Gaussian.
        coordinate.set(6.0);
        engine.advance(1).unwrap();
        let bias = engine.bindings()[0].cv.borrow().bias_factor();
        assert!(bias < 0.0, "potential decreases with x beyond the hill");
    }

    #[test]
    fn deposition_disabled_keeps_bias_flat() {
        let (_, mut engine) = grid_engine(5.0);
        engine.set_deposition_enabled(false);
        for step in 0..5 {
            engine.advance(step).unwrap();
        }
        assert_eq!(engine.statistics().num_hills(), 0);
        assert_relative_eq!(engine.bias_potential(), 0.0);
    }

    #[test]
    fn stride_controls_deposition_cadence() {
        let (_, cv) = coordinate_cv(5.0);
        let mut engine = MetaDynamics::new(1.0, 10.0, 3).unwrap();
        engine.register(cv, 1.0, None).unwrap();
        for step in 0..7 {
            engine.advance(step).unwrap();
        }
        // Deposits at internal steps 0, 3, and 6.
        assert_eq!(engine.statistics().num_hills(), 3);
        assert_eq!(engine.history().unwrap().num_samples(), 7);
    }

    #[test]
    fn hills_log_format_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hills.dat");

        {
            let (_, cv) = coordinate_cv(5.0);
            let mut engine = MetaDynamics::new(1.0, 10.0, 2).unwrap();
            engine.register(cv, 0.5, None).unwrap();
            engine.set_hills_file(&path, false).unwrap();
            for step in 0..5 {
                engine.advance(step).unwrap();
            }
            engine.flush().unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestep\tW\tposition\tsigma_position");
        // Deposits at steps 0, 2, 4.
        assert_eq!(lines.len(), 4);
        let fields: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(fields[0], "0");
        assert_relative_eq!(fields[1].parse::<f64>().unwrap(), 1.0);
        assert_relative_eq!(fields[2].parse::<f64>().unwrap(), 5.0);
        assert_relative_eq!(fields[3].parse::<f64>().unwrap(), 0.5);

        // A second run appends without repeating the header.
        {
            let (_, cv) = coordinate_cv(5.0);
            let mut engine = MetaDynamics::new(1.0, 10.0, 2).unwrap();
            engine.register(cv, 0.5, None).unwrap();
            engine.set_hills_file(&path, false).unwrap();
            engine.advance(5).unwrap();
            engine.flush().unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text.matches("timestep").count(), 1);
    }

    #[test]
    fn summary_reports_statistics() {
        let (_, mut engine) = grid_engine(5.0);
        for step in 0..3 {
            engine.advance(step).unwrap();
        }
        let yaml = engine.to_yaml();
        assert_eq!(yaml.get("steps").unwrap().as_u64(), Some(3));
        let hills = yaml.get("hills").unwrap();
        assert_eq!(hills.get("num_hills").unwrap().as_u64(), Some(3));
    }
}
