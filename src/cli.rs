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

//! Command line frontend: well-tempered metadynamics on an overdamped
//! Langevin particle in a one-dimensional double-well potential,
//! `U(x) = barrier · (x² − 1)²`.

use crate::collective_variable::{CoordinateVariable, GridAxis};
use crate::engine::MetaDynamicsBuilder;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use pretty_env_logger::env_logger::DEFAULT_FILTER_ENV;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::{io::Write, path::PathBuf};

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run biased Langevin dynamics in a double-well potential
    #[clap(arg_required_else_help = true)]
    Run {
        /// Input file in YAML format
        #[clap(long, short = 'i')]
        input: PathBuf,
    },
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Verbose output. See more with e.g. RUST_LOG=Trace
    #[clap(long, short = 'v', action)]
    pub verbose: bool,
    /// Output file in YAML format
    #[clap(long, short = 'o', default_value = "output.yaml")]
    pub output: PathBuf,
}

/// Double-well system and integrator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemInput {
    /// Barrier height of `U(x) = barrier · (x² − 1)²` (energy units).
    pub barrier: f64,
    /// Thermal energy kT (energy units).
    pub temperature: f64,
    /// Langevin time step.
    pub time_step: f64,
    /// Number of integration steps.
    pub steps: usize,
    /// RNG seed; seeded from the OS when absent.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Collective variable section of the input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CvInput {
    /// Gaussian hill width along the position axis.
    pub sigma: f64,
    /// Grid discretization, required when `use_grid` is set.
    #[serde(default)]
    pub axis: Option<GridAxis>,
}

/// Top-level YAML input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunInput {
    pub metadynamics: MetaDynamicsBuilder,
    pub system: SystemInput,
    pub cv: CvInput,
    /// Initialize the bias grid from a previous dump before the first step.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_grid: Option<PathBuf>,
    /// Dump the final bias grid to this file.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_grid: Option<PathBuf>,
}

impl RunInput {
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open input file {:?}", path))?;
        serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse input file {:?}", path))
    }
}

pub fn do_main() -> Result<()> {
    let args = Args::parse();
    if args.verbose && std::env::var(DEFAULT_FILTER_ENV).is_err() {
        std::env::set_var(DEFAULT_FILTER_ENV, "Debug");
    }
    pretty_env_logger::init();

    let mut yaml_output = std::fs::File::create(args.output)?;

    match args.command {
        Commands::Run { input } => {
            let input = RunInput::from_file(&input)?;
            run(&input, &mut yaml_output)?;
        }
    }
    Ok(())
}

/// Helper function to serialize data to an existing YAML file
fn write_yaml<T: serde::Serialize>(
    data: &T,
    output: &mut std::fs::File,
    key: Option<&str>,
) -> Result<()> {
    match key {
        Some(key) => {
            let mut wrapper = std::collections::BTreeMap::new();
            wrapper.insert(key.to_string(), data);
            let yaml = serde_yaml::to_string(&wrapper)?;
            output.write_all(yaml.as_bytes())?;
        }
        None => {
            let yaml = serde_yaml::to_string(data)?;
            output.write_all(yaml.as_bytes())?;
        }
    }
    Ok(())
}

pub fn run(input: &RunInput, yaml_output: &mut std::fs::File) -> Result<()> {
    let mut rng = match input.system.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Start in the left well; the engine reads the coordinate through a
    // shared cell while the integrator below updates it.
    let coordinate = Rc::new(Cell::new(-1.0));
    let cv = CoordinateVariable::new("position", coordinate.clone()).into_handle();

    let mut engine = input.metadynamics.build()?;
    engine.register(cv.clone(), input.cv.sigma, input.cv.axis.clone())?;
    if let Some(path) = &input.read_grid {
        engine.restart_from_grid(path)?;
    }

    let system = &input.system;
    log::info!(
        "Double well: barrier {}, kT {}, {} steps of dt {}",
        system.barrier,
        system.temperature,
        system.steps,
        system.time_step
    );
    write_yaml(system, yaml_output, Some("system"))?;

    let noise_amplitude = (2.0 * system.temperature * system.time_step).sqrt();
    let pb = ProgressBar::new(system.steps as u64);
    for step in 0..system.steps {
        engine.advance(step)?;

        // Overdamped Langevin update with unit friction. The bias factor
        // is ∂V/∂x, entering the force with a minus sign.
        let x = coordinate.get();
        let force = -4.0 * system.barrier * x * (x * x - 1.0) - cv.borrow().bias_factor();
        let noise: f64 = rng.sample(StandardNormal);
        coordinate.set(x + force * system.time_step + noise_amplitude * noise);

        pb.set_position(step as u64);
    }
    pb.finish();
    engine.flush()?;

    if let Some(path) = &input.write_grid {
        engine.dump_grid(path)?;
        log::info!("Bias grid written to {:?}", path);
    }

    log::info!(
        "Deposited {} hills; final bias potential {:.4}",
        engine.statistics().num_hills(),
        engine.bias_potential()
    );
    write_yaml(&engine.to_yaml(), yaml_output, Some("metadynamics"))?;
    Ok(())
}
