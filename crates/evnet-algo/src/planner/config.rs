//! Planner configuration and MILP backend selection.

use anyhow::anyhow;
use evnet_core::{EvNetError, EvNetResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// MILP backend used by the relaxation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MipSolverKind {
    /// Pure-Rust branch and bound; no gap or time limit
    #[default]
    Microlp,
    /// HiGHS; honours `mip_gap`, `time_limit_secs` and `verbose`
    #[cfg(feature = "solver-highs")]
    Highs,
}

impl MipSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_MIP_SOLVERS
    }

    /// Whether the backend honours `mip_gap` and `time_limit_secs`
    pub fn supports_limits(&self) -> bool {
        match self {
            MipSolverKind::Microlp => false,
            #[cfg(feature = "solver-highs")]
            MipSolverKind::Highs => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MipSolverKind::Microlp => "microlp",
            #[cfg(feature = "solver-highs")]
            MipSolverKind::Highs => "highs",
        }
    }
}

const AVAILABLE_MIP_SOLVERS: &[&str] = &[
    "microlp",
    #[cfg(feature = "solver-highs")]
    "highs",
];

fn unknown_solver_error(label: &str) -> anyhow::Error {
    anyhow!(
        "unknown mip solver '{}'; supported values: {}",
        label,
        MipSolverKind::available().join(", ")
    )
}

impl FromStr for MipSolverKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "microlp" => Ok(MipSolverKind::Microlp),
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(MipSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}

impl std::fmt::Display for MipSolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search parameters for [`super::CapacityPlanner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Scale of the spatial capacity cap `ε · exp(γ d²)` used by the relaxation
    pub epsilon: f64,
    /// Multiplier on the distance weights used to pick the second site of a pair
    pub sampling_temperature: f64,
    pub local_search_iterations: usize,
    /// Relative MIP gap at which the backend may stop
    pub mip_gap: Option<f64>,
    /// Wall-clock limit for the relaxation solve, in seconds
    pub time_limit_secs: Option<f64>,
    /// Backend solver output and per-iteration logging at info level
    pub verbose: bool,
    /// Seed for pair sampling; entropy when absent
    pub seed: Option<u64>,
    pub solver: MipSolverKind,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            epsilon: 5e-2,
            sampling_temperature: 1.0,
            local_search_iterations: 100,
            mip_gap: None,
            time_limit_secs: None,
            verbose: false,
            seed: None,
            solver: MipSolverKind::default(),
        }
    }
}

impl PlannerConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.local_search_iterations = iterations;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_solver(mut self, solver: MipSolverKind) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> EvNetResult<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(EvNetError::Config(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !self.sampling_temperature.is_finite() || self.sampling_temperature <= 0.0 {
            return Err(EvNetError::Config(format!(
                "sampling_temperature must be positive, got {}",
                self.sampling_temperature
            )));
        }
        if let Some(gap) = self.mip_gap {
            if !gap.is_finite() || gap < 0.0 {
                return Err(EvNetError::Config(format!(
                    "mip_gap must be non-negative, got {gap}"
                )));
            }
        }
        if let Some(limit) = self.time_limit_secs {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(EvNetError::Config(format!(
                    "time_limit_secs must be positive, got {limit}"
                )));
            }
        }
        if !self.solver.supports_limits()
            && (self.mip_gap.is_some() || self.time_limit_secs.is_some())
        {
            return Err(EvNetError::Config(format!(
                "the {} backend cannot honour mip_gap or time_limit_secs; \
                 build with the solver-highs feature and select solver: highs",
                self.solver
            )));
        }
        Ok(())
    }
}
