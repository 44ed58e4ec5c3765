//! # evnet-algo: Capacity Planning Algorithms
//!
//! Decides how many charging stations to build at each candidate site of an
//! [`evnet_core::Network`] so that total profit is maximised under a station
//! budget, per-site capacity bounds and coverage requirements.
//!
//! | Stage | Method | Model |
//! |-------|--------|-------|
//! | [`planner::RelaxationProblem`] | Binary-slot MILP via `good_lp` | Separable, no spillover |
//! | [`planner::CapacityPlanner::local_search`] | Pairwise exhaustive re-split | Full spillover |
//!
//! ## MILP Backends
//!
//! | Backend | Feature | Notes |
//! |---------|---------|-------|
//! | microlp | always on | Pure Rust |
//! | HiGHS | `solver-highs` | Honours MIP gap and time limit |

pub mod planner;

pub use planner::{
    check_feasibility, is_feasible, CapacityPlanner, MipSolverKind, PlanSummary, PlannerConfig,
    RelaxationProblem,
};
