//! Constraint-model compiler and solve orchestration for nurse rostering
//! (spec §1–§2): given a validated [`Scenario`], lower its declarative
//! preferences into a CP-SAT-style model, solve it, and extract a tabular
//! [`Assignment`].
//!
//! The command-line front end, HTTP server, spreadsheet exporter cosmetics,
//! and YAML schema-validator UX are external collaborators this crate does
//! not implement; [`loader`] owns only the narrow ingestion + structural
//! validation this crate itself depends on.
//!
//! ```no_run
//! use nurse_scheduling::{loader, orchestrate, SolveOptions};
//!
//! let scenario = loader::load_scenario_file("scenario.yaml")?;
//! let assignment = orchestrate::schedule(&scenario, &SolveOptions::default())?;
//! println!("status: {}", assignment.status);
//! # Ok::<(), nurse_scheduling::error::ScheduleError>(())
//! ```

pub mod calendar;
pub mod context;
pub mod error;
pub mod extract;
pub mod loader;
pub mod model;
pub mod orchestrate;
pub mod preferences;
pub mod resolver;
pub mod solver;

pub use calendar::Calendar;
pub use error::{Result, ScheduleError};
pub use extract::Assignment;
pub use model::{Preference, Scenario};
pub use orchestrate::{schedule, schedule_with_backend, schedule_with_progress, SolveOptions};
pub use solver::reference::ReferenceBackend;
pub use solver::SolverBackend;
