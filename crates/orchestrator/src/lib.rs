//! Generation engine for mealgen.
//!
//! This crate owns everything between "a session exists" and "the session is
//! terminal":
//!
//! - [`metrics`] - physical-metric derivation (BMI, BMR, TDEE, body fat, goal)
//! - [`prompt`] - day-prompt construction from profile, catalog, and history
//! - [`parse`] - typed parsing of backend output into a [`plan::DayPlan`]
//! - [`GenerationRun`] - the per-session day loop and its failure policy
//! - [`ProgressPublisher`] - store-polling progress event stream
//! - [`Dispatcher`] - inline vs background execution with bounded retries
//!
//! The run loop and the publisher never share memory: they synchronize only
//! through the session row in the database, so they can live in different
//! processes.

pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod parse;
pub mod plan;
pub mod progress;
pub mod prompt;
pub mod runner;

pub use dispatch::{Dispatcher, GenerationJob, RunJob, WorkerConfig};
pub use error::OrchestratorError;
pub use plan::{DayPlan, Meal, MealComponent};
pub use progress::{ProgressEvent, ProgressPublisher, PublisherConfig};
pub use runner::{GenerationRun, RunConfig};
