//! # Habitrack Core Library
//!
//! Core logic for the Habitrack habit tracker. Every operation is available
//! through the library; the `habitrack` CLI is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Streak engine**: a pure function from completion dates and an anchor
//!   date to current/longest streaks
//! - **Storage**: SQLite-backed repositories and TOML-based configuration
//! - **Services**: user, habit and completion operations that fetch dates and
//!   embed streaks into habit responses
//!
//! ## Key Components
//!
//! - [`StreakCalculator`]: Current and longest streak calculation
//! - [`HabitService`]: Owner-scoped habit CRUD, completions and streaks
//! - [`Database`]: SQLite implementation of the repository traits
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod habit;
pub mod repository;
pub mod service;
pub mod storage;
pub mod streak;
pub mod user;

pub use clock::{parse_date, Clock, FixedClock, SystemClock, TimeZoneSetting};
pub use error::{ConfigError, CoreError, DatabaseError, Result, UserLookup, ValidationError};
pub use habit::{
    Habit, HabitCompletion, HabitCompletionResponse, HabitDraft, HabitKey, HabitLimits,
    HabitResponse,
};
pub use repository::{CompletionRepository, HabitRepository, UserRepository};
pub use service::{CompletionService, HabitService, UserService};
pub use storage::{Config, Database};
pub use streak::{calculate_streaks, StreakCalculator, StreakResult};
pub use user::User;
