//! Habit and completion records, plus the request/response shapes that
//! callers exchange with the services.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::streak::StreakResult;

pub const DEFAULT_NAME_MAX_LEN: usize = 100;
pub const DEFAULT_DESCRIPTION_MAX_LEN: usize = 255;

/// Identifies a habit within the scope of its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitKey {
    pub user_id: i64,
    pub habit_id: i64,
}

impl HabitKey {
    pub fn of(user_id: i64, habit_id: i64) -> Self {
        Self { user_id, habit_id }
    }
}

/// A habit owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn key(&self) -> HabitKey {
        HabitKey::of(self.user_id, self.id)
    }
}

/// One day on which a habit was marked done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: i64,
    pub habit_id: i64,
    pub user_id: i64,
    pub completion_date: NaiveDate,
}

/// Length limits applied to habit drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitLimits {
    pub name_max_len: usize,
    pub description_max_len: usize,
}

impl Default for HabitLimits {
    fn default() -> Self {
        Self {
            name_max_len: DEFAULT_NAME_MAX_LEN,
            description_max_len: DEFAULT_DESCRIPTION_MAX_LEN,
        }
    }
}

/// Name and description for creating or updating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    /// Trim fields and check them against `limits`.
    ///
    /// A blank description becomes `None`.
    ///
    /// # Errors
    /// Returns a validation error for a blank or overlong name, or an
    /// overlong description.
    pub fn validate(self, limits: &HabitLimits) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::invalid("name", "Habit name must not be blank"));
        }
        if name.chars().count() > limits.name_max_len {
            return Err(ValidationError::invalid(
                "name",
                format!(
                    "Habit name must be at most {} characters",
                    limits.name_max_len
                ),
            ));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(ref d) = description {
            if d.chars().count() > limits.description_max_len {
                return Err(ValidationError::invalid(
                    "description",
                    format!(
                        "Description must be at most {} characters",
                        limits.description_max_len
                    ),
                ));
            }
        }

        Ok(Self { name, description })
    }
}

/// A habit as presented to callers, with its streaks embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl HabitResponse {
    pub fn from_habit(habit: &Habit, streaks: StreakResult) -> Self {
        Self {
            id: habit.id,
            name: habit.name.clone(),
            description: habit.description.clone(),
            current_streak: streaks.current_streak,
            longest_streak: streaks.longest_streak,
        }
    }
}

/// A completion joined with the habit it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletionResponse {
    pub habit_id: i64,
    pub habit_name: String,
    pub habit_description: Option<String>,
    pub completion_date: NaiveDate,
}

impl HabitCompletionResponse {
    pub fn new(habit: &Habit, completion: &HabitCompletion) -> Self {
        Self {
            habit_id: habit.id,
            habit_name: habit.name.clone(),
            habit_description: habit.description.clone(),
            completion_date: completion.completion_date,
        }
    }
}
