//! Storage-facing traits the services are written against.
//!
//! [`crate::storage::Database`] implements all three over SQLite. Completion
//! lookups hand back plain vectors so the streak engine never touches storage.

use chrono::NaiveDate;

use crate::error::Result;
use crate::habit::{Habit, HabitCompletion, HabitDraft, HabitKey};
use crate::user::User;

pub trait UserRepository {
    /// Insert a user with an already-normalized email.
    fn insert_user(&self, email: &str) -> Result<User>;

    fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    fn list_users(&self) -> Result<Vec<User>>;
}

pub trait HabitRepository {
    fn insert_habit(&self, user_id: i64, draft: &HabitDraft) -> Result<Habit>;

    /// Habits owned by `user_id`, oldest first.
    fn find_habits_by_user(&self, user_id: i64) -> Result<Vec<Habit>>;

    /// The habit, only if it belongs to `key.user_id`.
    fn find_habit(&self, key: HabitKey) -> Result<Option<Habit>>;

    /// Returns `None` when no habit matched `key`.
    fn update_habit(&self, key: HabitKey, draft: &HabitDraft) -> Result<Option<Habit>>;

    /// Returns `false` when no habit matched `key`. Completions go with it.
    fn delete_habit(&self, key: HabitKey) -> Result<bool>;
}

pub trait CompletionRepository {
    fn completion_exists(&self, key: HabitKey, date: NaiveDate) -> Result<bool>;

    fn insert_completion(&self, key: HabitKey, date: NaiveDate) -> Result<HabitCompletion>;

    /// Returns `false` when there was nothing to delete.
    fn delete_completion(&self, key: HabitKey, date: NaiveDate) -> Result<bool>;

    /// Completion dates for one habit, most recent first.
    fn completion_dates(&self, key: HabitKey) -> Result<Vec<NaiveDate>>;

    /// Completion records for one habit, most recent first.
    fn completions_for_habit(&self, key: HabitKey) -> Result<Vec<HabitCompletion>>;

    /// Every completion a user recorded on `date`, across habits.
    fn completions_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<HabitCompletion>>;
}
