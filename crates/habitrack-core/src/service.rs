//! Application services: users, habits and completions.
//!
//! Services borrow a repository and own a [`Clock`]; they hold no other state.
//! Streaks are computed per call from whatever dates the repository returns.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::error::{CoreError, Result, UserLookup};
use crate::habit::{
    Habit, HabitCompletion, HabitCompletionResponse, HabitDraft, HabitKey, HabitLimits,
    HabitResponse,
};
use crate::repository::{CompletionRepository, HabitRepository, UserRepository};
use crate::streak::{StreakCalculator, StreakResult};
use crate::user::{normalize_email, User};

pub struct UserService<'a, R> {
    repo: &'a R,
}

impl<'a, R: UserRepository> UserService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Register a new email address.
    ///
    /// # Errors
    /// Returns a validation error for a malformed address and
    /// `EmailAlreadyExists` if it is taken.
    pub fn create_user(&self, email: &str) -> Result<User> {
        let email = normalize_email(email)?;
        if self.exists_by_email(&email)? {
            return Err(CoreError::EmailAlreadyExists(email));
        }
        let user = self.repo.insert_user(&email)?;
        tracing::info!(user_id = user.id, email = %user.email, "created user");
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.repo.list_users()
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<User> {
        self.repo.find_user_by_id(id)?.ok_or_else(|| {
            tracing::warn!(user_id = id, "user not found");
            CoreError::UserNotFound(UserLookup::Id(id))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        let email = normalize_email(email)?;
        self.repo.find_user_by_email(&email)?.ok_or_else(|| {
            tracing::warn!(%email, "user not found");
            CoreError::UserNotFound(UserLookup::Email(email))
        })
    }

    pub fn exists_by_email(&self, email: &str) -> Result<bool> {
        let email = normalize_email(email)?;
        Ok(self.repo.find_user_by_email(&email)?.is_some())
    }
}

/// Marks, unmarks and looks up completions. Does not check habit ownership;
/// [`HabitService`] does that before delegating here.
pub struct CompletionService<'a, R> {
    repo: &'a R,
    calculator: StreakCalculator,
}

impl<'a, R: CompletionRepository> CompletionService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self {
            repo,
            calculator: StreakCalculator::new(),
        }
    }

    /// # Errors
    /// Returns `HabitAlreadyCompleted` if `date` is already marked.
    pub fn mark_completed(&self, key: HabitKey, date: NaiveDate) -> Result<HabitCompletion> {
        if self.repo.completion_exists(key, date)? {
            return Err(CoreError::HabitAlreadyCompleted {
                habit_id: key.habit_id,
                date,
            });
        }
        let completion = self.repo.insert_completion(key, date)?;
        tracing::info!(habit_id = key.habit_id, %date, "marked completed");
        Ok(completion)
    }

    /// # Errors
    /// Returns `CompletionNotFound` if `date` was not marked.
    pub fn unmark_completed(&self, key: HabitKey, date: NaiveDate) -> Result<()> {
        if !self.repo.delete_completion(key, date)? {
            return Err(CoreError::CompletionNotFound {
                habit_id: key.habit_id,
                date,
            });
        }
        tracing::info!(habit_id = key.habit_id, %date, "unmarked completed");
        Ok(())
    }

    pub fn completions_for_habit(&self, key: HabitKey) -> Result<Vec<HabitCompletion>> {
        self.repo.completions_for_habit(key)
    }

    pub fn completions_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<HabitCompletion>> {
        self.repo.completions_on(user_id, date)
    }

    /// Fetch the habit's completion dates and run the streak calculator.
    pub fn streaks(&self, key: HabitKey, today: NaiveDate) -> Result<StreakResult> {
        let dates = self.repo.completion_dates(key)?;
        let result = self.calculator.calculate_streaks(dates, today);
        tracing::debug!(
            habit_id = key.habit_id,
            current = result.current_streak,
            longest = result.longest_streak,
            "computed streaks"
        );
        Ok(result)
    }
}

/// Habit CRUD scoped to an owner, plus streak-bearing responses.
pub struct HabitService<'a, R, C> {
    repo: &'a R,
    clock: C,
    limits: HabitLimits,
    completions: CompletionService<'a, R>,
}

impl<'a, R, C> HabitService<'a, R, C>
where
    R: HabitRepository + CompletionRepository,
    C: Clock,
{
    pub fn new(repo: &'a R, clock: C) -> Self {
        Self {
            repo,
            clock,
            limits: HabitLimits::default(),
            completions: CompletionService::new(repo),
        }
    }

    pub fn with_limits(mut self, limits: HabitLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn list_habits(&self, user_id: i64) -> Result<Vec<Habit>> {
        self.repo.find_habits_by_user(user_id)
    }

    /// # Errors
    /// Returns `HabitNotFound` if the habit does not exist or belongs to
    /// another user.
    pub fn get_habit(&self, key: HabitKey) -> Result<Habit> {
        self.repo.find_habit(key)?.ok_or_else(|| {
            tracing::warn!(
                habit_id = key.habit_id,
                user_id = key.user_id,
                "habit not found"
            );
            not_found(key)
        })
    }

    pub fn create_habit(&self, user_id: i64, draft: HabitDraft) -> Result<Habit> {
        let draft = draft.validate(&self.limits)?;
        let habit = self.repo.insert_habit(user_id, &draft)?;
        tracing::info!(habit_id = habit.id, user_id, name = %habit.name, "created habit");
        Ok(habit)
    }

    pub fn update_habit(&self, key: HabitKey, draft: HabitDraft) -> Result<Habit> {
        let draft = draft.validate(&self.limits)?;
        self.repo
            .update_habit(key, &draft)?
            .ok_or_else(|| not_found(key))
    }

    pub fn delete_habit(&self, key: HabitKey) -> Result<()> {
        if !self.repo.delete_habit(key)? {
            return Err(not_found(key));
        }
        tracing::info!(habit_id = key.habit_id, user_id = key.user_id, "deleted habit");
        Ok(())
    }

    /// Current and longest streak for one habit as of the clock's today.
    pub fn streaks_for_habit(&self, key: HabitKey) -> Result<StreakResult> {
        self.get_habit(key)?;
        self.completions.streaks(key, self.today())
    }

    pub fn habit_response(&self, key: HabitKey) -> Result<HabitResponse> {
        let habit = self.get_habit(key)?;
        let streaks = self.completions.streaks(key, self.today())?;
        Ok(HabitResponse::from_habit(&habit, streaks))
    }

    pub fn list_habit_responses(&self, user_id: i64) -> Result<Vec<HabitResponse>> {
        let today = self.today();
        self.list_habits(user_id)?
            .iter()
            .map(|habit| -> Result<HabitResponse> {
                let streaks = self.completions.streaks(habit.key(), today)?;
                Ok(HabitResponse::from_habit(habit, streaks))
            })
            .collect()
    }

    /// Mark the habit done on `date`, or today when `None`.
    pub fn mark_completed(
        &self,
        key: HabitKey,
        date: Option<NaiveDate>,
    ) -> Result<HabitCompletionResponse> {
        let habit = self.get_habit(key)?;
        let date = date.unwrap_or_else(|| self.today());
        let completion = self.completions.mark_completed(key, date)?;
        Ok(HabitCompletionResponse::new(&habit, &completion))
    }

    /// Remove the mark on `date`, or today when `None`. Returns the date unmarked.
    pub fn unmark_completed(&self, key: HabitKey, date: Option<NaiveDate>) -> Result<NaiveDate> {
        self.get_habit(key)?;
        let date = date.unwrap_or_else(|| self.today());
        self.completions.unmark_completed(key, date)?;
        Ok(date)
    }

    pub fn completions_for_habit(&self, key: HabitKey) -> Result<Vec<HabitCompletionResponse>> {
        let habit = self.get_habit(key)?;
        Ok(self
            .completions
            .completions_for_habit(key)?
            .iter()
            .map(|c| HabitCompletionResponse::new(&habit, c))
            .collect())
    }

    /// Everything the user completed on `date` (today when `None`).
    pub fn completions_on(
        &self,
        user_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<Vec<HabitCompletionResponse>> {
        let date = date.unwrap_or_else(|| self.today());
        let habits: HashMap<i64, Habit> = self
            .list_habits(user_id)?
            .into_iter()
            .map(|h| (h.id, h))
            .collect();
        Ok(self
            .completions
            .completions_on(user_id, date)?
            .iter()
            .filter_map(|c| {
                habits
                    .get(&c.habit_id)
                    .map(|h| HabitCompletionResponse::new(h, c))
            })
            .collect())
    }
}

fn not_found(key: HabitKey) -> CoreError {
    CoreError::HabitNotFound {
        habit_id: key.habit_id,
        user_id: key.user_id,
    }
}
