//! SQLite-backed storage for users, habits and completions.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use crate::error::{DatabaseError, Result};
use crate::habit::{Habit, HabitCompletion, HabitDraft, HabitKey};
use crate::repository::{CompletionRepository, HabitRepository, UserRepository};
use crate::user::User;

const DATE_FORMAT: &str = "%Y-%m-%d";

// === Helper Functions ===

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored `YYYY-MM-DD` column.
fn parse_date_column(idx: usize, value: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a stored RFC 3339 timestamp column.
fn parse_datetime_column(idx: usize, value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let created_at: String = row.get(2)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        created_at: parse_datetime_column(2, &created_at)?,
    })
}

fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let created_at: String = row.get(4)?;
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime_column(4, &created_at)?,
    })
}

fn row_to_completion(row: &rusqlite::Row) -> Result<HabitCompletion, rusqlite::Error> {
    let date: String = row.get(3)?;
    Ok(HabitCompletion {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        user_id: row.get(2)?,
        completion_date: parse_date_column(3, &date)?,
    })
}

const USER_COLUMNS: &str = "id, email, created_at";
const HABIT_COLUMNS: &str = "id, user_id, name, description, created_at";
const COMPLETION_COLUMNS: &str = "id, habit_id, user_id, completion_date";

/// SQLite database for habit storage.
///
/// One connection per process; every repository trait is implemented on it.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/habitrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitrack.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(DatabaseError::from)?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }
}

impl UserRepository for Database {
    fn insert_user(&self, email: &str) -> Result<User> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO users (email, created_at) VALUES (?1, ?2)",
            params![email, created_at.to_rfc3339()],
        )?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            email: email.to_string(),
            created_at,
        })
    }

    fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

impl HabitRepository for Database {
    fn insert_habit(&self, user_id: i64, draft: &HabitDraft) -> Result<Habit> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO habits (user_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, draft.name, draft.description, created_at.to_rfc3339()],
        )?;
        Ok(Habit {
            id: self.conn.last_insert_rowid(),
            user_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            created_at,
        })
    }

    fn find_habits_by_user(&self, user_id: i64) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ?1 ORDER BY id"
        ))?;
        let habits = stmt
            .query_map(params![user_id], row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    fn find_habit(&self, key: HabitKey) -> Result<Option<Habit>> {
        let habit = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1 AND user_id = ?2"),
                params![key.habit_id, key.user_id],
                row_to_habit,
            )
            .optional()?;
        Ok(habit)
    }

    fn update_habit(&self, key: HabitKey, draft: &HabitDraft) -> Result<Option<Habit>> {
        let changed = self.conn.execute(
            "UPDATE habits SET name = ?1, description = ?2 WHERE id = ?3 AND user_id = ?4",
            params![draft.name, draft.description, key.habit_id, key.user_id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.find_habit(key)
    }

    fn delete_habit(&self, key: HabitKey) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![key.habit_id, key.user_id],
        )?;
        Ok(deleted > 0)
    }
}

impl CompletionRepository for Database {
    fn completion_exists(&self, key: HabitKey, date: NaiveDate) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM habit_completions
                 WHERE habit_id = ?1 AND user_id = ?2 AND completion_date = ?3
             )",
            params![key.habit_id, key.user_id, format_date(date)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn insert_completion(&self, key: HabitKey, date: NaiveDate) -> Result<HabitCompletion> {
        self.conn.execute(
            "INSERT INTO habit_completions (habit_id, user_id, completion_date)
             VALUES (?1, ?2, ?3)",
            params![key.habit_id, key.user_id, format_date(date)],
        )?;
        Ok(HabitCompletion {
            id: self.conn.last_insert_rowid(),
            habit_id: key.habit_id,
            user_id: key.user_id,
            completion_date: date,
        })
    }

    fn delete_completion(&self, key: HabitKey, date: NaiveDate) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM habit_completions
             WHERE habit_id = ?1 AND user_id = ?2 AND completion_date = ?3",
            params![key.habit_id, key.user_id, format_date(date)],
        )?;
        Ok(deleted > 0)
    }

    fn completion_dates(&self, key: HabitKey) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT completion_date FROM habit_completions
             WHERE habit_id = ?1 AND user_id = ?2
             ORDER BY completion_date DESC",
        )?;
        let dates = stmt
            .query_map(params![key.habit_id, key.user_id], |row| {
                let date: String = row.get(0)?;
                parse_date_column(0, &date)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dates)
    }

    fn completions_for_habit(&self, key: HabitKey) -> Result<Vec<HabitCompletion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions
             WHERE habit_id = ?1 AND user_id = ?2
             ORDER BY completion_date DESC"
        ))?;
        let completions = stmt
            .query_map(params![key.habit_id, key.user_id], row_to_completion)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }

    fn completions_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<HabitCompletion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions
             WHERE user_id = ?1 AND completion_date = ?2
             ORDER BY habit_id"
        ))?;
        let completions = stmt
            .query_map(params![user_id, format_date(date)], row_to_completion)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }
}
