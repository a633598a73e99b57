pub mod completion;
pub mod config;
pub mod habit;
pub mod streak;
pub mod user;

use chrono::NaiveDate;
use clap::Args;
use habitrack_core::{
    parse_date, Clock, Config, Database, FixedClock, HabitKey, HabitService, User, UserService,
};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Act as this user (defaults to the `user.default_email` config key)
    #[arg(long, global = true)]
    pub user: Option<String>,
    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date)]
    pub today: Option<NaiveDate>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

/// Loaded config and open database for one command invocation.
pub struct Session {
    pub config: Config,
    pub db: Database,
}

impl Session {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Database::open()?;
        tracing::debug!(timezone = %config.clock.timezone, "session opened");
        Ok(Self { config, db })
    }

    pub fn clock(&self, global: &GlobalArgs) -> Box<dyn Clock> {
        match global.today {
            Some(date) => Box::new(FixedClock(date)),
            None => Box::new(self.config.clock()),
        }
    }

    pub fn habits(&self, global: &GlobalArgs) -> HabitService<'_, Database, Box<dyn Clock>> {
        HabitService::new(&self.db, self.clock(global)).with_limits(self.config.habit_limits())
    }

    pub fn users(&self) -> UserService<'_, Database> {
        UserService::new(&self.db)
    }

    /// Resolve `--user`, falling back to the configured default.
    pub fn current_user(&self, global: &GlobalArgs) -> Result<User, Box<dyn std::error::Error>> {
        let email = global
            .user
            .as_deref()
            .or(self.config.user.default_email.as_deref())
            .ok_or("no user selected: pass --user or set user.default_email")?;
        Ok(self.users().get_user_by_email(email)?)
    }

    pub fn habit_key(
        &self,
        global: &GlobalArgs,
        habit_id: i64,
    ) -> Result<HabitKey, Box<dyn std::error::Error>> {
        let user = self.current_user(global)?;
        Ok(HabitKey::of(user.id, habit_id))
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
