use chrono::NaiveDate;
use clap::{Args, Subcommand};
use habitrack_core::{parse_date, HabitCompletionResponse};

use super::{print_json, CmdResult, GlobalArgs, Session};

#[derive(Args)]
pub struct MarkArgs {
    /// Habit ID
    pub habit_id: i64,
    /// Day to mark (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum CompletionsAction {
    /// Every completion of one habit, newest first
    List {
        /// Habit ID
        habit_id: i64,
    },
    /// Everything completed on one day
    On {
        /// Day to show (YYYY-MM-DD, defaults to today)
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

pub fn mark(args: MarkArgs, global: &GlobalArgs) -> CmdResult {
    let session = Session::open()?;
    let key = session.habit_key(global, args.habit_id)?;
    let habits = session.habits(global);

    let done = habits.mark_completed(key, args.date)?;
    if global.json {
        print_json(&done)?;
    } else {
        let streaks = habits.streaks_for_habit(key)?;
        println!(
            "Marked {} done on {} (current streak {})",
            done.habit_name, done.completion_date, streaks.current_streak
        );
    }
    Ok(())
}

pub fn unmark(args: MarkArgs, global: &GlobalArgs) -> CmdResult {
    let session = Session::open()?;
    let key = session.habit_key(global, args.habit_id)?;
    let habits = session.habits(global);

    let date = habits.unmark_completed(key, args.date)?;
    if global.json {
        print_json(&serde_json::json!({ "habitId": key.habit_id, "completionDate": date }))?;
    } else {
        println!("Unmarked habit #{} on {date}", key.habit_id);
    }
    Ok(())
}

pub fn run(action: CompletionsAction, global: &GlobalArgs) -> CmdResult {
    let session = Session::open()?;
    let habits = session.habits(global);

    let completions = match action {
        CompletionsAction::List { habit_id } => {
            habits.completions_for_habit(session.habit_key(global, habit_id)?)?
        }
        CompletionsAction::On { date } => {
            let user = session.current_user(global)?;
            habits.completions_on(user.id, date)?
        }
    };

    if global.json {
        print_json(&completions)?;
    } else if completions.is_empty() {
        println!("No completions.");
    } else {
        for completion in &completions {
            println!("{}", describe(completion));
        }
    }
    Ok(())
}

fn describe(completion: &HabitCompletionResponse) -> String {
    format!(
        "{}  #{} {}",
        completion.completion_date, completion.habit_id, completion.habit_name
    )
}
