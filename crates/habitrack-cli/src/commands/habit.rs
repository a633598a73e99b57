use clap::Subcommand;
use habitrack_core::{HabitDraft, HabitKey, HabitResponse};

use super::{print_json, CmdResult, GlobalArgs, Session};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit name
        name: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
    /// List habits with their streaks
    List,
    /// Show one habit with its streaks
    Get {
        /// Habit ID
        id: i64,
    },
    /// Replace a habit's name and description
    Update {
        /// Habit ID
        id: i64,
        /// New name
        name: String,
        /// New description (omit to clear)
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a habit and its completions
    Delete {
        /// Habit ID
        id: i64,
    },
}

pub fn run(action: HabitAction, global: &GlobalArgs) -> CmdResult {
    let session = Session::open()?;
    let user = session.current_user(global)?;
    let habits = session.habits(global);

    match action {
        HabitAction::Create { name, description } => {
            let habit = habits.create_habit(user.id, HabitDraft::new(name, description))?;
            let response = habits.habit_response(habit.key())?;
            if global.json {
                print_json(&response)?;
            } else {
                println!("Habit created: #{} {}", response.id, response.name);
            }
        }
        HabitAction::List => {
            let responses = habits.list_habit_responses(user.id)?;
            if global.json {
                print_json(&responses)?;
            } else if responses.is_empty() {
                println!("No habits.");
            } else {
                for response in &responses {
                    println!("{}", describe(response));
                }
            }
        }
        HabitAction::Get { id } => {
            let response = habits.habit_response(HabitKey::of(user.id, id))?;
            if global.json {
                print_json(&response)?;
            } else {
                println!("{}", describe(&response));
                if let Some(description) = &response.description {
                    println!("  {description}");
                }
            }
        }
        HabitAction::Update {
            id,
            name,
            description,
        } => {
            let key = HabitKey::of(user.id, id);
            habits.update_habit(key, HabitDraft::new(name, description))?;
            let response = habits.habit_response(key)?;
            if global.json {
                print_json(&response)?;
            } else {
                println!("Habit updated: #{} {}", response.id, response.name);
            }
        }
        HabitAction::Delete { id } => {
            habits.delete_habit(HabitKey::of(user.id, id))?;
            if global.json {
                print_json(&serde_json::json!({ "deleted": id }))?;
            } else {
                println!("Habit deleted: #{id}");
            }
        }
    }
    Ok(())
}

fn describe(response: &HabitResponse) -> String {
    format!(
        "#{} {}  (current {}, longest {})",
        response.id, response.name, response.current_streak, response.longest_streak
    )
}
