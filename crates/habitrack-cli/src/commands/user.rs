use clap::Subcommand;
use habitrack_core::User;

use super::{print_json, CmdResult, GlobalArgs, Session};

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a new user
    Create {
        /// Email address
        email: String,
    },
    /// List all users
    List,
    /// Show a user by ID or email
    Get {
        /// Numeric ID or email address
        user: String,
    },
}

pub fn run(action: UserAction, global: &GlobalArgs) -> CmdResult {
    let session = Session::open()?;
    let users = session.users();

    match action {
        UserAction::Create { email } => {
            let user = users.create_user(&email)?;
            if global.json {
                print_json(&user)?;
            } else {
                println!("User created: {}", describe(&user));
            }
        }
        UserAction::List => {
            let all = users.list_users()?;
            if global.json {
                print_json(&all)?;
            } else if all.is_empty() {
                println!("No users.");
            } else {
                for user in &all {
                    println!("{}", describe(user));
                }
            }
        }
        UserAction::Get { user } => {
            let found = match user.parse::<i64>() {
                Ok(id) => users.get_user_by_id(id)?,
                Err(_) => users.get_user_by_email(&user)?,
            };
            if global.json {
                print_json(&found)?;
            } else {
                println!("{}", describe(&found));
            }
        }
    }
    Ok(())
}

fn describe(user: &User) -> String {
    format!("#{} {}", user.id, user.email)
}
