use super::{print_json, CmdResult, GlobalArgs, Session};

pub fn run(habit_id: i64, global: &GlobalArgs) -> CmdResult {
    let session = Session::open()?;
    let key = session.habit_key(global, habit_id)?;
    let habits = session.habits(global);

    let streaks = habits.streaks_for_habit(key)?;
    if global.json {
        print_json(&streaks)?;
    } else {
        println!("Current streak: {}", streaks.current_streak);
        println!("Longest streak: {}", streaks.longest_streak);
    }
    Ok(())
}
