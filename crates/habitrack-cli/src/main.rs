use clap::{CommandFactory, Parser, Subcommand};

mod commands;

use commands::GlobalArgs;

#[derive(Parser)]
#[command(name = "habitrack", version, about = "Habitrack CLI")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Mark a habit as done
    Done(commands::completion::MarkArgs),
    /// Remove a habit's completion mark
    Undo(commands::completion::MarkArgs),
    /// Completion history
    Completions {
        #[command(subcommand)]
        action: commands::completion::CompletionsAction,
    },
    /// Current and longest streak of a habit
    Streak {
        /// Habit ID
        habit_id: i64,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    ShellCompletions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("HABITRACK_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let global = cli.global;
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action, &global),
        Commands::Habit { action } => commands::habit::run(action, &global),
        Commands::Done(args) => commands::completion::mark(args, &global),
        Commands::Undo(args) => commands::completion::unmark(args, &global),
        Commands::Completions { action } => commands::completion::run(action, &global),
        Commands::Streak { habit_id } => commands::streak::run(habit_id, &global),
        Commands::Config { action } => commands::config::run(action),
        Commands::ShellCompletions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "habitrack", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
