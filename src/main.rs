use std::{fmt::Display, path::PathBuf};

use clap::{Parser, Subcommand};
use colored::*;
use jiff::Zoned;
use jiff::civil::Weekday;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    cycle::reset::ResetFeedback,
    models::task::Cycle,
    services::{
        cycles::reset_cycle,
        tasks::{AddTaskParameters, add_task, delete_task, resolve_task, toggle_complete},
        transfer::{TransferError, export_to_file, import_from_file},
    },
    storage::{Storage, json::JsonFileStorage},
};

mod cycle;
mod models;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "cadence",
    about = "Recurring daily, weekly and monthly tasks in your terminal"
)]
struct Cli {
    /// Path of the store file (defaults to the local data directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks grouped by cycle
    List {
        /// Only show one cycle
        #[arg(short, long)]
        cycle: Option<Cycle>,
    },

    /// Add a new recurring task
    Add {
        /// Task title
        title: String,

        /// Repetition cycle: daily, weekly or monthly
        #[arg(short, long, default_value = "daily")]
        cycle: Cycle,

        /// Hour of the day the task is due (0-23)
        #[arg(long, value_parser = clap::value_parser!(i8).range(0..=23))]
        hour: Option<i8>,

        /// Day of the week for weekly tasks (e.g. "monday", "mon" or 0-6 with 0 = Sunday)
        #[arg(long, value_parser = parse_day_of_week)]
        day_of_week: Option<i8>,

        /// Day of the month for monthly tasks (1-31)
        #[arg(long, value_parser = clap::value_parser!(i8).range(1..=31))]
        day_of_month: Option<i8>,
    },

    /// Check or uncheck a task
    Done {
        /// List number or part of the title
        task: String,
    },

    /// Delete a task
    Delete {
        /// List number or part of the title
        task: String,
    },

    /// Uncheck the tasks of a cycle whose period has ended
    Reset { cycle: Cycle },

    /// Show completion per cycle
    Stats,

    /// Export all tasks to a JSON file
    Export { file: PathBuf },

    /// Replace all tasks with the contents of a JSON file
    Import { file: PathBuf },
}

fn parse_day_of_week(value: &str) -> Result<i8, String> {
    if let Ok(number) = value.parse::<i8>() {
        return Weekday::from_sunday_zero_offset(number)
            .map(|w| w.to_sunday_zero_offset())
            .map_err(|_| format!("'{value}' is not a day of the week (0-6, 0 = Sunday)"));
    }

    let weekday = match value.to_lowercase().as_str() {
        "sunday" | "sun" => Weekday::Sunday,
        "monday" | "mon" => Weekday::Monday,
        "tuesday" | "tue" => Weekday::Tuesday,
        "wednesday" | "wed" => Weekday::Wednesday,
        "thursday" | "thu" => Weekday::Thursday,
        "friday" | "fri" => Weekday::Friday,
        "saturday" | "sat" => Weekday::Saturday,
        _ => return Err(format!("'{value}' is not a day of the week")),
    };
    Ok(weekday.to_sunday_zero_offset())
}

fn exit_with_error(error: impl Display) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cadence=warn")),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Initialize storage
    let storage_path = cli.store.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cadence")
            .join("store.json")
    });

    // Create parent directory if it doesn't exist
    if let Some(parent) = storage_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            exit_with_error(format!("Failed to create data directory: {}", e))
        });
    }

    let storage = JsonFileStorage::new(storage_path);

    let mut store = match storage.load() {
        Ok(store) => store,
        Err(e) => exit_with_error(format!("Failed to load store: {}", e)),
    };

    let now = Zoned::now();

    match cli.command.unwrap_or(Commands::List { cycle: None }) {
        Commands::List { cycle } => {
            let cycles: Vec<Cycle> = match cycle {
                Some(cycle) => vec![cycle],
                None => Cycle::ALL.to_vec(),
            };
            let total: usize = cycles
                .iter()
                .map(|c| store.get_tasks_in_cycle(*c).count())
                .sum();

            if total == 0 {
                println!("No tasks");
                return;
            }

            ui::render_view_header("Tasks", total);
            for cycle in cycles {
                // List numbers are store positions, so `done 3` matches what is shown
                let tasks: Vec<_> = store
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.cycle == cycle)
                    .collect();
                if tasks.is_empty() {
                    continue;
                }
                ui::render_section_header(&capitalize(cycle.as_str()));
                for (index, task) in tasks {
                    ui::render_task_line(index + 1, task, &now);
                }
            }
            println!();
        }
        Commands::Add {
            title,
            cycle,
            hour,
            day_of_week,
            day_of_month,
        } => {
            let params = AddTaskParameters {
                title,
                cycle,
                hour,
                day_of_week,
                day_of_month,
            };

            match add_task(&mut store, &storage, params, &now) {
                Ok(task) => {
                    println!("✓ Task added: {}", task.title);
                    println!("  #{}  {}", store.tasks.len(), task.cycle);
                    if let Some(deadline) = task.deadline {
                        println!("  Due: {}", ui::format_deadline(deadline, &now));
                    }
                }
                Err(e) => exit_with_error(e),
            }
        }
        Commands::Done { task } => {
            let id = resolve_task(&store, &task).unwrap_or_else(|e| exit_with_error(e));
            match toggle_complete(&mut store, &storage, id) {
                Ok(task) if task.is_completed => println!("✓ Checked: {}", task.title),
                Ok(task) => println!("○ Unchecked: {}", task.title),
                Err(e) => exit_with_error(e),
            }
        }
        Commands::Delete { task } => {
            let id = resolve_task(&store, &task).unwrap_or_else(|e| exit_with_error(e));
            match delete_task(&mut store, &storage, id) {
                Ok(task) => println!("✓ Task deleted: {}", task.title),
                Err(e) => exit_with_error(e),
            }
        }
        Commands::Reset { cycle } => match reset_cycle(&mut store, &storage, cycle, &now) {
            Ok(ResetFeedback::NothingToReset) => {
                println!("No {} tasks to reset", cycle);
            }
            Ok(ResetFeedback::NotYet { next_boundary }) => {
                println!(
                    "{} tasks cannot be reset yet. Next reset available {}",
                    capitalize(cycle.as_str()),
                    ui::format_boundary(&next_boundary).cyan()
                );
            }
            Ok(ResetFeedback::Reset { reset, pending }) => {
                println!(
                    "✓ Reset {} {} {}",
                    reset,
                    cycle,
                    if reset == 1 { "task" } else { "tasks" }
                );
                if pending > 0 {
                    println!(
                        "  {}",
                        format!("{} still inside the current period", pending).dimmed()
                    );
                }
            }
            Err(e) => exit_with_error(e),
        },
        Commands::Stats => {
            let (completed, total) = store.completion(None);
            ui::render_view_header("Completion", total);
            ui::render_completion("all", completed, total);
            for cycle in Cycle::ALL {
                let (completed, total) = store.completion(Some(cycle));
                ui::render_completion(cycle.as_str(), completed, total);
            }
            println!();
        }
        Commands::Export { file } => match export_to_file(&store, &file) {
            Ok(count) => println!("✓ Exported {} tasks to {}", count, file.display()),
            Err(TransferError::NothingToExport) => println!("Nothing to export"),
            Err(e) => exit_with_error(e),
        },
        Commands::Import { file } => match import_from_file(&mut store, &storage, &file) {
            Ok(count) => println!("✓ Imported {} tasks from {}", count, file.display()),
            Err(e) => exit_with_error(format!("Import rejected, tasks left unchanged: {}", e)),
        },
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::store::Store;

    /// Loads the store a second time to make sure a command's write landed.
    fn reload(storage: &impl Storage) -> Store {
        storage.load().unwrap()
    }

    #[test]
    fn test_parse_day_of_week() {
        assert_eq!(parse_day_of_week("0"), Ok(0));
        assert_eq!(parse_day_of_week("Monday"), Ok(1));
        assert_eq!(parse_day_of_week("sat"), Ok(6));
        assert!(parse_day_of_week("7").is_err());
        assert!(parse_day_of_week("someday").is_err());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("weekly"), "Weekly");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "cadence",
            "add",
            "Laundry",
            "--cycle",
            "weekly",
            "--hour",
            "9",
            "--day-of-week",
            "sat",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add {
                title,
                cycle,
                hour,
                day_of_week,
                day_of_month,
            }) => {
                assert_eq!(title, "Laundry");
                assert_eq!(cycle, Cycle::Weekly);
                assert_eq!(hour, Some(9));
                assert_eq!(day_of_week, Some(6));
                assert_eq!(day_of_month, None);
            }
            _ => panic!("Expected the add command"),
        }
    }

    #[test]
    fn test_cli_rejects_out_of_range_hour() {
        assert!(Cli::try_parse_from(["cadence", "add", "Stretch", "--hour", "24"]).is_err());
        assert!(
            Cli::try_parse_from(["cadence", "add", "Rent", "-c", "monthly", "--day-of-month", "0"])
                .is_err()
        );
    }

    #[test]
    fn test_add_then_reload_from_file() {
        let dir = std::env::temp_dir().join(format!("cadence-main-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let storage = JsonFileStorage::new(dir.join("store.json"));
        let mut store = Store::default();
        let params = AddTaskParameters {
            title: String::from("Stretch"),
            cycle: Cycle::Daily,
            hour: Some(7),
            day_of_week: None,
            day_of_month: None,
        };

        let task = add_task(&mut store, &storage, params, &Zoned::now()).unwrap();
        assert_eq!(reload(&storage).tasks, vec![task]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
