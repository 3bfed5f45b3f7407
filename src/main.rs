use anyhow::{Context, Result};
use backup_scheduler::config::{self, Config, ResolvedTask};
use backup_scheduler::managers::backup::{BackupManager, RunReport, TaskOutcome, TaskStatus};
use backup_scheduler::managers::logging::{self, LoggingConfig};
use backup_scheduler::strategies;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "backup-scheduler")]
#[command(about = "Scheduled zip backups with day/week/month/year retention", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/backup-config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all enabled tasks or a specific task
    Run {
        /// Specific task to run (defaults to all tasks)
        #[arg(short, long)]
        task: Option<String>,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show last archive and due state of every task
    Status {
        /// Specific task to check
        #[arg(short, long)]
        task: Option<String>,
    },

    /// List all configured tasks
    List,

    /// Apply retention policies without creating archives
    Purge {
        /// Specific task to purge (defaults to all tasks)
        #[arg(short, long)]
        task: Option<String>,

        /// Show what would be removed without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate configuration file
    Validate,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = config::expand_tilde(&cli.config);
    let config = match config::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            // No log directory is known yet; report on the console only
            logging::init_console_logging();
            tracing::error!("Cannot load configuration {:?}: {}", config_path, e);
            return Err(e).with_context(|| format!("Failed to load {:?}", config_path));
        }
    };
    let tasks = config::resolve_tasks(&config);

    // Setup logging with file rotation (must keep guard alive)
    let logging_config = LoggingConfig::from_config(&config.global);
    let _log_guard = logging::init_logging(&logging_config)?;

    let backup_manager = BackupManager::new(config.clone(), tasks.clone());

    // If no command specified, show status overview
    let command = cli.command.unwrap_or(Commands::Status { task: None });

    let success = match command {
        Commands::Run { task, json } => {
            let report = match task {
                Some(name) => backup_manager.run_task(&name)?,
                None => backup_manager.run_all(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_run_report(&report);
            }
            !report.has_failures()
        }

        Commands::Status { task } => {
            let statuses = match task {
                Some(name) => backup_manager.status_task(&name)?,
                None => backup_manager.status(),
            };

            println!("=== Backup Status ===\n");
            for status in &statuses {
                print_status(status);
            }
            true
        }

        Commands::List => {
            print_tasks(&tasks);
            true
        }

        Commands::Purge { task, dry_run, yes } => {
            if !dry_run && !yes && !confirm_purge(task.as_deref())? {
                println!("Purge cancelled.");
                return Ok(ExitCode::SUCCESS);
            }

            let report = match task {
                Some(name) => backup_manager.purge_task(&name, dry_run)?,
                None => backup_manager.purge_all(dry_run),
            };
            print_purge_report(&report);
            !report.has_failures()
        }

        Commands::Validate => {
            validate(&config, &tasks);
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn confirm_purge(task: Option<&str>) -> Result<bool> {
    use dialoguer::Confirm;

    let prompt = match task {
        Some(name) => format!("Delete archives of task '{}' outside its retention policy?", name),
        None => "Delete archives outside the retention policy of every task?".to_string(),
    };

    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn print_run_report(report: &RunReport) {
    for task in &report.tasks {
        match task.outcome {
            TaskOutcome::Created(ref path) => println!("✓ {}: created {}", task.name, path.display()),
            TaskOutcome::NotDue { next_due, .. } => println!(
                "- {}: not due (next at {})",
                task.name,
                next_due.format("%Y-%m-%d %H:%M")
            ),
            TaskOutcome::SourceMissing => {
                println!("- {}: source {} missing, skipped", task.name, task.source.display())
            }
            TaskOutcome::Disabled => println!("- {}: disabled", task.name),
            TaskOutcome::Purged | TaskOutcome::NoPolicy => {}
            TaskOutcome::Failed(ref e) => eprintln!("✗ {}: {}", task.name, e),
        }

        if let Some(ref purge) = task.purge {
            if !purge.removed.is_empty() {
                println!("  removed {} old archive(s)", purge.removed.len());
            }
            for failure in &purge.failures {
                eprintln!("  ⚠ could not remove {}: {}", failure.path.display(), failure.error);
            }
        }
    }

    if report.stopped_early {
        eprintln!("Run stopped at the first failure (fail_fast)");
    }

    let failures = report.failures().count();
    if failures == 0 {
        println!("✓ All tasks completed successfully");
    } else {
        eprintln!("✗ {} task(s) failed", failures);
    }
}

fn print_status(status: &TaskStatus) {
    println!("Task: {} (#{}, {})", status.name, status.index, status.task_type);
    println!("  Enabled: {}", if status.enabled { "Yes" } else { "No" });
    println!("  Target: {}", status.target.display());
    println!("  Frequency: every {}", status.frequency);

    if let Some(ref error) = status.error {
        println!("  ✗ {}", error);
        println!();
        return;
    }

    match (&status.last_backup, status.age()) {
        (Some(last), Some(age)) => {
            println!("  Last Backup: {} ({})", last.file_name, last.modified.format("%Y-%m-%d %H:%M"));
            println!("  Age: {} hours ago", age.num_hours());
        }
        _ => println!("  Last Backup: none"),
    }

    if let Some(next_due) = status.next_due {
        println!("  Next Due: {}", next_due.format("%Y-%m-%d %H:%M"));
    }
    println!("  Due Now: {}", if status.due { "Yes" } else { "No" });
    println!();
}

fn print_tasks(tasks: &[ResolvedTask]) {
    println!("Configured tasks:");
    for task in tasks {
        println!("  {}", task.name);
        println!("    Type: {}", task.task_type);
        println!("    Enabled: {}", task.enabled);
        println!("    Source: {}", task.source.display());
        println!("    Target: {}", task.target.display());
        println!("    Frequency: every {}", task.frequency);
        println!("    Format: {}", task.archive_format);
        println!("    Base name: {}", task.base_name);
        if let Some(ref retention) = task.retention {
            println!(
                "    Retention: {} daily, {} weekly, {} monthly, {} yearly",
                retention.daily, retention.weekly, retention.monthly, retention.yearly
            );
        }
        println!();
    }
}

fn print_purge_report(report: &RunReport) {
    for task in &report.tasks {
        match (&task.outcome, &task.purge) {
            (TaskOutcome::Purged, Some(purge)) => {
                let verb = if purge.dry_run { "would remove" } else { "removed" };
                println!(
                    "✓ {}: kept {}, {} {}",
                    task.name,
                    purge.kept.len(),
                    verb,
                    purge.removed.len()
                );
                for path in &purge.removed {
                    println!("    {}", path.display());
                }
                for failure in &purge.failures {
                    eprintln!("  ⚠ could not remove {}: {}", failure.path.display(), failure.error);
                }
            }
            (TaskOutcome::NoPolicy, _) => println!("- {}: no retention policy", task.name),
            (TaskOutcome::Disabled, _) => println!("- {}: disabled", task.name),
            (TaskOutcome::Failed(e), _) => eprintln!("✗ {}: {}", task.name, e),
            _ => {}
        }
    }
}

fn validate(config: &Config, tasks: &[ResolvedTask]) {
    println!("Configuration is valid!");
    println!("Tasks: {}", tasks.len());

    for task in tasks {
        if strategies::strategy_for(&task.task_type).is_none() {
            println!(
                "⚠ Task #{} '{}' has unsupported type '{}' and will fail at run time",
                task.index, task.name, task.task_type
            );
        }
        if !task.target.is_dir() {
            println!(
                "⚠ Task #{} '{}': target {} is not a directory",
                task.index,
                task.name,
                task.target.display()
            );
        }
    }

    println!("Logs: {}", config.global.log_directory.display());
}
