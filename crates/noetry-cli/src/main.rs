//! Noetry CLI - a simple virtual environment and dependency manager

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use noetry_pkg::{Platform, Project, SystemRunner};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod add;
mod convert;
mod env;
mod init;
mod list;
mod remove;
mod run;

#[derive(Parser)]
#[command(name = "noetry")]
#[command(version)]
#[command(about = "Noetry - A simple virtual environment and dependency manager", long_about = None)]
#[command(after_help = "Example:\n    noetry add requests\n    noetry run python script.py\n    noetry list")]
struct Cli {
    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true, env = "NOETRY_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// Interpreter used to create the virtual environment
    #[arg(long, global = true, env = "NOETRY_PYTHON")]
    python: Option<OsString>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new virtual environment for the project
    Create,

    /// Delete the virtual environment for the project
    Delete,

    /// Install a package and add it to requirements.txt
    Add {
        /// Package to install (any pip requirement specifier)
        package: String,
    },

    /// Uninstall a package and remove it from requirements.txt
    Remove {
        /// Package to uninstall
        package: String,
    },

    /// Set the Python version for the virtual environment
    SetPython {
        /// Interpreter version, e.g. 3.11
        version: String,
    },

    /// Initialize a new .noetry.yml configuration file
    Init,

    /// Convert a Poetry project to a Noetry project
    Convert,

    /// Run a command within the virtual environment
    Run {
        /// Command and its arguments; put `--` first when the command starts
        /// with an option (`noetry run -- -v` passes `-v` through)
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List all packages installed in the virtual environment
    List,
}

/// Resolved global options shared by every command.
struct Globals {
    project_dir: PathBuf,
    platform: Platform,
    python: Option<OsString>,
}

impl Globals {
    fn from_cli(cli: &Cli) -> Result<Self> {
        // Tools run with the project as their working directory, so every
        // path handed to them must already be absolute.
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let project_dir = match &cli.project_dir {
            Some(dir) => cwd.join(dir),
            None => cwd,
        };
        Ok(Self {
            project_dir,
            platform: Platform::host(),
            python: cli.python.clone(),
        })
    }

    fn project(&self) -> Project<'static> {
        let project = Project::new(self.project_dir.clone(), self.platform, &SystemRunner);
        match &self.python {
            Some(python) => project.with_base_python(python.clone()),
            None => project,
        }
    }
}

/// Initialize tracing with output to stderr so stdout carries only results
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "noetry=warn,noetry_pkg=warn",
        1 => "noetry=info,noetry_pkg=info",
        _ => "noetry=debug,noetry_pkg=debug",
    };
    let filter = if verbose > 0 {
        tracing_subscriber::EnvFilter::new(default)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    let ctx = Globals::from_cli(&cli)?;
    tracing::debug!(project = %ctx.project_dir.display(), platform = %ctx.platform, "resolved project");

    match cli.command {
        Some(Commands::Create) => env::create(&ctx.project())?,
        Some(Commands::Delete) => env::delete(&ctx.project())?,
        Some(Commands::Add { package }) => add::add_package(&ctx.project(), &package)?,
        Some(Commands::Remove { package }) => remove::remove_package(&ctx.project(), &package)?,
        Some(Commands::SetPython { version }) => init::set_python(&ctx.project(), &version)?,
        Some(Commands::Init) => init::init_project(&ctx.project())?,
        Some(Commands::Convert) => convert::convert_from_poetry(&ctx.project())?,
        Some(Commands::Run { command }) => return run::run_command(&ctx.project(), &command),
        Some(Commands::List) => list::list_packages(&ctx.project())?,
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map a failure to a process exit code by its underlying error kind.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<noetry_pkg::Error>())
        .map_or(1, |e| e.kind().exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_collects_trailing_arguments() {
        let cli = Cli::try_parse_from(["noetry", "run", "python", "-m", "pytest", "-x"]).unwrap();
        match cli.command {
            Some(Commands::Run { command }) => {
                assert_eq!(command, vec!["python", "-m", "pytest", "-x"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn run_requires_a_command() {
        assert!(Cli::try_parse_from(["noetry", "run"]).is_err());
    }

    #[test]
    fn add_requires_a_package() {
        assert!(Cli::try_parse_from(["noetry", "add"]).is_err());
    }

    #[test]
    fn set_python_subcommand_name() {
        let cli = Cli::try_parse_from(["noetry", "set-python", "3.11"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::SetPython { version }) if version == "3.11"
        ));
    }

    #[test]
    fn project_dir_is_global() {
        let cli = Cli::try_parse_from(["noetry", "list", "-C", "/tmp/proj"]).unwrap();
        assert_eq!(cli.project_dir, Some(PathBuf::from("/tmp/proj")));
    }

    #[test]
    fn relative_project_dir_is_made_absolute() {
        let cli = Cli::try_parse_from(["noetry", "-C", "app", "list"]).unwrap();
        let globals = Globals::from_cli(&cli).unwrap();
        assert!(globals.project_dir.is_absolute());
        assert_eq!(
            globals.project_dir,
            std::env::current_dir().unwrap().join("app")
        );
    }

    #[test]
    fn run_flags_before_command_are_global_unless_escaped() {
        let cli = Cli::try_parse_from(["noetry", "run", "-v", "python"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Some(Commands::Run { ref command }) if command == &["python"]));

        let cli = Cli::try_parse_from(["noetry", "run", "--", "-v", "python"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.command, Some(Commands::Run { ref command }) if command == &["-v", "python"]));
    }

    #[test]
    fn no_command_is_allowed() {
        let cli = Cli::try_parse_from(["noetry"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn exit_code_follows_error_kind() {
        let err = anyhow::Error::new(noetry_pkg::Error::UnsupportedPlatform)
            .context("Failed to run command");
        assert_eq!(exit_code_for(&err), 4);

        let other = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&other), 1);
    }
}
