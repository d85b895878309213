//! Command-line arguments

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use projects::SortKey;
use projects::models::ProjectStatus;

#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "Task management client", long_about = None)]
pub struct Cli {
    /// TOML configuration file; `TASKDECK_*` variables still override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the access token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },
    /// Forget the stored access token
    Logout,
    /// Show or edit the signed-in profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Change the password
    Password {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Upload a new avatar image
    Avatar {
        /// Image file, at most 2MB
        file: PathBuf,
    },
    /// List users that can join a project
    Users,
    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectsCommand),
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Print the profile
    Show,
    /// Update profile fields; unset flags are left alone
    Update(ProfileArgs),
}

#[derive(Args, Debug, Default, PartialEq)]
pub struct ProfileArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub telegram_id: Option<String>,
    /// Requires a telegram id
    #[arg(long)]
    pub telegram_notifications: Option<bool>,
    #[arg(long)]
    pub phone_number: Option<String>,
    /// Format: YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects
    List {
        /// Sort by `name` or `status`; server order when omitted
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Create a project
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Participant user id, repeatable
        #[arg(long = "participant")]
        participants: Vec<i64>,
        #[arg(long, default_value = "active")]
        status: ProjectStatus,
    },
    /// Update a project you own
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replaces the participant list, repeatable
        #[arg(long = "participant")]
        participants: Option<Vec<i64>>,
        #[arg(long)]
        status: Option<ProjectStatus>,
    },
    /// Delete a project you own
    Delete { id: i64 },
    /// Move a project onto another's position and print the new order
    Move { active: i64, over: i64 },
}
