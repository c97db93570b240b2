//! Command-line argument definitions.

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Warden - role and permission administration
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(about = "Inspect Warden role tables and evaluate access checks", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "WARDEN_CONFIG", global = true)]
    pub config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every role and what it grants
    Roles {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the permissions of one role, grouped by area
    Permissions {
        /// Role name (Admin, Manager, User, Guest)
        role: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a requirement against a hypothetical principal
    Check(CheckArgs),
    /// Configuration file operations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `warden check`.
#[derive(ClapArgs, Debug, Default)]
pub struct CheckArgs {
    /// Role held by the principal (repeatable; unknown names are ignored)
    #[arg(long = "role", value_name = "ROLE")]
    pub roles: Vec<String>,

    /// Evaluate with no principal at all
    #[arg(long, conflicts_with_all = ["roles", "loading"])]
    pub anonymous: bool,

    /// Evaluate while identity is still loading
    #[arg(long)]
    pub loading: bool,

    /// Accept principals holding this role (repeatable, any-of)
    #[arg(long = "require-role", value_name = "ROLE")]
    pub require_roles: Vec<String>,

    /// Required permission (repeatable)
    #[arg(long = "require", value_name = "PERMISSION")]
    pub require_permissions: Vec<String>,

    /// Require every listed permission instead of any one
    #[arg(long)]
    pub all: bool,

    /// Where a denied, authenticated principal is sent
    #[arg(long, value_name = "PATH")]
    pub redirect_to: Option<String>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// `warden config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,
    /// Write a default config file
    Init {
        /// Target file (defaults to the resolved path)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
