use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Huarongdao sliding-block puzzle in the terminal.
#[derive(Parser, Debug)]
#[command(name = "huarongdao", version, long_about = None)]
pub(crate) struct Cli {
    /// Configuration file (defaults to ./huarongdao.toml when present).
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Directory holding records and custom levels; overrides the config file.
    #[arg(long, global = true)]
    pub(crate) data_dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List built-in and custom levels with their best records.
    Levels,

    /// Play a level interactively.
    Play {
        /// Built-in level number or custom level id.
        level: String,
    },

    /// Step through a built-in level's reference solution.
    Replay {
        /// Built-in level number.
        level: u32,
    },

    /// Show or clear best records.
    Records {
        /// Forget every stored record.
        #[arg(long)]
        clear: bool,
    },

    /// Open the level editor.
    Edit {
        /// Custom level to edit; a new level is created when omitted.
        #[arg(long)]
        id: Option<String>,
    },

    /// Import a layout file or share code as a new custom level.
    Import {
        /// File to read, or `-` for standard input.
        path: PathBuf,
    },

    /// Export a custom level as JSON.
    Export {
        /// Custom level id.
        id: String,

        /// Output file; standard output when omitted.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check a layout file or share code without importing it.
    Validate {
        /// File to read, or `-` for standard input.
        path: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print a single-line share code for a custom level.
    Share {
        /// Custom level id.
        id: String,
    },

    /// Delete a custom level and its record.
    Delete {
        /// Custom level id.
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["huarongdao", "play", "2", "--data-dir", "/tmp/x"])
            .expect("arguments parse");
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Command::Play { ref level } if level == "2"));
    }
}
