use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "radpath")]
#[command(author, version, about)]
#[command(long_about = "Plan a single route over every segment of a trail map.\n\n\
    Reads a JSON edge list, doubles the cheapest set of segments so the route can\n\
    close on itself, and walks it as straight as possible.\n\n\
    Examples:\n  \
    radpath route map.json                Print the route as JSON\n  \
    radpath route map.json --map-width 800  Also report distance in map widths\n  \
    radpath double-edges map.json         Only list the segments walked twice\n  \
    radpath overlay map.json --offset 4   Print offset segments for drawing")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan a route over an edge list
    Route {
        /// JSON edge list: [[[x,y],[x,y]], ...] or {"edges": [...]}
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,

        /// Map width in pixels, to report the distance in map widths
        #[arg(long)]
        map_width: Option<f64>,
    },

    /// List the segments that must be walked twice
    DoubleEdges {
        /// JSON edge list
        file: PathBuf,
    },

    /// Plan a route and print its steps offset sideways for drawing
    Overlay {
        /// JSON edge list
        file: PathBuf,

        /// Sideways offset in map pixels
        #[arg(long)]
        offset: Option<f64>,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. planner.loop_lenience, planner.conflict_policy, output.pretty)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let quiet = self.quiet;
        match self.command {
            Some(Commands::Route {
                file,
                output,
                pretty,
                map_width,
            }) => crate::commands::route::run(&file, output.as_deref(), pretty, map_width, quiet),
            Some(Commands::DoubleEdges { file }) => crate::commands::route::double_edges(&file),
            Some(Commands::Overlay { file, offset }) => {
                crate::commands::route::overlay(&file, offset)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("radpath {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                use clap::CommandFactory;
                let mut cmd = Self::command();
                cmd.print_help()?;
                println!();
                Ok(())
            }
        }
    }
}
