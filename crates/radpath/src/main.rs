use clap::Parser;
use colored::Colorize;

use radpath::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    radpath::logging::init(cli.verbose, cli.quiet, !cli.no_color);

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}
