use clap::CommandFactory;
use clap_complete::{Shell as CompletionShell, generate};

use crate::cli::{Cli, Shell};

/// Print a completion script for `shell` to stdout.
pub fn run(shell: Shell) {
    let shell = match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::Powershell => CompletionShell::PowerShell,
    };
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "radpath", &mut std::io::stdout());
}
