use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let planner = config.planner();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".yellow());
    }
    println!();
    println!("{}", "planner".bold());
    println!("  loop_lenience:   {}", planner.loop_lenience);
    println!("  palette_size:    {}", planner.palette_size);
    println!("  conflict_policy: {}", planner.conflict_policy);
    println!("{}", "output".bold());
    println!("  pretty:          {}", config.pretty());
    println!("  offset:          {}", config.offset());
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
