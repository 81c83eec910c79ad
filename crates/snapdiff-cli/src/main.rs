mod commands;
mod logging;

use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use snapdiff_core::diff::finder::Finder;
use snapdiff_core::{env, files, AppConfig, DiffRunner, LaunchResult, SystemEnv, ToolKind};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match snapdiff_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Tools) => run_tools(&config),
        Some(Commands::Find { pattern }) => run_find(&pattern),
        Some(Commands::Launch { temp, target, tool }) => {
            run_launch(&config, &temp, &target, tool.as_deref())
        }
        Some(Commands::Kill { temp, target }) => runner(&config).map(|runner| runner.kill(&temp, &target)),
        Some(Commands::Accept { dir }) => run_accept(&dir),
        Some(Commands::Clean { dir, yes }) => run_clean(&dir, yes),
        Some(Commands::Ci) => {
            run_ci();
            Ok(())
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }

    Ok(())
}

fn runner(config: &AppConfig) -> anyhow::Result<DiffRunner> {
    DiffRunner::from_config(Arc::new(SystemEnv), config).context("Failed to set up the diff runner")
}

fn run_tools(config: &AppConfig) -> anyhow::Result<()> {
    let runner = runner(config)?;
    if runner.is_disabled() {
        println!("{}", "Diff launching is disabled".yellow());
        return Ok(());
    }
    if runner.tools().is_empty() {
        println!("{}", "No diff tools found".red());
        return Ok(());
    }
    for tool in runner.tools().resolved() {
        let mut flags = Vec::new();
        if tool.supports_text {
            flags.push("text");
        }
        if tool.auto_refresh {
            flags.push("auto-refresh");
        }
        if tool.is_mdi {
            flags.push("mdi");
        }
        println!(
            "{} {} [{}]",
            tool.name.green(),
            tool.exe_path.display(),
            flags.join(", ").cyan()
        );
    }
    Ok(())
}

fn run_find(pattern: &str) -> anyhow::Result<()> {
    match Finder::default().find(pattern)? {
        Some(path) => println!("{}", path.display().to_string().green()),
        None => println!("{} {}", "Not found:".red(), pattern),
    }
    Ok(())
}

fn run_launch(config: &AppConfig, temp: &Path, target: &Path, tool: Option<&str>) -> anyhow::Result<()> {
    let runner = runner(config)?;
    let result = match tool {
        Some(name) => runner.launch_tool(ToolKind::from_str(name)?, temp, target)?,
        None => runner.launch(temp, target)?,
    };
    let label = result.to_string();
    let colored = match result {
        LaunchResult::StartedNewInstance | LaunchResult::AlreadyRunningAndSupportsRefresh => label.green(),
        LaunchResult::Disabled | LaunchResult::TooManyRunningDiffTools => label.yellow(),
        LaunchResult::NoDiffToolFound | LaunchResult::NoEmptyFileForExtension => label.red(),
    };
    println!("{}", colored);
    Ok(())
}

fn run_accept(dir: &Path) -> anyhow::Result<()> {
    let received = files::find_received_files(dir);
    if received.is_empty() {
        info!("No received files under {}", dir.display());
        return Ok(());
    }
    for file in &received {
        let verified = files::accept_received(file)?;
        println!("{} {}", "Accepted".green(), verified.display());
    }
    info!("{} snapshots accepted", format!("{}", received.len()).green());
    Ok(())
}

fn run_clean(dir: &Path, yes: bool) -> anyhow::Result<()> {
    let received = files::find_received_files(dir);
    if received.is_empty() {
        info!("No received files under {}", dir.display());
        return Ok(());
    }
    if !yes {
        let prompt = format!("Delete {} received files under {}?", received.len(), dir.display());
        if !prompt_confirm(&prompt, Some(false))? {
            return Ok(());
        }
    }
    for file in &received {
        files::delete_if_exists(file).with_context(|| format!("Failed to delete {}", file.display()))?;
        println!("{} {}", "Deleted".red(), file.display());
    }
    Ok(())
}

fn run_ci() {
    let system = SystemEnv;
    match env::detect_ci(&system) {
        Some(server) => println!("Build server: {}", format!("{:?}", server).yellow()),
        None => println!("Build server: {}", "none".green()),
    }
    let disabled = env::is_disabled(&system);
    println!(
        "Diff launching: {}",
        if disabled { "disabled".yellow() } else { "enabled".green() }
    );
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
