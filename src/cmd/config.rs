//! Configuration view and validation commands: `review-suite config`.

use anyhow::Result;
use std::path::Path;

use review_suite::suite_config::{CONFIG_DIR, SuiteToml, config_path};

use super::super::ConfigCommands;

fn print_values(toml: &SuiteToml) {
    println!("[agent]");
    if let Some(cmd) = &toml.agent.cmd {
        println!("  cmd = \"{}\"", cmd);
    }
    println!("  allowed_tools = {:?}", toml.agent.allowed_tools);
    if !toml.agent.extra_args.is_empty() {
        println!("  extra_args = {:?}", toml.agent.extra_args);
    }
    println!();
    println!("[suite]");
    println!("  fresh_context = {}", toml.suite.fresh_context);
    println!("  show_freshness = {}", toml.suite.show_freshness);
    println!();
    if let Some(dir) = &toml.prompts.dir {
        println!("[prompts]");
        println!("  dir = \"{}\"", dir.display());
        println!();
    }
}

pub fn cmd_config(project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    let path = config_path(project_dir);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Review Suite Configuration");
            println!("==========================");
            println!();

            let toml = if path.exists() {
                println!("Config file: {}", path.display());
                println!();
                SuiteToml::load(&path)?
            } else {
                println!("No config.toml found at {}", path.display());
                println!();
                println!("Using default configuration:");
                SuiteToml::default()
            };
            print_values(&toml);

            println!("Effective values (with env overrides):");
            println!("  agent cmd = \"{}\"", toml.agent_cmd());
            let loader = toml.template_loader();
            match loader.override_dir() {
                Some(dir) => println!("  template overrides = {}", dir.display()),
                None => println!("  template overrides = (none)"),
            }
            println!();

            if !path.exists() {
                println!("Run 'review-suite config init' to create a config.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !path.exists() {
                println!("No config.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = SuiteToml::load(&path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if path.exists() {
                println!("config.toml already exists at {}", path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(project_dir.join(CONFIG_DIR))?;
            SuiteToml::default().save(&path)?;

            println!("Created config.toml at {}", path.display());
            println!();
            println!("You can now customize:");
            println!("  - [agent] cmd, allowed_tools, extra_args");
            println!("  - [suite] fresh_context, show_freshness");
            println!("  - [prompts] dir for your own stage templates");
            println!();
        }
    }

    Ok(())
}
