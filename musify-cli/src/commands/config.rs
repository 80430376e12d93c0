//! Config command - show the effective configuration.

use anyhow::Result;
use clap::Args;

use musify_store::{Config, default_config_dir};

use super::{catalog_config, load_config};
use crate::output::{ConfigOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    /// Only print configuration paths.
    #[arg(long, conflicts_with = "init")]
    pub path: bool,

    /// Write a default config file if none exists.
    #[arg(long)]
    pub init: bool,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    if args.path {
        return show_paths(cli);
    }
    if args.init {
        return init(cli).await;
    }

    let config = load_config(cli).await?;
    let output = ConfigOutput::new(&Config::default_path(), &config, &catalog_config(&config));

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_config(&output));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

async fn init(cli: &Cli) -> Result<()> {
    let config_file = Config::default_path();
    let created = !config_file.exists();
    if created {
        Config::default().save().await?;
    }

    match cli.format {
        OutputFormat::Text if created => println!("Wrote {}", config_file.display()),
        OutputFormat::Text => println!("{} already exists", config_file.display()),
        OutputFormat::Json => {
            let status = serde_json::json!({
                "config_file": config_file.display().to_string(),
                "created": created,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&status)?);
        }
    }
    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = Config::default_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }
    Ok(())
}
