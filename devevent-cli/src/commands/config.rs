//! Print the resolved configuration with secrets redacted

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use devevent_core::config::default_config_path;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub overrides: super::Overrides,

    /// Only print the config file path
    #[arg(long)]
    pub path: bool,
}

pub fn run_config(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    if args.path {
        match config_path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => println!("{}", path.display()),
            None => println!("<no home directory>"),
        }
        return Ok(());
    }

    let config = args.overrides.resolve(config_path)?;
    println!("{config}");
    Ok(())
}
