use anyhow::Result;
use clap::Parser;

use covpost::config::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    covpost::run::run(&cli)
}
