mod cli;
mod config;
mod fastqc;
mod job;
mod report;
mod sample;
mod stage;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let cfg = cli::handle_cli().with_context(|| "Error processing command line arguments")?;
    report::generate(&cfg)
}
