use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use utils::{init_log, LogLevel};

use crate::config::Config;

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("warn")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("result_dir")
                .short('D')
                .long("result-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Set root of per-sample result directories [default: job directory]"),
        )
        .arg(
            Arg::new("output_dir")
                .short('d')
                .long("output-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .default_value("report")
                .help("Set output directory for the generated report"),
        )
        .arg(
            Arg::new("job_dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("JOB_DIR")
                .required(true)
                .help("Job root directory containing the job description file"),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let job_dir = m
        .get_one::<PathBuf>("job_dir")
        .expect("Missing job directory")
        .clone();

    if !job_dir.is_dir() {
        return Err(anyhow!("Job directory {} not found", job_dir.display()));
    }

    let mut cfg = Config::new(job_dir);

    if let Some(p) = m.get_one::<PathBuf>("result_dir") {
        cfg.set_result_dir(p.to_owned())
    }

    if let Some(p) = m.get_one::<PathBuf>("output_dir") {
        cfg.set_out_dir(p.to_owned())
    }

    Ok(cfg)
}
