#[macro_use]
extern crate log;

use std::{
    fmt, fs,
    io::BufRead,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use clap::ArgMatches;
use regex::Regex;

/// LogLevel
///
/// Represents minimum level of messages that will be logged
///
#[derive(Debug, Clone, Copy)]
pub struct LogLevel {
    pub level: usize,
}

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel { level: 0 }),
            "warn" => Ok(LogLevel { level: 1 }),
            "info" => Ok(LogLevel { level: 2 }),
            "debug" => Ok(LogLevel { level: 3 }),
            "trace" => Ok(LogLevel { level: 4 }),
            "none" => Ok(LogLevel { level: 5 }),
            _ => Err("no match"),
        }
    }
}

impl LogLevel {
    pub fn is_none(&self) -> bool {
        self.level > 4
    }
    pub fn get_level(&self) -> usize {
        if self.level > 4 {
            0
        } else {
            self.level
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level_str = ["error", "warn", "info", "debug", "trace", "none"];
        if self.level < 6 {
            write!(f, "{}", level_str[self.level])
        } else {
            write!(f, "unknown")
        }
    }
}

/// Initialize logging from command line arguments
pub fn init_log(m: &ArgMatches) {
    let verbose = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or_else(|| LogLevel::from_str("info").expect("Could not set loglevel info"));
    let quiet = verbose.is_none() || m.get_flag("quiet");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .copied()
        .unwrap_or(stderrlog::Timestamp::Off);

    stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose.get_level())
        .timestamp(ts)
        .init()
        .unwrap();
}

/// Read in next line and split on tabs after trimming white space
pub fn get_next_line<'a, R: BufRead>(
    rdr: &mut R,
    buf: &'a mut String,
) -> anyhow::Result<Option<Vec<&'a str>>> {
    buf.clear();
    if rdr.read_line(buf)? == 0 {
        Ok(None)
    } else {
        Ok(Some(buf.trim().split('\t').collect()))
    }
}

/// Collect regular files in dir whose names match reg, sorted by name
pub fn find_files(dir: &Path, reg: &Regex) -> anyhow::Result<Vec<PathBuf>> {
    let mut v = Vec::new();
    for f in dir
        .read_dir()
        .with_context(|| format!("Error checking directory {}", dir.display()))?
    {
        let entry =
            f.with_context(|| format!("Could not get directory entry from {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            let name = entry.file_name().into_string().expect("Illegal file name");
            if reg.is_match(name.as_str()) {
                trace!("Adding file {}", path.display());
                v.push(path)
            }
        }
    }
    v.sort();
    Ok(v)
}

/// Copy src to dst, creating the destination directory if required
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> anyhow::Result<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    trace!("Copying {} to {}", src.display(), dst.display());
    if let Some(d) = dst.parent() {
        fs::create_dir_all(d)
            .with_context(|| format!("Could not create directory {}", d.display()))?
    }
    fs::copy(src, dst)
        .with_context(|| format!("Error copying {} to {}", src.display(), dst.display()))?;
    Ok(())
}
