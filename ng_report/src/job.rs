use std::path::{Path, PathBuf};

use anyhow::Context;
use compress_io::compress::CompressIo;
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer};

use crate::sample::{PairEnd, Sample};

/// Job description file expected in the job root directory
pub const JOB_INFO_FILE: &str = "job_info.yaml";

/// Per-sample options as written in the job description.
/// pair_end accepts R1, R2, null or false (not pair-end); anything
/// else aborts the load
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SampleOptions {
    #[serde(default, deserialize_with = "de_pair_end")]
    pair_end: Option<PairEnd>,
    #[serde(default)]
    stranded: Option<bool>,
}

fn de_pair_end<'de, D>(d: D) -> Result<Option<PairEnd>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_yaml::Value;

    match Value::deserialize(d)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(s) => s.parse().map(Some).map_err(de::Error::custom),
        v => Err(de::Error::custom(format!(
            "unexpected pair-end type: {:?}",
            v
        ))),
    }
}

/// Raw job description as stored on disk
#[derive(Debug, Deserialize)]
struct JobYaml {
    job_id: String,
    job_type: String,
    #[serde(default)]
    pipe_param: Option<serde_yaml::Mapping>,
    sample_list: Vec<IndexMap<String, Option<SampleOptions>>>,
}

/// JobInfo
///
/// Metadata for one pipeline run, read from the job description file
/// in the job root.  Read only once constructed.
///
/// id - job identifier
/// job_type - pipeline type that produced the results
/// root_path - job root directory
/// pipe_param - opaque pipeline parameter mapping, passed through to the report
/// sample_list - samples in declaration order
/// sample_group - samples grouped by base name so that pair-end mates
///                collapse under one key; order follows sample_list
///
#[derive(Debug)]
pub struct JobInfo {
    id: String,
    job_type: String,
    root_path: PathBuf,
    pipe_param: Option<serde_yaml::Mapping>,
    sample_list: Vec<Sample>,
    sample_group: IndexMap<String, Vec<Sample>>,
}

impl JobInfo {
    /// Read job metadata from the job description file in root
    pub fn from_path<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root_path = root.as_ref().to_owned();
        debug!("Reading job info from path {}", root_path.display());

        let p = root_path.join(JOB_INFO_FILE);
        info!("Reading {}", p.display());
        let rdr = CompressIo::new()
            .path(&p)
            .bufreader()
            .with_context(|| format!("Could not open job description {}", p.display()))?;
        let raw: JobYaml = serde_yaml::from_reader(rdr)
            .with_context(|| format!("Error parsing job description {}", p.display()))?;

        if raw.pipe_param.is_none() {
            warn!("Pipeline parameters not found!")
        }

        let sample_list = parse_sample_list(raw.sample_list)
            .with_context(|| format!("Error reading sample list from {}", p.display()))?;
        let sample_group = group_samples(&sample_list);

        debug!(
            "Job info created (id: {}, type: {}, {} samples in {} groups)",
            raw.job_id,
            raw.job_type,
            sample_list.len(),
            sample_group.len()
        );

        Ok(Self {
            id: raw.job_id,
            job_type: raw.job_type,
            root_path,
            pipe_param: raw.pipe_param,
            sample_list,
            sample_group,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn pipe_param(&self) -> Option<&serde_yaml::Mapping> {
        self.pipe_param.as_ref()
    }

    pub fn sample_list(&self) -> &[Sample] {
        &self.sample_list
    }

    pub fn sample_group(&self) -> &IndexMap<String, Vec<Sample>> {
        &self.sample_group
    }
}

/// Each sample_list entry is a single key mapping of sample name to
/// options; the options block may be empty
fn parse_sample_list(
    raw: Vec<IndexMap<String, Option<SampleOptions>>>,
) -> anyhow::Result<Vec<Sample>> {
    debug!("Get sample list from job description");
    let mut sample_list = Vec::with_capacity(raw.len());
    for entry in raw {
        let (name, info) = entry
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty entry in sample list"))?;
        let info = info.unwrap_or_default();
        sample_list.push(Sample::new(name, info.pair_end, info.stranded));
    }
    Ok(sample_list)
}

/// Group pair-end mates under their shared base name, preserving the
/// declaration order of both groups and group members
fn group_samples(samples: &[Sample]) -> IndexMap<String, Vec<Sample>> {
    let mut groups: IndexMap<String, Vec<Sample>> = IndexMap::new();
    for s in samples {
        groups.entry(s.name().to_owned()).or_default().push(s.clone())
    }
    groups
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn write_job(dir: &Path, yaml: &str) {
        fs::write(dir.join(JOB_INFO_FILE), yaml).unwrap()
    }

    #[test]
    fn load_job_and_group_samples() {
        let tmp = tempfile::tempdir().unwrap();
        write_job(
            tmp.path(),
            concat!(
                "job_id: 2014_A104\n",
                "job_type: tuxedo\n",
                "pipe_param:\n",
                "  threads: 4\n",
                "sample_list:\n",
                "  - '5566':\n",
                "      pair_end: R1\n",
                "  - '5566':\n",
                "      pair_end: R2\n",
                "      stranded: true\n",
                "  - SRR1:\n",
            ),
        );
        let job = JobInfo::from_path(tmp.path()).unwrap();
        assert_eq!(job.id(), "2014_A104");
        assert_eq!(job.job_type(), "tuxedo");
        assert!(job.pipe_param().is_some());

        let names: Vec<_> = job.sample_list().iter().map(|s| s.full_name()).collect();
        assert_eq!(names, ["5566_R1", "5566_R2", "SRR1"]);

        let keys: Vec<_> = job.sample_group().keys().collect();
        assert_eq!(keys, ["5566", "SRR1"]);
        let mates: Vec<_> = job.sample_group()["5566"]
            .iter()
            .map(|s| s.full_name())
            .collect();
        assert_eq!(mates, ["5566_R1", "5566_R2"]);
        assert_eq!(job.sample_group()["SRR1"][0].stranded(), None);
    }

    #[test]
    fn missing_job_id_fails() {
        let tmp = tempfile::tempdir().unwrap();
        write_job(tmp.path(), "job_type: tuxedo\nsample_list:\n  - SRR1:\n");
        assert!(JobInfo::from_path(tmp.path()).is_err());
    }

    #[test]
    fn missing_pipe_param_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write_job(
            tmp.path(),
            "job_id: j1\njob_type: qc\nsample_list:\n  - SRR1:\n",
        );
        let job = JobInfo::from_path(tmp.path()).unwrap();
        assert!(job.pipe_param().is_none());
        assert_eq!(job.sample_list().len(), 1);
    }

    #[test]
    fn invalid_pair_end_aborts_load() {
        let tmp = tempfile::tempdir().unwrap();
        write_job(
            tmp.path(),
            "job_id: j1\njob_type: qc\nsample_list:\n  - SRR1:\n      pair_end: R3\n",
        );
        assert!(JobInfo::from_path(tmp.path()).is_err());
    }

    #[test]
    fn pair_end_true_aborts_load() {
        let tmp = tempfile::tempdir().unwrap();
        write_job(
            tmp.path(),
            "job_id: j1\njob_type: qc\nsample_list:\n  - SRR1:\n      pair_end: true\n",
        );
        assert!(JobInfo::from_path(tmp.path()).is_err());
    }

    #[test]
    fn pair_end_false_means_single_end() {
        let tmp = tempfile::tempdir().unwrap();
        write_job(
            tmp.path(),
            "job_id: j1\njob_type: qc\nsample_list:\n  - SRR1:\n      pair_end: false\n",
        );
        let job = JobInfo::from_path(tmp.path()).unwrap();
        assert_eq!(job.sample_list()[0].full_name(), "SRR1");
        assert_eq!(job.sample_list()[0].pair_end(), None);
    }

    #[test]
    fn missing_description_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(JobInfo::from_path(tmp.path()).is_err());
    }
}
