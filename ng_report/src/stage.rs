use anyhow::Context;
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    config::Config,
    fastqc::{self, FastqcData, OverSeq},
    job::JobInfo,
};

/// Report page descriptor: URL route, template entrance and the title
/// shown in the navigation bar
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StageMapping {
    pub route: &'static str,
    pub template: &'static str,
    pub title: &'static str,
}

/// Pages making up the report, in display order
pub const STAGE_MAPPING: &[StageMapping] = &[StageMapping {
    route: "qc",
    template: "qc.html",
    title: "Quality Control",
}];

/// Per-sample FastQC results for the QC stage, keyed by full sample
/// name so that pair-end mates stay separate
#[derive(Debug, Default)]
pub struct QcResults {
    pub qc_info: IndexMap<String, IndexMap<String, String>>,
    pub over_seq: IndexMap<String, Vec<OverSeq>>,
}

/// Parse the FastQC report of every sample in the job
pub fn collect_qc_results(cfg: &Config, job: &JobInfo) -> anyhow::Result<QcResults> {
    debug!("Collecting FastQC results for job {}", job.id());

    let mut res = QcResults::default();
    for s in job.sample_list() {
        let p = cfg
            .result_dir()
            .join(s.full_name())
            .join(fastqc::FASTQC_DATA_FILE);
        let FastqcData { qc_info, over_seq } = fastqc::read_fastqc_data(&p)
            .with_context(|| format!("Error reading FastQC data for sample {}", s.full_name()))?;
        res.qc_info.insert(s.full_name().to_owned(), qc_info);
        res.over_seq.insert(s.full_name().to_owned(), over_seq);
    }
    Ok(res)
}
