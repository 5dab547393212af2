use std::fs;

use anyhow::Context;
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use regex::Regex;
use tera::{Context as TeraContext, Tera};

use crate::{
    config::Config,
    fastqc,
    job::JobInfo,
    stage::{self, QcResults, StageMapping},
};
use utils::{copy_file, find_files};

/// Subdirectory of the report output taking per-sample images
const SAMPLE_PIC_DIR: &str = "qc_sample/pics";

/// Generate the report for the job described by cfg
pub fn generate(cfg: &Config) -> anyhow::Result<()> {
    let job = JobInfo::from_path(cfg.job_dir())?;
    info!(
        "Generating report for job {} ({}) under {}",
        job.id(),
        job.job_type(),
        job.root_path().display()
    );

    let qc = stage::collect_qc_results(cfg, &job)?;

    fs::create_dir_all(cfg.out_dir()).with_context(|| {
        format!(
            "Could not create output directory {}",
            cfg.out_dir().display()
        )
    })?;

    let templates = load_templates()?;
    let ctx = build_context(&job, &qc);
    for sm in stage::STAGE_MAPPING {
        render_stage(&templates, &ctx, sm, cfg)?;
    }

    embed_sample_images(cfg, &job)?;

    info!("Report written to {}", cfg.out_dir().display());
    Ok(())
}

/// Report templates are embedded in the binary
fn load_templates() -> anyhow::Result<Tera> {
    let mut t = Tera::default();
    t.add_raw_template("qc.html", include_str!("templates/qc.html.tera"))
        .with_context(|| "Error compiling report templates")?;
    Ok(t)
}

fn build_context(job: &JobInfo, qc: &QcResults) -> TeraContext {
    let check_image: IndexMap<&str, &str> = fastqc::CHECK_IMAGE.iter().copied().collect();
    let status_glyph: IndexMap<&str, &str> = fastqc::STATUS_GLYPH.iter().copied().collect();
    let local: DateTime<Local> = Local::now();

    let mut ctx = TeraContext::new();
    ctx.insert("job_id", job.id());
    ctx.insert("job_type", job.job_type());
    ctx.insert("pipe_param", &job.pipe_param());
    ctx.insert("sample_group", job.sample_group());
    ctx.insert("qc_info", &qc.qc_info);
    ctx.insert("over_seq", &qc.over_seq);
    ctx.insert("check_image", &check_image);
    ctx.insert("check_no_image", fastqc::CHECK_NO_IMAGE);
    ctx.insert("status_glyph", &status_glyph);
    ctx.insert("stage_mapping", stage::STAGE_MAPPING);
    ctx.insert("time", &local.format("%a %b %e %T %Y").to_string());
    ctx.insert("version", env!("CARGO_PKG_VERSION"));
    ctx
}

fn render_stage(
    templates: &Tera,
    ctx: &TeraContext,
    sm: &StageMapping,
    cfg: &Config,
) -> anyhow::Result<()> {
    debug!("Rendering stage {} with template {}", sm.route, sm.template);
    let html = templates
        .render(sm.template, ctx)
        .with_context(|| format!("Error rendering template {}", sm.template))?;
    let out = cfg.out_dir().join(format!("{}.html", sm.route));
    fs::write(&out, html).with_context(|| format!("Error writing {}", out.display()))?;
    Ok(())
}

/// Copy each sample's FastQC images under the report output so the
/// rendered pages can reference them.  A sample without images is
/// reported but does not stop the run
fn embed_sample_images(cfg: &Config, job: &JobInfo) -> anyhow::Result<()> {
    let reg = Regex::new(r"[.]png$")?;
    for s in job.sample_list() {
        let src_dir = cfg.result_dir().join(s.full_name()).join("Images");
        if !src_dir.is_dir() {
            warn!(
                "No images found for sample {} in {}",
                s.full_name(),
                src_dir.display()
            );
            continue;
        }
        let dst_dir = cfg.out_dir().join(SAMPLE_PIC_DIR).join(s.full_name());
        let files = find_files(&src_dir, &reg)?;
        for f in &files {
            let name = f.file_name().expect("Illegal file name");
            copy_file(f, dst_dir.join(name))?;
        }
        debug!("Copied {} images for sample {}", files.len(), s.full_name());
    }
    Ok(())
}
