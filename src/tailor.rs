// src/tailor.rs
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::JobPosting;

pub const TITLE_PLACEHOLDER: &str = "{{job_title}}";
pub const COMPANY_PLACEHOLDER: &str = "{{company}}";

pub fn render(template: &str, job: &JobPosting) -> String {
    template
        .replace(TITLE_PLACEHOLDER, &job.title)
        .replace(COMPANY_PLACEHOLDER, &job.company)
}

/// `cv_<slug>`: lower-case, whitespace to `_`, path separators dropped, `unknown` when empty.
pub fn company_slug(company: &str) -> String {
    let slug: String = company
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '.'))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}

/// Fill the base CV template for `job` and write it into `out_dir`. Returns the new file.
pub fn tailor_cv(job: &JobPosting, template_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    let template = fs::read_to_string(template_path)
        .with_context(|| format!("reading CV template {}", template_path.display()))?;
    let ext = template_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("txt");

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let out = out_dir.join(format!("cv_{}.{ext}", company_slug(&job.company)));
    fs::write(&out, render(&template, job))
        .with_context(|| format!("writing {}", out.display()))?;
    tracing::debug!(path = %out.display(), "tailored CV written");
    Ok(out)
}
