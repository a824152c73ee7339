use crate::generator::RenamePlan;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied { from: PathBuf, to: PathBuf },
    Unchanged { path: PathBuf },
    Failed { from: PathBuf, to: PathBuf, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyReport {
    pub outcomes: Vec<ApplyOutcome>,
    pub applied: usize,
    pub unchanged: usize,
    pub failed: usize,
}

pub fn apply_plan(plan: &RenamePlan) -> ApplyReport {
    let mut report = ApplyReport::default();

    for pair in &plan.pairs {
        if !pair.changed {
            report.unchanged += 1;
            report.outcomes.push(ApplyOutcome::Unchanged {
                path: pair.entry.path.clone(),
            });
            continue;
        }

        let target = pair.entry.path.with_file_name(&pair.new_name);
        match rename_one(&pair.entry.path, &target) {
            Ok(()) => {
                report.applied += 1;
                report.outcomes.push(ApplyOutcome::Applied {
                    from: pair.entry.path.clone(),
                    to: target,
                });
            }
            Err(message) => {
                log::warn!(
                    "リネームに失敗しました: {} -> {}: {message}",
                    pair.entry.path.display(),
                    target.display()
                );
                report.failed += 1;
                report.outcomes.push(ApplyOutcome::Failed {
                    from: pair.entry.path.clone(),
                    to: target,
                    message,
                });
            }
        }
    }

    report
}

fn rename_one(from: &Path, to: &Path) -> Result<(), String> {
    if to.exists() && !is_same_file(from, to) {
        return Err("リネーム先が既に存在します".to_string());
    }
    fs::rename(from, to).map_err(|err| err.to_string())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
