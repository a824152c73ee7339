use crate::checks::check_file_name;
use crate::entry::FileEntry;
use crate::template::{Template, TemplateError};
use crate::token::{render, Token};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub reference_time: Option<DateTime<Local>>,
    pub case_insensitive: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePair {
    pub entry: FileEntry,
    pub new_name: String,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenameStats {
    pub planned: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub reference_time: DateTime<Local>,
    pub pairs: Vec<RenamePair>,
    pub stats: RenameStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    DuplicateName,
    InvalidName,
    ExistingFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub file_index: usize,
    pub name: String,
    pub kind: ConflictKind,
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0}")]
    Template(#[from] TemplateError),
    #[error("リネーム先が競合しています: {}件", .0.len())]
    Conflict(Vec<Conflict>),
}

pub fn generate(template: &Template, files: &[FileEntry]) -> Result<RenamePlan, GenerateError> {
    generate_with_options(template, files, &GenerateOptions::default())
}

pub fn generate_with_options(
    template: &Template,
    files: &[FileEntry],
    options: &GenerateOptions,
) -> Result<RenamePlan, GenerateError> {
    template.validate()?;

    let reference_time = options.reference_time.unwrap_or_else(Local::now);
    let case_insensitive = options
        .case_insensitive
        .unwrap_or_else(host_case_insensitive);
    let extension_supplied = template.tokens().iter().any(|token| {
        matches!(
            token,
            Token::OriginalName {
                strip_extension: false,
            }
        )
    });

    let mut pairs = Vec::with_capacity(files.len());
    let mut stats = RenameStats::default();

    for (index, entry) in files.iter().enumerate() {
        let mut new_name = String::new();
        for (token_index, token) in template.tokens().iter().enumerate() {
            let piece = render(token, index, reference_time, entry)
                .map_err(|source| TemplateError {
                    token_index,
                    source,
                })?;
            new_name.push_str(&piece);
        }
        if !extension_supplied {
            new_name.push('.');
            new_name.push_str(&entry.canonical_extension());
        }

        let changed = new_name != entry.file_name;
        if !changed {
            stats.unchanged += 1;
        }
        stats.planned += 1;
        pairs.push(RenamePair {
            entry: entry.clone(),
            new_name,
            changed,
        });
    }

    let conflicts = collect_conflicts(&pairs, case_insensitive);
    if !conflicts.is_empty() {
        return Err(GenerateError::Conflict(conflicts));
    }

    log::debug!(
        "リネーム計画を生成しました: {}件 (変更なし {}件)",
        stats.planned,
        stats.unchanged
    );

    Ok(RenamePlan {
        reference_time,
        pairs,
        stats,
    })
}

fn collect_conflicts(pairs: &[RenamePair], case_insensitive: bool) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for (file_index, pair) in pairs.iter().enumerate() {
        if let Some(violation) = check_file_name(&pair.new_name) {
            conflicts.push(Conflict {
                file_index,
                name: pair.new_name.clone(),
                kind: ConflictKind::InvalidName,
                detail: violation.to_string(),
            });
        }
    }

    let mut by_name = BTreeMap::<String, Vec<usize>>::new();
    for (file_index, pair) in pairs.iter().enumerate() {
        by_name
            .entry(fold_case(&pair.new_name, case_insensitive))
            .or_default()
            .push(file_index);
    }
    for indices in by_name.values() {
        if indices.len() < 2 {
            continue;
        }
        for &file_index in indices {
            conflicts.push(Conflict {
                file_index,
                name: pairs[file_index].new_name.clone(),
                kind: ConflictKind::DuplicateName,
                detail: "同名の出力が複数あります".to_string(),
            });
        }
    }

    let batch_paths: HashSet<String> = pairs
        .iter()
        .map(|pair| fold_case(&pair.entry.path.to_string_lossy(), case_insensitive))
        .collect();
    for (file_index, pair) in pairs.iter().enumerate() {
        if fold_case(&pair.new_name, case_insensitive)
            == fold_case(&pair.entry.file_name, case_insensitive)
        {
            continue;
        }
        let target = pair.entry.path.with_file_name(&pair.new_name);
        if !target.exists() {
            continue;
        }
        if batch_paths.contains(&fold_case(&target.to_string_lossy(), case_insensitive)) {
            continue;
        }
        conflicts.push(Conflict {
            file_index,
            name: pair.new_name.clone(),
            kind: ConflictKind::ExistingFile,
            detail: "既存のファイルと衝突します".to_string(),
        });
    }

    conflicts.sort_by_key(|conflict| conflict.file_index);
    conflicts
}

fn fold_case(value: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        value.to_lowercase()
    } else {
        value.to_string()
    }
}

fn host_case_insensitive() -> bool {
    cfg!(any(windows, target_os = "macos"))
}
