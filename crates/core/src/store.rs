use crate::config::app_paths;
use crate::template::Template;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTemplate {
    pub name: String,
    pub tokens: Template,
}

pub fn templates_to_json(templates: &[SavedTemplate]) -> Result<String> {
    serde_json::to_string_pretty(templates).context("テンプレートのシリアライズに失敗しました")
}

pub fn templates_from_json(raw: &str) -> Result<Vec<SavedTemplate>> {
    serde_json::from_str(raw).context("テンプレートのパースに失敗しました")
}

pub fn load_templates_from(path: &Path) -> Result<Vec<SavedTemplate>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("テンプレートファイルを読めませんでした: {}", path.display()))?;
    templates_from_json(&raw)
}

pub fn save_templates_to(path: &Path, templates: &[SavedTemplate]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "テンプレート用ディレクトリを作成できませんでした: {}",
                parent.display()
            )
        })?;
    }
    let body = templates_to_json(templates)?;
    fs::write(path, body).with_context(|| {
        format!(
            "テンプレートファイルを書き込めませんでした: {}",
            path.display()
        )
    })?;
    Ok(())
}

pub fn load_templates() -> Result<Vec<SavedTemplate>> {
    load_templates_from(&app_paths()?.templates_path)
}

pub fn save_templates(templates: &[SavedTemplate]) -> Result<()> {
    save_templates_to(&app_paths()?.templates_path, templates)
}

pub fn find_template<'a>(templates: &'a [SavedTemplate], name: &str) -> Option<&'a SavedTemplate> {
    templates.iter().find(|template| template.name == name)
}

pub fn upsert_template(templates: &mut Vec<SavedTemplate>, template: SavedTemplate) {
    match templates.iter().position(|t| t.name == template.name) {
        Some(position) => templates[position] = template,
        None => templates.push(template),
    }
}

pub fn remove_template(templates: &mut Vec<SavedTemplate>, name: &str) -> bool {
    let before = templates.len();
    templates.retain(|template| template.name != name);
    templates.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse_template;
    use crate::token::{DateReference, Token};
    use tempfile::tempdir;

    fn sample_templates() -> Vec<SavedTemplate> {
        vec![
            SavedTemplate {
                name: "連番".to_string(),
                tokens: Template::new(vec![
                    Token::Number {
                        min_digits: 4,
                        init: 1,
                        gain: 1,
                    },
                    Token::Literal {
                        text: "_".to_string(),
                    },
                    Token::OriginalName {
                        strip_extension: true,
                    },
                ]),
            },
            SavedTemplate {
                name: "撮影日".to_string(),
                tokens: Template::new(vec![
                    Token::DateFormat {
                        pattern: "%Y-%m-%d".to_string(),
                        reference: DateReference::FileMtime,
                    },
                    Token::Number {
                        min_digits: 1,
                        init: 11,
                        gain: -3,
                    },
                    Token::OriginalName {
                        strip_extension: false,
                    },
                ]),
            },
        ]
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let templates = sample_templates();
        let json = templates_to_json(&templates).expect("must serialize");
        let loaded = templates_from_json(&json).expect("must parse");
        assert_eq!(loaded, templates);
    }

    #[test]
    fn save_and_load_round_trip_through_disk() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("templates.json");
        let templates = sample_templates();

        save_templates_to(&path, &templates).expect("must save");
        let loaded = load_templates_from(&path).expect("must load");
        assert_eq!(loaded, templates);
    }

    #[test]
    fn loading_missing_file_yields_empty_list() {
        let temp = tempdir().expect("tempdir");
        let loaded =
            load_templates_from(&temp.path().join("missing.json")).expect("must not fail");
        assert!(loaded.is_empty());
    }

    #[test]
    fn upsert_replaces_by_name() {
        let mut templates = sample_templates();
        let replacement = SavedTemplate {
            name: "連番".to_string(),
            tokens: parse_template("{num:2:0:5}").expect("must parse"),
        };

        upsert_template(&mut templates, replacement.clone());
        assert_eq!(templates.len(), 2);
        assert_eq!(find_template(&templates, "連番"), Some(&replacement));
    }

    #[test]
    fn upsert_appends_new_names() {
        let mut templates = sample_templates();
        upsert_template(
            &mut templates,
            SavedTemplate {
                name: "新規".to_string(),
                tokens: parse_template("{orig}").expect("must parse"),
            },
        );
        assert_eq!(templates.len(), 3);
    }

    #[test]
    fn remove_reports_whether_a_template_existed() {
        let mut templates = sample_templates();
        assert!(remove_template(&mut templates, "連番"));
        assert!(!remove_template(&mut templates, "連番"));
        assert_eq!(templates.len(), 1);
    }
}
