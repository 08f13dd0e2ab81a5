//! Template field schemas and data files.
//!
//! A schema lists the fields a template expects, optionally grouped:
//!
//! ```yaml
//! title: Доверенность
//! grouped_fields:
//!   - name: Сотрудник
//!     fields:
//!       - { tag: fio, name: ФИО сотрудника, type: text, length: 100 }
//! ungrouped_fields:
//!   - { tag: days, name: Срок, type: number, default: "10" }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use doctpl_render::{Context, Defaults};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub title: String,
    #[serde(default)]
    pub grouped_fields: Vec<FieldGroup>,
    #[serde(default)]
    pub ungrouped_fields: Vec<Field>,
}

impl Schema {
    pub fn load(path: &Path) -> Result<Self> {
        load_data(path)
    }

    /// Every field, grouped ones first.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.grouped_fields
            .iter()
            .flat_map(|g| g.fields.iter())
            .chain(self.ungrouped_fields.iter())
    }

    pub fn field_tags(&self) -> BTreeSet<String> {
        self.fields().map(|f| f.tag.clone()).collect()
    }

    /// `tag -> field name`, the context of a draft render.
    pub fn labels(&self) -> Context {
        self.fields().map(|f| (f.tag.as_str(), f.name.as_str())).collect()
    }

    /// `tag -> default`, falling back to the field name when a field has no
    /// default or an empty one.
    pub fn defaults(&self) -> Defaults {
        self.fields()
            .map(|f| {
                let text = match f.default.as_deref() {
                    Some(default) if !default.is_empty() => default,
                    _ => f.name.as_str(),
                };
                (f.tag.clone(), text.to_string())
            })
            .collect()
    }

    pub fn draft_file_name(&self, extension: &str) -> String {
        format!("{}_шаблон.{extension}", self.title)
    }

    pub fn preview_file_name(&self, extension: &str) -> String {
        format!("{}_preview.{extension}", self.title)
    }
}

/// Reads a YAML or JSON file, chosen by extension (YAML unless `.json`).
pub fn load_data<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
title: Доверенность
grouped_fields:
  - name: Сотрудник
    fields:
      - { tag: fio, name: ФИО сотрудника, hint: Полностью, type: text, length: 100 }
      - { tag: post, name: Должность, default: "" }
ungrouped_fields:
  - { tag: days, name: Срок, type: number, default: "10" }
"#;

    fn schema() -> Schema {
        serde_yaml::from_str(SCHEMA).unwrap()
    }

    #[test]
    fn test_fields_in_order() {
        let s = schema();
        let tags: Vec<&str> = s.fields().map(|f| f.tag.as_str()).collect();
        assert_eq!(tags, vec!["fio", "post", "days"]);
        assert_eq!(schema().grouped_fields[0].fields[0].kind, "text");
    }

    #[test]
    fn test_labels_and_defaults() {
        let schema = schema();
        let labels = schema.labels();
        assert_eq!(labels.get("fio"), Some(&serde_json::json!("ФИО сотрудника")));

        let defaults = schema.defaults();
        assert_eq!(defaults["fio"], "ФИО сотрудника");
        assert_eq!(defaults["post"], "Должность");
        assert_eq!(defaults["days"], "10");
    }

    #[test]
    fn test_output_names() {
        assert_eq!(schema().draft_file_name("pdf"), "Доверенность_шаблон.pdf");
        assert_eq!(schema().preview_file_name("docx"), "Доверенность_preview.docx");
    }

    #[test]
    fn test_loads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, serde_json::to_string(&schema()).unwrap()).unwrap();
        assert_eq!(Schema::load(&path).unwrap(), schema());
    }

    #[test]
    fn test_reports_the_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        fs::write(&path, "title: [").unwrap();
        let err = Schema::load(&path).unwrap_err();
        assert!(err.to_string().contains("schema.yaml"));
    }
}
