//! Labels and label schema
//!
//! Anomaly tasks carry exactly two labels: one normal and one anomalous.
//! The schema is stored alongside the model as `label_schema.json` and
//! embedded in deployment configs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{Error, Result};

#[cfg(test)]
mod tests;

/// A single label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    /// RGBA color as `#rrggbbaa`.
    pub color: String,
    #[serde(default)]
    pub hotkey: String,
    pub is_anomalous: bool,
    #[serde(default)]
    pub is_empty: bool,
}

impl Label {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_anomalous: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: if is_anomalous { "#ff0000ff" } else { "#00ff00ff" }.to_string(),
            hotkey: String::new(),
            is_anomalous,
            is_empty: false,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Relation between labels of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelGroupType {
    #[default]
    Exclusive,
    EmptyLabel,
}

/// A named group of mutually related labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGroup {
    pub name: String,
    pub labels: Vec<Label>,
    #[serde(default)]
    pub group_type: LabelGroupType,
}

/// Label schema of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LabelSchema {
    pub groups: Vec<LabelGroup>,
}

impl LabelSchema {
    /// The standard two-label anomaly schema.
    pub fn anomaly() -> Self {
        Self::from_labels(
            "labels",
            vec![Label::new("0", "Normal", false), Label::new("1", "Anomalous", true)],
        )
    }

    /// A schema with a single exclusive group.
    pub fn from_labels(group: impl Into<String>, labels: Vec<Label>) -> Self {
        Self {
            groups: vec![LabelGroup {
                name: group.into(),
                labels,
                group_type: LabelGroupType::Exclusive,
            }],
        }
    }

    /// All labels across groups, in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.groups.iter().flat_map(|g| g.labels.iter())
    }

    pub fn normal_label(&self) -> Result<&Label> {
        self.labels()
            .find(|l| !l.is_anomalous)
            .ok_or(Error::MissingLabel { kind: "normal" })
    }

    pub fn anomalous_label(&self) -> Result<&Label> {
        self.labels()
            .find(|l| l.is_anomalous)
            .ok_or(Error::MissingLabel { kind: "anomalous" })
    }
}

/// Converts a label schema to the JSON layout consumed by deployed models.
pub struct LabelSchemaMapper;

impl LabelSchemaMapper {
    pub fn forward(schema: &LabelSchema) -> Value {
        let all_labels: serde_json::Map<String, Value> = schema
            .labels()
            .map(|label| {
                (
                    label.id.clone(),
                    json!({
                        "_id": label.id,
                        "name": label.name,
                        "color": label.color,
                        "hotkey": label.hotkey,
                        "is_empty": label.is_empty,
                        "is_anomalous": label.is_anomalous,
                    }),
                )
            })
            .collect();

        let label_groups: Vec<Value> = schema
            .groups
            .iter()
            .map(|group| {
                json!({
                    "name": group.name,
                    "label_ids": group.labels.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(),
                    "relation_type": group.group_type,
                })
            })
            .collect();

        json!({
            "label_groups": label_groups,
            "all_labels": all_labels,
        })
    }

    /// Inverse of [`LabelSchemaMapper::forward`].
    pub fn backward(value: &Value) -> Result<LabelSchema> {
        let invalid = |message: &str| Error::InvalidBlob {
            key: crate::model::KEY_LABEL_SCHEMA.to_string(),
            message: message.to_string(),
        };
        let all_labels = value
            .get("all_labels")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("missing 'all_labels'"))?;
        let groups = value
            .get("label_groups")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("missing 'label_groups'"))?;

        let mut schema = LabelSchema::default();
        for group in groups {
            let name = group.get("name").and_then(Value::as_str).unwrap_or_default();
            let group_type: LabelGroupType = group
                .get("relation_type")
                .cloned()
                .map(serde_json::from_value)
                .transpose()?
                .unwrap_or_default();
            let ids = group
                .get("label_ids")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid("group without 'label_ids'"))?;
            let mut labels = Vec::with_capacity(ids.len());
            for id in ids {
                let id = id.as_str().ok_or_else(|| invalid("non-string label id"))?;
                let entry = all_labels
                    .get(id)
                    .ok_or_else(|| invalid(&format!("unknown label id '{id}'")))?;
                labels.push(Label {
                    id: id.to_string(),
                    name: entry.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
                    color: entry.get("color").and_then(Value::as_str).unwrap_or_default().to_string(),
                    hotkey: entry.get("hotkey").and_then(Value::as_str).unwrap_or_default().to_string(),
                    is_anomalous: entry.get("is_anomalous").and_then(Value::as_bool).unwrap_or(false),
                    is_empty: entry.get("is_empty").and_then(Value::as_bool).unwrap_or(false),
                });
            }
            schema.groups.push(LabelGroup {
                name: name.to_string(),
                labels,
                group_type,
            });
        }
        Ok(schema)
    }
}

/// Serialize a label schema for storage under `label_schema.json`.
pub fn label_schema_to_bytes(schema: &LabelSchema) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&LabelSchemaMapper::forward(schema))?)
}

/// Parse a label schema stored by [`label_schema_to_bytes`].
pub fn label_schema_from_bytes(bytes: &[u8]) -> Result<LabelSchema> {
    let value: Value = serde_json::from_slice(bytes)?;
    LabelSchemaMapper::backward(&value)
}
