//! IR graph definition and the on-disk IR pair.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::rt_info::{ModelInfo, RtValue};
use crate::{Error, Result};

static FAKE_QUANTIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<layer\b[^>]*\btype\s*=\s*"FakeQuantize""#).expect("Invalid FakeQuantize regex")
});

static PARAMETER_SHAPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<layer\b[^>]*\btype\s*=\s*"Parameter"[^>]*>\s*<data\b[^>]*\bshape\s*=\s*"([^"]*)""#)
        .expect("Invalid Parameter shape regex")
});

static RT_ENTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([A-Za-z_][\w.\-]*)\s+value\s*=\s*"([^"]*)"\s*/>"#).expect("Invalid rt_info entry regex")
});

const MODEL_INFO_TAG: &str = "model_info";

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

/// Graph definition (`.xml`) of an IR model.
#[derive(Debug, Clone, PartialEq)]
pub struct IrGraph {
    xml: String,
}

impl IrGraph {
    /// Parse a graph definition; the document must have a `<net>` root.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| Error::InvalidIr {
                message: format!("graph is not UTF-8: {e}"),
            })?
            .to_string();
        if !xml.contains("<net") || !xml.contains("</net>") {
            return Err(Error::InvalidIr {
                message: "missing <net> root element".to_string(),
            });
        }
        Ok(Self { xml })
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.xml.as_bytes().to_vec()
    }

    /// Whether the graph contains quantization (`FakeQuantize`) nodes.
    pub fn is_quantized(&self) -> bool {
        FAKE_QUANTIZE_REGEX.is_match(&self.xml)
    }

    /// Shape of the first input parameter, e.g. `[1, 3, 256, 256]`.
    pub fn input_shape(&self) -> Option<Vec<usize>> {
        let captures = PARAMETER_SHAPE_REGEX.captures(&self.xml)?;
        captures[1]
            .split(',')
            .map(|d| d.trim().parse().ok())
            .collect()
    }

    /// Byte range of the network-level `rt_info` element.
    ///
    /// Only an `rt_info` closing the `<net>` element counts; layers carry
    /// their own.
    fn net_rt_info_range(&self) -> Option<(usize, usize)> {
        let head = self.xml[..self.xml.rfind("</net>")?].trim_end();
        let start = head.rfind("<rt_info")?;
        let element = &head[start..];
        let self_closing = element.ends_with("/>") && !element[1..].contains('<');
        (self_closing || element.ends_with("</rt_info>")).then_some((start, head.len()))
    }

    /// Entries of the `model_info` section, as strings.
    pub fn model_info(&self) -> Option<ModelInfo> {
        let (start, end) = self.net_rt_info_range()?;
        let rt_info = &self.xml[start..end];
        let open = format!("<{MODEL_INFO_TAG}>");
        let close = format!("</{MODEL_INFO_TAG}>");
        let body_start = rt_info.find(&open)? + open.len();
        let body_end = body_start + rt_info[body_start..].find(&close)?;
        let body = &rt_info[body_start..body_end];

        Some(
            RT_ENTRY_REGEX
                .captures_iter(body)
                .map(|c| (c[1].to_string(), RtValue::Str(unescape_attr(&c[2]))))
                .collect(),
        )
    }

    /// Write `info` as the graph's `model_info`, replacing any previous
    /// section and keeping other `rt_info` children.
    pub fn embed_model_info(&mut self, info: &ModelInfo) -> Result<()> {
        let mut section = format!("\t\t<{MODEL_INFO_TAG}>\n");
        for (key, value) in info {
            section.push_str(&format!(
                "\t\t\t<{key} value=\"{}\" />\n",
                escape_attr(&value.to_ir_string())
            ));
        }
        section.push_str(&format!("\t\t</{MODEL_INFO_TAG}>\n"));

        let updated = match self.net_rt_info_range() {
            Some((start, end)) => {
                let existing = &self.xml[start..end];
                let rt_info = if existing.ends_with("/>") {
                    format!("<rt_info>\n{section}\t</rt_info>")
                } else {
                    let open = format!("<{MODEL_INFO_TAG}>");
                    let close = format!("</{MODEL_INFO_TAG}>");
                    match (existing.find(&open), existing.find(&close)) {
                        (Some(s), Some(e)) if e > s => {
                            let line_start = existing[..s].rfind('\n').map_or(s, |p| p + 1);
                            let mut after = e + close.len();
                            if existing[after..].starts_with('\n') {
                                after += 1;
                            }
                            format!("{}{section}{}", &existing[..line_start], &existing[after..])
                        }
                        _ => {
                            let insert_at = existing.rfind("</rt_info>").unwrap_or(existing.len());
                            format!("{}\n{section}\t{}", existing[..insert_at].trim_end(), &existing[insert_at..])
                        }
                    }
                };
                format!("{}{rt_info}{}", &self.xml[..start], &self.xml[end..])
            }
            None => {
                let insert_at = self.xml.rfind("</net>").ok_or_else(|| Error::InvalidIr {
                    message: "missing </net> closing tag".to_string(),
                })?;
                format!(
                    "{}\t<rt_info>\n{section}\t</rt_info>\n{}",
                    &self.xml[..insert_at],
                    &self.xml[insert_at..]
                )
            }
        };
        self.xml = updated;
        Ok(())
    }
}

/// Graph definition plus binary weights.
#[derive(Debug, Clone, PartialEq)]
pub struct IrModel {
    pub graph: IrGraph,
    pub weights: Vec<u8>,
}

impl IrModel {
    pub fn new(graph: IrGraph, weights: Vec<u8>) -> Self {
        Self { graph, weights }
    }

    /// Path of the weights file belonging to `xml_path`.
    pub fn weights_path(xml_path: &Path) -> PathBuf {
        xml_path.with_extension("bin")
    }

    /// Read `model.xml` and its sibling `model.bin`.
    pub fn read(xml_path: impl AsRef<Path>) -> Result<Self> {
        let xml_path = xml_path.as_ref();
        let xml = std::fs::read(xml_path)
            .map_err(|e| Error::io(format!("reading {}", xml_path.display()), e))?;
        let bin_path = Self::weights_path(xml_path);
        let weights = std::fs::read(&bin_path)
            .map_err(|e| Error::io(format!("reading {}", bin_path.display()), e))?;
        Ok(Self::new(IrGraph::parse(&xml)?, weights))
    }

    /// Write `model.xml` and its sibling `model.bin`.
    pub fn save(&self, xml_path: impl AsRef<Path>) -> Result<()> {
        let xml_path = xml_path.as_ref();
        std::fs::write(xml_path, self.graph.as_str())
            .map_err(|e| Error::io(format!("writing {}", xml_path.display()), e))?;
        let bin_path = Self::weights_path(xml_path);
        std::fs::write(&bin_path, &self.weights)
            .map_err(|e| Error::io(format!("writing {}", bin_path.display()), e))
    }
}
