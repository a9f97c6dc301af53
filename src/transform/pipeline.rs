//! Typed transform pipeline and its serialized form.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::config::{InputNormalization, TransformSettings};
use crate::{Error, Result};

/// ImageNet channel means, RGB.
pub const IMAGENET_MEAN: [f64; 3] = [0.485, 0.456, 0.406];
/// ImageNet channel standard deviations, RGB.
pub const IMAGENET_STD: [f64; 3] = [0.229, 0.224, 0.225];

const SERIALIZED_VERSION: &str = "1.3.0";
const CLASS_KEY: &str = "__class_fullname__";

/// One preprocessing step.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformSpec {
    Resize { height: u32, width: u32 },
    CenterCrop { height: u32, width: u32 },
    /// Per-channel `(x / max_pixel_value - mean) / std`.
    Normalize {
        mean: Vec<f64>,
        std: Vec<f64>,
        max_pixel_value: f64,
    },
    ToTensor,
    /// A step the deployment path does not interpret.
    Other { name: String, params: Map<String, Value> },
}

impl TransformSpec {
    /// Short class name as written in the serialized form.
    pub fn class_name(&self) -> &str {
        match self {
            TransformSpec::Resize { .. } => "Resize",
            TransformSpec::CenterCrop { .. } => "CenterCrop",
            TransformSpec::Normalize { .. } => "Normalize",
            TransformSpec::ToTensor => "ToTensorV2",
            TransformSpec::Other { name, .. } => name,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            TransformSpec::Resize { height, width } => json!({
                CLASS_KEY: "Resize",
                "always_apply": true,
                "p": 1.0,
                "height": height,
                "width": width,
                "interpolation": 1,
            }),
            TransformSpec::CenterCrop { height, width } => json!({
                CLASS_KEY: "CenterCrop",
                "always_apply": false,
                "p": 1.0,
                "height": height,
                "width": width,
            }),
            TransformSpec::Normalize {
                mean,
                std,
                max_pixel_value,
            } => json!({
                CLASS_KEY: "Normalize",
                "always_apply": false,
                "p": 1.0,
                "mean": mean,
                "std": std,
                "max_pixel_value": max_pixel_value,
            }),
            TransformSpec::ToTensor => json!({
                CLASS_KEY: "ToTensorV2",
                "always_apply": true,
                "p": 1.0,
                "transpose_mask": false,
            }),
            TransformSpec::Other { name, params } => {
                let mut map = params.clone();
                map.insert(CLASS_KEY.to_string(), Value::String(name.clone()));
                Value::Object(map)
            }
        }
    }

    fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| format!("transform entry is not an object: {value}"))?;
        let full_name = object
            .get(CLASS_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("transform entry without {CLASS_KEY}"))?;
        // serialized names may carry the module path
        let name = full_name.rsplit('.').next().unwrap_or(full_name);

        let dim = |key: &str| -> std::result::Result<u32, String> {
            object
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| format!("{name}: missing or invalid '{key}'"))
        };
        let floats = |key: &str| -> std::result::Result<Vec<f64>, String> {
            match object.get(key) {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|v| v.as_f64().ok_or_else(|| format!("{name}: non-numeric '{key}'")))
                    .collect(),
                Some(Value::Number(n)) => Ok(vec![n.as_f64().unwrap_or_default()]),
                _ => Err(format!("{name}: missing '{key}'")),
            }
        };

        Ok(match name {
            "Resize" => TransformSpec::Resize {
                height: dim("height")?,
                width: dim("width")?,
            },
            "CenterCrop" => TransformSpec::CenterCrop {
                height: dim("height")?,
                width: dim("width")?,
            },
            "Normalize" => TransformSpec::Normalize {
                mean: floats("mean")?,
                std: floats("std")?,
                max_pixel_value: object
                    .get("max_pixel_value")
                    .and_then(Value::as_f64)
                    .unwrap_or(255.0),
            },
            "ToTensorV2" => TransformSpec::ToTensor,
            _ => {
                let mut params = object.clone();
                params.remove(CLASS_KEY);
                TransformSpec::Other {
                    name: full_name.to_string(),
                    params,
                }
            }
        })
    }
}

/// An ordered sequence of transforms (a `Compose`).
#[derive(Debug, Clone, PartialEq)]
pub struct TransformPipeline {
    pub transforms: Vec<TransformSpec>,
}

impl TransformPipeline {
    pub fn new(transforms: Vec<TransformSpec>) -> Self {
        Self { transforms }
    }

    /// Rebuild the training transform from task settings.
    ///
    /// A configured transform file wins. Otherwise the pipeline is resize,
    /// optional center crop, optional ImageNet normalization, to-tensor.
    pub fn from_settings(settings: &TransformSettings, image_size: [u32; 2]) -> Result<Self> {
        if let Some(path) = &settings.config_path {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::io(format!("reading transform config {}", path.display()), e))?;
            let value: Value = serde_yaml::from_str(&content).map_err(|e| Error::ConfigParsing {
                path: path.clone(),
                message: e.to_string(),
            })?;
            return Self::from_value(&value).map_err(|message| Error::ConfigParsing {
                path: path.clone(),
                message,
            });
        }

        let [height, width] = image_size;
        let mut transforms = vec![TransformSpec::Resize { height, width }];
        if let Some([height, width]) = settings.center_crop {
            transforms.push(TransformSpec::CenterCrop { height, width });
        }
        if settings.normalization == InputNormalization::Imagenet {
            transforms.push(TransformSpec::Normalize {
                mean: IMAGENET_MEAN.to_vec(),
                std: IMAGENET_STD.to_vec(),
                max_pixel_value: 255.0,
            });
        }
        transforms.push(TransformSpec::ToTensor);
        Ok(Self::new(transforms))
    }

    /// Serialized albumentations layout.
    pub fn to_value(&self) -> Value {
        json!({
            "__version__": SERIALIZED_VERSION,
            "transform": {
                CLASS_KEY: "Compose",
                "p": 1.0,
                "transforms": self.transforms.iter().map(TransformSpec::to_value).collect::<Vec<_>>(),
                "bbox_params": null,
                "keypoint_params": null,
                "additional_targets": {},
            }
        })
    }

    /// Parse the serialized layout. A bare `Compose` object is accepted too.
    pub fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let compose = value.get("transform").unwrap_or(value);
        let entries = compose
            .get("transforms")
            .and_then(Value::as_array)
            .ok_or_else(|| "transform description has no 'transforms' list".to_string())?;
        let transforms = entries
            .iter()
            .map(TransformSpec::from_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(transforms))
    }

    /// Mean and std of the first normalization step.
    pub fn normalization(&self) -> Option<(&[f64], &[f64])> {
        self.transforms.iter().find_map(|t| match t {
            TransformSpec::Normalize { mean, std, .. } => Some((mean.as_slice(), std.as_slice())),
            _ => None,
        })
    }

    /// `(height, width)` of the first resize step.
    pub fn resize(&self) -> Option<(u32, u32)> {
        self.transforms.iter().find_map(|t| match t {
            TransformSpec::Resize { height, width } => Some((*height, *width)),
            _ => None,
        })
    }
}

impl Serialize for TransformPipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransformPipeline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}
