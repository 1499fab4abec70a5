//! Reading and writing camera-pose `transforms*.json` documents.
//!
//! A document is kept as an order-preserving JSON object so that every field
//! we do not touch (intrinsics, `aabb_scale`, ...) round-trips unchanged.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};

pub const FRAMES_KEY: &str = "frames";
pub const FILE_PATH_KEY: &str = "file_path";

const INDENT: &[u8] = b"    ";

#[derive(Debug, Clone, PartialEq)]
pub struct TransformsDocument {
    fields: Map<String, Value>,
}

impl TransformsDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Self::from_value(value).with_context(|| format!("loading {}", path.display()))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => bail!("top-level JSON must be an object (found {})", kind(&other)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `frames` list, if present and an array.
    pub fn frames(&self) -> Option<&Vec<Value>> {
        self.fields.get(FRAMES_KEY).and_then(Value::as_array)
    }

    pub fn frames_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.fields.get_mut(FRAMES_KEY).and_then(Value::as_array_mut)
    }

    pub fn require_frames(&self) -> Result<&Vec<Value>> {
        match self.frames() {
            Some(frames) => Ok(frames),
            None => bail!("missing required '{FRAMES_KEY}' field"),
        }
    }

    /// Copy of every non-`frames` field, with `frames` appended last.
    pub fn with_frames(&self, frames: Vec<Value>) -> Self {
        let mut fields: Map<String, Value> = self
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != FRAMES_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        fields.insert(FRAMES_KEY.to_string(), Value::Array(frames));
        Self { fields }
    }

    pub fn to_pretty_string(&self) -> Result<String> {
        to_pretty_string(&self.fields)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_pretty(path, &self.fields)
    }
}

/// Serialize with 4-space indentation.
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let pretty = to_pretty_string(value)?;
    fs::write(path, pretty).with_context(|| format!("writing {}", path.display()))
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
