use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::files;
use crate::verify::scrubber::Scrubber;

/// One file's worth of content to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Text { extension: String, data: String },
    Binary { extension: String, data: Vec<u8> },
}

impl Target {
    pub fn text(extension: &str, data: impl Into<String>) -> Result<Self> {
        files::guard_extension(extension)?;
        if !files::is_text(extension) {
            return Err(Error::Other(format!(
                "Text passed for binary extension '{}'. Use Target::binary instead.",
                extension
            )));
        }
        Ok(Target::Text {
            extension: extension.to_string(),
            data: data.into(),
        })
    }

    pub fn binary(extension: &str, data: impl Into<Vec<u8>>) -> Result<Self> {
        files::guard_extension(extension)?;
        if files::is_text(extension) {
            return Err(Error::Other(format!(
                "Bytes passed for text extension '{}'. Use Target::text instead.",
                extension
            )));
        }
        Ok(Target::Binary {
            extension: extension.to_string(),
            data: data.into(),
        })
    }

    pub fn extension(&self) -> &str {
        match self {
            Target::Text { extension, .. } | Target::Binary { extension, .. } => extension,
        }
    }
}

/// A value to verify, converted once into the kind of text it produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Numbers, booleans, identifiers, timestamps.
    Primitive(String),
    Text(String),
    /// Output of a `Display` implementation.
    Display(String),
    /// Text with its own extension, e.g. rendered XML.
    Custom { value: String, extension: String },
    /// Serialized with serde and rendered as indented JSON.
    Structured(Value),
}

impl Snapshot {
    pub fn display(value: &impl Display) -> Self {
        Snapshot::Display(value.to_string())
    }

    pub fn custom(value: impl Into<String>, extension: &str) -> Self {
        Snapshot::Custom {
            value: value.into(),
            extension: extension.to_string(),
        }
    }

    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Snapshot::Structured(serde_json::to_value(value)?))
    }
}

impl From<&str> for Snapshot {
    fn from(value: &str) -> Self {
        Snapshot::Text(value.to_string())
    }
}

impl From<String> for Snapshot {
    fn from(value: String) -> Self {
        Snapshot::Text(value)
    }
}

impl From<&String> for Snapshot {
    fn from(value: &String) -> Self {
        Snapshot::Text(value.clone())
    }
}

impl From<bool> for Snapshot {
    fn from(value: bool) -> Self {
        Snapshot::Primitive(if value { "True" } else { "False" }.to_string())
    }
}

macro_rules! primitive_snapshot {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Snapshot {
                fn from(value: $ty) -> Self {
                    Snapshot::Primitive(value.to_string())
                }
            }
        )*
    };
}

primitive_snapshot!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char);

impl From<Uuid> for Snapshot {
    fn from(value: Uuid) -> Self {
        Snapshot::Primitive(value.to_string())
    }
}

impl From<DateTime<Utc>> for Snapshot {
    fn from(value: DateTime<Utc>) -> Self {
        Snapshot::Primitive(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl From<Value> for Snapshot {
    fn from(value: Value) -> Self {
        Snapshot::Structured(value)
    }
}

/// Replaces GUID and RFC 3339 string values before rendering.
pub(crate) fn scrub_value(value: Value, scrubber: &Scrubber, scrub_guids: bool, scrub_times: bool) -> Value {
    match value {
        Value::String(text) => {
            if scrub_guids {
                if let Ok(guid) = Uuid::parse_str(&text) {
                    return Value::String(scrubber.scrub_guid(guid));
                }
            }
            if scrub_times {
                if let Ok(time) = DateTime::parse_from_rfc3339(&text) {
                    return Value::String(scrubber.scrub_time(time.with_timezone(&Utc)));
                }
            }
            Value::String(text)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| scrub_value(item, scrubber, scrub_guids, scrub_times))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, scrub_value(item, scrubber, scrub_guids, scrub_times)))
                .collect(),
        ),
        other => other,
    }
}

/// Four-space indented JSON with sorted keys.
pub(crate) fn to_pretty_json(value: &Value) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|e| Error::Other(e.to_string()))
}
