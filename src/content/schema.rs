//! Declarative front-matter schemas and the generic validator that runs them.
//!
//! A [`Schema`] lists its fields in order; validating a document walks the
//! list, coerces each value into JSON, applies defaults and bounds, then
//! hands the object to the schema's transform for computed fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use serde_yaml::Mapping;

use crate::error::AppError;
use crate::models::hook::{slug_as_params, Hook};

/// The type of a schema field and its bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Derived from the document path; front matter is ignored.
    Path,
    /// A string of at most `max` UTF-16 code units.
    String { max: Option<usize> },
    /// A date or timestamp, stored as RFC 3339.
    Date,
    Boolean,
    /// The document body, compiled to HTML.
    Markup,
}

/// Whether a field must be present.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    Default(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: FieldKind, presence: Presence) -> Self {
        Self {
            name,
            kind,
            presence,
        }
    }
}

/// Post-validation step computing derived fields.
pub type SchemaTransform = fn(&mut Map<String, Value>);

/// Everything the validator reads from one source document.
#[derive(Debug, Clone, Copy)]
pub struct SchemaInput<'a> {
    /// Document path used in error messages.
    pub document: &'a str,
    /// Path-derived slug.
    pub slug: &'a str,
    pub front_matter: &'a Mapping,
    /// Raw markup body.
    pub body: &'a str,
}

#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    transform: Option<SchemaTransform>,
}

impl Schema {
    pub fn object(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            transform: None,
        }
    }

    pub fn transform(mut self, transform: SchemaTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate and coerce a document against this schema.
    ///
    /// `compile` renders the body for `Markup` fields. Unknown front matter
    /// keys are dropped.
    pub fn validate(
        &self,
        input: &SchemaInput<'_>,
        compile: &mut dyn FnMut(&str) -> Result<String, AppError>,
    ) -> Result<Map<String, Value>, AppError> {
        let mut object = Map::new();

        for field in &self.fields {
            let value = match field.kind {
                FieldKind::Path => Some(Value::String(input.slug.to_string())),
                FieldKind::Markup => Some(Value::String(compile(input.body)?)),
                _ => match input.front_matter.get(field.name) {
                    Some(raw) => Some(coerce(input.document, field, raw)?),
                    None => None,
                },
            };

            match (value, &field.presence) {
                (Some(value), _) => {
                    object.insert(field.name.to_string(), value);
                }
                (None, Presence::Default(default)) => {
                    object.insert(field.name.to_string(), default.clone());
                }
                (None, Presence::Optional) => {}
                (None, Presence::Required) => {
                    return Err(AppError::schema(input.document, field.name, "required"));
                }
            }
        }

        if let Some(transform) = self.transform {
            transform(&mut object);
        }

        Ok(object)
    }
}

fn coerce(document: &str, field: &FieldSpec, raw: &serde_yaml::Value) -> Result<Value, AppError> {
    let type_error = |expected: &str| {
        AppError::schema(
            document,
            field.name,
            format!("expected {expected}, received {}", describe(raw)),
        )
    };

    match &field.kind {
        FieldKind::String { max } => {
            let s = raw.as_str().ok_or_else(|| type_error("string"))?;
            if let Some(max) = max {
                // Measured in UTF-16 code units.
                let len = s.encode_utf16().count();
                if len > *max {
                    return Err(AppError::schema(
                        document,
                        field.name,
                        format!("string must contain at most {max} character(s), got {len}"),
                    ));
                }
            }
            Ok(Value::String(s.to_string()))
        }
        FieldKind::Boolean => raw
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| type_error("boolean")),
        FieldKind::Date => {
            let s = raw.as_str().ok_or_else(|| type_error("date string"))?;
            let date = parse_date(s).ok_or_else(|| {
                AppError::schema(document, field.name, format!("invalid date '{s}'"))
            })?;
            Ok(Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)))
        }
        FieldKind::Path | FieldKind::Markup => Err(AppError::Internal(format!(
            "field '{}' is not read from front matter",
            field.name
        ))),
    }
}

fn describe(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "array",
        serde_yaml::Value::Mapping(_) => "object",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

/// Parse RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and plain dates (as UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|n| n.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| n.and_utc())
        })
}

/// Schema of the "Hooks" collection.
pub fn hook_schema() -> Schema {
    Schema::object(vec![
        FieldSpec::new("slug", FieldKind::Path, Presence::Required),
        FieldSpec::new("title", FieldKind::String { max: Some(99) }, Presence::Required),
        FieldSpec::new(
            "description",
            FieldKind::String { max: Some(999) },
            Presence::Required,
        ),
        FieldSpec::new("date", FieldKind::Date, Presence::Optional),
        FieldSpec::new("published", FieldKind::Boolean, Presence::Default(Value::Bool(true))),
        FieldSpec::new("new", FieldKind::Boolean, Presence::Default(Value::Bool(false))),
        FieldSpec::new("body", FieldKind::Markup, Presence::Required),
    ])
    .transform(computed_fields)
}

fn computed_fields(object: &mut Map<String, Value>) {
    let params = match object.get("slug") {
        Some(Value::String(slug)) => slug_as_params(slug),
        _ => return,
    };
    object.insert("slugAsParams".to_string(), Value::String(params));
}

/// Validate a document against [`hook_schema`] and build the record.
pub fn validate_hook(
    schema: &Schema,
    input: &SchemaInput<'_>,
    compile: &mut dyn FnMut(&str) -> Result<String, AppError>,
) -> Result<Hook, AppError> {
    let object = schema.validate(input, compile)?;
    serde_json::from_value(Value::Object(object)).map_err(|e| {
        AppError::schema(input.document, "<record>", format!("cannot build record: {e}"))
    })
}
