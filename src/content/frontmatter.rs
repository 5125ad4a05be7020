use serde_yaml::Mapping;

use crate::error::AppError;

/// A source document split into its front matter and markup body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub front_matter: Mapping,
    pub body: String,
}

/// Split a YAML front matter block (between two `---` lines) from the body.
///
/// A document that does not start with `---` has empty front matter.
pub fn split_front_matter(document: &str, source: &str) -> Result<ParsedDocument, AppError> {
    let content = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(rest) = strip_delimiter_line(content) else {
        return Ok(ParsedDocument {
            front_matter: Mapping::new(),
            body: content.to_string(),
        });
    };

    let mut offset = 0;
    let mut closing = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let (yaml_end, body_start) = closing.ok_or_else(|| AppError::FrontMatter {
        document: document.to_string(),
        message: "missing closing '---' delimiter".into(),
    })?;

    let yaml = &rest[..yaml_end];
    let front_matter = parse_mapping(document, yaml)?;
    let body = rest[body_start..].trim_start_matches(['\r', '\n']).to_string();

    Ok(ParsedDocument { front_matter, body })
}

fn strip_delimiter_line(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn parse_mapping(document: &str, yaml: &str) -> Result<Mapping, AppError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
        Ok(serde_yaml::Value::Mapping(map)) => Ok(map),
        Ok(serde_yaml::Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(AppError::FrontMatter {
            document: document.to_string(),
            message: "front matter must be a mapping".into(),
        }),
        Err(e) => Err(AppError::FrontMatter {
            document: document.to_string(),
            message: e.to_string(),
        }),
    }
}
