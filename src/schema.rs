//! GraphQL schema summary built from a saved introspection result
//!
//! Reads a `{"data": {"__schema": {"types": [...]}}}` document once and
//! renders the object, scalar and enum type names for the agent instruction.
//! Introspection types (`__Schema`, `__Type`, ...) are left out.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const RESERVED_PREFIX: &str = "__";

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("cannot read schema file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed schema file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct IntrospectionDocument {
    data: IntrospectionData,
}

#[derive(Debug, Deserialize)]
struct IntrospectionData {
    #[serde(rename = "__schema")]
    schema: IntrospectionSchema,
}

#[derive(Debug, Deserialize)]
struct IntrospectionSchema {
    types: Vec<IntrospectionType>,
}

#[derive(Debug, Deserialize)]
struct IntrospectionType {
    name: String,
    kind: TypeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TypeKind {
    Object,
    Scalar,
    Enum,
    #[serde(other)]
    Other,
}

/// Type names grouped by kind, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSummary {
    pub objects: Vec<String>,
    pub scalars: Vec<String>,
    pub enums: Vec<String>,
}

impl SchemaSummary {
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let summary = Self::parse(&raw).map_err(|source| SchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            objects = summary.objects.len(),
            scalars = summary.scalars.len(),
            enums = summary.enums.len(),
            "Loaded GraphQL schema summary"
        );
        Ok(summary)
    }

    fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let document: IntrospectionDocument = serde_json::from_str(raw)?;
        let mut summary = Self::default();

        for ty in document.data.schema.types {
            if ty.name.starts_with(RESERVED_PREFIX) {
                continue;
            }
            match ty.kind {
                TypeKind::Object => summary.objects.push(ty.name),
                TypeKind::Scalar => summary.scalars.push(ty.name),
                TypeKind::Enum => summary.enums.push(ty.name),
                TypeKind::Other => {}
            }
        }

        Ok(summary)
    }

    /// Human-readable block embedded in the GraphQL agent instruction
    pub fn render(&self) -> String {
        [
            ("Object types", &self.objects),
            ("Scalar types", &self.scalars),
            ("Enum types", &self.enums),
        ]
        .iter()
        .map(|(label, names)| {
            if names.is_empty() {
                format!("{label}: (none)")
            } else {
                format!("{label}: {}", names.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
    }
}
