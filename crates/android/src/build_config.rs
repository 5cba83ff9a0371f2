//! Compile-time constants injected into the Android `BuildConfig` class
//!
//! The same field list can be rendered as Gradle `buildConfigField` calls,
//! as a standalone Kotlin object, or as JSON for other tooling.

use crate::resolver::{ResolvedConfig, Traceability};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

/// JVM type of a generated constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    /// `java.lang.String`
    String,
    /// `java.lang.Boolean`
    Boolean,
}

impl FieldType {
    /// Type name as written in `buildConfigField` and Kotlin declarations
    fn type_name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Boolean => "Boolean",
        }
    }
}

/// One generated constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfigField {
    /// JVM type
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Constant name
    pub name: &'static str,
    /// Unquoted value
    pub value: String,
}

impl BuildConfigField {
    fn string(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            ty: FieldType::String,
            name,
            value: value.into(),
        }
    }

    fn boolean(name: &'static str, value: bool) -> Self {
        Self {
            ty: FieldType::Boolean,
            name,
            value: value.to_string(),
        }
    }

    /// Value as a Java/Kotlin source literal
    #[must_use]
    pub fn literal(&self) -> String {
        match self.ty {
            FieldType::String => format!("\"{}\"", escape_literal(&self.value)),
            FieldType::Boolean => self.value.clone(),
        }
    }

    /// `buildConfigField("String", "NAME", "\"value\"")`
    #[must_use]
    pub fn to_gradle(&self) -> String {
        format!(
            "buildConfigField(\"{}\", \"{}\", \"{}\")",
            self.ty.type_name(),
            self.name,
            escape_literal(&self.literal())
        )
    }
}

/// Output flavor for [`render`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldFormat {
    /// Gradle Kotlin DSL statements
    #[default]
    Gradle,
    /// Kotlin `object BuildConfig` source
    Kotlin,
    /// JSON document with fields and manifest placeholders
    Json,
}

impl FromStr for FieldFormat {
    type Err = flavorkit_core::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gradle" => Ok(Self::Gradle),
            "kotlin" => Ok(Self::Kotlin),
            "json" => Ok(Self::Json),
            other => Err(flavorkit_core::error::Error::validation(format!(
                "Unknown field format: {other}"
            ))
            .with_suggestion("Use one of: gradle, kotlin, json")),
        }
    }
}

/// Constants for a resolved configuration, in injection order
#[must_use]
pub fn fields(config: &ResolvedConfig, trace: &Traceability) -> Vec<BuildConfigField> {
    vec![
        BuildConfigField::string("BUILD_TIME", trace.build_time_string()),
        BuildConfigField::string("GIT_COMMIT", trace.git_commit.as_str()),
        BuildConfigField::string("BUILD_TYPE_NAME", trace.build_type_name.as_str()),
        BuildConfigField::boolean("IS_DEBUG", config.is_debug),
        BuildConfigField::string("API_BASE_URL", config.api_base_url.as_str()),
        BuildConfigField::string("CHANNEL", config.channel_label.as_str()),
    ]
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument<'a> {
    variant: String,
    fields: &'a [BuildConfigField],
    manifest_placeholders: &'a BTreeMap<String, String>,
}

/// Render the constants of `config` in the requested format
pub fn render(
    config: &ResolvedConfig,
    trace: &Traceability,
    format: FieldFormat,
) -> serde_json::Result<String> {
    let fields = fields(config, trace);
    let rendered = match format {
        FieldFormat::Gradle => render_gradle(config, &fields),
        FieldFormat::Kotlin => render_kotlin(config, &fields),
        FieldFormat::Json => serde_json::to_string_pretty(&JsonDocument {
            variant: config.gradle_variant_name(),
            fields: &fields,
            manifest_placeholders: &config.manifest_placeholders,
        })?,
    };
    Ok(rendered)
}

fn render_gradle(config: &ResolvedConfig, fields: &[BuildConfigField]) -> String {
    let mut out = String::new();
    for field in fields {
        out.push_str(&field.to_gradle());
        out.push('\n');
    }
    for (key, value) in &config.manifest_placeholders {
        let _ = writeln!(
            out,
            "manifestPlaceholders[\"{key}\"] = \"{}\"",
            escape_literal(value)
        );
    }
    out
}

fn render_kotlin(config: &ResolvedConfig, fields: &[BuildConfigField]) -> String {
    let mut out = format!(
        "// Generated for {}. Do not edit.\nobject BuildConfig {{\n",
        config.gradle_variant_name()
    );
    for field in fields {
        let _ = writeln!(
            out,
            "    const val {}: {} = {}",
            field.name,
            field.ty.type_name(),
            field.literal()
        );
    }
    out.push_str("}\n");
    out
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
