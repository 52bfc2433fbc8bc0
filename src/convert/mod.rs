//! DCAT-US 1.1 -> 3.0 record conversion.
//!
//! The converter walks a parsed 1.1 catalog and rewrites every record it owns
//! (datasets, distributions, publishers, contact points) through the field
//! tables in [`crate::vocabulary`]. It never fails on unknown keys: those are
//! dropped and reported through [`Warnings`]. It fails only when the shape of
//! the input makes conversion impossible (an array where an object belongs,
//! and so on), returning a [`ConvertError`] that names the location.

pub mod error;
pub mod file;
pub mod warning;

pub use error::ConvertError;
pub use file::{BatchReport, FileFailure, FileReport, convert_directory, convert_file};
pub use warning::{Container, ConversionWarning, WarningReason, Warnings};

use crate::vocabulary::{
    self, CATALOG_FIELDS, CONTACT_POINT_FIELDS, CONTACT_TYPE, DATASET_FIELDS, DATASET_TYPE,
    DATE_TYPE, DEFAULT_CATALOG_DESCRIPTION, DEFAULT_CATALOG_TITLE, DEFAULT_DATASET_BASE,
    DESCRIPTION_TERM, DISTRIBUTION_FIELDS, DISTRIBUTION_TYPE, FieldPolicy, FieldRule,
    JSON_LD_KEYWORDS, LICENSE_TERM, LOCATION_LABEL, LOCATION_TYPE, MAILTO_PREFIX, MODIFIED_TERM,
    ORG_LABEL_TERM, ORG_NAME_TERM, ORGANIZATION_TYPE, PUBLISHER_FIELDS, PUBLISHER_TERM,
    RECURRENCE_PREFIX, SUB_ORGANIZATION_TERM, TITLE_TERM, find_rule,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::debug;

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("date pattern compiles"));

type Record = Map<String, Value>;

/// A converted catalog plus everything that was dropped along the way.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: Value,
    pub warnings: Vec<ConversionWarning>,
}

/// Convert a 1.1 catalog with the default settings.
pub fn convert_catalog(record: &Value) -> Result<Conversion, ConvertError> {
    Converter::default().convert(record)
}

/// Table-driven 1.1 -> 3.0 converter.
///
/// The only tunable is the base IRI used to mint dataset `@id`s when a
/// dataset carries an `identifier` but no `@id` of its own.
#[derive(Debug, Clone)]
pub struct Converter {
    dataset_base: String,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            dataset_base: DEFAULT_DATASET_BASE.to_string(),
        }
    }
}

/// How a `modified`/`issued` string is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateClass {
    Recurrence,
    Date,
    Literal,
}

fn classify_date(value: &str) -> DateClass {
    if value.starts_with(RECURRENCE_PREFIX) {
        DateClass::Recurrence
    } else if DATE_PREFIX.is_match(value) {
        DateClass::Date
    } else {
        DateClass::Literal
    }
}

impl Converter {
    pub fn with_dataset_base(base: impl Into<String>) -> Self {
        Self {
            dataset_base: base.into(),
        }
    }

    pub fn dataset_base(&self) -> &str {
        &self.dataset_base
    }

    /// Convert a whole catalog, collecting warnings.
    pub fn convert(&self, record: &Value) -> Result<Conversion, ConvertError> {
        let mut warnings = Warnings::default();
        let document = self.transform_catalog(record, &mut warnings)?;
        debug!(
            dataset_base = self.dataset_base(),
            warnings = warnings.as_slice().len(),
            "catalog transformed"
        );
        Ok(Conversion {
            document: Value::Object(document),
            warnings: warnings.into_vec(),
        })
    }

    /// Rewrite a catalog record.
    ///
    /// The output starts with `@context`, then the source `@type`/`@id`, then
    /// any injected defaults (title, description, publisher), then the mapped
    /// fields in source order.
    pub fn transform_catalog(
        &self,
        record: &Value,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        let source = expect_object(record, "")?;
        let mut out = Record::new();
        out.insert("@context".to_string(), vocabulary::context());
        for keyword in JSON_LD_KEYWORDS {
            if let Some(value) = source.get(*keyword) {
                out.insert(keyword.to_string(), value.clone());
            }
        }

        if !source.contains_key("title") {
            out.insert(TITLE_TERM.to_string(), json!(DEFAULT_CATALOG_TITLE));
        }
        if !source.contains_key("description") {
            out.insert(
                DESCRIPTION_TERM.to_string(),
                json!(DEFAULT_CATALOG_DESCRIPTION),
            );
        }
        if !source.contains_key("publisher") {
            out.insert(PUBLISHER_TERM.to_string(), vocabulary::default_publisher());
        }

        for (key, value) in source {
            if key == "@context" || JSON_LD_KEYWORDS.contains(&key.as_str()) {
                continue;
            }
            match find_rule(CATALOG_FIELDS, key) {
                Some(rule) => {
                    self.apply_rule(rule, value, "", Container::Catalog, &mut out, warnings)?
                }
                None => warnings.push(ConversionWarning::unmapped(key, Container::Catalog)),
            }
        }
        Ok(out)
    }

    /// Rewrite a dataset record as a `dcat:Dataset`.
    pub fn transform_dataset(
        &self,
        record: &Value,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        self.dataset_at(record, "", warnings)
    }

    /// Rewrite a distribution record as a `dcat:Distribution`.
    pub fn transform_distribution(
        &self,
        record: &Value,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        self.distribution_at(record, "", warnings)
    }

    /// Rewrite a publisher record as an `org:Organization`.
    pub fn transform_publisher(
        &self,
        record: &Value,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        self.publisher_at(record, "", warnings)
    }

    /// Rewrite a contact point record as a `vcard:Contact`.
    pub fn transform_contact_point(
        &self,
        record: &Value,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        self.contact_point_at(record, "", warnings)
    }

    fn dataset_at(
        &self,
        record: &Value,
        at: &str,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        let source = expect_object(record, at)?;
        let mut out = Record::new();
        out.insert("@type".to_string(), json!(DATASET_TYPE));

        if let Some(identifier) = source.get("identifier") {
            let identifier = identifier_text(identifier, &child(at, "identifier"))?;
            let mut base = match source.get("@id") {
                Some(id) => expect_str(id, &child(at, "@id"))?.to_string(),
                None => self.dataset_base.clone(),
            };
            if !base.ends_with('/') {
                base.push('/');
            }
            out.insert("@id".to_string(), json!(format!("{base}{identifier}")));
        }

        self.apply_table(
            source,
            DATASET_FIELDS,
            at,
            Container::Dataset,
            &mut out,
            warnings,
        )?;
        Ok(out)
    }

    fn distribution_at(
        &self,
        record: &Value,
        at: &str,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        let source = expect_object(record, at)?;
        let mut out = Record::new();
        out.insert("@type".to_string(), json!(DISTRIBUTION_TYPE));
        if !source.contains_key("license") {
            out.insert(LICENSE_TERM.to_string(), vocabulary::default_license());
        }
        self.apply_table(
            source,
            DISTRIBUTION_FIELDS,
            at,
            Container::Distribution,
            &mut out,
            warnings,
        )?;
        Ok(out)
    }

    fn publisher_at(
        &self,
        record: &Value,
        at: &str,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        let source = expect_object(record, at)?;
        let mut out = Record::new();
        out.insert("@type".to_string(), json!(ORGANIZATION_TYPE));

        if let Some(name) = source.get("name") {
            out.insert(ORG_NAME_TERM.to_string(), name.clone());
            out.insert(ORG_LABEL_TERM.to_string(), name.clone());
        }
        if let Some(parent) = source.get("subOrganizationOf") {
            let parent = self.publisher_at(parent, &child(at, "subOrganizationOf"), warnings)?;
            out.insert(SUB_ORGANIZATION_TERM.to_string(), Value::Object(parent));
        }
        for rule in PUBLISHER_FIELDS {
            if let Some(value) = source.get(rule.source) {
                out.insert(rule.target.to_string(), value.clone());
            }
        }

        for key in source.keys() {
            let handled = matches!(key.as_str(), "name" | "subOrganizationOf")
                || JSON_LD_KEYWORDS.contains(&key.as_str())
                || find_rule(PUBLISHER_FIELDS, key).is_some();
            if !handled {
                warnings.push(ConversionWarning::unmapped(key, Container::Publisher));
            }
        }
        Ok(out)
    }

    fn contact_point_at(
        &self,
        record: &Value,
        at: &str,
        warnings: &mut Warnings,
    ) -> Result<Record, ConvertError> {
        let source = expect_object(record, at)?;
        let mut out = Record::new();
        out.insert("@type".to_string(), json!(CONTACT_TYPE));

        for rule in CONTACT_POINT_FIELDS {
            if let Some(value) = source.get(rule.source) {
                self.apply_rule(*rule, value, at, Container::ContactPoint, &mut out, warnings)?;
            }
        }

        for key in source.keys() {
            let handled = JSON_LD_KEYWORDS.contains(&key.as_str())
                || find_rule(CONTACT_POINT_FIELDS, key).is_some();
            if !handled {
                warnings.push(ConversionWarning::unmapped(key, Container::ContactPoint));
            }
        }
        Ok(out)
    }

    /// Apply `table` to every key of `source` in source order; keys without a
    /// row are reported, JSON-LD keywords are skipped.
    fn apply_table(
        &self,
        source: &Record,
        table: &[FieldRule],
        at: &str,
        container: Container,
        out: &mut Record,
        warnings: &mut Warnings,
    ) -> Result<(), ConvertError> {
        for (key, value) in source {
            match find_rule(table, key) {
                Some(rule) => self.apply_rule(rule, value, at, container, out, warnings)?,
                None if JSON_LD_KEYWORDS.contains(&key.as_str()) => {}
                None => warnings.push(ConversionWarning::unmapped(key, container)),
            }
        }
        Ok(())
    }

    fn apply_rule(
        &self,
        rule: FieldRule,
        value: &Value,
        at: &str,
        container: Container,
        out: &mut Record,
        warnings: &mut Warnings,
    ) -> Result<(), ConvertError> {
        let location = child(at, rule.source);
        let converted = match rule.policy {
            FieldPolicy::Rename => value.clone(),
            FieldPolicy::Iri => match value.as_str() {
                Some(iri) => vocabulary::iri(iri),
                None => value.clone(),
            },
            FieldPolicy::ContactPoint => {
                Value::Object(self.contact_point_at(value, &location, warnings)?)
            }
            FieldPolicy::Publisher => Value::Object(self.publisher_at(value, &location, warnings)?),
            FieldPolicy::Distributions => {
                let items = expect_array(value, &location)?;
                let mut converted = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let item_at = child(&location, &idx.to_string());
                    converted.push(Value::Object(self.distribution_at(item, &item_at, warnings)?));
                }
                Value::Array(converted)
            }
            FieldPolicy::Datasets => {
                let items = expect_array(value, &location)?;
                let mut converted = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let item_at = child(&location, &idx.to_string());
                    converted.push(Value::Object(self.dataset_at(item, &item_at, warnings)?));
                }
                Value::Array(converted)
            }
            FieldPolicy::Email => vocabulary::iri(&mailto(expect_str(value, &location)?)),
            FieldPolicy::Location => match value.as_str() {
                Some(label) => json!({ "@type": LOCATION_TYPE, LOCATION_LABEL: label }),
                None => value.clone(),
            },
            FieldPolicy::Date => match value.as_str() {
                Some(text) => match classify_date(text) {
                    DateClass::Recurrence if rule.target == MODIFIED_TERM => {
                        warnings.push(ConversionWarning::duration_as_date(
                            rule.source,
                            container,
                            text,
                        ));
                        return Ok(());
                    }
                    DateClass::Date => json!({ "@type": DATE_TYPE, "@value": text }),
                    DateClass::Recurrence | DateClass::Literal => value.clone(),
                },
                None => value.clone(),
            },
        };
        out.insert(rule.target.to_string(), converted);
        Ok(())
    }
}

fn mailto(email: &str) -> String {
    if email.starts_with(MAILTO_PREFIX) {
        email.to_string()
    } else {
        format!("{MAILTO_PREFIX}{email}")
    }
}

fn child(at: &str, key: &str) -> String {
    format!("{at}/{key}")
}

fn display_location(at: &str) -> String {
    if at.is_empty() {
        "/".to_string()
    } else {
        at.to_string()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_object<'a>(value: &'a Value, at: &str) -> Result<&'a Record, ConvertError> {
    value.as_object().ok_or_else(|| ConvertError::ExpectedObject {
        location: display_location(at),
        found: kind(value),
    })
}

fn expect_array<'a>(value: &'a Value, at: &str) -> Result<&'a Vec<Value>, ConvertError> {
    value.as_array().ok_or_else(|| ConvertError::ExpectedArray {
        location: display_location(at),
        found: kind(value),
    })
}

fn expect_str<'a>(value: &'a Value, at: &str) -> Result<&'a str, ConvertError> {
    value.as_str().ok_or_else(|| ConvertError::ExpectedString {
        location: display_location(at),
        found: kind(value),
    })
}

// Numeric identifiers appear in harvested catalogs; they are minted verbatim.
fn identifier_text(value: &Value, at: &str) -> Result<String, ConvertError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(ConvertError::ExpectedString {
            location: display_location(at),
            found: kind(other),
        }),
    }
}
