use serde::Serialize;
use std::fmt;

/// Record type a warning was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Catalog,
    Dataset,
    Distribution,
    Publisher,
    ContactPoint,
}

impl Container {
    pub fn as_str(&self) -> &'static str {
        match self {
            Container::Catalog => "catalog",
            Container::Dataset => "dataset",
            Container::Distribution => "distribution",
            Container::Publisher => "publisher",
            Container::ContactPoint => "contact point",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a source field did not make it into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WarningReason {
    /// No table row exists for the key.
    Unmapped,
    /// A repeating interval (`R/...`) sat where a date belongs.
    DurationAsDate { value: String },
}

/// A non-fatal observation made while converting one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionWarning {
    pub field: String,
    pub container: Container,
    pub reason: WarningReason,
}

impl ConversionWarning {
    pub fn unmapped(field: &str, container: Container) -> Self {
        Self {
            field: field.to_string(),
            container,
            reason: WarningReason::Unmapped,
        }
    }

    pub fn duration_as_date(field: &str, container: Container, value: &str) -> Self {
        Self {
            field: field.to_string(),
            container,
            reason: WarningReason::DurationAsDate {
                value: value.to_string(),
            },
        }
    }
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            WarningReason::Unmapped => {
                write!(f, "Unmapped {} property '{}'", self.container, self.field)
            }
            WarningReason::DurationAsDate { value } => write!(
                f,
                "{} '{}' in {} is a duration, not a date; skipped",
                self.field, value, self.container
            ),
        }
    }
}

/// Ordered collector threaded through one conversion.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    entries: Vec<ConversionWarning>,
}

impl Warnings {
    pub fn push(&mut self, warning: ConversionWarning) {
        self.entries.push(warning);
    }

    pub fn as_slice(&self) -> &[ConversionWarning] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<ConversionWarning> {
        self.entries
    }
}
