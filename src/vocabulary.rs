//! Fixed DCAT-US 3.0 vocabulary: the `@context` prefix table, type markers,
//! default literals, and the per-container field tables that drive the
//! converter.
//!
//! Every table row pairs a 1.1 property name with its 3.0 term and the
//! [`FieldPolicy`] that decides how the value is rewritten. Adding a property
//! means adding a row; the converter never special-cases keys by name.

use serde_json::{Map, Value, json};

/// Prefix -> namespace pairs emitted as the output `@context`, in output order.
pub const CONTEXT_PREFIXES: &[(&str, &str)] = &[
    ("dcat", "http://www.w3.org/ns/dcat#"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("vcard", "http://www.w3.org/2006/vcard/ns#"),
    ("dcat-us", "http://data.resources.gov/ontology/dcat-us#"),
    ("schema", "https://schema.org/"),
    ("org", "http://www.w3.org/ns/org#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
];

pub const DATASET_TYPE: &str = "dcat:Dataset";
pub const DISTRIBUTION_TYPE: &str = "dcat:Distribution";
pub const ORGANIZATION_TYPE: &str = "org:Organization";
pub const CONTACT_TYPE: &str = "vcard:Contact";
pub const LOCATION_TYPE: &str = "dcterms:Location";
pub const LOCATION_LABEL: &str = "rdfs:label";
pub const DATE_TYPE: &str = "xsd:date";

pub const TITLE_TERM: &str = "dcterms:title";
pub const DESCRIPTION_TERM: &str = "dcterms:description";
pub const PUBLISHER_TERM: &str = "dcterms:publisher";
pub const LICENSE_TERM: &str = "dcterms:license";
pub const MODIFIED_TERM: &str = "dcterms:modified";
pub const ORG_NAME_TERM: &str = "foaf:name";
pub const ORG_LABEL_TERM: &str = "skos:prefLabel";
pub const SUB_ORGANIZATION_TERM: &str = "org:subOrganizationOf";
pub const EMAIL_TERM: &str = "vcard:hasEmail";

pub const DEFAULT_CATALOG_TITLE: &str = "Data Catalog";
pub const DEFAULT_CATALOG_DESCRIPTION: &str = "Government data catalog";
pub const DEFAULT_PUBLISHER_ID: &str = "https://www.usa.gov/";
pub const DEFAULT_PUBLISHER_NAME: &str = "U.S. Government";
pub const DEFAULT_DATASET_BASE: &str = "https://data.gov/datasets/";
pub const DEFAULT_LICENSE: &str = "https://creativecommons.org/publicdomain/zero/1.0/";

/// Prefix marking an ISO 8601 repeating interval (`R/P1D`), not a date.
pub const RECURRENCE_PREFIX: &str = "R/";
pub const MAILTO_PREFIX: &str = "mailto:";

/// JSON-LD keywords that are carried through or ignored, never reported as
/// unmapped.
pub const JSON_LD_KEYWORDS: &[&str] = &["@type", "@id"];

/// How a mapped source value is rewritten under its target term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Value copied unchanged.
    Rename,
    /// String values become `{"@id": value}`; other values are copied.
    Iri,
    /// Object rewritten as a `vcard:Contact`.
    ContactPoint,
    /// Object rewritten as an `org:Organization`.
    Publisher,
    /// Array of distribution objects, order preserved.
    Distributions,
    /// Array of dataset objects, order preserved.
    Datasets,
    /// String values become a `dcterms:Location` with an `rdfs:label`.
    Location,
    /// String values are classified as a typed date, a plain literal, or a
    /// recurrence that does not belong in the slot.
    Date,
    /// String address turned into a `mailto:` IRI node.
    Email,
}

/// One row of a field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub source: &'static str,
    pub target: &'static str,
    pub policy: FieldPolicy,
}

const fn rule(source: &'static str, target: &'static str, policy: FieldPolicy) -> FieldRule {
    FieldRule {
        source,
        target,
        policy,
    }
}

use FieldPolicy::{
    ContactPoint, Datasets, Date, Distributions, Email, Iri, Location, Publisher, Rename,
};

pub const CATALOG_FIELDS: &[FieldRule] = &[
    rule("conformsTo", "dcterms:conformsTo", Iri),
    rule("describedBy", "dcat-us:describedBy", Iri),
    rule("dataset", "dcat:dataset", Datasets),
    rule("title", TITLE_TERM, Rename),
    rule("description", DESCRIPTION_TERM, Rename),
    rule("issued", "dcterms:issued", Rename),
    rule("modified", MODIFIED_TERM, Rename),
    rule("language", "dcterms:language", Rename),
    rule("license", LICENSE_TERM, Rename),
    rule("rights", "dcterms:rights", Rename),
    rule("spatial", "dcterms:spatial", Rename),
    rule("temporal", "dcterms:temporal", Rename),
    rule("publisher", PUBLISHER_TERM, Publisher),
    rule("contactPoint", "dcat:contactPoint", ContactPoint),
];

pub const DATASET_FIELDS: &[FieldRule] = &[
    rule("title", TITLE_TERM, Rename),
    rule("description", DESCRIPTION_TERM, Rename),
    rule("keyword", "dcat:keyword", Rename),
    rule("modified", MODIFIED_TERM, Date),
    rule("issued", "dcterms:issued", Date),
    rule("identifier", "dcterms:identifier", Rename),
    rule("accessLevel", "dcat-us:accessLevel", Rename),
    rule("rights", "dcterms:rights", Rename),
    rule("license", LICENSE_TERM, Rename),
    rule("spatial", "dcterms:spatial", Location),
    rule("temporal", "dcterms:temporal", Rename),
    rule("accrualPeriodicity", "dcterms:accrualPeriodicity", Rename),
    rule("conformsTo", "dcterms:conformsTo", Iri),
    rule("dataQuality", "dqv:hasQualityMeasurement", Rename),
    rule("theme", "dcat:theme", Rename),
    rule("references", "dcterms:references", Rename),
    rule("isPartOf", "dcterms:isPartOf", Rename),
    rule("landingPage", "dcat:landingPage", Rename),
    rule("language", "dcterms:language", Rename),
    rule("bureauCode", "dcat-us:bureauCode", Rename),
    rule("programCode", "dcat-us:programCode", Rename),
    rule("primaryITInvestmentUII", "dcat-us:primaryITInvestmentUII", Rename),
    rule("systemOfRecords", "dcat-us:systemOfRecords", Rename),
    rule("dataStandard", "dcat-us:dataStandard", Rename),
    rule("describedBy", "dcat-us:describedBy", Iri),
    rule("publisher", PUBLISHER_TERM, Publisher),
    rule("contactPoint", "dcat:contactPoint", ContactPoint),
    rule("distribution", "dcat:distribution", Distributions),
];

pub const DISTRIBUTION_FIELDS: &[FieldRule] = &[
    rule("accessURL", "dcat:accessURL", Iri),
    rule("downloadURL", "dcat:downloadURL", Iri),
    rule("mediaType", "dcat:mediaType", Rename),
    rule("format", "dcterms:format", Rename),
    rule("title", TITLE_TERM, Rename),
    rule("description", DESCRIPTION_TERM, Rename),
    rule("conformsTo", "dcterms:conformsTo", Rename),
    rule("describedBy", "dcat-us:describedBy", Iri),
    rule("license", LICENSE_TERM, Iri),
];

/// Publisher keys renamed without restructuring. `name` and
/// `subOrganizationOf` are handled by the converter itself.
pub const PUBLISHER_FIELDS: &[FieldRule] = &[
    rule("mbox", "foaf:mbox", Rename),
    rule("homepage", "foaf:homepage", Rename),
    rule("identifier", "dcterms:identifier", Rename),
];

/// Contact point rows, in output order.
pub const CONTACT_POINT_FIELDS: &[FieldRule] = &[
    rule("fn", "vcard:fn", Rename),
    rule("hasEmail", EMAIL_TERM, Email),
    rule("hasTelephone", "vcard:hasTelephone", Rename),
    rule("hasURL", "vcard:hasURL", Rename),
    rule("organization-name", "vcard:organization-name", Rename),
    rule("street-address", "vcard:street-address", Rename),
    rule("locality", "vcard:locality", Rename),
    rule("region", "vcard:region", Rename),
    rule("postal-code", "vcard:postal-code", Rename),
    rule("country-name", "vcard:country-name", Rename),
];

/// Look up the rule for `source` in `table`.
pub fn find_rule(table: &[FieldRule], source: &str) -> Option<FieldRule> {
    table.iter().find(|rule| rule.source == source).copied()
}

/// The `@context` object placed first in every converted catalog.
pub fn context() -> Value {
    let prefixes: Map<String, Value> = CONTEXT_PREFIXES
        .iter()
        .map(|(prefix, iri)| (prefix.to_string(), Value::String(iri.to_string())))
        .collect();
    Value::Object(prefixes)
}

/// Publisher injected into catalogs that do not name one.
pub fn default_publisher() -> Value {
    json!({
        "@type": ORGANIZATION_TYPE,
        "@id": DEFAULT_PUBLISHER_ID,
        ORG_NAME_TERM: DEFAULT_PUBLISHER_NAME,
        ORG_LABEL_TERM: DEFAULT_PUBLISHER_NAME,
    })
}

/// License injected into distributions that do not carry one.
pub fn default_license() -> Value {
    iri(DEFAULT_LICENSE)
}

/// Wrap an IRI string as a JSON-LD node reference.
pub fn iri(value: &str) -> Value {
    json!({ "@id": value })
}
