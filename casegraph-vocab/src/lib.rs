//! Vocabulary constants and query-text markers for casegraph
//!
//! This crate provides a centralized location for the predicate IRIs,
//! canonical query variables, and textual markers shared by the query
//! compiler, the augmenter, and the result mapper.
//!
//! # Organization
//!
//! Constants are organized by concern:
//! - `rdf` - RDF vocabulary used by the object-binding fragment
//! - `acl` - access-control predicates for the permission filter
//! - `query` - canonical variable names and block delimiters
//! - `text` - full-text connector placeholder and markers
//! - `sort` - generated sort-variable conventions
//! - `facet` - facet sentinel values

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:long IRI
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
}

/// Access-control predicates consumed by the permission filter
pub mod acl {
    /// Predicate binding an instance to principals allowed to read it
    pub const READ_ACCESS: &str = "http://casegraph.org/acl#readAccess";

    /// Predicate binding an instance to principals allowed to write it
    pub const WRITE_ACCESS: &str = "http://casegraph.org/acl#writeAccess";
}

/// Canonical query variables and structural markers
pub mod query {
    /// The canonical subject variable every compiled query projects
    pub const INSTANCE_VAR: &str = "instance";

    /// Variable bound to the subject's rdf:type by the object-binding fragment
    pub const INSTANCE_TYPE_VAR: &str = "instanceType";

    /// Variable produced by count-wrapped queries
    pub const COUNT_VAR: &str = "count";

    /// Variable produced by group-by wrapped queries
    pub const GROUP_VALUE_VAR: &str = "value";

    /// Template comment marking where the permission filter should be
    /// spliced in, optionally naming the instance variable:
    /// `# permission-filter ?case`
    pub const PERMISSION_MARKER: &str = "# permission-filter";
}

/// Full-text connector markers
pub mod text {
    /// Placeholder substituted with the configured connector identifier
    /// before the query is sent to the store
    pub const CONNECTOR_PLACEHOLDER: &str = "%TEXT_CONNECTOR%";

    /// Predicate linking an instance to a full-text match node
    pub const MATCHES: &str = "http://casegraph.org/text#matches";
}

/// Generated sort-variable conventions
pub mod sort {
    /// Suffix appended to sort variables generated by the augmenter.
    ///
    /// The mapper recognizes bound names carrying this suffix and stores
    /// them under the canonical sort key, so client-side sorting does not
    /// depend on the generated variable name.
    pub const SUFFIX: &str = "_sort";
}

/// Facet sentinel values
pub mod facet {
    /// Selected-value sentinel meaning "no value assigned for this
    /// property"; compiled as a negated-presence filter, never matched
    /// as a literal.
    pub const NO_VALUE: &str = "urn:casegraph:facet:no-value";
}
