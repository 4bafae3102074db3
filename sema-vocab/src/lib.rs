//! Vocabulary constants and namespace codes for sema
//!
//! This crate provides a centralized location for the IRIs, prefix
//! declarations, and wiki namespace codes used throughout the sema
//! query-translation core.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` / `rdfs` / `xsd` - standard W3C vocabularies
//! - `store` - the store's own ontology (sort keys, redirects, namespace encoding)
//! - `prefixes` - prefix-to-IRI table used when rendering SPARQL prologues
//! - `ns` - wiki namespace codes used for page references

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
}

/// The store's own ontology terms
///
/// These are the properties the condition builders emit directly:
/// membership, namespace encoding, sort keys, and redirect resolution.
pub mod store {
    /// Base IRI of the store ontology
    pub const BASE: &str = "http://sema.dev/ontology#";

    /// Category/class membership property
    pub const INSTANCE_OF: &str = "http://sema.dev/ontology#instanceOf";

    /// Namespace-encoding property (object is a namespace literal term)
    pub const PAGE_NAMESPACE: &str = "http://sema.dev/ontology#pageNamespace";

    /// Sort-key property; its value is the totally-ordered scalar used
    /// when ordering entity references
    pub const SORT_KEY: &str = "http://sema.dev/ontology#sortKey";

    /// Redirect property; a page carrying it is an alias for its target
    pub const REDIRECTS_TO: &str = "http://sema.dev/ontology#redirectsTo";

    /// Concept-definition property
    pub const CONCEPT_DEFINITION: &str = "http://sema.dev/ontology#conceptDefinition";
}

/// Prefix declarations for SPARQL prologue rendering
///
/// Namespace ids are small stable integers; the serializer asks a
/// condition which ids it touched and emits only those prefixes.
pub mod prefixes {
    /// `wiki:` - article pages
    pub const WIKI: (u32, &str, &str) = (0, "wiki", "http://sema.dev/wiki/");

    /// `property:` - property pages
    pub const PROPERTY: (u32, &str, &str) = (1, "property", "http://sema.dev/property/");

    /// `category:` - category pages
    pub const CATEGORY: (u32, &str, &str) = (2, "category", "http://sema.dev/category/");

    /// `concept:` - concept pages
    pub const CONCEPT: (u32, &str, &str) = (3, "concept", "http://sema.dev/concept/");

    /// `sema:` - the store ontology
    pub const STORE: (u32, &str, &str) = (4, "sema", "http://sema.dev/ontology#");

    /// `xsd:` - XML Schema datatypes
    pub const XSD: (u32, &str, &str) = (5, "xsd", "http://www.w3.org/2001/XMLSchema#");

    /// `rdf:` - RDF vocabulary
    pub const RDF: (u32, &str, &str) = (6, "rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");

    /// All known prefixes in id order
    pub const ALL: [(u32, &str, &str); 7] =
        [WIKI, PROPERTY, CATEGORY, CONCEPT, STORE, XSD, RDF];

    /// Look up a prefix declaration by namespace id
    pub fn by_id(id: u32) -> Option<(u32, &'static str, &'static str)> {
        ALL.iter().copied().find(|(nid, _, _)| *nid == id)
    }
}

/// Wiki namespace codes
///
/// Mirrors the host wiki's namespace numbering; only the codes the
/// query core needs to distinguish are named.
pub mod ns {
    /// Main (article) namespace
    pub const MAIN: i32 = 0;

    /// Category namespace
    pub const CATEGORY: i32 = 14;

    /// Property namespace
    pub const PROPERTY: i32 = 102;

    /// Concept namespace
    pub const CONCEPT: i32 = 108;
}
