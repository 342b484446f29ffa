//! IRI constants for the vocabularies a nanopublication relies on.

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod rdfs {
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// Dublin Core elements (`dc:`).
pub mod dc {
    pub const TITLE: &str = "http://purl.org/dc/elements/1.1/title";
    pub const DESCRIPTION: &str = "http://purl.org/dc/elements/1.1/description";
}

/// Dublin Core terms (`dct:`).
pub mod dct {
    pub const NS: &str = "http://purl.org/dc/terms/";
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
    pub const LICENSE: &str = "http://purl.org/dc/terms/license";
}

pub mod pav {
    pub const NS: &str = "http://purl.org/pav/";
    pub const CREATED_BY: &str = "http://purl.org/pav/createdBy";
}

/// Core nanopublication schema.
pub mod np {
    pub const NS: &str = "http://www.nanopub.org/nschema#";
    pub const NANOPUBLICATION: &str = "http://www.nanopub.org/nschema#Nanopublication";
    pub const HAS_ASSERTION: &str = "http://www.nanopub.org/nschema#hasAssertion";
    pub const HAS_PROVENANCE: &str = "http://www.nanopub.org/nschema#hasProvenance";
    pub const HAS_PUBLICATION_INFO: &str = "http://www.nanopub.org/nschema#hasPublicationInfo";
}

/// Nanopublication extensions: indexes and signatures.
pub mod npx {
    pub const NS: &str = "http://purl.org/nanopub/x/";
    pub const NANOPUB_INDEX: &str = "http://purl.org/nanopub/x/NanopubIndex";
    pub const INCOMPLETE_INDEX: &str = "http://purl.org/nanopub/x/IncompleteIndex";
    pub const INDEX_ASSERTION: &str = "http://purl.org/nanopub/x/IndexAssertion";
    pub const INCLUDES_ELEMENT: &str = "http://purl.org/nanopub/x/includesElement";
    pub const INCLUDES_SUBINDEX: &str = "http://purl.org/nanopub/x/includesSubindex";
    pub const APPENDS_INDEX: &str = "http://purl.org/nanopub/x/appendsIndex";
    pub const NANOPUB_SIGNATURE_ELEMENT: &str =
        "http://purl.org/nanopub/x/NanopubSignatureElement";
    pub const HAS_SIGNATURE_TARGET: &str = "http://purl.org/nanopub/x/hasSignatureTarget";
    pub const HAS_ALGORITHM: &str = "http://purl.org/nanopub/x/hasAlgorithm";
    pub const HAS_PUBLIC_KEY: &str = "http://purl.org/nanopub/x/hasPublicKey";
    pub const HAS_SIGNATURE: &str = "http://purl.org/nanopub/x/hasSignature";
}

pub const ORCID_PREFIX: &str = "http://orcid.org/";
