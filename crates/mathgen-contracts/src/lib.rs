//! Shared, version-pinned schema identifiers.
//!
//! These constants are the single source of truth for the `schema_version`
//! strings that appear in catalog, manifest and report JSON. Bump the
//! version suffix whenever a field changes meaning.

pub const MATHGEN_TYPES_SCHEMA_VERSION: &str = "mathgen.types@0.1.0";
pub const MATHGEN_FUNCTIONS_SCHEMA_VERSION: &str = "mathgen.functions@0.1.0";
pub const MATHGEN_SELECTION_SCHEMA_VERSION: &str = "mathgen.selection@0.1.0";

pub const MATHGEN_MANIFEST_SCHEMA_VERSION: &str = "mathgen.manifest@0.1.0";
pub const MATHGEN_REPORT_SCHEMA_VERSION: &str = "mathgen.report@0.1.0";

/// Marker replaced by the concatenated test cases when a wrapper template is used.
pub const TEST_CASES_MARKER: &str = "$TEST_CASES";
