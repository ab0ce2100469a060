//! One full generation run: resolve, expand, synthesize.

use rand::RngCore;
use serde::Serialize;

use mathgen_contracts::{MATHGEN_REPORT_SCHEMA_VERSION, TEST_CASES_MARKER};

use crate::diagnostics::Diagnostic;
use crate::error::{GenError, Result};
use crate::expand::expand_signatures;
use crate::signature::Signature;
use crate::synth::{generate_test_cases, render_stream, CheckMode, TestCase};
use crate::types::{expand_types, Selection, TypeCatalog};
use crate::util::sha256_hex;
use crate::values::seeded_rng;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub start_id: u64,
    pub check: CheckMode,
    /// Function names (`name` or `ns::name`) to keep; empty keeps all.
    pub functions: Vec<String>,
}

impl GenerateOptions {
    fn wants(&self, sig: &Signature) -> bool {
        self.functions.is_empty()
            || self
                .functions
                .iter()
                .any(|f| *f == sig.name || *f == sig.qualified_name())
    }
}

#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub test_cases: Vec<TestCase>,
    pub diagnostics: Vec<Diagnostic>,
    pub signature_count: usize,
    pub start_id: u64,
    /// First id not used by this run.
    pub next_id: u64,
}

impl GenerationOutput {
    pub fn render(&self) -> String {
        render_stream(&self.test_cases)
    }

    pub fn report(&self, check: CheckMode) -> RunReport {
        RunReport {
            schema_version: MATHGEN_REPORT_SCHEMA_VERSION,
            check,
            signature_count: self.signature_count,
            test_case_count: self.test_cases.len(),
            start_id: self.start_id,
            next_id: self.next_id,
            diagnostics: self.diagnostics.clone(),
            sha256: sha256_hex(self.render().as_bytes()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub schema_version: &'static str,
    pub check: CheckMode,
    pub signature_count: usize,
    pub test_case_count: usize,
    pub start_id: u64,
    pub next_id: u64,
    pub diagnostics: Vec<Diagnostic>,
    pub sha256: String,
}

/// Runs generation from the fixed seed.
pub fn generate(
    catalog: &TypeCatalog,
    signatures: &[Signature],
    selection: &Selection,
    opts: &GenerateOptions,
) -> Result<GenerationOutput> {
    let mut rng = seeded_rng();
    generate_with_rng(&mut rng, catalog, signatures, selection, opts)
}

pub fn generate_with_rng(
    rng: &mut dyn RngCore,
    catalog: &TypeCatalog,
    signatures: &[Signature],
    selection: &Selection,
    opts: &GenerateOptions,
) -> Result<GenerationOutput> {
    let resolved = expand_types(selection, catalog)?;
    let wanted: Vec<Signature> = signatures
        .iter()
        .filter(|s| opts.wants(s))
        .cloned()
        .collect();
    let expansion = expand_signatures(&resolved, &wanted)?;
    let test_cases = generate_test_cases(rng, opts.start_id, &expansion.signatures, opts.check)?;
    let next_id = opts
        .start_id
        .checked_add(test_cases.len() as u64)
        .ok_or(GenError::IdOverflow {
            start_id: opts.start_id,
        })?;

    tracing::info!(
        templates = wanted.len(),
        signatures = expansion.signatures.len(),
        test_cases = test_cases.len(),
        diagnostics = expansion.diagnostics.len(),
        start_id = opts.start_id,
        next_id,
        "generated test cases"
    );

    Ok(GenerationOutput {
        signature_count: expansion.signatures.len(),
        diagnostics: expansion.diagnostics,
        test_cases,
        start_id: opts.start_id,
        next_id,
    })
}

/// Substitutes the stream for the template's marker; `None` if the
/// template has no marker.
pub fn apply_template(template: &str, stream: &str) -> Option<String> {
    template
        .contains(TEST_CASES_MARKER)
        .then(|| template.replace(TEST_CASES_MARKER, stream))
}
