use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mathgen_contracts::MATHGEN_MANIFEST_SCHEMA_VERSION;
use mathgen_core::catalog;
use mathgen_core::{CheckMode, GenerateOptions};

#[derive(Parser, Debug)]
#[command(name = "mathgen")]
#[command(about = "Deterministic SYCL math builtin test case generator.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate test cases for one catalog.
    Generate {
        #[arg(long)]
        types: PathBuf,
        #[arg(long)]
        functions: PathBuf,
        /// Defaults to every leaf of the type catalog.
        #[arg(long)]
        selection: Option<PathBuf>,
        /// Emit result-checking test cases.
        #[arg(long, default_value_t = false)]
        verified: bool,
        #[arg(long, default_value_t = 0)]
        start_id: u64,
        /// Only generate these functions (`name` or `ns::name`); repeatable.
        #[arg(long = "function")]
        function: Vec<String>,
        /// Wrapper file whose `$TEST_CASES` marker receives the output.
        #[arg(long)]
        template: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        /// If set, fail if output differs; do not write.
        #[arg(long, default_value_t = false)]
        check: bool,
        /// Write a JSON run report here.
        #[arg(long)]
        report_out: Option<PathBuf>,
    },
    /// Generate multiple outputs from a manifest.
    Batch {
        #[arg(long)]
        manifest: PathBuf,
        /// If set, fail if any output differs; do not write.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Print the diagnostic code catalog as markdown.
    Diagnostics,
}

fn main() -> Result<()> {
    if let Ok(filter) = EnvFilter::try_from_env("MATHGEN_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    try_main().map_err(|err| {
        eprintln!("{err:#}");
        err
    })
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            types,
            functions,
            selection,
            verified,
            start_id,
            function,
            template,
            out,
            check,
            report_out,
        } => {
            let job = Job {
                types,
                functions,
                selection,
                template,
                out,
                report_out,
                opts: GenerateOptions {
                    start_id,
                    check: if verified {
                        CheckMode::Verified
                    } else {
                        CheckMode::Plain
                    },
                    functions: function,
                },
            };
            run_job(&job, check).map(|_| ())
        }
        Command::Batch { manifest, check } => run_batch(&manifest, check),
        Command::Diagnostics => {
            print!("{}", mathgen_core::diagnostics::render_diagnostics_md());
            Ok(())
        }
    }
}

#[derive(Debug)]
struct Job {
    types: PathBuf,
    functions: PathBuf,
    selection: Option<PathBuf>,
    template: Option<PathBuf>,
    out: PathBuf,
    report_out: Option<PathBuf>,
    opts: GenerateOptions,
}

/// Runs one generation and returns the next free test id.
fn run_job(job: &Job, check: bool) -> Result<u64> {
    let types = catalog::load_types(&job.types)?;
    let functions = catalog::load_functions(&job.functions)?;
    let selection = match &job.selection {
        Some(path) => catalog::load_selection(path)?,
        None => mathgen_core::types::Selection::all_of(&types),
    };

    let output = mathgen_core::generate(&types, &functions, &selection, &job.opts)
        .map_err(|err| anyhow::anyhow!("{}", err.to_diagnostic()))
        .with_context(|| format!("generate from {}", job.functions.display()))?;
    for diag in &output.diagnostics {
        eprintln!("{diag}");
    }

    let stream = output.render();
    let text = match &job.template {
        None => stream,
        Some(path) => {
            let template = std::fs::read_to_string(path)
                .with_context(|| format!("read template: {}", path.display()))?;
            mathgen_core::apply_template(&template, &stream).with_context(|| {
                format!(
                    "template has no {} marker: {}",
                    mathgen_contracts::TEST_CASES_MARKER,
                    path.display()
                )
            })?
        }
    };
    write_output(&job.out, &text, check)?;

    if let Some(path) = &job.report_out {
        let report = output.report(job.opts.check);
        let mut json = serde_json::to_string_pretty(&report).context("encode report JSON")?;
        json.push('\n');
        write_output(path, &json, check)?;
    }
    Ok(output.next_id)
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    schema_version: String,
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct ManifestEntry {
    types: String,
    functions: String,
    #[serde(default)]
    selection: Option<String>,
    #[serde(default)]
    check: CheckMode,
    /// Continues from the previous entry's next id when omitted.
    #[serde(default)]
    start_id: Option<u64>,
    #[serde(default)]
    functions_filter: Vec<String>,
    #[serde(default)]
    template: Option<String>,
    out: String,
    #[serde(default)]
    report_out: Option<String>,
}

fn run_batch(manifest_path: &Path, check: bool) -> Result<()> {
    let bytes = std::fs::read(manifest_path)
        .with_context(|| format!("read manifest: {}", manifest_path.display()))?;
    let m: Manifest = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse manifest JSON: {}", manifest_path.display()))?;
    if m.schema_version.trim() != MATHGEN_MANIFEST_SCHEMA_VERSION {
        anyhow::bail!(
            "manifest schema_version mismatch: expected {MATHGEN_MANIFEST_SCHEMA_VERSION} got {:?}",
            m.schema_version
        );
    }

    // Relative paths are resolved against the manifest's directory.
    let base = manifest_path.parent().unwrap_or(Path::new("."));
    let mut next_id = 0u64;
    for (idx, e) in m.entries.into_iter().enumerate() {
        let job = Job {
            types: base.join(&e.types),
            functions: base.join(&e.functions),
            selection: e.selection.map(|p| base.join(p)),
            template: e.template.map(|p| base.join(p)),
            out: base.join(&e.out),
            report_out: e.report_out.map(|p| base.join(p)),
            opts: GenerateOptions {
                start_id: e.start_id.unwrap_or(next_id),
                check: e.check,
                functions: e.functions_filter,
            },
        };
        next_id = run_job(&job, check).with_context(|| format!("manifest entry[{idx}]"))?;
    }
    Ok(())
}

fn write_output(out_path: &Path, src: &str, check: bool) -> Result<()> {
    if check {
        let cur = std::fs::read_to_string(out_path)
            .with_context(|| format!("read existing output: {}", out_path.display()))?;
        if cur != src {
            anyhow::bail!("generated output differs: {}", out_path.display());
        }
        tracing::debug!(path = %out_path.display(), "output up to date");
        return Ok(());
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(out_path, src.as_bytes())
        .with_context(|| format!("write output: {}", out_path.display()))?;
    tracing::debug!(path = %out_path.display(), bytes = src.len(), "wrote output");
    Ok(())
}
