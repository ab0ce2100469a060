use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures")
}

fn run_mathgen(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_mathgen");
    Command::new(exe)
        .args(args)
        .env_remove("MATHGEN_LOG")
        .output()
        .expect("run mathgen")
}

fn stderr(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn copy_fixtures(dst: &Path) {
    for entry in std::fs::read_dir(fixtures_dir()).expect("read fixtures") {
        let entry = entry.expect("fixture entry");
        if entry.file_type().expect("file type").is_file() {
            std::fs::copy(entry.path(), dst.join(entry.file_name())).expect("copy fixture");
        }
    }
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_string_lossy().into_owned()
}

#[test]
fn generate_writes_stream_and_check_accepts_it() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out_path = tmp.path().join("gen/plain.cpp");
    let out_str = out_path.to_str().unwrap();
    let types = fixture("types.json");
    let functions = fixture("functions.json");
    let selection = fixture("selection.json");

    let args: [&str; 9] = [
        "generate",
        "--types",
        &types,
        "--functions",
        &functions,
        "--selection",
        &selection,
        "--out",
        out_str,
    ];
    let out = run_mathgen(&args);
    assert_eq!(out.status.code(), Some(0), "stderr:\n{}", stderr(&out));
    // The empty sqrt expansion is reported, not fatal.
    assert!(stderr(&out).contains("MG0200"), "stderr:\n{}", stderr(&out));

    let text = std::fs::read_to_string(&out_path).expect("read output");
    assert!(text.starts_with("\n{\n  test_function<0, float>(\n"));
    assert_eq!(text.matches("\n{\n").count(), 63);

    let mut check_args = args.to_vec();
    check_args.push("--check");
    let out = run_mathgen(&check_args);
    assert_eq!(out.status.code(), Some(0), "stderr:\n{}", stderr(&out));

    std::fs::write(&out_path, "stale").expect("overwrite output");
    let out = run_mathgen(&check_args);
    assert_ne!(out.status.code(), Some(0));
    assert!(stderr(&out).contains("generated output differs"));
    assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "stale");
}

#[test]
fn generate_with_template_filter_and_report() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out_path = tmp.path().join("sin.cpp");
    let report_path = tmp.path().join("sin.report.json");
    let types = fixture("types.json");
    let functions = fixture("functions.json");
    let template = fixture("template.cpp");

    let out = run_mathgen(&[
        "generate",
        "--types",
        &types,
        "--functions",
        &functions,
        "--verified",
        "--start-id",
        "7",
        "--function",
        "sin",
        "--template",
        &template,
        "--out",
        out_path.to_str().unwrap(),
        "--report-out",
        report_path.to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr:\n{}", stderr(&out));

    let text = std::fs::read_to_string(&out_path).expect("read output");
    assert!(text.starts_with("// Generated math builtin test cases.\n"));
    assert!(!text.contains("$TEST_CASES"));
    assert!(text.contains("  check_function<7, float>(log,\n"));
    assert!(text.contains("  check_function<11, sycl::vec<double, 2>>(log,\n"));
    assert!(!text.contains("check_function<12,"));

    let report: Value =
        serde_json::from_slice(&std::fs::read(&report_path).expect("read report")).expect("parse");
    assert_eq!(report["schema_version"], "mathgen.report@0.1.0");
    assert_eq!(report["check"], "verified");
    assert_eq!(report["signature_count"], 5);
    assert_eq!(report["test_case_count"], 5);
    assert_eq!(report["start_id"], 7);
    assert_eq!(report["next_id"], 12);
    assert_eq!(report["sha256"].as_str().map(str::len), Some(64));
}

#[test]
fn batch_chains_ids_across_entries() {
    let tmp = tempfile::tempdir().expect("tempdir");
    copy_fixtures(tmp.path());
    let manifest = tmp.path().join("manifest.json");

    let out = run_mathgen(&["batch", "--manifest", manifest.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0), "stderr:\n{}", stderr(&out));

    // sin (5) + fract (5 * 6) plain blocks, ids 0..35.
    let plain = std::fs::read_to_string(tmp.path().join("out/plain.cpp")).expect("plain");
    assert!(plain.contains("void run_tests("));
    assert!(plain.contains("test_function_multi_ptr_global<34, "));
    assert!(!plain.contains("<35, "));

    let verified = std::fs::read_to_string(tmp.path().join("out/verified.cpp")).expect("verified");
    assert!(verified.contains("  check_function<35, float>(log,\n"));

    let report: Value = serde_json::from_slice(
        &std::fs::read(tmp.path().join("out/verified.report.json")).expect("read report"),
    )
    .expect("parse report");
    assert_eq!(report["start_id"], 35);
    assert_eq!(report["next_id"], 40);

    let out = run_mathgen(&["batch", "--manifest", manifest.to_str().unwrap(), "--check"]);
    assert_eq!(out.status.code(), Some(0), "stderr:\n{}", stderr(&out));
}

#[test]
fn batch_rejects_wrong_schema_version() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let manifest = tmp.path().join("manifest.json");
    std::fs::write(
        &manifest,
        r#"{"schema_version": "mathgen.manifest@9.9.9", "entries": []}"#,
    )
    .expect("write manifest");

    let out = run_mathgen(&["batch", "--manifest", manifest.to_str().unwrap()]);
    assert_ne!(out.status.code(), Some(0));
    assert!(stderr(&out).contains("manifest schema_version mismatch"));
}

#[test]
fn configuration_errors_fail_the_run() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let functions = tmp.path().join("functions.json");
    std::fs::write(
        &functions,
        r#"{"schema_version": "mathgen.functions@0.1.0",
            "functions": [{"name": "ldexp", "ret_type": "genfloat",
                           "arg_types": ["genfloat", "genint32"],
                           "mutations": [["genfloat", "genint32", "width"]]}]}"#,
    )
    .expect("write functions");
    let types = fixture("types.json");
    let out_path = tmp.path().join("out.cpp");

    let out = run_mathgen(&[
        "generate",
        "--types",
        &types,
        "--functions",
        functions.to_str().unwrap(),
        "--out",
        out_path.to_str().unwrap(),
    ]);
    assert_ne!(out.status.code(), Some(0));
    let err = stderr(&out);
    assert!(err.contains("MG0100"), "{err}");
    assert!(err.contains("unknown mutation rule \"width\""), "{err}");
    assert!(!out_path.exists());
}

#[test]
fn diagnostics_catalog_lists_codes() {
    let out = run_mathgen(&["diagnostics"]);
    assert_eq!(out.status.code(), Some(0));
    let md = String::from_utf8_lossy(&out.stdout);
    assert!(md.contains("MG0200"));
    assert!(md.contains("MG0400"));
}
