//! Text layout of one emitted test case.
//!
//! A block is a brace-scoped statement list: optional preamble statements,
//! then one registration call whose kernel lambda holds the body.
//!
//! ```text
//! {
//!   <preamble>
//!   <harness><<id>, <ret>>(log,
//!       [=](<accessor> acc){
//!         <body>
//!       }, <trailing args>, <accuracy>, "<comment>");
//! }
//! ```

/// Registration helper a block is wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Harness {
    TestFunction,
    TestFunctionLocal,
    TestFunctionGlobal,
    Check,
    CheckPrivate,
    CheckLocal,
    CheckGlobal,
}

impl Harness {
    pub fn as_str(self) -> &'static str {
        match self {
            Harness::TestFunction => "test_function",
            Harness::TestFunctionLocal => "test_function_multi_ptr_local",
            Harness::TestFunctionGlobal => "test_function_multi_ptr_global",
            Harness::Check => "check_function",
            Harness::CheckPrivate => "check_function_multi_ptr_private",
            Harness::CheckLocal => "check_function_multi_ptr_local",
            Harness::CheckGlobal => "check_function_multi_ptr_global",
        }
    }

    /// Checking harnesses report through the test's `log`.
    pub fn takes_log(self) -> bool {
        matches!(
            self,
            Harness::Check | Harness::CheckPrivate | Harness::CheckLocal | Harness::CheckGlobal
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseBlock {
    pub test_id: u64,
    pub harness: Harness,
    pub ret_type: String,
    pub preamble: Vec<String>,
    /// Accessor type the kernel lambda takes as `acc`.
    pub accessor: Option<String>,
    pub body: Vec<String>,
    /// Harness arguments after the lambda.
    pub trailing_args: Vec<String>,
    pub accuracy: Option<String>,
    pub comment: Option<String>,
}

const PREAMBLE_INDENT: &str = "  ";
const LAMBDA_INDENT: &str = "      ";
const BODY_INDENT: &str = "        ";

impl TestCaseBlock {
    pub fn render(&self) -> String {
        let mut out = String::from("\n{\n");
        for stmt in &self.preamble {
            push_lines(&mut out, PREAMBLE_INDENT, stmt);
        }

        out.push_str(PREAMBLE_INDENT);
        out.push_str(&format!(
            "{}<{}, {}>(",
            self.harness.as_str(),
            self.test_id,
            self.ret_type
        ));
        if self.harness.takes_log() {
            out.push_str("log,");
        }
        out.push('\n');

        out.push_str(LAMBDA_INDENT);
        match &self.accessor {
            Some(acc) => out.push_str(&format!("[=]({acc} acc){{\n")),
            None => out.push_str("[=]{\n"),
        }
        for stmt in &self.body {
            push_lines(&mut out, BODY_INDENT, stmt);
        }
        out.push_str(LAMBDA_INDENT);
        out.push('}');

        for arg in &self.trailing_args {
            out.push_str(", ");
            out.push_str(arg);
        }
        if let Some(accuracy) = &self.accuracy {
            out.push_str(", ");
            out.push_str(accuracy);
        }
        if let Some(comment) = &self.comment {
            out.push_str(&format!(", \"{}\"", escape_string_literal(comment)));
        }
        out.push_str(");\n}\n");
        out
    }
}

fn push_lines(out: &mut String, indent: &str, stmt: &str) {
    for line in stmt.lines() {
        if line.is_empty() {
            out.push('\n');
            continue;
        }
        out.push_str(indent);
        out.push_str(line);
        out.push('\n');
    }
}

pub(crate) fn escape_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}
