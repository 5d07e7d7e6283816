// executor.rs - Bounded execution of external scanning tools
// Purpose: render argv templates, spawn the tool without a shell, enforce a
//          wall-clock timeout and capture stdout/stderr/exit status

use crate::error::{ReconError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
// COMMAND TEMPLATES
// ═══════════════════════════════════════════════════════════════════════════

/// Where the tool's stdout ends up besides the captured buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdoutSink {
    /// Tool writes its own output file (`-o {output}`)
    Capture,
    /// Captured stdout is also written to the output file
    OutputFile,
}

/// In-process replacement for shell post-processing of stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFilter {
    None,
    /// crt.sh JSON: every `name_value`, wildcard prefix removed, sorted and unique
    CertTranscriptNames,
}

/// Argument-vector template for one tool invocation.
/// Placeholders: `{target}`, `{domain}`, `{url}`, `{wordlist}`, `{output}`.
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    pub args: &'static [&'static str],
    pub stdin: Option<&'static str>,
    pub stdout: StdoutSink,
    pub filter: OutputFilter,
}

impl CommandTemplate {
    pub const fn new(args: &'static [&'static str]) -> Self {
        Self {
            args,
            stdin: None,
            stdout: StdoutSink::Capture,
            filter: OutputFilter::None,
        }
    }

    /// Feed `template` on stdin (the `echo x | tool` form)
    pub fn stdin(mut self, template: &'static str) -> Self {
        self.stdin = Some(template);
        self
    }

    /// Redirect stdout into the output file (the `tool > out` / `| tee out` forms)
    pub fn to_output_file(mut self) -> Self {
        self.stdout = StdoutSink::OutputFile;
        self
    }

    pub fn filter(mut self, filter: OutputFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Literal values substituted into templates. Each value stays inside the argv
/// element it was substituted into.
#[derive(Debug, Clone)]
pub struct Substitutions {
    pub target: String,
    pub wordlist: Option<String>,
    pub output: String,
}

impl Substitutions {
    pub fn new(target: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            wordlist: None,
            output: output.into(),
        }
    }

    pub fn with_wordlist(mut self, wordlist: Option<String>) -> Self {
        self.wordlist = wordlist;
        self
    }

    /// Single left-to-right pass; substituted values are never rescanned.
    /// Unknown placeholders, and `{wordlist}` when none is set, stay as written.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let token = tail
                .find('}')
                .and_then(|end| self.lookup(&tail[1..end]).map(|value| (end, value)));
            match token {
                Some((end, value)) => {
                    out.push_str(value);
                    rest = &tail[end + 1..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "target" | "domain" | "url" => Some(&self.target),
            "output" => Some(&self.output),
            "wordlist" => self.wordlist.as_deref(),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TIMEOUTS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    /// Screenshots, technology detection, installs
    Short,
    /// Subdomain enumeration
    Medium,
    /// Directory brute force
    Long,
    /// Full port range scans
    VeryLong,
}

impl TimeoutClass {
    pub fn duration(self) -> Duration {
        match self {
            TimeoutClass::Short => Duration::from_secs(300),
            TimeoutClass::Medium => Duration::from_secs(600),
            TimeoutClass::Long => Duration::from_secs(1800),
            TimeoutClass::VeryLong => Duration::from_secs(3600),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REQUEST / RESULT
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Display name used in errors and logs
    pub tool: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub stdout_file: Option<PathBuf>,
    pub filter: OutputFilter,
    pub timeout: Duration,
    pub expected_output: Option<PathBuf>,
    /// Applied on top of the inherited environment of this child only
    pub env: BTreeMap<String, String>,
}

impl ExecutionRequest {
    pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args,
            stdin: None,
            stdout_file: None,
            filter: OutputFilter::None,
            timeout: TimeoutClass::Medium.duration(),
            expected_output: None,
            env: BTreeMap::new(),
        }
    }

    /// Render a template. `program` is the bare binary name or the explicit
    /// path returned by the resolver.
    pub fn from_template(
        tool: &str,
        program: impl Into<PathBuf>,
        template: &CommandTemplate,
        subs: &Substitutions,
    ) -> Self {
        let args = template.args.iter().map(|a| subs.render(a)).collect();
        let mut request = Self::new(tool, program, args);
        request.stdin = template.stdin.map(|s| subs.render(s));
        request.filter = template.filter;
        if template.stdout == StdoutSink::OutputFile {
            request.stdout_file = Some(PathBuf::from(&subs.output));
        }
        request
    }

    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = limit;
        self
    }

    pub fn expect_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.expected_output = Some(path.into());
        self
    }

    pub fn envs(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// Human-readable command line for status output
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Exited(i32),
    /// Terminated by a signal outside our control
    Signaled,
    /// Killed by the watchdog
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExitKind,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.status == ExitKind::Exited(0)
    }

    pub fn timed_out(&self) -> bool {
        self.status == ExitKind::TimedOut
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            ExitKind::Exited(code) => Some(code),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EXECUTION
// ═══════════════════════════════════════════════════════════════════════════

/// Spawn the request's program and wait for it under the request timeout.
///
/// A timeout is reported through `ExitKind::TimedOut`, never as an error; the
/// child is killed when its handle is dropped. Only spawn and filesystem
/// failures produce `Err`.
pub async fn execute(request: &ExecutionRequest) -> Result<ExecutionResult> {
    debug!(tool = %request.tool, command = %request.display(), "spawning");

    let mut cmd = Command::new(&request.program);
    cmd.args(&request.args)
        .envs(&request.env)
        .stdin(if request.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReconError::NotFound {
                tool: request.tool.clone(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    // The stdin write runs under the same deadline as the wait.
    let stdin_pipe = child.stdin.take();
    let payload = request.stdin.as_ref().map(|p| format!("{}\n", p));
    let tool = request.tool.clone();
    let run = async move {
        if let (Some(mut pipe), Some(line)) = (stdin_pipe, payload) {
            if let Err(e) = pipe.write_all(line.as_bytes()).await {
                // Tool exited before reading its input; its exit status tells the rest.
                debug!(%tool, error = %e, "stdin write failed");
            }
        }
        child.wait_with_output().await
    };

    let output = match timeout(request.timeout, run).await {
        Ok(output) => output?,
        Err(_) => {
            warn!(tool = %request.tool, limit = request.timeout.as_secs(), "timed out, killed");
            return Ok(ExecutionResult {
                status: ExitKind::TimedOut,
                stdout: String::new(),
                stderr: format!("Command timed out after {} seconds", request.timeout.as_secs()),
                elapsed: start.elapsed(),
            });
        }
    };

    let status = match output.status.code() {
        Some(code) => ExitKind::Exited(code),
        None => ExitKind::Signaled,
    };
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if let Some(path) = &request.stdout_file {
        let content = apply_filter(request.filter, &stdout);
        tokio::fs::write(path, content).await?;
    }

    let elapsed = start.elapsed();
    info!(tool = %request.tool, ?status, elapsed_ms = elapsed.as_millis() as u64, "finished");

    Ok(ExecutionResult {
        status,
        stdout,
        stderr,
        elapsed,
    })
}

/// True when `path` is a file holding at least one byte, or a directory holding
/// something besides the run journal.
pub fn output_is_usable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| if m.is_dir() { dir_has_entries(path) } else { m.len() > 0 })
        .unwrap_or(false)
}

fn dir_has_entries(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.file_name() != crate::progress::JOURNAL_FILE)
        })
        .unwrap_or(false)
}

/// Caller-side success rule: exit status zero, or the expected output file was
/// produced anyway. Timeouts stay distinct from failures.
pub fn classify(request: &ExecutionRequest, result: ExecutionResult) -> Result<ExecutionResult> {
    if result.timed_out() {
        return Err(ReconError::Timeout {
            tool: request.tool.clone(),
            limit: request.timeout,
        });
    }

    if result.succeeded() {
        return Ok(result);
    }

    if let Some(path) = &request.expected_output {
        if output_is_usable(path) {
            warn!(
                tool = %request.tool,
                code = ?result.exit_code(),
                "non-zero exit but output was produced"
            );
            return Ok(result);
        }
    }

    let diagnostic = if result.stderr.trim().is_empty() {
        &result.stdout
    } else {
        &result.stderr
    };
    Err(ReconError::exec_failed(
        request.tool.clone(),
        result.exit_code(),
        diagnostic,
    ))
}

// ═══════════════════════════════════════════════════════════════════════════
// OUTPUT FILTERS
// ═══════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref RE_NAME_VALUE: Regex = Regex::new(r#""name_value":"([^"]*)""#).unwrap();
}

pub fn apply_filter(filter: OutputFilter, stdout: &str) -> String {
    match filter {
        OutputFilter::None => stdout.to_string(),
        OutputFilter::CertTranscriptNames => cert_transcript_names(stdout),
    }
}

fn cert_transcript_names(body: &str) -> String {
    let names: BTreeSet<String> = RE_NAME_VALUE
        .captures_iter(body)
        .filter_map(|cap| cap.get(1))
        .flat_map(|m| m.as_str().split("\\n"))
        .map(|name| name.replace("*.", "").trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let mut out = String::new();
    for name in names {
        out.push_str(&name);
        out.push('\n');
    }
    out
}
