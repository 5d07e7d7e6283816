// runner.rs - One driver for every recon module
// Purpose: validate the target, create the run directory, run the selected
//          tools one after another and summarize what they wrote

use crate::aggregator::{self, Aggregation, RESULTS_SUFFIX};
use crate::catalog::{ModuleSpec, OutputKind, TargetKind, ToolSpec};
use crate::error::{ReconError, Result};
use crate::executor::{self, ExecutionRequest, ExecutionResult, Substitutions};
use crate::output;
use crate::progress::RunJournal;
use crate::resolver::ToolResolver;
use crate::summarizer::{self, Summary};
use crate::validator;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// State of one module invocation
#[derive(Debug)]
pub struct RunContext {
    /// Normalized target substituted into every template
    pub target: String,
    pub wordlist: Option<String>,
    pub dir: PathBuf,
    pub journal: RunJournal,
}

#[derive(Debug)]
pub struct ToolReport {
    pub tool: &'static str,
    pub output: PathBuf,
    pub summary: Summary,
    pub result: ExecutionResult,
}

pub struct ModuleRunner {
    module: ModuleSpec,
    resolver: ToolResolver,
    output_root: PathBuf,
    timeout: Duration,
}

impl ModuleRunner {
    pub fn new(module: ModuleSpec, resolver: ToolResolver, output_root: impl Into<PathBuf>) -> Self {
        let timeout = module.timeout.duration();
        Self {
            module,
            resolver,
            output_root: output_root.into(),
            timeout,
        }
    }

    /// Override the module's timeout class
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn module(&self) -> &ModuleSpec {
        &self.module
    }

    pub fn normalize_target(&self, raw: &str) -> Result<String> {
        let normalized = match self.module.target {
            TargetKind::Domain => validator::validate_domain(raw),
            TargetKind::Url => validator::validate_url(raw),
            TargetKind::HostOrIp => validator::validate_host_or_ip(raw),
        };
        normalized.ok_or_else(|| ReconError::invalid(target_kind_name(self.module.target), raw))
    }

    /// Directory label: module prefix plus the target host
    pub fn label(&self, target: &str) -> String {
        let host = match self.module.target {
            TargetKind::Url => validator::host_of(target),
            TargetKind::Domain | TargetKind::HostOrIp => target.to_string(),
        };
        format!("{}{}", self.module.label_prefix, host)
    }

    /// Validate inputs and create the run directory. Nothing touches the
    /// filesystem until the target (and wordlist, when needed) check out.
    pub fn prepare(&self, raw_target: &str, wordlist: Option<&str>) -> Result<RunContext> {
        let target = self.normalize_target(raw_target)?;

        let wordlist = if self.module.needs_wordlist() {
            let path = wordlist
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .ok_or_else(|| ReconError::invalid("wordlist", ""))?;
            if !Path::new(path).is_file() {
                return Err(ReconError::invalid("wordlist", path));
            }
            Some(path.to_string())
        } else {
            None
        };

        let dir = output::create_output_dir(&self.output_root, &self.label(&target))?;
        let journal = RunJournal::new(self.module.title, &target, &dir);
        journal.run_started();
        info!(module = self.module.title, %target, dir = %dir.display(), "run started");

        Ok(RunContext {
            target,
            wordlist,
            dir,
            journal,
        })
    }

    /// Where `tool` writes: `<dir>/<tool>_results.txt`, or the run directory
    /// itself for directory-producing modules
    pub fn output_path(&self, ctx: &RunContext, tool: &ToolSpec) -> PathBuf {
        match self.module.output {
            OutputKind::File => ctx.dir.join(format!("{}{}", tool.name, RESULTS_SUFFIX)),
            OutputKind::Directory => ctx.dir.clone(),
        }
    }

    pub async fn run_tool(&self, ctx: &RunContext, tool: &ToolSpec) -> Result<ToolReport> {
        let location = self.resolver.resolve(tool.binary);
        let Some(program) = location.program(tool.binary) else {
            ctx.journal.tool_skipped(tool.name, "not installed");
            return Err(ReconError::NotFound {
                tool: tool.name.to_string(),
            });
        };

        let output = self.output_path(ctx, tool);
        let subs = Substitutions::new(ctx.target.clone(), output.to_string_lossy())
            .with_wordlist(ctx.wordlist.clone());
        let request = ExecutionRequest::from_template(tool.name, program, &tool.command, &subs)
            .timeout(self.timeout)
            .expect_output(&output);

        ctx.journal.tool_started(tool.name);
        let spinner = spinner(format!("Running {} against {}", tool.name.cyan(), ctx.target));

        let outcome = match executor::execute(&request).await {
            Ok(result) => executor::classify(&request, result),
            Err(e) => Err(e),
        };
        spinner.finish_and_clear();

        match outcome {
            Ok(result) => {
                let summary = match self.module.output {
                    OutputKind::File => summarizer::summarize(&output, self.module.preview_limit),
                    OutputKind::Directory => summarizer::summarize_dir(&output, self.module.preview_limit),
                };
                ctx.journal
                    .tool_completed(tool.name, summary.count, result.elapsed.as_millis() as u64);
                if summary.count > 0 {
                    ctx.journal.data_found(self.module.result_noun, summary.count);
                }
                Ok(ToolReport {
                    tool: tool.name,
                    output,
                    summary,
                    result,
                })
            }
            Err(e) => {
                match &e {
                    ReconError::Timeout { limit, .. } => {
                        ctx.journal.tool_timed_out(tool.name, limit.as_secs())
                    }
                    ReconError::NotFound { .. } => ctx.journal.tool_skipped(tool.name, "not installed"),
                    other => ctx.journal.tool_failed(tool.name, &other.to_string()),
                }
                warn!(tool = tool.name, error = %e, "tool run failed");
                Err(e)
            }
        }
    }

    /// Run every tool in order. Missing tools come back as `NotFound` without
    /// being spawned; one tool failing never stops the next.
    pub async fn run_all<F>(&self, ctx: &RunContext, mut on_result: F) -> Vec<(&'static str, Result<ToolReport>)>
    where
        F: FnMut(&ToolSpec, &Result<ToolReport>),
    {
        let mut results = Vec::with_capacity(self.module.tools.len());
        for tool in &self.module.tools {
            let outcome = self.run_tool(ctx, tool).await;
            on_result(tool, &outcome);
            results.push((tool.name, outcome));
        }
        results
    }

    /// `None` when the module does not combine results
    pub fn aggregate(&self, ctx: &RunContext) -> Result<Option<Aggregation>> {
        if !self.module.aggregate {
            return Ok(None);
        }
        let outcome = aggregator::aggregate(&ctx.dir, &ctx.target)?;
        ctx.journal.data_found("unique subdomains", outcome.count());
        Ok(Some(outcome))
    }

    pub fn finish(&self, ctx: &RunContext) {
        ctx.journal.run_completed();
        info!(module = self.module.title, dir = %ctx.dir.display(), "run finished");
    }
}

fn target_kind_name(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Domain => "domain",
        TargetKind::Url => "URL",
        TargetKind::HostOrIp => "IP address or domain",
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
