// menu.rs - Interactive menus and single-shot dispatch
// Purpose: main menu, per-module tool menus, install prompts, wordlist menu
//          and the tool status table

use crate::aggregator::Aggregation;
use crate::catalog::{self, ModuleSpec, ToolSpec, WORDLISTS};
use crate::console::Console;
use crate::error::{ReconError, Result};
use crate::resolver::{ToolLocation, ToolResolver};
use crate::runner::{ModuleRunner, RunContext, ToolReport};
use colored::*;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Which tools of a module to run
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    One(&'a ToolSpec),
    All,
}

pub struct App<R> {
    console: Console<R>,
    resolver: ToolResolver,
    output_root: PathBuf,
    /// Install missing tools without asking
    assume_yes: bool,
}

impl<R: BufRead> App<R> {
    pub fn new(console: Console<R>, resolver: ToolResolver, output_root: impl Into<PathBuf>) -> Self {
        Self {
            console,
            resolver,
            output_root: output_root.into(),
            assume_yes: false,
        }
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MAIN MENU
    // ═══════════════════════════════════════════════════════════════════════════

    /// Runs until the operator exits or input ends. Module errors are reported
    /// and the menu comes back.
    pub async fn main_menu(&mut self) {
        let modules = catalog::modules();
        loop {
            println!();
            println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
            println!("{}", "  MAIN MENU".white().bold());
            println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
            for m in &modules {
                println!("  {}. {:<24} {}", m.key.green().bold(), m.title, m.description.dimmed());
            }
            println!("  {}. {:<24} {}", "6".green().bold(), "Check Tools", "Show installed and missing tools".dimmed());
            println!("  {}. {}", "0".red().bold(), "Exit");

            let Some(choice) = self.console.prompt("\n[?] Select an option:") else {
                break;
            };
            match choice.as_str() {
                "0" | "q" | "exit" => break,
                "6" => {
                    check_tools_status(&self.resolver);
                    self.console.pause();
                }
                key => match modules.iter().find(|m| m.key == key) {
                    Some(module) => {
                        if let Err(e) = self.module_menu(module.clone()).await {
                            report_error(&e);
                            self.console.pause();
                        }
                    }
                    None => println!("{}", "[!] Invalid option".red()),
                },
            }
        }
        println!("{}", "\n[*] Goodbye".cyan());
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MODULE MENU
    // ═══════════════════════════════════════════════════════════════════════════

    pub async fn module_menu(&mut self, module: ModuleSpec) -> Result<()> {
        let runner = ModuleRunner::new(module, self.resolver.clone(), &self.output_root);
        let module = runner.module().clone();
        let run_all_key = (module.tools.len() + 1).to_string();

        loop {
            println!();
            println!("{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
            println!("{}", format!("  {}", module.title.to_uppercase()).yellow().bold());
            println!("{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
            for (i, tool) in module.tools.iter().enumerate() {
                let mark = if self.resolver.resolve(tool.binary).is_found() {
                    "✓".green()
                } else {
                    "✗".red()
                };
                println!("  {}. {} {:<12} {}", i + 1, mark, tool.name, tool.description.dimmed());
            }
            if module.run_all {
                println!("  {}. Run all tools", run_all_key);
            }
            println!("  0. Back");

            let Some(choice) = self.console.prompt("\n[?] Select a tool:") else {
                return Ok(());
            };
            if choice == "0" || choice.eq_ignore_ascii_case("back") {
                return Ok(());
            }

            let selection = if module.run_all && choice == run_all_key {
                Selection::All
            } else {
                match choice.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| module.tools.get(i)) {
                    Some(tool) => Selection::One(tool),
                    None => {
                        println!("{}", "[!] Invalid option".red());
                        continue;
                    }
                }
            };

            if let Err(e) = self.interactive_run(&runner, selection).await {
                report_error(&e);
            }
            self.console.pause();
        }
    }

    async fn interactive_run(&mut self, runner: &ModuleRunner, selection: Selection<'_>) -> Result<()> {
        if let Selection::One(tool) = selection {
            if !self.ensure_installed(tool).await {
                return Ok(());
            }
        }

        let Some(target) = self.prompt_target(runner) else {
            return Ok(());
        };

        let wordlist = if runner.module().needs_wordlist() {
            match self.choose_wordlist() {
                Some(w) => Some(w),
                None => return Ok(()),
            }
        } else {
            None
        };

        let ctx = runner.prepare(&target, wordlist.as_deref())?;
        execute_selection(runner, &ctx, selection).await
    }

    /// Re-prompts on invalid input; a blank answer cancels
    fn prompt_target(&mut self, runner: &ModuleRunner) -> Option<String> {
        let label = match runner.module().target {
            catalog::TargetKind::Domain => "[?] Target domain (e.g. example.com):",
            catalog::TargetKind::Url => "[?] Target URL (e.g. https://example.com):",
            catalog::TargetKind::HostOrIp => "[?] Target IP or domain:",
        };
        loop {
            let raw = self.console.prompt(label)?;
            if raw.is_empty() {
                return None;
            }
            match runner.normalize_target(&raw) {
                Ok(target) => return Some(target),
                Err(e) => println!("{}", format!("[!] {}", e).red()),
            }
        }
    }

    /// Offer the known wordlists plus a custom path. Missing files are rejected.
    pub fn choose_wordlist(&mut self) -> Option<String> {
        let custom_key = (WORDLISTS.len() + 1).to_string();
        loop {
            println!("\n{}", "[*] Wordlists:".cyan());
            for (i, (name, path)) in WORDLISTS.iter().enumerate() {
                let mark = if Path::new(path).is_file() { "✓".green() } else { "✗".red() };
                println!("  {}. {} {:<18} {}", i + 1, mark, name, path.dimmed());
            }
            println!("  {}. Custom path", custom_key);

            let choice = self.console.prompt("[?] Select a wordlist:")?;
            if choice.is_empty() || choice == "0" {
                return None;
            }

            let path = if choice == custom_key {
                self.console.prompt("[?] Wordlist path:")?
            } else {
                match choice.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| WORDLISTS.get(i)) {
                    Some((_, path)) => path.to_string(),
                    None => {
                        println!("{}", "[!] Invalid option".red());
                        continue;
                    }
                }
            };

            if Path::new(&path).is_file() {
                return Some(path);
            }
            println!("{}", format!("[!] Wordlist not found: {}", path).red());
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INSTALLATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// True once the tool resolves. Offers to install it when missing.
    pub async fn ensure_installed(&mut self, tool: &ToolSpec) -> bool {
        if self.resolver.resolve(tool.binary).is_found() {
            return true;
        }

        println!("{}", format!("[!] {} is not installed", tool.name).yellow());
        let Some(install_cmd) = tool.install else {
            println!("{}", format!("[!] No installer available for {} (needs {})", tool.name, tool.binary).red());
            return false;
        };

        let confirmed = self.assume_yes || self.console.confirm(&format!("[?] Install {} now?", tool.name));
        if !confirmed {
            return false;
        }
        install_tool(&self.resolver, tool, install_cmd).await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SINGLE-SHOT MODE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Run one module without menus. `tool` is required unless the module has a
    /// run-all entry, in which case every tool runs.
    pub async fn run_once(
        &mut self,
        module: ModuleSpec,
        tool: Option<&str>,
        target: &str,
        wordlist: Option<&str>,
    ) -> Result<()> {
        let runner = ModuleRunner::new(module, self.resolver.clone(), &self.output_root);
        let module = runner.module().clone();

        let selection = match tool {
            Some(name) => Selection::One(module.tool(name).ok_or_else(|| ReconError::invalid("tool", name))?),
            None if module.run_all => Selection::All,
            None => return Err(ReconError::invalid("tool", "")),
        };

        if let Selection::One(tool) = selection {
            if !self.ensure_installed(tool).await {
                return Err(ReconError::NotFound {
                    tool: tool.name.to_string(),
                });
            }
        }

        let ctx = runner.prepare(target, wordlist)?;
        execute_selection(&runner, &ctx, selection).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUN + REPORT
// ═══════════════════════════════════════════════════════════════════════════════

async fn execute_selection(runner: &ModuleRunner, ctx: &RunContext, selection: Selection<'_>) -> Result<()> {
    let module = runner.module();
    println!("{}", format!("[*] Output directory: {}", ctx.dir.display()).cyan());

    let outcome = match selection {
        Selection::One(tool) => {
            println!("{}", format!("[*] Running {}...", tool.name).cyan());
            let result = runner.run_tool(ctx, tool).await;
            if let Ok(report) = &result {
                print_report(module, report);
            }
            result.map(|_| ())
        }
        Selection::All => {
            runner
                .run_all(ctx, |tool, result| match result {
                    Ok(report) => print_report(module, report),
                    Err(ReconError::NotFound { .. }) => {
                        println!("{}", format!("[!] {} not installed, skipping", tool.name).yellow())
                    }
                    Err(e) => report_error(e),
                })
                .await;

            runner.aggregate(ctx).map(|aggregation| {
                if let Some(aggregation) = aggregation {
                    print_aggregation(&aggregation);
                }
            })
        }
    };

    runner.finish(ctx);
    outcome
}

fn print_report(module: &ModuleSpec, report: &ToolReport) {
    if report.summary.count == 0 {
        println!("{}", format!("[!] {} finished but produced no results", report.tool).yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "[+] {} found {} {} ({:.1}s)",
            report.tool,
            report.summary.count,
            module.result_noun,
            report.result.elapsed.as_secs_f64()
        )
        .green()
        .bold()
    );
    for line in &report.summary.preview {
        println!("    {} {}", "•".cyan(), line);
    }
    if report.summary.remaining() > 0 {
        println!("    {}", format!("... and {} more", report.summary.remaining()).dimmed());
    }
    println!("{}", format!("[*] Results saved to {}", report.output.display()).dimmed());
}

fn print_aggregation(aggregation: &Aggregation) {
    for skipped in aggregation.skipped() {
        println!("{}", format!("[!] {}", skipped).yellow());
    }
    match aggregation {
        Aggregation::Empty { .. } => {
            println!("{}", "[!] No subdomains found across all tools".yellow());
        }
        Aggregation::Written { path, subdomains, .. } => {
            println!();
            println!("{}", "═══════════════════════════════════════════════════════════════".green().bold());
            println!("{}", format!("  TOTAL UNIQUE SUBDOMAINS: {}", subdomains.len()).green().bold());
            println!("{}", "═══════════════════════════════════════════════════════════════".green().bold());
            println!("{}", format!("[+] Combined results saved to {}", path.display()).green());
        }
    }
}

/// Console line for an error, timeouts kept visually apart from failures
pub fn report_error(e: &ReconError) {
    match e {
        ReconError::Timeout { .. } => println!("{}", format!("[!] {}", e).yellow().bold()),
        ReconError::InvalidInput { .. } => println!("{}", format!("[!] {}", e).yellow()),
        _ => println!("{}", format!("[✗] {}", e).red()),
    }
    error!(error = %e, "operation failed");
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOOL MANAGEMENT
// ═══════════════════════════════════════════════════════════════════════════════

async fn install_tool(resolver: &ToolResolver, tool: &ToolSpec, install_cmd: &str) -> bool {
    println!("{}", format!("[*] Installing {}: {}", tool.name, install_cmd).cyan());
    match resolver.install(tool.name, install_cmd).await {
        Ok(_) => match resolver.resolve(tool.binary) {
            ToolLocation::NotFound => {
                warn!(tool = tool.name, "install succeeded but binary not found");
                println!(
                    "{}",
                    format!(
                        "[!] {} installed but not found; add {} to PATH",
                        tool.name,
                        resolver.user_bin_dir().display()
                    )
                    .yellow()
                );
                false
            }
            found => {
                info!(tool = tool.name, "installed");
                let location = found.path().map(|p| p.display().to_string()).unwrap_or_default();
                println!("{}", format!("[+] {} installed → {}", tool.name, location).green());
                true
            }
        },
        Err(e) => {
            println!("{}", format!("[✗] Failed to install {}: {}", tool.name, e).red());
            error!(tool = tool.name, error = %e, "install failed");
            false
        }
    }
}

/// Print found/missing for every distinct catalog binary. Returns (found, total).
pub fn check_tools_status(resolver: &ToolResolver) -> (usize, usize) {
    println!("{}", "╔══════════════════════════════════════════════════════════════════════════════╗".cyan().bold());
    println!("{}", "║                        RECONVAPT - TOOL STATUS CHECK                         ║".cyan().bold());
    println!("{}", "╚══════════════════════════════════════════════════════════════════════════════╝".cyan().bold());

    let tools = catalog::all_tools();
    let mut found = 0;
    for tool in &tools {
        let location = resolver.resolve(tool.binary);
        let (icon, name) = if location.is_found() {
            found += 1;
            ("✓".green(), tool.name.green())
        } else {
            ("✗".red(), tool.name.red())
        };
        let detail = match (&location, tool.install) {
            (ToolLocation::NotFound, Some(cmd)) => format!("Install: {}", cmd),
            (ToolLocation::NotFound, None) => format!("Requires {}", tool.binary),
            (found_at, _) => format!("→ {}", found_at.path().map(|p| p.display().to_string()).unwrap_or_default()),
        };
        println!("  {} {:<12} - {:<35} {}", icon, name, tool.description, detail.dimmed());
    }

    println!();
    println!("{}", format!("  Tools found: {}/{}", found, tools.len()).white().bold());
    if found < tools.len() {
        println!("{}", format!("  Missing tools are installed into {}", resolver.user_bin_dir().display()).dimmed());
    }
    (found, tools.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModuleKind;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn app(input: &str, root: &Path, home: &Path) -> App<Cursor<String>> {
        let resolver = ToolResolver::new(None, home).with_fallback_dirs(vec![]);
        App::new(Console::new(Cursor::new(input.to_string())), resolver, root)
    }

    #[tokio::test]
    async fn test_main_menu_exits_on_zero_and_eof() {
        let root = TempDir::new().unwrap();
        app("0\n", root.path(), root.path()).main_menu().await;
        app("", root.path(), root.path()).main_menu().await;
        app("9\n6\n\n", root.path(), root.path()).main_menu().await;
    }

    #[tokio::test]
    async fn test_run_completes_even_when_combined_file_cannot_be_written() {
        use crate::aggregator::COMBINED_FILE;
        use crate::executor::CommandTemplate;
        use crate::progress::{EventType, JOURNAL_FILE, RunJournal};

        let root = TempDir::new().unwrap();
        let mut module = catalog::module(ModuleKind::Subdomains);
        module.tools = vec![ToolSpec {
            name: "writer",
            binary: "sh",
            description: "test tool",
            command: CommandTemplate::new(&["-c", "echo www.{domain} > \"$0\"", "{output}"]),
            install: None,
            requires_wordlist: false,
        }];
        let resolver = ToolResolver::from_env().with_fallback_dirs(vec![]);
        let runner = ModuleRunner::new(module, resolver, root.path());
        let ctx = runner.prepare("example.com", None).unwrap();
        // A directory in the combined file's place makes the write fail.
        std::fs::create_dir(ctx.dir.join(COMBINED_FILE)).unwrap();

        let outcome = execute_selection(&runner, &ctx, Selection::All).await;
        assert!(matches!(outcome, Err(ReconError::Io(_))));

        let events = RunJournal::read_events_from_file(&ctx.dir.join(JOURNAL_FILE));
        assert!(matches!(events.last().unwrap().event_type, EventType::RunCompleted));
    }

    #[tokio::test]
    async fn test_missing_tool_declined_install_creates_no_run() {
        let root = TempDir::new().unwrap();
        let output = root.path().join("output");
        // pick nmap, decline install, back out
        let mut app = app("1\nn\n\n0\n", &output, root.path());

        app.module_menu(catalog::module(ModuleKind::Ports)).await.unwrap();
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_tool_without_installer_is_refused() {
        let root = TempDir::new().unwrap();
        let mut app = app("", root.path(), root.path());
        let subs = catalog::module(ModuleKind::Subdomains);
        assert!(!app.ensure_installed(subs.tool("crt.sh").unwrap()).await);
    }

    #[test]
    fn test_custom_wordlist_is_checked() {
        let root = TempDir::new().unwrap();
        let list = root.path().join("words.txt");
        std::fs::write(&list, "admin\n").unwrap();
        let custom = (WORDLISTS.len() + 1).to_string();
        let input = format!("{c}\n/nope/missing.txt\n{c}\n{}\n", list.display(), c = custom);

        let mut app = app(&input, root.path(), root.path());
        assert_eq!(app.choose_wordlist(), Some(list.display().to_string()));
    }

    #[tokio::test]
    async fn test_run_once_rejects_unknown_tool_and_bad_target() {
        let root = TempDir::new().unwrap();
        let mut app = app("", root.path(), root.path());

        let unknown = app
            .run_once(catalog::module(ModuleKind::Tech), Some("wappalyzer"), "example.com", None)
            .await;
        assert!(matches!(unknown, Err(ReconError::InvalidInput { kind: "tool", .. })));

        let no_tool = app
            .run_once(catalog::module(ModuleKind::Ports), None, "10.0.0.1", None)
            .await;
        assert!(matches!(no_tool, Err(ReconError::InvalidInput { .. })));
    }

    #[test]
    fn test_check_tools_counts_every_binary() {
        let home = TempDir::new().unwrap();
        let resolver = ToolResolver::new(None, home.path()).with_fallback_dirs(vec![]);
        let (found, total) = check_tools_status(&resolver);
        assert_eq!(found, 0);
        assert_eq!(total, catalog::all_tools().len());
    }
}
