// main.rs - reconvapt - Menu-driven reconnaissance tool orchestrator
// Purpose: subdomain enumeration, directory discovery, port scanning, screenshot
//          capture and technology detection through external tools

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use reconvapt::catalog::{self, ModuleKind};
use reconvapt::console::Console;
use reconvapt::menu::{self, App};
use reconvapt::resolver::ToolResolver;
use reconvapt::{logging, output};
use std::path::{Path, PathBuf};
use tracing::info;

const WORDLISTS_DIR: &str = "wordlists";

/// reconvapt - Reconnaissance Tool Orchestrator
#[derive(Parser, Debug)]
#[command(
    name = "reconvapt",
    version,
    about = "Menu-driven orchestrator for external reconnaissance tools",
    long_about = r#"
╔═══════════════════════════════════════════════════════════════════════════════╗
║                  RECONVAPT - Reconnaissance Tool Orchestrator                  ║
╚═══════════════════════════════════════════════════════════════════════════════╝

reconvapt runs well-known scanners one at a time, each under a timeout, and
keeps their raw output in a fresh timestamped directory per run:

  📡 SUBDOMAIN ENUMERATION    subfinder, assetfinder, httpx, crt.sh
  📂 DIRECTORY DISCOVERY      ffuf, gobuster, dirb
  🔍 PORT SCANNING            nmap, naabu, masscan
  📸 SCREENSHOT CAPTURE       gowitness, aquatone
  🧩 TECHNOLOGY DETECTION     httpx, whatweb

Missing tools can be installed from the menus (go install / apt-get).

═══════════════════════════════════════════════════════════════════════════════

EXAMPLES:

  Interactive menu:
    reconvapt

  Check which tools are installed:
    reconvapt --check-tools

  Run every subdomain source once:
    reconvapt --module subdomains --target example.com

  Directory discovery with ffuf:
    reconvapt --module directories --tool ffuf --target https://example.com \
              --wordlist /usr/share/wordlists/dirb/common.txt

═══════════════════════════════════════════════════════════════════════════════

OUTPUT FILES:

  output/
  └── <label>_<YYYYMMDD_HHMMSS>/
      ├── <tool>_results.txt      # Raw tool output
      ├── all_subdomains.txt      # Combined subdomains (subdomain module)
      └── progress.jsonl          # Run journal
  logs/reconvapt.log              # Log file (RECONVAPT_LOG / RUST_LOG)
"#
)]
struct Args {
    // ═══════════════════════════════════════════════════════════════════════════
    // SINGLE-SHOT MODE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Module to run without the interactive menu
    #[arg(short, long, value_enum, requires = "target", help_heading = "Single-shot Mode")]
    module: Option<ModuleKind>,

    /// Target domain, URL or IP for --module
    #[arg(short, long, value_name = "TARGET", requires = "module", help_heading = "Single-shot Mode")]
    target: Option<String>,

    /// Tool to use (default: all tools, where the module supports it)
    #[arg(long, value_name = "NAME", requires = "module", help_heading = "Single-shot Mode")]
    tool: Option<String>,

    /// Wordlist for directory discovery
    #[arg(short, long, value_name = "FILE", requires = "module", help_heading = "Single-shot Mode")]
    wordlist: Option<String>,

    /// Install missing tools without asking
    #[arg(short, long, help_heading = "Single-shot Mode")]
    yes: bool,

    // ═══════════════════════════════════════════════════════════════════════════
    // OUTPUT OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Root directory for per-run result directories
    #[arg(long, default_value = "output", value_name = "DIR", help_heading = "Output")]
    output_dir: PathBuf,

    /// Directory for reconvapt.log
    #[arg(long, default_value = "logs", value_name = "DIR", help_heading = "Output")]
    logs_dir: PathBuf,

    // ═══════════════════════════════════════════════════════════════════════════
    // TOOL MANAGEMENT OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Check which tools are installed
    #[arg(long, help_heading = "Tool Management")]
    check_tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    output::ensure_workspace(&[args.output_dir.as_path(), args.logs_dir.as_path(), Path::new(WORDLISTS_DIR)])
        .context("Failed to create output, logs and wordlists directories")?;
    let _log_guard = logging::init_logging(&args.logs_dir).context("Failed to initialize logging")?;
    info!(version = env!("CARGO_PKG_VERSION"), "reconvapt started");

    print_banner();
    let resolver = ToolResolver::from_env();

    if args.check_tools {
        menu::check_tools_status(&resolver);
        return Ok(());
    }

    let mut app = App::new(Console::stdin(), resolver, &args.output_dir).assume_yes(args.yes);

    if let Some(kind) = args.module {
        let target = args.target.as_deref().context("--target is required with --module")?;
        let module = catalog::module(kind);
        let title = module.title;
        app.run_once(module, args.tool.as_deref(), target, args.wordlist.as_deref())
            .await
            .with_context(|| format!("{} against {} failed", title, target))?;
        return Ok(());
    }

    app.main_menu().await;
    info!("reconvapt exiting");
    Ok(())
}

fn print_banner() {
    println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    println!("{}", "  ██████╗ ███████╗ ██████╗ ██████╗ ███╗   ██╗██╗   ██╗ █████╗ ██████╗ ████████╗".cyan().bold());
    println!("{}", "  ██╔══██╗██╔════╝██╔════╝██╔═══██╗████╗  ██║██║   ██║██╔══██╗██╔══██╗╚══██╔══╝".cyan().bold());
    println!("{}", "  ██████╔╝█████╗  ██║     ██║   ██║██╔██╗ ██║██║   ██║███████║██████╔╝   ██║   ".cyan().bold());
    println!("{}", "  ██╔══██╗██╔══╝  ██║     ██║   ██║██║╚██╗██║╚██╗ ██╔╝██╔══██║██╔═══╝    ██║   ".cyan().bold());
    println!("{}", "  ██║  ██║███████╗╚██████╗╚██████╔╝██║ ╚████║ ╚████╔╝ ██║  ██║██║        ██║   ".cyan().bold());
    println!("{}", "  ╚═╝  ╚═╝╚══════╝ ╚═════╝ ╚═════╝ ╚═╝  ╚═══╝  ╚═══╝  ╚═╝  ╚═╝╚═╝        ╚═╝   ".cyan().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    println!("{}", format!("  Reconnaissance Tool Orchestrator v{}", env!("CARGO_PKG_VERSION")).white().bold());
    println!("{}", "  Only scan targets you are authorized to test".yellow());
    println!("{}", "═══════════════════════════════════════════════════════════════\n".cyan().bold());
}
