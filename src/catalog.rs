// catalog.rs - Static tool and module definitions
// Purpose: every external tool reconvapt knows about, grouped by module, with
//          its argv template and install command

use crate::executor::{CommandTemplate, OutputFilter, TimeoutClass};
use clap::ValueEnum;
use std::collections::BTreeSet;

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Tool definition with installation info
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub binary: &'static str,
    pub description: &'static str,
    pub command: CommandTemplate,
    /// `None` when no installer exists (built on another tool)
    pub install: Option<&'static str>,
    pub requires_wordlist: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ModuleKind {
    Subdomains,
    Directories,
    Ports,
    Screenshots,
    Tech,
}

/// What a module asks the operator for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Domain,
    Url,
    HostOrIp,
}

/// What `{output}` names for a module's tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    File,
    Directory,
}

#[derive(Debug, Clone)]
pub struct ModuleSpec {
    /// Main menu key
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Output directory label prefix, prepended to the target host
    pub label_prefix: &'static str,
    pub target: TargetKind,
    pub timeout: TimeoutClass,
    pub preview_limit: usize,
    pub result_noun: &'static str,
    pub run_all: bool,
    pub aggregate: bool,
    pub output: OutputKind,
    pub tools: Vec<ToolSpec>,
}

impl ModuleSpec {
    pub fn tool(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn needs_wordlist(&self) -> bool {
        self.tools.iter().any(|t| t.requires_wordlist)
    }
}

/// Wordlists offered by the directory discovery menu
pub const WORDLISTS: &[(&str, &str)] = &[
    ("dirb common", "/usr/share/wordlists/dirb/common.txt"),
    ("dirbuster small", "/usr/share/wordlists/dirbuster/directory-list-2.3-small.txt"),
    ("dirbuster medium", "/usr/share/wordlists/dirbuster/directory-list-2.3-medium.txt"),
];

// ═══════════════════════════════════════════════════════════════════════════
// MODULES
// ═══════════════════════════════════════════════════════════════════════════

pub fn modules() -> Vec<ModuleSpec> {
    vec![
        subdomain_module(),
        directory_module(),
        port_module(),
        screenshot_module(),
        tech_module(),
    ]
}

pub fn module(kind: ModuleKind) -> ModuleSpec {
    match kind {
        ModuleKind::Subdomains => subdomain_module(),
        ModuleKind::Directories => directory_module(),
        ModuleKind::Ports => port_module(),
        ModuleKind::Screenshots => screenshot_module(),
        ModuleKind::Tech => tech_module(),
    }
}

/// Every distinct binary across all modules, first occurrence wins
pub fn all_tools() -> Vec<ToolSpec> {
    let mut seen = BTreeSet::new();
    modules()
        .into_iter()
        .flat_map(|m| m.tools)
        .filter(|t| seen.insert(t.binary))
        .collect()
}

fn subdomain_module() -> ModuleSpec {
    ModuleSpec {
        key: "1",
        title: "Subdomain Enumeration",
        description: "Passive subdomain discovery with multiple sources",
        label_prefix: "",
        target: TargetKind::Domain,
        timeout: TimeoutClass::Medium,
        preview_limit: 3,
        result_noun: "subdomains",
        run_all: true,
        aggregate: true,
        output: OutputKind::File,
        tools: vec![
            ToolSpec {
                name: "subfinder",
                binary: "subfinder",
                description: "Passive subdomain discovery",
                command: CommandTemplate::new(&["-d", "{domain}", "-o", "{output}"]),
                install: Some("go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest"),
                requires_wordlist: false,
            },
            ToolSpec {
                name: "assetfinder",
                binary: "assetfinder",
                description: "Related domains and subdomains",
                command: CommandTemplate::new(&["--subs-only", "{domain}"]).to_output_file(),
                install: Some("go install github.com/tomnomnom/assetfinder@latest"),
                requires_wordlist: false,
            },
            ToolSpec {
                name: "httpx",
                binary: "httpx",
                description: "HTTP probing",
                command: CommandTemplate::new(&["-silent"]).stdin("{domain}").to_output_file(),
                install: Some("go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest"),
                requires_wordlist: false,
            },
            ToolSpec {
                name: "crt.sh",
                binary: "curl",
                description: "Certificate transparency logs",
                command: CommandTemplate::new(&["-s", "https://crt.sh/?q=%25.{domain}&output=json"])
                    .to_output_file()
                    .filter(OutputFilter::CertTranscriptNames),
                install: None,
                requires_wordlist: false,
            },
        ],
    }
}

fn directory_module() -> ModuleSpec {
    ModuleSpec {
        key: "2",
        title: "Directory Discovery",
        description: "Brute-force directories and files on a web server",
        label_prefix: "dir_",
        target: TargetKind::Url,
        timeout: TimeoutClass::Long,
        preview_limit: 5,
        result_noun: "directories/files",
        run_all: false,
        aggregate: false,
        output: OutputKind::File,
        tools: vec![
            ToolSpec {
                name: "ffuf",
                binary: "ffuf",
                description: "Fast web fuzzer",
                command: CommandTemplate::new(&[
                    "-u", "{url}/FUZZ", "-w", "{wordlist}",
                    "-mc", "200,204,301,302,307,401,403",
                    "-o", "{output}", "-of", "csv", "-s",
                ]),
                install: Some("go install github.com/ffuf/ffuf@latest"),
                requires_wordlist: true,
            },
            ToolSpec {
                name: "gobuster",
                binary: "gobuster",
                description: "Directory/file brute forcer",
                command: CommandTemplate::new(&[
                    "dir", "-u", "{url}", "-w", "{wordlist}", "-o", "{output}", "-q", "--no-error",
                ]),
                install: Some("go install github.com/OJ/gobuster/v3@latest"),
                requires_wordlist: true,
            },
            ToolSpec {
                name: "dirb",
                binary: "dirb",
                description: "Web content scanner",
                command: CommandTemplate::new(&["{url}", "{wordlist}", "-o", "{output}", "-S", "-r"]),
                install: Some("apt-get install -y dirb"),
                requires_wordlist: true,
            },
        ],
    }
}

fn port_module() -> ModuleSpec {
    ModuleSpec {
        key: "3",
        title: "Port Scanning",
        description: "Full TCP port range scan of a host",
        label_prefix: "ports_",
        target: TargetKind::HostOrIp,
        timeout: TimeoutClass::VeryLong,
        preview_limit: 10,
        result_noun: "open ports",
        run_all: false,
        aggregate: false,
        output: OutputKind::File,
        tools: vec![
            ToolSpec {
                name: "nmap",
                binary: "nmap",
                description: "Network mapper",
                command: CommandTemplate::new(&["-p-", "-T4", "--open", "{target}", "-oN", "{output}"]),
                install: Some("apt-get install -y nmap"),
                requires_wordlist: false,
            },
            ToolSpec {
                name: "naabu",
                binary: "naabu",
                description: "Fast SYN/CONNECT port scanner",
                command: CommandTemplate::new(&["-host", "{target}", "-p", "-", "-o", "{output}", "-silent"]),
                install: Some("go install -v github.com/projectdiscovery/naabu/v2/cmd/naabu@latest"),
                requires_wordlist: false,
            },
            ToolSpec {
                name: "masscan",
                binary: "masscan",
                description: "Port scanner (requires root)",
                command: CommandTemplate::new(&["{target}", "-p1-65535", "--rate=1000", "-oL", "{output}"]),
                install: Some("apt-get install -y masscan"),
                requires_wordlist: false,
            },
        ],
    }
}

fn screenshot_module() -> ModuleSpec {
    ModuleSpec {
        key: "4",
        title: "Screenshot Capture",
        description: "Capture a screenshot of a web page",
        label_prefix: "screenshot_",
        target: TargetKind::Url,
        timeout: TimeoutClass::Short,
        preview_limit: 5,
        result_noun: "files",
        run_all: false,
        aggregate: false,
        output: OutputKind::Directory,
        tools: vec![
            ToolSpec {
                name: "gowitness",
                binary: "gowitness",
                description: "Web screenshot utility",
                command: CommandTemplate::new(&["single", "{url}", "--screenshot-path", "{output}"]),
                install: Some("go install github.com/sensepost/gowitness@latest"),
                requires_wordlist: false,
            },
            ToolSpec {
                name: "aquatone",
                binary: "aquatone",
                description: "Visual inspection of websites",
                command: CommandTemplate::new(&["-out", "{output}"]).stdin("{url}"),
                install: Some("go install github.com/michenriksen/aquatone@latest"),
                requires_wordlist: false,
            },
        ],
    }
}

fn tech_module() -> ModuleSpec {
    ModuleSpec {
        key: "5",
        title: "Technology Detection",
        description: "Identify web technologies, titles and status codes",
        label_prefix: "tech_",
        target: TargetKind::Url,
        timeout: TimeoutClass::Short,
        preview_limit: 10,
        result_noun: "lines",
        run_all: false,
        aggregate: false,
        output: OutputKind::File,
        tools: vec![
            ToolSpec {
                name: "httpx",
                binary: "httpx",
                description: "Tech detection, title, status code",
                command: CommandTemplate::new(&["-tech-detect", "-title", "-status-code", "-silent"])
                    .stdin("{url}")
                    .to_output_file(),
                install: Some("go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest"),
                requires_wordlist: false,
            },
            ToolSpec {
                name: "whatweb",
                binary: "whatweb",
                description: "Web technology fingerprinting",
                command: CommandTemplate::new(&["{url}", "-v", "--color=never"]).to_output_file(),
                install: Some("apt-get install -y whatweb"),
                requires_wordlist: false,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutionRequest, StdoutSink, Substitutions};

    #[test]
    fn test_menu_keys_are_unique() {
        let keys: BTreeSet<_> = modules().iter().map(|m| m.key).collect();
        assert_eq!(keys.len(), modules().len());
    }

    #[test]
    fn test_all_tools_dedups_by_binary() {
        let tools = all_tools();
        let httpx = tools.iter().filter(|t| t.binary == "httpx").count();
        assert_eq!(httpx, 1);
        assert!(tools.iter().any(|t| t.binary == "curl"));
    }

    #[test]
    fn test_ffuf_keeps_match_codes() {
        let dirs = module(ModuleKind::Directories);
        assert!(dirs.needs_wordlist());
        let ffuf = dirs.tool("FFUF").unwrap();

        let subs = Substitutions::new("http://example.com", "/o/ffuf_results.txt")
            .with_wordlist(Some("/wl/common.txt".into()));
        let req = ExecutionRequest::from_template(ffuf.name, ffuf.binary, &ffuf.command, &subs);
        assert_eq!(req.args[1], "http://example.com/FUZZ");
        assert!(req.args.iter().any(|a| a == "200,204,301,302,307,401,403"));
    }

    #[test]
    fn test_crtsh_has_no_installer_and_filters() {
        let subs = module(ModuleKind::Subdomains);
        assert!(subs.run_all && subs.aggregate);
        let crt = subs.tool("crt.sh").unwrap();
        assert!(crt.install.is_none());
        assert_eq!(crt.command.stdout, StdoutSink::OutputFile);
        assert_eq!(crt.command.filter, OutputFilter::CertTranscriptNames);
    }

    #[test]
    fn test_only_screenshots_write_directories() {
        for m in modules() {
            let is_screenshots = m.key == module(ModuleKind::Screenshots).key;
            assert_eq!(m.output == OutputKind::Directory, is_screenshots);
        }
    }
}
