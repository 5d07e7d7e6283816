// resolver.rs - Locate external tools and install missing ones
// Many Go-based tools land in ~/go/bin, which is often missing from PATH when
// the framework starts, so the fallback directories matter as much as PATH.

use crate::error::{ReconError, Result};
use crate::executor::{self, ExecutionRequest, ExecutionResult, TimeoutClass};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a tool was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLocation {
    NotFound,
    /// Found through the executable search path
    OnPath(PathBuf),
    /// Found only in a fallback install directory; must be invoked by path
    ExplicitPath(PathBuf),
}

impl ToolLocation {
    pub fn is_found(&self) -> bool {
        !matches!(self, ToolLocation::NotFound)
    }

    /// Program to spawn: the bare binary name when PATH finds it, the full
    /// path otherwise.
    pub fn program(&self, binary: &str) -> Option<PathBuf> {
        match self {
            ToolLocation::NotFound => None,
            ToolLocation::OnPath(_) => Some(PathBuf::from(binary)),
            ToolLocation::ExplicitPath(path) => Some(path.clone()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ToolLocation::NotFound => None,
            ToolLocation::OnPath(p) | ToolLocation::ExplicitPath(p) => Some(p),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolResolver {
    search_path: Option<OsString>,
    home: PathBuf,
    gopath: Option<OsString>,
    fallback_dirs: Vec<PathBuf>,
}

impl ToolResolver {
    /// Resolver over an explicit search path and home directory. Fallbacks are
    /// `<home>/go/bin`, `/usr/local/bin`, `/usr/bin`, probed in that order.
    pub fn new(search_path: Option<OsString>, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let fallback_dirs = vec![
            home.join("go").join("bin"),
            PathBuf::from("/usr/local/bin"),
            PathBuf::from("/usr/bin"),
        ];
        Self {
            search_path,
            home,
            gopath: None,
            fallback_dirs,
        }
    }

    /// Resolver configured from the process environment (PATH, HOME, GOPATH)
    pub fn from_env() -> Self {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/root"));
        let mut resolver = Self::new(std::env::var_os("PATH"), home);
        resolver.gopath = std::env::var_os("GOPATH");
        resolver
    }

    pub fn with_fallback_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.fallback_dirs = dirs;
        self
    }

    pub fn with_gopath(mut self, gopath: Option<OsString>) -> Self {
        self.gopath = gopath;
        self
    }

    pub fn user_bin_dir(&self) -> PathBuf {
        self.home.join("go").join("bin")
    }

    pub fn resolve(&self, binary: &str) -> ToolLocation {
        if let Some(paths) = &self.search_path {
            for dir in std::env::split_paths(paths) {
                let candidate = dir.join(binary);
                if is_executable(&candidate) {
                    debug!(binary, path = %candidate.display(), "found on PATH");
                    return ToolLocation::OnPath(candidate);
                }
            }
        }

        for dir in &self.fallback_dirs {
            let candidate = dir.join(binary);
            if is_executable(&candidate) {
                debug!(binary, path = %candidate.display(), "found in fallback dir");
                return ToolLocation::ExplicitPath(candidate);
            }
        }

        ToolLocation::NotFound
    }

    /// Environment overrides for the install child: user bin dir first on PATH,
    /// GOPATH defaulted when the operator has none.
    pub fn install_env(&self) -> BTreeMap<String, String> {
        let user_bin = self.user_bin_dir();
        let mut dirs = vec![user_bin];
        if let Some(paths) = &self.search_path {
            dirs.extend(std::env::split_paths(paths));
        }

        let mut env = BTreeMap::new();
        let path = std::env::join_paths(dirs)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| self.user_bin_dir().to_string_lossy().to_string());
        env.insert("PATH".to_string(), path);

        if self.gopath.is_none() {
            env.insert(
                "GOPATH".to_string(),
                self.home.join("go").to_string_lossy().to_string(),
            );
        }
        env
    }

    /// Run `install_cmd` as an argument vector with the install environment.
    /// Success means exit status zero; the tool itself is not re-resolved here.
    pub async fn install(&self, tool: &str, install_cmd: &str) -> Result<ExecutionResult> {
        let mut parts = install_cmd.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| ReconError::invalid("install command", install_cmd))?;
        let args = parts.map(str::to_string).collect();

        let env = self.install_env();
        let program_path = self
            .resolve_with(program, &env)
            .unwrap_or_else(|| PathBuf::from(program));

        info!(tool, command = install_cmd, "installing");
        let request = ExecutionRequest::new(tool, program_path, args)
            .timeout(TimeoutClass::Short.duration())
            .envs(env);

        let result = executor::execute(&request).await?;
        executor::classify(&request, result)
    }

    // The installer itself (go, apt-get) may also live outside PATH.
    fn resolve_with(&self, program: &str, env: &BTreeMap<String, String>) -> Option<PathBuf> {
        let resolver = Self {
            search_path: env.get("PATH").map(OsString::from),
            ..self.clone()
        };
        match resolver.resolve(program) {
            ToolLocation::NotFound => None,
            found => found.path().map(Path::to_path_buf),
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn place(dir: &Path, name: &str, mode: u32) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_fallback_to_user_bin_dir() {
        let home = TempDir::new().unwrap();
        let empty_path = TempDir::new().unwrap();
        let tool = place(&home.path().join("go/bin"), "reconvapt-fake-subfinder", 0o755);

        let resolver = ToolResolver::new(Some(empty_path.path().as_os_str().to_owned()), home.path());
        let location = resolver.resolve("reconvapt-fake-subfinder");

        assert_eq!(location, ToolLocation::ExplicitPath(tool.clone()));
        assert_eq!(location.program("reconvapt-fake-subfinder"), Some(tool));
    }

    #[test]
    fn test_search_path_wins_over_fallback() {
        let home = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        place(&home.path().join("go/bin"), "reconvapt-fake-httpx", 0o755);
        let on_path = place(bin.path(), "reconvapt-fake-httpx", 0o755);

        let resolver = ToolResolver::new(Some(bin.path().as_os_str().to_owned()), home.path());
        let location = resolver.resolve("reconvapt-fake-httpx");

        assert_eq!(location, ToolLocation::OnPath(on_path));
        assert_eq!(
            location.program("reconvapt-fake-httpx"),
            Some(PathBuf::from("reconvapt-fake-httpx"))
        );
    }

    #[test]
    fn test_non_executable_is_not_found() {
        let home = TempDir::new().unwrap();
        place(&home.path().join("go/bin"), "reconvapt-fake-naabu", 0o644);

        let resolver = ToolResolver::new(None, home.path());
        assert_eq!(resolver.resolve("reconvapt-fake-naabu"), ToolLocation::NotFound);
        assert!(!resolver.resolve("reconvapt-fake-naabu").is_found());
    }

    #[test]
    fn test_install_env_prepends_user_bin() {
        let resolver = ToolResolver::new(Some(OsString::from("/usr/bin:/bin")), "/home/op");
        let env = resolver.install_env();

        assert_eq!(env.get("PATH").unwrap(), "/home/op/go/bin:/usr/bin:/bin");
        assert_eq!(env.get("GOPATH").unwrap(), "/home/op/go");

        let with_gopath = resolver.with_gopath(Some(OsString::from("/opt/go")));
        assert!(!with_gopath.install_env().contains_key("GOPATH"));
    }

    #[tokio::test]
    async fn test_install_reports_exit_status() {
        let home = TempDir::new().unwrap();
        let resolver = ToolResolver::from_env().with_fallback_dirs(vec![]);
        let resolver = ToolResolver {
            home: home.path().to_path_buf(),
            ..resolver
        };

        assert!(resolver.install("true", "true").await.is_ok());
        assert!(matches!(
            resolver.install("false", "false --flag").await,
            Err(ReconError::ExecFailed { .. })
        ));
        assert!(matches!(
            resolver.install("ghost", "reconvapt-missing-installer x").await,
            Err(ReconError::NotFound { .. })
        ));
    }
}
