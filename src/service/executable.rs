use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::service::descriptor::ServiceDescriptor;

/// The binary registered with the native manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutablePath {
    program: PathBuf,
    command_line: String,
}

impl ExecutablePath {
    fn new(program: PathBuf, arguments: &[String]) -> Self {
        let mut command_line = program.to_string_lossy().to_string();
        if !arguments.is_empty() {
            command_line.push(' ');
            command_line.push_str(&arguments.join(" "));
        }
        Self {
            program,
            command_line,
        }
    }

    /// The bare resolved binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `<absolute-path> [arg1 arg2 ...]`, arguments only when there are any.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }
}

/// Resolve the descriptor's name on the search path, falling back to the
/// currently running executable.
pub fn resolve(descriptor: &ServiceDescriptor) -> Result<ExecutablePath> {
    let program = match which::which(descriptor.name()) {
        Ok(path) if path.exists() => path,
        _ => std::env::current_exe().map_err(|source| ServiceError::ExecutablePath {
            name: descriptor.name().to_string(),
            source,
        })?,
    };

    debug!(program = %program.display(), "Resolved service executable");
    Ok(ExecutablePath::new(program, descriptor.arguments()))
}

/// Payload run in the foreground by [`crate::service::Service::run`].
pub trait Executable {
    fn run(&mut self) -> anyhow::Result<()>;
}

impl<F> Executable for F
where
    F: FnMut() -> anyhow::Result<()>,
{
    fn run(&mut self) -> anyhow::Result<()> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_without_arguments_is_bare_path() {
        let path = ExecutablePath::new(PathBuf::from("/usr/bin/sampled"), &[]);
        assert_eq!(path.command_line(), "/usr/bin/sampled");
    }

    #[test]
    fn test_command_line_joins_arguments() {
        let args = vec!["--flag".to_string(), "-v".to_string()];
        let path = ExecutablePath::new(PathBuf::from("/usr/bin/sampled"), &args);
        assert_eq!(path.command_line(), "/usr/bin/sampled --flag -v");
        assert_eq!(path.program(), Path::new("/usr/bin/sampled"));
    }

    #[test]
    fn test_resolve_falls_back_to_current_exe() {
        let descriptor = ServiceDescriptor::new("svcman-no-such-binary-on-path", "Test")
            .with_arguments(["--flag"]);
        let resolved = resolve(&descriptor).unwrap();

        let current = std::env::current_exe().unwrap();
        assert_eq!(resolved.program(), current.as_path());
        assert!(resolved.command_line().ends_with(" --flag"));
    }

    #[test]
    fn test_resolve_never_empty_without_arguments() {
        let descriptor = ServiceDescriptor::new("svcman-no-such-binary-on-path", "Test");
        let resolved = resolve(&descriptor).unwrap();
        assert!(!resolved.command_line().is_empty());
    }

    #[test]
    fn test_closure_is_executable() {
        let mut calls = 0;
        let mut payload = || {
            calls += 1;
            Ok::<(), anyhow::Error>(())
        };
        payload.run().unwrap();
        assert_eq!(calls, 1);
    }
}
