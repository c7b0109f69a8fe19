#![allow(dead_code)]

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use svcman::service::{CommandOutput, CommandRunner, NativeCommand};
use svcman::{Backend, Service, ServiceConfig, ServiceDescriptor};

pub const PID: u32 = 4321;

/// In-memory stand-in for a host's native service manager.
pub struct FakeManager {
    backend: Backend,
    name: String,
    state: Mutex<FakeState>,
}

struct FakeState {
    id_output: Option<String>,
    running: bool,
    calls: Vec<String>,
    failing: Vec<String>,
}

impl FakeManager {
    pub fn root(backend: Backend, name: &str) -> Arc<Self> {
        Self::with_id(backend, name, Some("0\n"))
    }

    pub fn unprivileged(backend: Backend, name: &str) -> Arc<Self> {
        Self::with_id(backend, name, Some("1000\n"))
    }

    /// `id -g` cannot be executed.
    pub fn without_id(backend: Backend, name: &str) -> Arc<Self> {
        Self::with_id(backend, name, None)
    }

    fn with_id(backend: Backend, name: &str, id_output: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            name: name.to_string(),
            state: Mutex::new(FakeState {
                id_output: id_output.map(str::to_string),
                running: false,
                calls: Vec::new(),
                failing: Vec::new(),
            }),
        })
    }

    /// Make an exact command line exit nonzero.
    pub fn fail_on(&self, command: &str) {
        self.state.lock().unwrap().failing.push(command.to_string());
    }

    pub fn set_running(&self, running: bool) {
        self.state.lock().unwrap().running = running;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than the privilege check.
    pub fn manager_calls(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| c != "id -g").collect()
    }

    fn running_output(&self) -> String {
        let name = &self.name;
        match self.backend {
            Backend::Systemd => format!(
                "● {name}.service - Sample Daemon\n     Loaded: loaded (/etc/systemd/system/{name}.service; enabled)\n     Active: active (running) since Tue 2024-03-05 10:12:01 UTC; 4s ago\n   Main PID: {PID} ({name})\n"
            ),
            Backend::Upstart => format!("{name} start/running, process {PID}\n"),
            Backend::SysV => format!("{name} (pid  {PID}) is running...\n"),
            Backend::Launchd => format!(
                "{{\n\t\"Label\" = \"{name}\";\n\t\"LastExitStatus\" = 0;\n\t\"PID\" = {PID};\n}};\n"
            ),
            Backend::BsdRcd => format!("{name} is running as pid {PID}.\n"),
        }
    }
}

fn ok(stdout: impl Into<String>) -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
    }
}

fn failed(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl CommandRunner for FakeManager {
    async fn output(&self, command: &NativeCommand) -> io::Result<CommandOutput> {
        let line = command.to_string();
        let mut state = self.state.lock().unwrap();
        state.calls.push(line.clone());

        if state.failing.contains(&line) {
            return Ok(failed(1, "forced failure"));
        }

        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();
        let output = match (command.program.as_str(), args.as_slice()) {
            ("id", ["-g"]) => match &state.id_output {
                Some(gid) => ok(gid.clone()),
                None => return Err(io::Error::new(io::ErrorKind::NotFound, "id: not found")),
            },
            ("systemctl", ["start", _])
            | ("start", [_])
            | ("service", [_, "start" | "onestart"])
            | ("launchctl", ["load", _]) => {
                state.running = true;
                ok("")
            }
            ("systemctl", ["stop", _])
            | ("stop", [_])
            | ("service", [_, "stop" | "onestop"])
            | ("launchctl", ["unload", _]) => {
                state.running = false;
                ok("")
            }
            ("systemctl", ["status", _])
            | ("status", [_])
            | ("service", [_, "status" | "onestatus"])
            | ("launchctl", ["list", _]) => {
                if state.running {
                    ok(self.running_output())
                } else {
                    failed(3, "")
                }
            }
            _ => ok(""),
        };
        Ok(output)
    }
}

pub fn descriptor() -> ServiceDescriptor {
    ServiceDescriptor::new("sampled", "Sample Daemon")
        .with_arguments(["--flag"])
        .with_dependencies(["network"])
}

pub fn service(root: &Path, backend: Backend, runner: Arc<FakeManager>) -> Service {
    let config = ServiceConfig {
        root: root.to_path_buf(),
        backend: Some(backend),
        template: None,
    };
    Service::with_runner(descriptor(), config, runner).unwrap()
}
