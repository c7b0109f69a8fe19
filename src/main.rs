use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use svcman::config::{self, Settings};
use svcman::service::{Action, Backend, Report, Service, ServiceConfig, ServiceDescriptor};

#[derive(Parser)]
#[command(name = "svcman")]
#[command(about = "Install and control a background service under the native init system")]
#[command(version)]
struct Cli {
    /// Service name, also the descriptor file name
    #[arg(short, long)]
    name: String,

    /// Human description embedded in the descriptor (defaults to the name)
    #[arg(short, long)]
    description: Option<String>,

    /// Service to start after (repeatable, systemd only)
    #[arg(long = "dependency")]
    dependencies: Vec<String>,

    /// Argument passed to the service executable (repeatable)
    #[arg(long = "arg", allow_hyphen_values = true)]
    arguments: Vec<String>,

    /// Use this backend instead of detecting one
    #[arg(long)]
    backend: Option<Backend>,

    /// Filesystem root for descriptors and platform markers
    #[arg(long)]
    root: Option<PathBuf>,

    /// Descriptor template file replacing the backend default
    #[arg(long)]
    template: Option<PathBuf>,

    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the service descriptor and register it
    Install {
        /// Extra arguments rendered into the descriptor
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Unregister the service and delete its descriptor
    Remove,
    /// Start the service
    Start,
    /// Stop the service
    Stop,
    /// Restart the service
    Restart,
    /// Show service status
    Status,
    /// Run a program in the foreground as the service payload
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Print the descriptor template in effect
    Template,
    /// Print the selected backend and descriptor path
    Backend,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let Cli {
        name,
        description,
        dependencies,
        arguments,
        backend,
        root,
        template,
        config: config_file,
        command,
    } = Cli::parse();

    let settings = match config_file {
        Some(path) => Settings::load_from(&path)?,
        None => Settings::load()?,
    };

    let description = description.unwrap_or_else(|| name.clone());
    let descriptor = ServiceDescriptor::new(name, description)
        .with_arguments(arguments)
        .with_dependencies(dependencies);

    let service_config = ServiceConfig {
        root: root
            .or(settings.root.clone())
            .unwrap_or_else(|| PathBuf::from("/")),
        backend: backend.or(settings.backend),
        template: None,
    };
    let mut service = Service::new(descriptor, service_config)?;

    let template_path = template.or_else(|| {
        settings
            .template_path(service.backend())
            .map(Path::to_path_buf)
    });
    if let Some(path) = template_path {
        service.set_template(config::read_template(&path)?);
    }

    match command {
        Commands::Install { args } => {
            finish(&service, Action::Install, service.install(&args).await)?
        }
        Commands::Remove => finish(&service, Action::Remove, service.remove().await)?,
        Commands::Start => finish(&service, Action::Start, service.start().await)?,
        Commands::Stop => finish(&service, Action::Stop, service.stop().await)?,
        Commands::Restart => finish(&service, Action::Restart, service.restart().await)?,
        Commands::Status => {
            let status = service.status().await?;
            println!("{}", status);
        }
        Commands::Run { command } => {
            let payload = || run_payload(&command);
            finish(&service, Action::Run, service.run(payload))?
        }
        Commands::Template => print!("{}", service.template()),
        Commands::Backend => {
            println!("Backend: {}", service.backend());
            println!("Descriptor: {}", service.descriptor_path().display());
            println!(
                "Installed: {}",
                if service.is_installed() { "yes" } else { "no" }
            );
        }
    }

    Ok(())
}

fn finish(service: &Service, action: Action, result: svcman::Result<Report>) -> Result<()> {
    match result {
        Ok(report) => {
            println!("{}", report.message);
            for warning in &report.warnings {
                println!("  warning: {}", warning);
            }
            Ok(())
        }
        Err(e) => {
            println!(
                "{}",
                action.failed_line(service.descriptor().description(), &e)
            );
            Err(e.into())
        }
    }
}

fn run_payload(command: &[String]) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("No program given to run")?;

    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("Failed to execute {}", program))?;

    if !status.success() {
        anyhow::bail!("{} exited with {}", program, status);
    }
    Ok(())
}
