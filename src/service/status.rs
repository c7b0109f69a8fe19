//! Running/stopped verdicts scraped from native manager output.

use std::fmt;

use regex::Regex;

use crate::error::Result;

/// Derived runtime state of an installed service. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    Stopped,
    Running { pid: Option<u32> },
}

impl RuntimeStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, RuntimeStatus::Running { .. })
    }

    pub fn pid(&self) -> Option<u32> {
        match self {
            RuntimeStatus::Running { pid } => *pid,
            RuntimeStatus::Stopped => None,
        }
    }
}

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeStatus::Running { pid: Some(pid) } => {
                write!(f, "Service (pid  {}) is running...", pid)
            }
            RuntimeStatus::Running { pid: None } => write!(f, "Service is running..."),
            RuntimeStatus::Stopped => write!(f, "Service is stopped"),
        }
    }
}

/// A presence pattern plus a pid-extraction pattern with one capture group.
#[derive(Debug, Clone)]
pub struct StatusParser {
    presence: Regex,
    pid: Regex,
}

impl StatusParser {
    pub fn new(presence: &str, pid: &str) -> Result<Self> {
        Ok(Self {
            presence: Regex::new(presence)?,
            pid: Regex::new(pid)?,
        })
    }

    pub fn parse(&self, output: &str) -> RuntimeStatus {
        if !self.presence.is_match(output) {
            return RuntimeStatus::Stopped;
        }

        let pid = self
            .pid
            .captures(output)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());

        RuntimeStatus::Running { pid }
    }
}
