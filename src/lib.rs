//! Install, remove, start, stop and query a background service under the
//! host's native init system (systemd, upstart, SysV init, launchd or BSD rc.d).

pub mod config;
pub mod error;
pub mod service;

pub use error::{Result, ServiceError};
pub use service::{Backend, RuntimeStatus, Service, ServiceConfig, ServiceDescriptor};
