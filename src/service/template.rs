//! Descriptor template rendering.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::Result;
use crate::service::backend::Backend;
use crate::service::descriptor::ServiceDescriptor;
use crate::service::executable::ExecutablePath;

pub const SYSTEMD_TEMPLATE: &str = include_str!("../../resources/templates/systemd.service.hbs");
pub const UPSTART_TEMPLATE: &str = include_str!("../../resources/templates/upstart.conf.hbs");
pub const SYSV_TEMPLATE: &str = include_str!("../../resources/templates/sysv.sh.hbs");
pub const LAUNCHD_TEMPLATE: &str = include_str!("../../resources/templates/launchd.plist.hbs");
pub const RCD_TEMPLATE: &str = include_str!("../../resources/templates/rcd.sh.hbs");

/// Values available to every descriptor template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    pub name: String,
    pub description: String,
    /// Dependency names, space-joined.
    pub dependencies: String,
    /// Resolved executable followed by the descriptor arguments.
    pub path: String,
    /// Resolved executable alone.
    pub program: String,
    /// Install-time extra arguments, space-joined.
    pub args: String,
    /// Descriptor arguments followed by install-time arguments.
    pub arguments: Vec<String>,
}

impl TemplateContext {
    pub fn new(
        descriptor: &ServiceDescriptor,
        executable: &ExecutablePath,
        install_args: &[String],
    ) -> Self {
        Self {
            name: descriptor.name().to_string(),
            description: descriptor.description().to_string(),
            dependencies: descriptor.dependencies().join(" "),
            path: executable.command_line().to_string(),
            program: executable.program().to_string_lossy().to_string(),
            args: install_args.join(" "),
            arguments: descriptor
                .arguments()
                .iter()
                .chain(install_args)
                .cloned()
                .collect(),
        }
    }
}

/// Render `template` with `context` for `backend`.
///
/// Rendering is strict: a template that names a field missing from
/// [`TemplateContext`] is an error. Values are XML-escaped in launchd
/// plists and inserted verbatim everywhere else.
pub fn render(backend: Backend, template: &str, context: &TemplateContext) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    match backend {
        Backend::Launchd => handlebars.register_escape_fn(handlebars::html_escape),
        _ => handlebars.register_escape_fn(handlebars::no_escape),
    }

    Ok(handlebars.render_template(template, context)?)
}
