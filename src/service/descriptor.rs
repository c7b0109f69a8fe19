/// Identity and launch parameters of a service.
///
/// The descriptor is immutable once built: lifecycle operations only read it.
/// Changing the name or arguments of an installed service means removing it and
/// installing it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    name: String,
    description: String,
    arguments: Vec<String>,
    dependencies: Vec<String>,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            arguments: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Arguments appended to the executable path at install time.
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Services this one should start after. Only systemd uses them.
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}
