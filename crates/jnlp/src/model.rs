use url::Url;

use crate::JnlpError;

/// When a jar has to be present on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JarDownload {
    #[default]
    Eager,
    Progress,
    /// Loaded on demand by the application itself
    Lazy,
}

impl JarDownload {
    /// Map a `download` attribute, anything unknown is eager
    pub fn from_attr(value: &str) -> Self {
        match value {
            "lazy" => JarDownload::Lazy,
            "progress" => JarDownload::Progress,
            _ => JarDownload::Eager,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarResource {
    /// As written in the descriptor, relative to the codebase
    pub href: String,
    pub main: bool,
    pub download: JarDownload,
}

/// A `-D` system property for the JVM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// Requested Java runtime and its tuning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct J2se {
    pub version: Option<String>,
    pub href: Option<String>,
    pub initial_heap_size: Option<String>,
    pub max_heap_size: Option<String>,
    /// Raw `java-vm-args`, whitespace separated
    pub java_vm_args: Option<String>,
}

impl J2se {
    pub fn vm_args(&self) -> impl Iterator<Item = &str> {
        self.java_vm_args
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDesc {
    pub main_class: String,
    pub arguments: Vec<String>,
}

/// A parsed launch descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JnlpFile {
    /// Base for every relative href, always ends with `/`
    pub codebase: Url,
    pub jars: Vec<JarResource>,
    pub properties: Vec<Property>,
    pub j2se: Option<J2se>,
    pub application: ApplicationDesc,
}

impl JnlpFile {
    pub fn jar_url(&self, jar: &JarResource) -> Result<Url, JnlpError> {
        self.codebase
            .join(&jar.href)
            .map_err(|source| JnlpError::InvalidUrl {
                value: jar.href.clone(),
                source,
            })
    }
}
