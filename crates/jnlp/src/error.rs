// Error type for descriptor parsing
#[derive(Debug, thiserror::Error)]
pub enum JnlpError {
    #[error("Malformed descriptor: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Descriptor has no codebase and no source URL to fall back to")]
    MissingCodebase,

    #[error("Descriptor has no <{0}> element")]
    MissingElement(&'static str),

    #[error("<{element}> is missing its '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl From<quick_xml::events::attributes::AttrError> for JnlpError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        JnlpError::Xml(err.into())
    }
}
