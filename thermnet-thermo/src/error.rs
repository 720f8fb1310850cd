use thiserror::Error;

/// Errors that may occur when resolving fluid or material properties.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The property is not supported by this provider.
    #[error("property `{property}` is not implemented by this provider")]
    NotImplemented {
        property: &'static str,
        context: Option<String>,
    },

    /// The property is undefined at the given state.
    ///
    /// For example, a provider returned a non-finite value.
    #[error("property `{property}` is undefined at the given state")]
    Undefined {
        property: &'static str,
        context: Option<String>,
    },

    /// The fluid identifier is not known to the provider.
    #[error("unknown fluid `{0}`")]
    UnknownFluid(String),

    /// The material identifier is not present in the material table.
    #[error("unknown material `{0}`")]
    UnknownMaterial(String),

    /// The input values are invalid or inconsistent.
    ///
    /// Indicates that the inputs are physically invalid or outside the provider's valid domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The property backend failed.
    #[error("backend error: {0}")]
    Backend(String),
}
