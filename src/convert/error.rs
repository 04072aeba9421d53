/// A problem found while reducing a TEI tree.
///
/// Every variant except [`ConvertError::NestedBracket`] is recoverable: the
/// converter logs it and carries on with a fallback value unless it was built
/// in strict mode. `context` is the slash-separated element path where the
/// problem was found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("no handler for <{tag}>")]
    UnhandledTag { tag: String, context: String },
    #[error("invalid gap quantity: {quantity:?}")]
    InvalidQuantity { quantity: String, context: String },
    #[error("no acceptable choice in <{tag}>; must be one of {accepted}")]
    NoAcceptableChoice {
        tag: String,
        accepted: String,
        context: String,
    },
    #[error("nested brackets in {text:?}")]
    NestedBracket { text: String, context: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    UnhandledTag,
    InvalidQuantity,
    NoAcceptableChoice,
    NestedBracket,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::UnhandledTag { .. } => ErrorKind::UnhandledTag,
            ConvertError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            ConvertError::NoAcceptableChoice { .. } => ErrorKind::NoAcceptableChoice,
            ConvertError::NestedBracket { .. } => ErrorKind::NestedBracket,
        }
    }

    pub fn context(&self) -> &str {
        match self {
            ConvertError::UnhandledTag { context, .. }
            | ConvertError::InvalidQuantity { context, .. }
            | ConvertError::NoAcceptableChoice { context, .. }
            | ConvertError::NestedBracket { context, .. } => context,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Nested brackets mean the supplied text cannot be masked safely, so
    /// they are never recovered.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConvertError::NestedBracket { .. })
    }

    pub(crate) fn at(mut self, path: String) -> Self {
        match &mut self {
            ConvertError::UnhandledTag { context, .. }
            | ConvertError::InvalidQuantity { context, .. }
            | ConvertError::NoAcceptableChoice { context, .. }
            | ConvertError::NestedBracket { context, .. } => *context = path,
        }
        self
    }
}
