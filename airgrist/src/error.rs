use std::fmt;
use std::fmt::{Debug, Display, Formatter};

/// Result that is a wrapper of `Result<T, airgrist::Error>`
pub type Result<T> = std::result::Result<T, Error>;

/// ErrorKind is all kinds of Error of airgrist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// airgrist don't know what happened here, and no actions other than
    /// just returning it back. For example, reqwest returns an internal
    /// connection error.
    Unexpected,

    /// A remote API returned a non-success HTTP status.
    ///
    /// The error message carries the status code and the response body so
    /// a failed import can be diagnosed without re-running it.
    RemoteFailed,
    /// A request exceeded its deadline.
    RequestTimeout,
    /// A wire payload failed validation at the client boundary.
    ///
    /// This error is returned when a schema fetched from the source API
    /// can't be converted into the in-memory model, for example when a
    /// table's `primaryFieldId` references no field of that table.
    SchemaInvalid,
    /// A source field type can't be represented on the destination side.
    ///
    /// Reserved: the current translation policy degrades unmapped types
    /// to `Any` and never produces this kind.
    MappingUnsupported,
    /// Configuration is missing or failed to parse.
    ConfigInvalid,
}

impl ErrorKind {
    /// Convert self into static str.
    pub fn into_static(self) -> &'static str {
        self.into()
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

impl From<ErrorKind> for &'static str {
    fn from(v: ErrorKind) -> &'static str {
        match v {
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::RemoteFailed => "RemoteFailed",
            ErrorKind::RequestTimeout => "RequestTimeout",
            ErrorKind::SchemaInvalid => "SchemaInvalid",
            ErrorKind::MappingUnsupported => "MappingUnsupported",
            ErrorKind::ConfigInvalid => "ConfigInvalid",
        }
    }
}

/// Error is the error struct returned by all airgrist functions.
pub struct Error {
    kind: ErrorKind,
    message: String,

    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("source", &self.source);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "    {k}: {v}")?;
            }
        }
        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "Source: {source:?}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref())
    }
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),

            context: Vec::default(),
            source: None,
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set source for error.
    ///
    /// # Notes
    ///
    /// If the source has been set, we will raise a panic here.
    pub fn set_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "the source error has been set");

        self.source = Some(src.into());
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the context attached to this error, if any.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl From<serde_json::Error> for Error {
    fn from(v: serde_json::Error) -> Self {
        Self::new(ErrorKind::Unexpected, "handling json data failed").set_source(v)
    }
}

impl From<reqwest::Error> for Error {
    fn from(v: reqwest::Error) -> Self {
        if v.is_timeout() {
            Self::new(ErrorKind::RequestTimeout, "http request timed out").set_source(v)
        } else {
            Self::new(ErrorKind::Unexpected, "http request failed").set_source(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    fn test_error() -> Error {
        Error {
            kind: ErrorKind::RemoteFailed,
            message: "table creation rejected".to_string(),
            context: vec![
                ("document", "j3kSao7evLmt".to_string()),
                ("status", "403".to_string()),
            ],
            source: Some(anyhow!("access denied")),
        }
    }

    #[test]
    fn test_error_display() {
        let s = format!("{}", test_error());
        assert_eq!(
            s,
            r#"RemoteFailed, context: { document: j3kSao7evLmt, status: 403 } => table creation rejected, source: access denied"#
        )
    }

    #[test]
    fn test_error_debug() {
        let s = format!("{:?}", test_error());
        assert_eq!(
            s,
            r#"RemoteFailed => table creation rejected

Context:
    document: j3kSao7evLmt
    status: 403

Source: access denied
"#
        )
    }

    #[test]
    fn test_error_context_lookup() {
        let err = test_error();
        assert_eq!(err.context("document"), Some("j3kSao7evLmt"));
        assert_eq!(err.context("missing"), None);
    }
}
