//! Error types for catalog parsing, panorama loading and tour navigation.

use thiserror::Error;

/// Errors raised by the gallery core.
///
/// Only [`GalleryError::MalformedCatalog`] stops the feature from working.
/// Everything else is recoverable: the caller logs it and keeps the current view.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GalleryError {
    /// The catalog document could not be turned into a usable catalog
    #[error("Malformed catalog: {message}")]
    MalformedCatalog {
        /// Description of what is wrong with the document
        message: String,
    },

    /// A panorama could not be fetched or decoded
    #[error("Failed to load media '{url}': {cause}")]
    MediaLoadFailed {
        /// URL of the media that failed
        url: String,
        /// Underlying fetch or decode failure
        cause: String,
    },

    /// A hotspot asked for an icon the registry does not have
    #[error("Icon not found: {name}")]
    IconNotFound {
        /// Bare icon name that was looked up
        name: String,
    },

    /// A hotspot targets a node that is not part of the live tour
    #[error("Unknown tour node: {id}")]
    UnknownNode {
        /// The node id that could not be resolved
        id: String,
    },

    /// An annotation color string could not be parsed
    #[error("Invalid color '{value}'")]
    InvalidColor {
        /// The offending color string
        value: String,
    },

    /// A tour was requested for a category that is not a tour
    #[error("Category '{category}' is not a tour")]
    NotATour {
        /// Name of the category
        category: String,
    },

    /// A tour or panorama was requested for a category without items
    #[error("Category '{category}' has no items")]
    EmptyCategory {
        /// Name of the category
        category: String,
    },

    /// The navigator cannot perform the operation in its current state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// Name of the state the navigator was in
        state: &'static str,
    },
}

impl GalleryError {
    /// Create a malformed catalog error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedCatalog {
            message: message.into(),
        }
    }

    /// Create a media load failure.
    pub fn media_load_failed(url: impl Into<String>, cause: impl ToString) -> Self {
        Self::MediaLoadFailed {
            url: url.into(),
            cause: cause.to_string(),
        }
    }

    /// Create an icon lookup failure.
    pub fn icon_not_found(name: impl Into<String>) -> Self {
        Self::IconNotFound { name: name.into() }
    }

    /// Create an unknown node error.
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }

    /// Create an invalid color error.
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
        }
    }

    /// Whether the feature can keep working after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MalformedCatalog { .. })
    }
}

impl From<serde_json::Error> for GalleryError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_malformed_catalog_is_fatal() {
        assert!(!GalleryError::malformed("x").is_recoverable());
        assert!(GalleryError::media_load_failed("a.jpg", "404").is_recoverable());
        assert!(GalleryError::icon_not_found("arrow").is_recoverable());
        assert!(GalleryError::unknown_node("C").is_recoverable());
        assert!(GalleryError::invalid_color("#ZZZZZZ").is_recoverable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = GalleryError::media_load_failed("pano/a.jpg", "connection reset");
        assert_eq!(
            err.to_string(),
            "Failed to load media 'pano/a.jpg': connection reset"
        );
    }

    #[test]
    fn test_json_error_becomes_malformed_catalog() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GalleryError = json_err.into();
        assert!(matches!(err, GalleryError::MalformedCatalog { .. }));
    }
}
