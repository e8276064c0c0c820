use serde::{Deserialize, Serialize};

/// One part of a structured user message: text, or an image carried as a
/// base64 data URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },

    /// An image reference.
    ImageUrl {
        /// The image reference.
        image_url: ImageUrl,
    },
}

/// An image reference as the wire protocol expects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    /// Either a remote URL or a `data:` URL.
    pub url: String,
}

impl ContentPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Create an image part from a base64-encoded JPEG, wrapping it in a
    /// `data:` URL as the endpoint expects.
    pub fn image_base64(data: impl AsRef<str>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/jpeg;base64,{}", data.as_ref()),
            },
        }
    }

    /// Returns true if this part is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::ImageUrl { .. })
    }
}
