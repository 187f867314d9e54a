use std::fmt;

use serde_json::Value;

use crate::{ParsedTarget, Verified};

/// Content type of a [`RouteResponse`] body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// `text/plain; charset=utf-8`
    Text,
    /// `application/json`
    Json,
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
    /// `application/octet-stream`
    Binary,
}

impl ContentType {
    /// Picks the image type for a lower-case file extension.
    pub fn for_extension(ext: &str) -> Self {
        match ext {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            _ => Self::Binary,
        }
    }

    /// MIME type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Json => "application/json",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Binary => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Framework-neutral response produced by a route.
///
/// Error bodies are `&'static str` by construction, so a response cannot
/// echo request input back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResponse {
    status: u16,
    content_type: ContentType,
    location: Option<String>,
    body: Vec<u8>,
}

impl RouteResponse {
    /// Fixed text response.
    pub fn text(status: u16, body: &'static str) -> Self {
        Self {
            status,
            content_type: ContentType::Text,
            location: None,
            body: body.as_bytes().to_vec(),
        }
    }

    /// JSON response.
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: ContentType::Json,
            location: None,
            body: body.to_string().into_bytes(),
        }
    }

    /// 200 with raw bytes.
    pub fn bytes(content_type: ContentType, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            location: None,
            body,
        }
    }

    /// 302 to a target the redirect guard accepted.
    pub fn redirect(target: &Verified<ParsedTarget>) -> Self {
        Self {
            status: 302,
            content_type: ContentType::Text,
            location: Some(target.as_ref().as_str().to_string()),
            body: Vec::new(),
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Body content type.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// `Location` header, for redirects.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, if it is UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}
