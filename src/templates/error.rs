//! Template engine error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// A template could not be loaded or parsed
    #[error("Failed to load template: {0}")]
    Load(String),

    /// Rendering failed (missing template, bad context, filter error)
    #[error("Template error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
