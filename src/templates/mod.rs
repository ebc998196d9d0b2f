//! Page templates
//!
//! Tera templates compiled into the binary from `templates/`. A directory set
//! with `site.templates_path` can replace any of them by file name, which is
//! how deployments restyle the site without rebuilding.

use chrono::Datelike;
use rust_embed::RustEmbed;
use serde::Serialize;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::TemplateError;

/// Built-in templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct DefaultTemplates;

/// Template renderer shared by all handlers
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load the built-in templates, then any `.html` files from `overrides`.
    pub fn new(overrides: Option<&Path>) -> Result<Self, TemplateError> {
        let mut templates: Vec<(String, String)> = Vec::new();

        for name in DefaultTemplates::iter() {
            let file = DefaultTemplates::get(&name)
                .ok_or_else(|| TemplateError::Load(format!("{}: missing from binary", name)))?;
            let content = std::str::from_utf8(&file.data)
                .map_err(|e| TemplateError::Load(format!("{}: {}", name, e)))?;
            templates.push((name.to_string(), content.to_string()));
        }

        if let Some(dir) = overrides {
            let mut custom = Vec::new();
            collect_templates_from_dir(dir, dir, &mut custom)?;
            for (name, content) in custom {
                tracing::info!("Using template override {}", name);
                match templates.iter_mut().find(|(n, _)| *n == name) {
                    Some(existing) => existing.1 = content,
                    None => templates.push((name, content)),
                }
            }
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| TemplateError::Load(error_chain(&e)))?;

        Ok(Self { tera })
    }

    /// Render `template` with exactly the given context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, TemplateError> {
        self.tera
            .render(template, context)
            .map_err(|e| TemplateError::Render(format!("'{}': {}", template, error_chain(&e))))
    }

    /// Render a page with the standard variables merged into `context`
    pub fn render_page(
        &self,
        template: &str,
        context: &TeraContext,
        vars: &StandardTemplateVars,
    ) -> Result<String, TemplateError> {
        let mut full = context.clone();
        vars.insert_into(&mut full);
        self.render(template, &full)
    }

    /// The 500 page. Falls back to static HTML when `error.html` itself fails.
    pub fn render_error_page(&self, vars: &StandardTemplateVars) -> String {
        let mut context = TeraContext::new();
        vars.insert_into(&mut context);
        match self.render("error.html", &context) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                simple_error_page(&vars.site_name)
            }
        }
    }
}

/// Walk `current_path` collecting `*.html` files named relative to `base_path`
fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<(), TemplateError> {
    if !current_path.exists() {
        tracing::warn!("Template directory {:?} does not exist", current_path);
        return Ok(());
    }

    for entry in fs::read_dir(current_path)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().map_or(false, |ext| ext == "html") {
            let relative = path
                .strip_prefix(base_path)
                .map_err(|_| TemplateError::Load(format!("{:?} is outside {:?}", path, base_path)))?;
            let name = relative.to_string_lossy().replace('\\', "/");
            let content = fs::read_to_string(&path)?;
            templates.push((name, content));
        }
    }
    Ok(())
}

fn error_chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

fn simple_error_page(site_name: &str) -> String {
    let site_name = tera::escape_html(site_name);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Server Error | {}</title>
</head>
<body>
    <h1>Server Error (500)</h1>
    <p>Something went wrong on our side. Please try again later.</p>
    <p><a href="/">Return home</a></p>
</body>
</html>"#,
        site_name
    )
}

/// Variables every page receives
#[derive(Debug, Clone, Serialize)]
pub struct StandardTemplateVars {
    pub site_name: String,
    pub request_path: String,
    /// Current year, for the footer
    pub year: i32,
    pub user: Option<CurrentUser>,
    pub messages: Vec<Message>,
}

impl StandardTemplateVars {
    pub fn new(site_name: impl Into<String>, request_path: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            request_path: request_path.into(),
            year: chrono::Utc::now().year(),
            user: None,
            messages: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: Option<CurrentUser>) -> Self {
        self.user = user;
        self
    }

    pub fn with_message(mut self, level: MessageLevel, text: impl Into<String>) -> Self {
        self.messages.push(Message {
            level,
            text: text.into(),
        });
        self
    }

    fn insert_into(&self, context: &mut TeraContext) {
        context.insert("site_name", &self.site_name);
        context.insert("request_path", &self.request_path);
        context.insert("year", &self.year);
        if let Some(ref user) = self.user {
            context.insert("user", user);
        }
        context.insert("messages", &self.messages);
    }
}

/// Logged-in member as seen by templates
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub first_name: String,
}

impl From<&crate::models::User> for CurrentUser {
    fn from(user: &crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
        }
    }
}

/// One-shot notice shown above the page content
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Error,
}
