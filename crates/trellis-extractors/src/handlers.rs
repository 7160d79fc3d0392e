//! Pluggable text-format handling.
//!
//! An ordered chain of capability-probing handlers: each handler reports
//! whether it applies to a piece of input, and the first applicable one
//! processes it. Which handlers exist is decided once at construction via
//! explicit capability flags, not runtime probes.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static CITATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));

/// A format handler: probes input and normalizes it to plain text.
pub trait FormatHandler: Send + Sync {
    /// Handler name, for logs.
    fn name(&self) -> &str;

    /// Whether this handler can process the input.
    fn applies(&self, input: &str) -> bool;

    /// Normalize the input. Must not fail: on trouble, return the input
    /// unchanged.
    fn process(&self, input: &str) -> String;
}

/// Which optional handlers to enable, resolved once at startup and
/// injected — unavailability is a configuration value, not a runtime
/// probe.
#[derive(Debug, Clone, Copy)]
pub struct ExtractorCapabilities {
    /// Enable the HTML tag-stripping handler.
    pub html: bool,
    /// Enable the JSON pretty-printing handler.
    pub json: bool,
}

impl Default for ExtractorCapabilities {
    fn default() -> Self {
        Self {
            html: true,
            json: true,
        }
    }
}

/// Strips markup from HTML-looking input.
pub struct HtmlHandler;

impl FormatHandler for HtmlHandler {
    fn name(&self) -> &str {
        "html"
    }

    fn applies(&self, input: &str) -> bool {
        let lower = input.to_lowercase();
        input.contains('<') && input.contains('>') && (lower.contains("<html") || lower.contains("<div"))
    }

    fn process(&self, input: &str) -> String {
        TAG_RE.replace_all(input, " ").into_owned()
    }
}

/// Pretty-prints JSON-looking input so keys and values survive as text.
pub struct JsonHandler;

impl FormatHandler for JsonHandler {
    fn name(&self) -> &str {
        "json"
    }

    fn applies(&self, input: &str) -> bool {
        let trimmed = input.trim();
        (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'))
    }

    fn process(&self, input: &str) -> String {
        match serde_json::from_str::<serde_json::Value>(input) {
            Ok(parsed) => serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| input.to_string()),
            Err(_) => input.to_string(),
        }
    }
}

/// Ordered handler chain; first applicable handler wins.
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn FormatHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Create a registry with the handlers the capabilities allow, in
    /// probe order.
    pub fn with_capabilities(capabilities: ExtractorCapabilities) -> Self {
        let mut registry = Self::new();
        if capabilities.html {
            registry = registry.register(Arc::new(HtmlHandler));
        }
        if capabilities.json {
            registry = registry.register(Arc::new(JsonHandler));
        }
        registry
    }

    /// Append a handler to the chain.
    pub fn register(mut self, handler: Arc<dyn FormatHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Find the first handler that applies to the input.
    pub fn find(&self, input: &str) -> Option<&dyn FormatHandler> {
        self.handlers
            .iter()
            .find(|h| h.applies(input))
            .map(|h| h.as_ref())
    }

    /// Run the input through the first applicable handler (if any), then
    /// drop citation brackets like `[1]` and collapse whitespace.
    pub fn preprocess(&self, input: &str) -> String {
        let handled = match self.find(input) {
            Some(handler) => handler.process(input),
            None => input.to_string(),
        };
        let cleaned = CITATION_RE.replace_all(&handled, "");
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_capabilities(ExtractorCapabilities::default())
    }
}
