use std::sync::{Arc, LazyLock};

use regex::Regex;

/// Supplies the value for the `X-CSRF-Token` header on write requests.
pub trait CsrfTokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoToken;

impl CsrfTokenProvider for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CsrfTokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.clone())
    }
}

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<meta\s[^>]*>"#).expect("valid meta tag pattern"));
static META_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*["']csrf-token["']"#).expect("valid meta name pattern")
});
static META_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#).expect("valid meta content pattern")
});

/// Token read once from a page's `<meta name="csrf-token" content="...">`.
#[derive(Debug, Clone, Default)]
pub struct MetaTagToken {
    token: Option<String>,
}

impl MetaTagToken {
    pub fn from_html(html: &str) -> Self {
        let token = META_TAG
            .find_iter(html)
            .map(|tag| tag.as_str())
            .filter(|tag| META_NAME.is_match(tag))
            .find_map(|tag| META_CONTENT.captures(tag))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|token| !token.is_empty());
        Self { token }
    }
}

impl CsrfTokenProvider for MetaTagToken {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }
}

impl<F> CsrfTokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Asks each provider in turn and keeps the first token found.
#[derive(Clone, Default)]
pub struct FirstAvailable(pub Vec<Arc<dyn CsrfTokenProvider>>);

impl CsrfTokenProvider for FirstAvailable {
    fn token(&self) -> Option<String> {
        self.0.iter().find_map(|provider| provider.token())
    }
}
