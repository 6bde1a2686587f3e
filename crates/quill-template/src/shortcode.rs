//! Shortcodes: `{tailwindcss}` and `{ url('/path') }`.

use std::path::Path;
use std::sync::LazyLock;

use quill_storage::Storage;
use regex::{Captures, Regex};

use crate::engine::EngineConfig;
use crate::paths::MAIN_CSS;

const TAILWIND_CDN: &str = "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4?plugins=forms,typography,aspect-ratio,line-clamp";

/// Directives the browser build of Tailwind does not understand.
const TAILWIND_DIRECTIVES: [&str; 3] = [
    "@tailwind base;",
    "@tailwind components;",
    "@tailwind utilities;",
];

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*url\('([^']+)'\)\s*\}").unwrap());

/// Expand shortcodes in a composed document.
pub(crate) fn expand(text: &str, config: &EngineConfig, storage: &dyn Storage) -> String {
    let text = if text.contains("{tailwindcss}") {
        text.replacen("{tailwindcss}", &tailwind(config, storage), 1)
    } else {
        text.to_owned()
    };
    expand_urls(&text, config)
}

/// Markup for the `{tailwindcss}` shortcode.
///
/// Builds link the compiled stylesheet. Dev mode loads the Tailwind browser
/// build and inlines `main.css` without its `@tailwind` directives.
fn tailwind(config: &EngineConfig, storage: &dyn Storage) -> String {
    if !config.dev {
        return format!(
            r#"<link href="{}/{MAIN_CSS}" rel="stylesheet">"#,
            config.base_url()
        );
    }

    let mut markup = format!(r#"<script src="{TAILWIND_CDN}"></script>"#);
    match storage.read(Path::new(MAIN_CSS)) {
        Ok(mut css) => {
            for directive in TAILWIND_DIRECTIVES {
                css = css.replacen(directive, "", 1);
            }
            markup.push_str("<style>");
            markup.push_str(&css);
            markup.push_str("</style>");
        }
        Err(e) => {
            tracing::warn!(path = MAIN_CSS, error = %e, "Stylesheet not found, skipping inline styles");
        }
    }
    markup
}

/// Resolve `{ url('/path') }` against the base URL.
fn expand_urls(text: &str, config: &EngineConfig) -> String {
    URL_RE
        .replace_all(text, |caps: &Captures<'_>| {
            format!("{}{}", config.base_url(), &caps[1])
        })
        .into_owned()
}
