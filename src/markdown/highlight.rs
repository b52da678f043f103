//! Syntax highlighting for fenced code blocks

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::helpers::html_escape;

/// Theme used when none is configured
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// syntect-backed highlighter
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl Highlighter {
    /// Create a highlighter with the bundled syntaxes and themes
    pub fn new(theme: &str, line_numbers: bool) -> Self {
        let theme_set = ThemeSet::load_defaults();
        if !theme_set.themes.contains_key(theme) {
            tracing::warn!("Unknown highlight theme {:?}, using {}", theme, DEFAULT_THEME);
        }
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Whether a grammar is bundled for the language
    #[cfg(test)]
    fn supports(&self, lang: &str) -> bool {
        self.find_syntax(lang).is_some()
    }

    /// Highlight a code block tagged with `lang`
    pub fn highlight(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .find_syntax(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self.theme().and_then(|theme| {
            // syntect's newline grammars expect every line to be terminated
            let source = format!("{}\n", code);
            highlighted_html_for_string(&source, &self.syntax_set, syntax, theme).ok()
        });

        let body = match highlighted {
            Some(html) => html,
            None => {
                tracing::debug!("Highlighting {} failed, rendering plain", lang);
                format!("<pre><code>{}</code></pre>", html_escape(code))
            }
        };

        let body = if self.line_numbers {
            add_line_numbers(code, &body)
        } else {
            body
        };

        let lang = html_escape(lang);
        format!(
            r#"<div class="code-block language-{}" data-language="{}">{}</div>"#,
            lang, lang, body
        )
    }

    fn find_syntax(&self, lang: &str) -> Option<&SyntaxReference> {
        self.syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.get(DEFAULT_THEME))
            .or_else(|| self.theme_set.themes.values().next())
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME, false)
    }
}

/// Put a line-number gutter next to highlighted code
fn add_line_numbers(code: &str, highlighted: &str) -> String {
    let line_count = code.lines().count().max(1);
    let gutter = (1..=line_count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<table class="highlight"><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table>"#,
        gutter, highlighted
    )
}
