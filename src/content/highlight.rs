use std::io::Cursor;
use std::path::Path;

use pulldown_cmark_escape::escape_html;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::AppError;

/// Prefix of every highlighting class, so theme CSS cannot clash with site CSS.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Themes compiled into the crate, checked before syntect's bundled set.
const EMBEDDED_THEMES: &[(&str, &[u8])] =
    &[("github-dark", include_bytes!("themes/github-dark.tmTheme"))];

/// Fence tokens with no matching syntax name or extension.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[("shell", "bash"), ("console", "bash")];

/// Class-based code highlighter tagged with a theme name.
///
/// Spans carry `hl-` classes; colors come from the stylesheet generated by
/// [`theme_css`] for the configured theme.
pub struct SyntaxHighlighter {
    syntaxes: SyntaxSet,
    theme: String,
}

impl SyntaxHighlighter {
    /// Uses the extended syntax set, which includes TypeScript and TSX.
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            syntaxes: two_face::syntax::extra_newlines(),
            theme: theme.into(),
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Highlight `code` written in `lang` (plain text when unknown).
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> Result<String, AppError> {
        let token = lang.map(|l| {
            LANGUAGE_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(l))
                .map(|(_, target)| *target)
                .unwrap_or(l)
        });

        let syntax = token
            .and_then(|t| self.syntaxes.find_syntax_by_token(t))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| AppError::Render(format!("Highlighting failed: {e}")))?;
        }
        let highlighted = generator.finalize();

        let language = escape_attr(lang.unwrap_or("plaintext"));
        let theme = escape_attr(&self.theme);
        Ok(format!(
            "<figure data-rehype-pretty-code-figure=\"\"><pre tabindex=\"0\" data-language=\"{language}\" data-theme=\"{theme}\"><code data-language=\"{language}\" data-theme=\"{theme}\">{highlighted}</code></pre></figure>\n"
        ))
    }
}

/// Look up a theme by name: first in `themes_dir` (`{name}.tmTheme`), then
/// among the embedded themes, then syntect's bundled ones. `None` when none
/// has it.
pub fn resolve_theme(name: &str, themes_dir: Option<&Path>) -> Result<Option<Theme>, AppError> {
    if let Some(dir) = themes_dir {
        let path = dir.join(format!("{name}.tmTheme"));
        if path.is_file() {
            let theme = ThemeSet::get_theme(&path).map_err(|e| {
                AppError::Config(format!("Failed to load theme '{}': {e}", path.display()))
            })?;
            return Ok(Some(theme));
        }
    }

    if let Some(theme) = embedded_theme(name)? {
        return Ok(Some(theme));
    }

    let mut bundled = ThemeSet::load_defaults();
    Ok(bundled.themes.remove(name))
}

fn embedded_theme(name: &str) -> Result<Option<Theme>, AppError> {
    let Some((_, source)) = EMBEDDED_THEMES.iter().find(|(n, _)| *n == name) else {
        return Ok(None);
    };
    let theme = ThemeSet::load_from_reader(&mut Cursor::new(*source))
        .map_err(|e| AppError::Internal(format!("Embedded theme '{name}' is invalid: {e}")))?;
    Ok(Some(theme))
}

/// Stylesheet for the `hl-` classes under `theme`.
pub fn theme_css(theme: &Theme) -> Result<String, AppError> {
    css_for_theme_with_class_style(theme, CLASS_STYLE)
        .map_err(|e| AppError::Render(format!("Failed to generate theme CSS: {e}")))
}

/// Escape a value for use inside a double-quoted HTML attribute.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    match escape_html(&mut out, value) {
        Ok(()) => out,
        Err(_) => unreachable!("writing to a String cannot fail"),
    }
}
