//! Rule-based HTML to Markdown conversion
//!
//! This is a fixed chain of regex substitutions applied once, in order, over
//! the whole input. It is not an HTML parser: nested or malformed markup gives
//! best-effort output. Known limitations:
//! - `alt` is only picked up when it follows `src` inside an `<img>` tag
//! - headings, links and inline styles must open and close on the same line
//! - tags with attributes (`<p class="x">`) are stripped, not converted
//! - HTML entities are left untouched

use once_cell::sync::Lazy;
use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid regex"),
            replacement,
        }
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(
            r#"<img[^>]+src=["']([^"']+)["'][^>]*alt=["']([^"']*)["'][^>]*>"#,
            "![${2}](${1})",
        ),
        Rule::new(r#"<img[^>]+src=["']([^"']+)["'][^>]*>"#, "![](${1})"),
        Rule::new(r"<h1>(.*?)</h1>", "# ${1}\n\n"),
        Rule::new(r"<h2>(.*?)</h2>", "## ${1}\n\n"),
        Rule::new(r"<h3>(.*?)</h3>", "### ${1}\n\n"),
        // Paragraphs may span lines
        Rule::new(r"(?s)<p>(.*?)</p>", "${1}\n\n"),
        Rule::new(r#"<a href="(.*?)">(.*?)</a>"#, "[${2}](${1})"),
        Rule::new(r"<(?:strong|b)>(.*?)</(?:strong|b)>", "**${1}**"),
        Rule::new(r"<(?:em|i)>(.*?)</(?:em|i)>", "*${1}*"),
        Rule::new(r"<br\s*/?>", "\n"),
        Rule::new(r"<[^>]+>", ""),
    ]
});

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Convert rendered WordPress HTML into Markdown.
///
/// Empty input yields an empty string. Runs of three or more newlines are
/// collapsed to one blank line and the result is trimmed.
pub fn html_to_markdown(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let mut md = html.to_string();
    for rule in RULES.iter() {
        md = rule
            .pattern
            .replace_all(&md, rule.replacement)
            .into_owned();
    }

    EXCESS_NEWLINES
        .replace_all(&md, "\n\n")
        .trim()
        .to_string()
}
