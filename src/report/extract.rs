//! src/report/extract.rs
use once_cell::sync::Lazy;
use regex::Regex;

static INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
        .expect("Invisible block pattern is a valid regex")
});

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|section|article|header|footer|table|ul|ol|title|head)\s*>")
        .expect("Line break pattern is a valid regex")
});

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z][a-zA-Z0-9]*);")
        .expect("Entity pattern is a valid regex")
});

/// Reduce an HTML document to the text a reader would see, one phrase per line.
pub fn html_to_text(html: &str) -> String {
    let visible = INVISIBLE.replace_all(html, "");
    let broken = LINE_BREAK.replace_all(&visible, "\n");
    let stripped = strip_tags(&broken);

    let decoded = decode_entities(&stripped);

    let phrases: Vec<&str> = decoded
        .lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect();
    phrases.join("\n")
}

// A `<` only opens a tag when markup follows it, so "BTC <60k" stays text.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut inside_tag = false;
    let mut chars = html.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '<' if !inside_tag && chars.peek().is_some_and(|&next| opens_tag(next)) => {
                inside_tag = true
            }
            '>' if inside_tag => inside_tag = false,
            _ if !inside_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn opens_tag(next: char) -> bool {
    next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?')
}

// Entities are decoded one at a time. Bare ampersands and unknown names pass through.
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            htmlescape::decode_html(&caps[0]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
