//! src/report/tone.rs
use once_cell::sync::Lazy;
use regex::Regex;

// Longer phrases come before the words they contain.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("spill the tea", "provide details"),
    ("vibe check", "Market Assessment"),
    ("it's giving", "indicating"),
    ("that's facts", ""),
    ("stay woke", ""),
    ("no cap", ""),
    ("periodt", ""),
    ("bestie", ""),
    ("lowkey", ""),
    ("highkey", ""),
    ("fr fr", ""),
    ("slay", "perform well"),
    ("fire", "strong"),
    ("lit", "active"),
    ("tea", "information"),
];

static SLANG: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    REPLACEMENTS
        .iter()
        .map(|(slang, professional)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(slang));
            let regex = Regex::new(&pattern).expect("Slang pattern is a valid regex");
            (regex, *professional)
        })
        .collect()
});

static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}", // emoticons
        r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
        r"\x{1F680}-\x{1F6FF}", // transport & map
        r"\x{1F900}-\x{1F9FF}", // supplemental symbols
        r"\x{1F1E0}-\x{1F1FF}", // flags
        r"\x{2600}-\x{26FF}",   // misc symbols
        r"\x{2702}-\x{27B0}",   // dingbats
        r"\x{FE0F}",
        "]+"
    ))
    .expect("Emoji pattern is a valid regex")
});

/// Rewrite casual report copy into the register of a client letter.
pub fn professional(text: &str) -> String {
    let mut text = text.to_string();
    for (slang, replacement) in SLANG.iter() {
        text = slang.replace_all(&text, *replacement).into_owned();
    }

    EMOJI.replace_all(&text, "").into_owned()
}
