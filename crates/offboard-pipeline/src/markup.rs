use std::sync::OnceLock;

use regex::Regex;

fn mailto_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[([^\[\]|]*)\|mailto:[^\[\]]*\]").expect("mailto link regex compiles")
    })
}

/// Replaces Jira wiki mailto links (`[display|mailto:address]`) with their
/// display text. Applied until no link remains, so the result is a fixpoint.
pub fn normalize_markup(text: &str) -> String {
    let re = mailto_link_regex();
    let mut current = text.to_string();
    while re.is_match(&current) {
        current = re.replace_all(&current, "$1").into_owned();
    }
    current
}
