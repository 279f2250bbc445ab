const STRIPPED: [char; 11] = ['“', '”', '’', '‘', '…', '"', '\'', '(', ')', '«', '»'];

/// Lowercased text with collapsed whitespace and quotes removed, used for
/// phrase matching.
pub fn normalize(text: &str) -> String {
    let mut s = text.to_lowercase();

    // quotes go first so the spaces they padded collapse too
    s.retain(|ch| !STRIPPED.contains(&ch));

    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
