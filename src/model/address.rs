//! Sender text helpers: pulling a mailbox out of free-form display text.

/// Find the first `local@domain.tld` mailbox inside `text` and return it lowercased.
///
/// Local and domain characters are ASCII alphanumerics, `_`, `.` and `-`;
/// the top-level label after the final dot is alphanumerics and `_` only.
/// If no mailbox is present the whole text is lowercased instead, so a row
/// showing only a display name still groups consistently.
///
/// # Examples
/// - `"Shop Deals <Promo@Shop.com>"` → `"promo@shop.com"`
/// - `"LinkedIn"` → `"linkedin"`
pub fn extract_email(text: &str) -> String {
    match find_mailbox(text) {
        Some((start, end)) => text[start..end].to_lowercase(),
        None => text.to_lowercase(),
    }
}

/// Display name part of a sender string: everything before `<`, trimmed.
///
/// Falls back to `fallback` (normally the sender email) when that part is empty.
pub fn display_name(sender: &str, fallback: &str) -> String {
    let name = sender.split('<').next().unwrap_or("").trim();
    let name = strip_quotes(name);
    if name.is_empty() {
        fallback.to_string()
    } else {
        name
    }
}

/// Byte range of the leftmost mailbox in `text`.
fn find_mailbox(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    for (at, _) in bytes.iter().enumerate().filter(|(_, &b)| b == b'@') {
        let mut start = at;
        while start > 0 && is_local_byte(bytes[start - 1]) {
            start -= 1;
        }
        if start == at {
            continue;
        }
        if let Some(end) = domain_end(bytes, at + 1) {
            return Some((start, end));
        }
    }
    None
}

/// End offset of a `domain.tld` run starting at `from`, if one exists.
///
/// The domain run is taken greedily, then shortened to the last dot that is
/// followed by at least one word character.
fn domain_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut run_end = from;
    while run_end < bytes.len() && is_local_byte(bytes[run_end]) {
        run_end += 1;
    }
    // Need at least one character before the dot.
    let dot = (from + 1..run_end)
        .rev()
        .find(|&i| bytes[i] == b'.' && i + 1 < run_end && is_word_byte(bytes[i + 1]))?;
    let mut end = dot + 1;
    while end < run_end && is_word_byte(bytes[end]) {
        end += 1;
    }
    Some(end)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_local_byte(b: u8) -> bool {
    is_word_byte(b) || b == b'.' || b == b'-'
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}
