//! Display-name sanitization applied before any name reaches the store.

/// Normalize a raw display name so it is safe to store and render.
///
/// Control characters are dropped, whitespace runs collapse to one space,
/// the result is trimmed, and `&`, `<`, `>` are HTML-escaped so markup is
/// stored as inert text. This is stricter than bleach's default clean, which
/// keeps an allow-list of tags such as `<b>` and `<i>`: here every tag is escaped.
pub fn sanitize_name(raw: &str) -> String {
    let visible: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect();

    let mut out = String::with_capacity(visible.len());
    for (i, word) in visible.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        for c in word.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(c),
            }
        }
    }
    out
}
