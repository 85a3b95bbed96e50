//! Text cleanup for free-form API fields.

/// Trims a text field and strips control characters.
///
/// CRLF and lone CR become LF. Every other control character except TAB
/// is removed, so the serializer only ever has to escape LF.
pub fn sanitize_text(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned: String = normalized
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    cleaned.trim().to_string()
}
