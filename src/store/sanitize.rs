const FENCE: &str = "```";

/// Strips the formatting artifacts language models wrap around SQL: code
/// fences, a dialect tag on its own line, and a leading `SQL:` label.
///
/// Text without artifacts is returned trimmed but otherwise untouched.
pub fn sanitize_generated_sql(text: &str) -> String {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        body = match rest.split_once('\n') {
            Some((tag, after)) if tag.trim().is_empty() || is_dialect_tag(tag) => after,
            _ => rest,
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix(FENCE) {
        body = rest;
    }
    body = body.trim();

    if let Some((first, after)) = body.split_once('\n') {
        if is_dialect_tag(first) {
            body = after.trim();
        }
    } else if is_dialect_tag(body) {
        body = "";
    }

    body = strip_dialect_prefix(body);
    body.trim().to_string()
}

fn is_dialect_tag(s: &str) -> bool {
    matches!(
        s.trim().trim_end_matches(':').to_ascii_lowercase().as_str(),
        "sql" | "sqlite" | "sqlite3"
    )
}

/// Drops a leading `sql` / `SQL:` word glued to the statement itself.
fn strip_dialect_prefix(body: &str) -> &str {
    let mut parts = body.splitn(2, char::is_whitespace);
    match (parts.next(), parts.next()) {
        (Some(word), Some(rest)) if is_dialect_tag(word) && !rest.trim().is_empty() => rest.trim_start(),
        _ => body,
    }
}
