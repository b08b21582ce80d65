//! String list helpers

/// Split around runs of whitespace
pub fn fields(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

/// Items prefixed by `optional` when it is non-empty
///
/// Useful for optional wrapper programs: `wrap(&launcher, ["cc", "-c"])`.
pub fn wrap<I, S>(optional: &str, items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = Vec::new();
    if !optional.is_empty() {
        out.push(optional.to_string());
    }
    out.extend(items.into_iter().map(Into::into));
    out
}
