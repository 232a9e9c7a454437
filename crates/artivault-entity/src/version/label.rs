//! `major.minor` version labels.

/// Label of the first version of every file.
pub const INITIAL_LABEL: &str = "1.0";

/// Compute the label that follows `latest`.
///
/// `"1.4"` becomes `"1.5"`; a bare major like `"2"` becomes `"2.1"`. Only
/// the first two dot-separated parts are read. Anything that does not parse
/// gets `".1"` appended, so `"abc"` becomes `"abc.1"`. With no previous
/// version the result is [`INITIAL_LABEL`].
pub fn next_label(latest: Option<&str>) -> String {
    let Some(latest) = latest else {
        return INITIAL_LABEL.to_string();
    };
    parse_major_minor(latest)
        .and_then(|(major, minor)| minor.checked_add(1).map(|next| format!("{major}.{next}")))
        .unwrap_or_else(|| format!("{latest}.1"))
}

fn parse_major_minor(label: &str) -> Option<(i64, i64)> {
    let mut parts = label.split('.');
    let major = parts.next()?.trim().parse::<i64>().ok()?;
    let minor = match parts.next() {
        Some(minor) => minor.trim().parse::<i64>().ok()?,
        None => 0,
    };
    Some((major, minor))
}
