use std::borrow::Cow;

/// Checks whether at least one character of `chars` occurs in `value`.
pub fn one_of_in(chars: &str, value: &str) -> bool {
    chars.chars().any(|c| value.contains(c))
}

/// Splits `value` at every occurrence of every separator in `seps`.
/// Without separators, the string is split at runs of whitespace.
pub fn splits<'a>(value: &'a str, seps: &[&str]) -> Vec<&'a str> {
    let Some((first, rest)) = seps.split_first() else {
        return value.split_whitespace().collect();
    };
    let mut parts: Vec<&str> = value.split(first).collect();
    for sep in rest {
        parts = parts.into_iter().flat_map(|part| part.split(sep)).collect();
    }
    parts
}

/// Splits a list of names or values separated by commas and/or whitespace.
pub fn split_list(value: &str) -> Vec<&str> {
    splits(value, &[",", " ", "\t"])
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect()
}

/// Removes all ANSI color escape sequences (`ESC[...m`) from a string.
pub fn remove_ansi_colors(value: &str) -> Cow<'_, str> {
    if !value.contains("\x1b[") {
        return Cow::Borrowed(value);
    }
    let mut result = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("\x1b[") {
        match rest[start..].find('m') {
            Some(end) => {
                result.push_str(&rest[..start]);
                rest = &rest[start + end + 1..];
            }
            None => break,
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

/// Number of characters that are visible on a terminal.
pub fn visible_width(value: &str) -> usize {
    remove_ansi_colors(value).chars().count()
}

/// Truncates `value` to at most `length` characters.
pub fn truncate_chars(value: &str, length: usize) -> &str {
    match value.char_indices().nth(length) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
