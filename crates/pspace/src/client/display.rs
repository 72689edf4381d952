/// Resolves the `--display` option of `info` and `list` into the final list
/// of column characters.
///
/// A plain string replaces `default`. Characters following a `+` are added
/// and characters following a `-` are removed. If the option starts with `+`
/// or `-`, the changes apply to `default`.
pub fn resolve_display(option: &str, default: &str, allowed: &str) -> anyhow::Result<String> {
    let mut display = if option.contains(['+', '-']) {
        if option.starts_with(['+', '-']) {
            default.to_string()
        } else {
            String::new()
        }
    } else {
        option.to_string()
    };

    if option.contains(['+', '-']) {
        let mut removing = false;
        for c in option.chars() {
            match c {
                '+' => removing = false,
                '-' => removing = true,
                c if removing => display.retain(|d| d != c),
                c => display.push(c),
            }
        }
    }

    if let Some(c) = display.chars().find(|c| !allowed.contains(*c)) {
        anyhow::bail!("unknown character \"{c}\" in --display");
    }
    Ok(display)
}
