/// Replace `${ENV_VAR}` placeholders in config string values.
///
/// Unresolvable variables are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] but resolves variables through `lookup`.
pub fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 2..];
        let Some(close) = tail.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &tail[..close];
        match (!name.is_empty()).then(|| lookup(name)).flatten() {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[open..open + close + 3]),
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    out
}
