use std::collections::BTreeMap;

/// Expands `$NAME` and `${NAME}` references. Unknown names are left as written.
pub fn expand_vars<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                if is_var_name(name) {
                    match lookup(name) {
                        Some(found) => out.push_str(&found),
                        None => out.push_str(&rest[pos..pos + end + 3]),
                    }
                    rest = &braced[end + 1..];
                    continue;
                }
            }
            out.push('$');
            rest = after;
            continue;
        }

        let name_len = after
            .char_indices()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_'))
            .map(|(idx, _)| idx)
            .unwrap_or(after.len());
        if name_len == 0 {
            out.push('$');
            rest = after;
            continue;
        }
        let name = &after[..name_len];
        match lookup(name) {
            Some(found) => out.push_str(&found),
            None => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[name_len..];
    }

    out.push_str(rest);
    out
}

fn is_var_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Overlays `overlay` onto `ambient`. Overlay values are expanded against the
/// ambient environment first, so `PATH: "$PATH:/opt/bin"` extends the inherited value.
pub fn merge_environment<I>(ambient: I, overlay: &BTreeMap<String, String>) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut merged: BTreeMap<String, String> = ambient.into_iter().collect();
    let expanded: Vec<(String, String)> = overlay
        .iter()
        .map(|(key, value)| {
            let value = expand_vars(value, |name| merged.get(name).cloned());
            (key.clone(), value)
        })
        .collect();
    merged.extend(expanded);
    merged
}
