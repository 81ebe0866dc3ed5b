use log::warn;

use crate::section::Section;

/// Replace every `%name%` in `value` with the value of `name` in `strings`, recursively.
///
/// Unknown names (or a missing `strings` section) expand to nothing. A name that is already
/// being expanded further up the chain is left as its literal `%name%` text.
pub fn expand_vars(value: &str, strings: Option<&Section>) -> String {
    let mut chain = Vec::new();
    expand(value, strings, &mut chain)
}

fn expand<'s>(value: &str, strings: Option<&'s Section>, chain: &mut Vec<&'s str>) -> String {
    let mut result = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('%') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        // A %strkey% never spans a line break.
        let Some(end) = after.find(['%', '\n']).filter(|&i| after[i..].starts_with('%')) else {
            result.push('%');
            rest = after;
            continue;
        };

        let var = &after[..end];
        rest = &after[end + 1..];

        let Some((key, replacement)) = strings.and_then(|s| s.get_key_value(var)) else {
            continue;
        };

        if chain.contains(&key) {
            warn!("placeholder cycle through %{var}%; leaving it unexpanded");
            result.push('%');
            result.push_str(var);
            result.push('%');
            continue;
        }

        chain.push(key);
        result.push_str(&expand(replacement, strings, chain));
        chain.pop();
    }

    result.push_str(rest);
    result
}
