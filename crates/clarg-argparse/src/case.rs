/// `dry-run`, `dry_run` and `--dry-run` all become `dryRun`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let words = name
        .trim_start_matches('-')
        .split(['-', '_'])
        .filter(|w| !w.is_empty());

    for (i, word) in words.enumerate() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if i == 0 {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(chars.as_str());
    }
    out
}
