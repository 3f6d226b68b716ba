//! Clause rewriting ahead of parsing.

const DATE_TOKEN: &str = " DATE ";

/// Rewrite `DATE '<literal>'` into `DATE('<literal>')` so the SQL parser
/// reads it as an ordinary function call.
///
/// The search is case-insensitive and restarts on the rewritten string
/// after every replacement. Each rewrite removes one ` DATE ` occurrence
/// and cannot create another, so the loop always ends. An occurrence with
/// fewer than two quotes after it stops the rewriting.
pub fn standardize(clause: &str) -> String {
    let mut out = clause.to_string();

    // ASCII upper-casing keeps byte offsets aligned with `out`
    while let Some(idx) = out.to_ascii_uppercase().find(DATE_TOKEN) {
        let after = idx + DATE_TOKEN.len();
        let Some(open) = out[after..].find('\'').map(|i| after + i) else {
            break;
        };
        let Some(close) = out[open + 1..].find('\'').map(|i| open + 1 + i) else {
            break;
        };

        out = format!(
            "{} DATE({}){}",
            &out[..idx],
            &out[open..=close],
            &out[close + 1..]
        );
    }

    out
}
