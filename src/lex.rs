// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ SPLIT SOURCE INTO FRAGMENTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The fixed entry-point declaration. Shader sources wrap their statements
/// in `void main() { ... }`; the wrapper carries no information and is
/// discarded during splitting.
const ENTRY_POINT: &str = "void main()";

/// A trimmed, non-empty statement candidate together with the 1-based
/// source line it came from.
///
/// Fragments are ephemeral: they are produced and consumed within one
/// compile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub line: usize,
}

/// Split raw source text into an ordered list of statement candidates.
///
/// Each line is trimmed and dropped if it is empty, a `//` comment, the
/// entry-point declaration or a bare structural brace. A trailing `;` is
/// stripped so downstream parsing works on a canonical unterminated form.
///
/// The split is strictly line-oriented: a construct spanning more than one
/// source line is parsed per line, not per statement.
pub fn split_statements(source: &str) -> Vec<Fragment> {
    let mut fragments = vec![];
    for (index, raw) in source.lines().enumerate() {
        let mut line = raw.trim();
        if line.is_empty()
            || line.starts_with("//")
            || line.starts_with(ENTRY_POINT)
            || line == "{"
            || line == "}"
        {
            continue;
        }
        if let Some(stripped) = line.strip_suffix(';') {
            line = stripped.trim_end();
        }
        fragments.push(Fragment {
            text: line.to_owned(),
            line: index + 1,
        });
    }
    fragments
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
