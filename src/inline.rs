use crate::document::Run;

/// Split text into plain, bold and italic runs.
///
/// Scans left to right for `**text**` or `*text*` where `text` is non-empty
/// and contains no `*`. Bold is tried first at each position, so `**x**` is a
/// single bold run. Asterisks that do not close a span stay in the plain text.
pub fn resolve_emphasis(text: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let span = if text.as_bytes()[pos] == b'*' {
            match_span(text, pos)
        } else {
            None
        };
        match span {
            Some((run, end)) => {
                push_plain(&mut runs, &text[plain_start..pos]);
                runs.push(run);
                pos = end;
                plain_start = end;
            }
            None => pos += 1,
        }
    }
    push_plain(&mut runs, &text[plain_start..]);

    runs
}

/// Try to match an emphasis span starting at `start`, which holds a `*`.
/// Returns the run and the byte offset just past the closing delimiter.
fn match_span(text: &str, start: usize) -> Option<(Run, usize)> {
    let rest = &text[start..];

    if let Some(after) = rest.strip_prefix("**") {
        match after.find('*') {
            Some(len) if len > 0 && after[len..].starts_with("**") => {
                return Some((Run::Bold(after[..len].to_string()), start + len + 4));
            }
            _ => {}
        }
    }

    let after = rest.strip_prefix('*')?;
    let len = after.find('*')?;
    (len > 0).then(|| (Run::Italic(after[..len].to_string()), start + len + 2))
}

fn push_plain(runs: &mut Vec<Run>, text: &str) {
    if !text.is_empty() {
        runs.push(Run::Plain(text.to_string()));
    }
}
