//! Removal of WordPress block-editor comment markers.
//!
//! The block editor wraps every block in comments such as
//! `<!-- wp:paragraph -->` and `<!-- /wp:paragraph -->`, sometimes with JSON
//! attributes (`<!-- wp:heading {"level":3} -->`). They carry no meaning for
//! the destination and are removed.
//!
//! Anything mentioning `more` is kept: the `<!-- more -->` page break, the
//! spaceless `<!--more-->` form, and the `<!-- wp:more -->` block around it.

const OPEN: &str = "<!-- ";
const CLOSE: &str = " -->";
const PAGE_BREAK: &str = "more";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Copying text until the next `<!-- `.
    Text,
    /// Positioned on a `<!-- `; decide whether it opens a removable marker.
    Marker,
}

/// Removes block-editor comment markers from `input`.
///
/// A marker is `<!-- `, a non-blank body on a single line, then ` -->`.
/// Markers whose body contains `more` are left in place. A line left blank
/// by removal is dropped with its newline; otherwise only the whitespace the
/// markers were padded with is trimmed. All other text is copied through
/// unchanged and in order.
///
/// # Example
///
/// ```rust
/// use wpimport_core::markers::strip_block_markers;
///
/// let md = "<!-- wp:paragraph -->\nHello\n<!-- /wp:paragraph -->\n<!-- more -->";
/// assert_eq!(strip_block_markers(md), "Hello\n<!-- more -->");
/// ```
pub fn strip_block_markers(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for line in input.split_inclusive('\n') {
        strip_line(line, &mut output);
    }
    output
}

/// True when `body`, the text between `<!--` and `-->`, makes the comment a
/// removable marker.
///
/// Used on comment nodes before conversion and by [`strip_block_markers`].
pub(crate) fn is_marker_comment(body: &str) -> bool {
    body.strip_prefix(' ')
        .and_then(|body| body.strip_suffix(' '))
        .is_some_and(is_marker_body)
}

fn is_marker_body(body: &str) -> bool {
    !body.trim().is_empty() && !body.contains('\n') && !body.contains(PAGE_BREAK)
}

fn strip_line(line: &str, output: &mut String) {
    let (content, newline) = match line.strip_suffix('\n') {
        Some(content) => (content, "\n"),
        None => (line, ""),
    };

    let mut kept = String::with_capacity(content.len());
    let mut state = State::Text;
    let mut pos = 0;
    let mut removed = false;
    let mut leading = false;

    loop {
        match state {
            State::Text => match content[pos..].find(OPEN) {
                Some(offset) => {
                    kept.push_str(&content[pos..pos + offset]);
                    pos += offset;
                    state = State::Marker;
                }
                None => {
                    kept.push_str(&content[pos..]);
                    break;
                }
            },
            State::Marker => {
                match marker_len(&content[pos..]) {
                    Some(len) => {
                        leading |= kept.trim().is_empty();
                        removed = true;
                        pos += len;
                    }
                    None => {
                        kept.push_str(OPEN);
                        pos += OPEN.len();
                    }
                }
                state = State::Text;
            }
        }
    }

    if !removed {
        output.push_str(line);
        return;
    }
    if kept.trim().is_empty() {
        return;
    }

    let kept = if leading { kept.trim_start() } else { kept.as_str() };
    output.push_str(kept.trim_end());
    output.push_str(newline);
}

/// Length of the removable marker at the start of `candidate`, if any.
///
/// `candidate` is a single line starting with [`OPEN`].
fn marker_len(candidate: &str) -> Option<usize> {
    let rest = &candidate[OPEN.len()..];
    let body_len = rest.find(CLOSE)?;

    is_marker_body(&rest[..body_len]).then_some(OPEN.len() + body_len + CLOSE.len())
}
