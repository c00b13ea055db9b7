//! Path segment sanitization for the output tree.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Make one decoded URL path segment safe as a file or directory name.
///
/// - Replaces NUL, `/`, `\` and control characters with `_`
/// - Maps the reserved names `.` and `..` to `_`
/// - Limits length to 255 bytes on a char boundary
///
/// Dots and spaces are kept so `.well-known` and `my file.pdf` survive.
pub fn sanitize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c == '\0' || c == '/' || c == '\\' || c.is_control() {
            out.push('_');
        } else {
            out.push(c);
        }
    }

    if out.is_empty() || out == "." || out == ".." {
        return "_".to_string();
    }

    if out.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !out.is_char_boundary(take) {
            take -= 1;
        }
        out.truncate(take);
    }
    out
}
