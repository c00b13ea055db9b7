//! Relative references between files of the site tree.

/// Reference from the file `from` to the file `to`, both `/`-separated paths
/// relative to the site root. Each segment is percent-encoded so the result
/// is a valid relative URL.
pub fn relative_path(from: &str, to: &str) -> String {
    let from_dirs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let from_dirs = &from_dirs[..from_dirs.len().saturating_sub(1)];
    let to_parts: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let (to_file, to_dirs) = match to_parts.split_last() {
        Some((file, dirs)) => (*file, dirs),
        None => return String::from("./"),
    };

    let common = from_dirs
        .iter()
        .zip(to_dirs.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = String::new();
    for _ in common..from_dirs.len() {
        out.push_str("../");
    }
    for dir in &to_dirs[common..] {
        out.push_str(&urlencoding::encode(dir));
        out.push('/');
    }
    out.push_str(&urlencoding::encode(to_file));
    out
}
