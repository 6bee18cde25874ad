use std::path::{Component, Path, PathBuf};

/// Keeps only the plain name components of a user-supplied path, so the result
/// is always relative and never climbs out of its base. Backslashes count as
/// separators.
pub fn sanitize_input(input: &str) -> PathBuf {
    let unified = input.replace('\\', "/");
    Path::new(&unified)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Resolves a user-supplied file name inside the local working directory.
pub fn resolve_local_path(local_dir: &Path, name: &str) -> PathBuf {
    local_dir.join(sanitize_input(name))
}

/// Hides the password of a `PASS` command for logging.
pub fn mask_command(command: &str) -> String {
    match command.split_once(' ') {
        Some((verb, _)) if verb.eq_ignore_ascii_case("PASS") => format!("{} ****", verb),
        _ => command.to_string(),
    }
}
