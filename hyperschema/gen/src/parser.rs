//! Path template helpers.
//!
//! Action paths use `{param}` placeholders. The schema builder needs the
//! placeholder names to check them against declared parameters, and joins
//! API, resource and action paths into link hrefs.

/// Extracts parameter names from a path template.
///
/// ## Examples
///
/// ```
/// use hyperschema_gen::parser::extract_path_params;
///
/// assert_eq!(extract_path_params("/bottles"), vec![] as Vec<&str>);
/// assert_eq!(extract_path_params("/bottles/{bottleID}"), vec!["bottleID"]);
/// assert_eq!(
///     extract_path_params("/accounts/{accountID}/bottles/{bottleID}"),
///     vec!["accountID", "bottleID"]
/// );
/// ```
pub fn extract_path_params(path: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = None;

    for (idx, c) in path.char_indices() {
        match c {
            '{' => start = Some(idx + 1),
            '}' => {
                if let Some(pos) = start.take() {
                    let param = &path[pos..idx];
                    if !param.is_empty() {
                        params.push(param);
                    }
                }
            }
            _ => {}
        }
    }

    params
}

/// Joins path segments with exactly one `/` between them.
///
/// Empty segments are skipped. The result always starts with `/`, and a
/// trailing slash is dropped unless the result is the root.
///
/// ## Examples
///
/// ```
/// use hyperschema_gen::parser::join_paths;
///
/// assert_eq!(join_paths(&["/cellar", "/accounts/", "/{id}"]), "/cellar/accounts/{id}");
/// assert_eq!(join_paths(&["", "bottles", ""]), "/bottles");
/// assert_eq!(join_paths(&["", ""]), "/");
/// ```
pub fn join_paths(segments: &[&str]) -> String {
    let joined = segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    format!("/{}", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_no_params() {
        assert_eq!(extract_path_params("/bottles"), Vec::<&str>::new());
        assert_eq!(extract_path_params("/"), Vec::<&str>::new());
        assert_eq!(extract_path_params(""), Vec::<&str>::new());
    }

    #[test]
    fn extract_consecutive_params() {
        assert_eq!(extract_path_params("/{a}/{b}"), vec!["a", "b"]);
    }

    #[test]
    fn extract_ignores_empty_and_unbalanced_braces() {
        assert_eq!(extract_path_params("/{}/x"), Vec::<&str>::new());
        assert_eq!(extract_path_params("/x}/{y"), Vec::<&str>::new());
        assert_eq!(extract_path_params("/{{a}"), vec!["a"]);
    }

    #[test]
    fn join_collapses_slashes() {
        assert_eq!(join_paths(&["/api/", "//v1/", "items"]), "/api/v1/items");
    }

    #[test]
    fn join_of_nothing_is_root() {
        assert_eq!(join_paths(&[]), "/");
    }
}
