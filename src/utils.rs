//! Small filesystem helpers shared by the runner.

use std::path::Path;

use tokio::fs;

use crate::error::ScanError;

pub async fn ensure_dir(path: &Path) -> Result<(), ScanError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| ScanError::InputInvalid(format!("failed to create directory {path:?}: {e}")))
}

/// Deduplicates a list of strings by an arbitrary key, preserving first-seen
/// order. Used for both URL-signature and payload-line dedup (§6.1).
pub fn dedup_preserve_order<T, F, K>(items: Vec<T>, key_fn: F) -> Vec<T>
where
    F: Fn(&T) -> K,
    K: std::hash::Hash + Eq,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key_fn(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let items = vec!["a", "b", "a", "c", "b"];
        let deduped = dedup_preserve_order(items, |s| s.to_string());
        assert_eq!(deduped, vec!["a", "b", "c"]);
    }
}
