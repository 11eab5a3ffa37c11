//! Locally present but remotely unknown components

use crate::catalog::CatalogSection;

/// Identifiers installed locally that the catalog does not know about
///
/// Keeps the installed order and drops duplicates.
pub fn offline_identifiers(installed: &[String], supported: &CatalogSection) -> Vec<String> {
    let mut offline: Vec<String> = Vec::new();
    for identifier in installed {
        if supported.contains(identifier) || offline.contains(identifier) {
            continue;
        }
        offline.push(identifier.clone());
    }
    offline
}
