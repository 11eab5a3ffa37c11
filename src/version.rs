//! Version ordering and install candidate selection
//!
//! Component identifiers look like `soda-9.0-1`, `dxvk-2.3` or
//! `ge-proton9-20`. Ordering reads every numeric run of an identifier: the
//! first three form a [`semver::Version`], further runs break ties, and the
//! full identifier breaks whatever tie is left. When any identifier of a set
//! carries no number at all the whole set falls back to reverse lexicographic
//! order instead of mixing both schemes.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::catalog::CatalogSection;
use crate::error::VersionError;

static NUMERIC_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

#[derive(Debug, PartialEq, Eq)]
struct VersionKey {
    core: Version,
    rest: Vec<u64>,
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.core
            .cmp(&other.core)
            .then_with(|| self.rest.cmp(&other.rest))
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn parse_version(identifier: &str) -> Option<VersionKey> {
    let mut runs = Vec::new();
    for m in NUMERIC_RUN.find_iter(identifier) {
        runs.push(m.as_str().parse::<u64>().ok()?);
    }
    if runs.is_empty() {
        return None;
    }

    let part = |i: usize| runs.get(i).copied().unwrap_or(0);
    let core = Version::new(part(0), part(1), part(2));
    let rest = runs.iter().skip(3).copied().collect();
    Some(VersionKey { core, rest })
}

/// Order identifiers newest first.
pub fn sort_descending<S: AsRef<str>>(identifiers: &[S]) -> Vec<String> {
    let keyed: Option<Vec<(VersionKey, String)>> = identifiers
        .iter()
        .map(|id| parse_version(id.as_ref()).map(|key| (key, id.as_ref().to_string())))
        .collect();

    match keyed {
        Some(mut keyed) => {
            keyed.sort_by(|(ka, a), (kb, b)| kb.cmp(ka).then_with(|| b.cmp(a)));
            keyed.into_iter().map(|(_, id)| id).collect()
        }
        None => {
            let mut plain: Vec<String> =
                identifiers.iter().map(|id| id.as_ref().to_string()).collect();
            plain.sort_by(|a, b| b.cmp(a));
            plain
        }
    }
}

/// Newest identifier of a set, if any
pub fn latest<S: AsRef<str>>(identifiers: &[S]) -> Option<String> {
    sort_descending(identifiers).into_iter().next()
}

/// Pick the identifier to install from a catalog section.
///
/// Sections are scanned in their declared order. Without `allow_unstable`
/// the first entry that is not `rc`/`unstable` wins, otherwise the first
/// entry wins regardless of channel.
pub fn select_candidate(
    section: &CatalogSection,
    allow_unstable: bool,
) -> Result<&str, VersionError> {
    section
        .iter()
        .find(|entry| allow_unstable || !entry.channel.is_prerelease())
        .map(|entry| entry.identifier.as_str())
        .ok_or(VersionError::NoCandidateAvailable)
}

/// True when `candidate` orders strictly ahead of `current`
pub fn is_newer(candidate: &str, current: &str) -> bool {
    if candidate == current {
        return false;
    }
    sort_descending(&[candidate, current])
        .first()
        .is_some_and(|first| first == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Channel;

    #[test]
    fn numeric_ordering_beats_lexicographic() {
        let sorted = sort_descending(&["ge-proton9-3", "ge-proton9-20", "ge-proton8-32"]);
        assert_eq!(sorted, vec!["ge-proton9-20", "ge-proton9-3", "ge-proton8-32"]);
    }

    #[test]
    fn dotted_versions_sort_newest_first() {
        let sorted = sort_descending(&["dxvk-1.10.3", "dxvk-2.3", "dxvk-1.9"]);
        assert_eq!(sorted, vec!["dxvk-2.3", "dxvk-1.10.3", "dxvk-1.9"]);
    }

    #[test]
    fn unparseable_member_degrades_whole_set() {
        let sorted = sort_descending(&["b-2.0", "custom", "a-10.0"]);
        assert_eq!(sorted, vec!["custom", "b-2.0", "a-10.0"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let inputs: Vec<Vec<&str>> = vec![
            vec!["soda-7.0-9", "caffe-7.20", "soda-7.0-10", "lutris-GE-Proton8-26"],
            vec!["lutris-x", "soda-y", "sys-wine-1", "caffe-z"],
            vec!["runtime-0.5", "runtime-0.5", "runtime-0.4.1"],
            vec![],
        ];
        for input in inputs {
            let once = sort_descending(&input);
            assert_eq!(sort_descending(&once), once);
        }
    }

    #[test]
    fn stable_candidate_skips_prerelease() {
        let section = CatalogSection::from_entries([
            ("soda-9.0-rc2", Channel::Rc),
            ("soda-8.0-2", Channel::Stable),
        ]);
        assert_eq!(select_candidate(&section, false), Ok("soda-8.0-2"));
        assert_eq!(select_candidate(&section, true), Ok("soda-9.0-rc2"));
    }

    #[test]
    fn first_declared_entry_wins() {
        let section = CatalogSection::from_entries([("A", Channel::Stable), ("B", Channel::Rc)]);
        assert_eq!(select_candidate(&section, false), Ok("A"));
        assert_eq!(select_candidate(&section, true), Ok("A"));
    }

    #[test]
    fn no_candidate_when_empty_or_filtered_out() {
        let empty = CatalogSection::default();
        assert_eq!(
            select_candidate(&empty, true),
            Err(VersionError::NoCandidateAvailable)
        );

        let only_unstable = CatalogSection::from_entries([("x-1.0", Channel::Unstable)]);
        assert_eq!(
            select_candidate(&only_unstable, false),
            Err(VersionError::NoCandidateAvailable)
        );
    }

    #[test]
    fn newer_bridge_is_detected() {
        assert!(is_newer("winebridge-1.1", "winebridge-1.0"));
        assert!(!is_newer("winebridge-1.0", "winebridge-1.1"));
        assert!(!is_newer("winebridge-1.1", "winebridge-1.1"));
    }

    #[test]
    fn latest_of_empty_set_is_none() {
        assert_eq!(latest::<&str>(&[]), None);
        assert_eq!(latest(&["vkd3d-2.11", "vkd3d-2.12"]).as_deref(), Some("vkd3d-2.12"));
    }
}
