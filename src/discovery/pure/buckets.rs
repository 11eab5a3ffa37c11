//! Runner priority bucketing

/// Managed runner families, highest priority first
pub const RUNNER_FAMILIES: [&str; 4] = ["soda", "caffe", "vaniglia", "lutris"];

/// Prefix given to the system-provided wine build
pub const SYSTEM_RUNNER_PREFIX: &str = "sys-";

/// Group runner identifiers into priority buckets
///
/// Order is: the four managed families, then everything else, then system
/// builds last. Relative order inside a bucket is preserved, so callers
/// pass an already version-sorted list.
pub fn group_runners(runners: Vec<String>) -> Vec<String> {
    let mut families: Vec<Vec<String>> = vec![Vec::new(); RUNNER_FAMILIES.len()];
    let mut others = Vec::new();
    let mut system = Vec::new();

    for runner in runners {
        if runner.starts_with(SYSTEM_RUNNER_PREFIX) {
            system.push(runner);
            continue;
        }
        match RUNNER_FAMILIES.iter().position(|f| runner.starts_with(f)) {
            Some(idx) => families[idx].push(runner),
            None => others.push(runner),
        }
    }

    families
        .into_iter()
        .flatten()
        .chain(others)
        .chain(system)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn families_come_first_system_last() {
        let grouped = group_runners(strings(&["lutris-x", "soda-y", "sys-wine-1", "caffe-z"]));
        assert_eq!(grouped, strings(&["soda-y", "caffe-z", "lutris-x", "sys-wine-1"]));
    }

    #[test]
    fn unknown_families_land_between() {
        let grouped = group_runners(strings(&[
            "sys-wine-9.0",
            "ge-proton9-20",
            "vaniglia-7.22",
            "kron4ek-9.1",
        ]));
        assert_eq!(
            grouped,
            strings(&["vaniglia-7.22", "ge-proton9-20", "kron4ek-9.1", "sys-wine-9.0"])
        );
    }

    #[test]
    fn order_within_bucket_is_kept() {
        let grouped = group_runners(strings(&["soda-9.0-1", "soda-7.0-9", "caffe-8.0"]));
        assert_eq!(grouped, strings(&["soda-9.0-1", "soda-7.0-9", "caffe-8.0"]));
    }
}
