//! Reconciling the host-alias file with the virtual hosts in the managed file.
//!
//! Only names ending in the configured domain suffix take part. Both sides
//! are reduced to sorted, deduplicated, lowercase lists before comparing.

use std::collections::BTreeSet;
use std::path::Path;

use log::info;

use crate::directive::Grammar;
use crate::error::Result;
use crate::rewrite;

/// Names present on one side only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostDiff {
    /// Virtual hosts with no host-alias entry.
    pub missing_from_hosts: Vec<String>,
    /// Host aliases with no virtual host.
    pub missing_from_vhosts: Vec<String>,
}

impl HostDiff {
    pub fn is_empty(&self) -> bool {
        self.missing_from_hosts.is_empty() && self.missing_from_vhosts.is_empty()
    }
}

/// Compare two name lists with a two-pointer merge.
///
/// Both lists must be sorted and free of duplicates; only then does the
/// result equal their symmetric difference.
pub fn diff(hosts: &[String], vhosts: &[String]) -> HostDiff {
    debug_assert!(is_canonical(hosts), "hosts list must be sorted and unique");
    debug_assert!(is_canonical(vhosts), "vhosts list must be sorted and unique");

    let mut result = HostDiff::default();
    let (mut h, mut v) = (0, 0);
    while h < hosts.len() && v < vhosts.len() {
        match hosts[h].cmp(&vhosts[v]) {
            std::cmp::Ordering::Equal => {
                h += 1;
                v += 1;
            }
            std::cmp::Ordering::Less => {
                result.missing_from_vhosts.push(hosts[h].clone());
                h += 1;
            }
            std::cmp::Ordering::Greater => {
                result.missing_from_hosts.push(vhosts[v].clone());
                v += 1;
            }
        }
    }
    result.missing_from_vhosts.extend_from_slice(&hosts[h..]);
    result.missing_from_hosts.extend_from_slice(&vhosts[v..]);
    result
}

fn is_canonical(names: &[String]) -> bool {
    names.windows(2).all(|pair| pair[0] < pair[1])
}

/// Names under `domain` in host-alias file text (`<ip> <name>...` lines).
pub fn host_names(contents: &str, domain: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for line in contents.lines() {
        let line = line.split('#').next().unwrap_or_default();
        names.extend(
            line.split_whitespace()
                .skip(1)
                .map(str::to_lowercase)
                .filter(|name| has_suffix(name, domain)),
        );
    }
    names.into_iter().collect()
}

/// Names under `domain` from the `ServerName` lines of a config file.
pub fn vhost_names(grammar: &Grammar, contents: &str, domain: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| grammar.server_name(line))
        .map(|name| name.to_lowercase())
        .filter(|name| has_suffix(name, domain))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn has_suffix(name: &str, domain: &str) -> bool {
    name.len() > domain.len() && name.ends_with(domain)
}

/// Append an `<ip> <name>` line for every name the file does not already
/// alias. Returns how many lines were added.
pub fn merge(path: &Path, ip: &str, names: &[String]) -> Result<usize> {
    let mut added = 0;
    rewrite::with_locked_contents(path, |contents| {
        let present: BTreeSet<String> = contents
            .lines()
            .flat_map(|line| {
                line.split('#')
                    .next()
                    .unwrap_or_default()
                    .split_whitespace()
                    .skip(1)
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut updated = contents.to_string();
        added = 0;
        for name in names {
            if !present.contains(&name.to_lowercase()) {
                updated = rewrite::appended(&updated, &format!("{ip} {name}"));
                added += 1;
            }
        }
        Ok((added > 0).then_some(updated))
    })?;

    if added > 0 {
        info!("Added {} host alias(es) to {}", added, path.display());
    }
    Ok(added)
}

/// Make sure `name` resolves to `ip` through the host-alias file. Returns
/// whether a line was added.
pub fn ensure_alias(path: &Path, ip: &str, name: &str) -> Result<bool> {
    Ok(merge(path, ip, &[name.to_string()])? > 0)
}
