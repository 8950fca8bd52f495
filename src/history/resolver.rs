//! Historical-name to current-name mapping.
//!
//! Renames are recorded as `old -> target` aliases where `target` is always a terminal name (one
//! with no alias of its own), so the table never contains a cycle. Lookups through longer chains
//! are compressed in place.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct RenameResolver {
    aliases: HashMap<String, String>,
    probes: usize,
}

impl RenameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow `name` to the path it is known by today.
    pub fn resolve(&mut self, name: &str) -> String {
        let mut chain: Vec<String> = Vec::new();
        let mut current = name.to_string();
        loop {
            self.probes += 1;
            match self.aliases.get(&current) {
                Some(next) if *next != current && chain.len() <= self.aliases.len() => {
                    chain.push(std::mem::replace(&mut current, next.clone()));
                }
                _ => break,
            }
        }

        // Every name on the chain except the last hop now points straight at the terminal.
        if chain.len() > 1 {
            for interior in &chain[..chain.len() - 1] {
                if let Some(slot) = self.aliases.get_mut(interior) {
                    slot.clone_from(&current);
                }
            }
        }
        current
    }

    /// Record a rename observed in history.
    ///
    /// The alias is only kept when the new name leads to a path accepted by `is_interesting`;
    /// the old name itself does not need to be of interest because older history may still
    /// mention it. Returns the resolved target when the alias was recorded.
    pub fn record_rename<F>(&mut self, old: &str, new: &str, is_interesting: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        let target = self.resolve(new);
        if !is_interesting(&target) {
            return None;
        }
        if old != target {
            self.aliases.insert(old.to_string(), target.clone());
        }
        Some(target)
    }

    /// Convenience form of [`record_rename`](Self::record_rename) over a fixed interest set.
    pub fn record_rename_in(
        &mut self,
        old: &str,
        new: &str,
        interest: &HashSet<String>,
    ) -> Option<String> {
        self.record_rename(old, new, |p| interest.contains(p))
    }

    /// Number of historical names with an alias.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Alias-table lookups performed so far.
    pub fn probes(&self) -> usize {
        self.probes
    }

    #[cfg(test)]
    fn insert_raw(&mut self, old: &str, new: &str) {
        self.aliases.insert(old.to_string(), new.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interest(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn unknown_names_resolve_to_themselves() {
        let mut resolver = RenameResolver::new();
        assert_eq!(resolver.resolve("a.md"), "a.md");
        assert!(resolver.is_empty());
    }

    #[test]
    fn rename_chain_resolves_to_current_name() {
        let set = interest(&["c.md"]);
        let mut resolver = RenameResolver::new();
        // Newest first: b -> c, then a -> b, then x -> a.
        assert_eq!(resolver.record_rename_in("b.md", "c.md", &set).as_deref(), Some("c.md"));
        assert_eq!(resolver.record_rename_in("a.md", "b.md", &set).as_deref(), Some("c.md"));
        assert_eq!(resolver.record_rename_in("x.md", "a.md", &set).as_deref(), Some("c.md"));
        assert_eq!(resolver.resolve("x.md"), "c.md");
        assert_eq!(resolver.resolve("a.md"), "c.md");
    }

    #[test]
    fn renames_toward_uninteresting_paths_are_dropped() {
        let set = interest(&["keep.md"]);
        let mut resolver = RenameResolver::new();
        assert!(resolver.record_rename_in("old.md", "gone.md", &set).is_none());
        assert_eq!(resolver.resolve("old.md"), "old.md");
    }

    #[test]
    fn rename_back_to_current_name_adds_no_self_alias() {
        let set = interest(&["b.md"]);
        let mut resolver = RenameResolver::new();
        resolver.record_rename_in("a.md", "b.md", &set);
        // Older history: b was renamed to a, i.e. the file returned to its first name.
        assert_eq!(resolver.record_rename_in("b.md", "a.md", &set).as_deref(), Some("b.md"));
        assert_eq!(resolver.resolve("b.md"), "b.md");
        assert_eq!(resolver.resolve("a.md"), "b.md");
    }

    #[test]
    fn path_compression_makes_interior_lookups_single_probe() {
        let mut resolver = RenameResolver::new();
        // A long chain n0 -> n1 -> ... -> n9 built directly, bypassing the terminal rule.
        for i in 0..9 {
            resolver.insert_raw(&format!("n{i}"), &format!("n{}", i + 1));
        }

        let before = resolver.probes();
        assert_eq!(resolver.resolve("n0"), "n9");
        assert_eq!(resolver.probes() - before, 10);

        for i in 1..9 {
            let before = resolver.probes();
            assert_eq!(resolver.resolve(&format!("n{i}")), "n9");
            // One probe to find the terminal alias, one to confirm the terminal has none.
            assert_eq!(resolver.probes() - before, 2, "interior n{i} was not compressed");
        }
    }

    #[test]
    fn cyclic_table_terminates() {
        let mut resolver = RenameResolver::new();
        resolver.insert_raw("a", "b");
        resolver.insert_raw("b", "a");
        let resolved = resolver.resolve("a");
        assert!(resolved == "a" || resolved == "b");
    }
}
