//! `%YAML` and `%TAG` directives.

use std::fmt;

/// The YAML version this engine targets.
pub const MAJOR_VERSION: u32 = 1;
pub const MINOR_VERSION: u32 = 1;

/// The non-specific tag handle: a scalar tagged `!` resolves the same way a
/// plain untagged scalar would.
pub const DEFAULT_HANDLE: &str = "!";

/// A `%YAML major.minor` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionDirective {
    pub major: u32,
    pub minor: u32,
}

impl VersionDirective {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether this directive names the version the engine implements.
    pub fn is_compatible(&self) -> bool {
        self.major == MAJOR_VERSION && self.minor == MINOR_VERSION
    }
}

impl fmt::Display for VersionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A `%TAG handle prefix` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDirective {
    pub handle: String,
    pub prefix: String,
}

impl TagDirective {
    pub fn new(handle: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            prefix: prefix.into(),
        }
    }
}

/// The two tag directives every document gets for free: the primary handle
/// `!` and the secondary handle `!!` for the core YAML tag namespace.
pub fn default_tag_directives() -> [TagDirective; 2] {
    [
        TagDirective::new("!", "!"),
        TagDirective::new("!!", "tag:yaml.org,2002:"),
    ]
}

/// An insertion-ordered set of tag directives keyed by handle.
///
/// Handle uniqueness is the caller's concern (the parser and emitter both
/// report duplicates as errors before adding); `add` itself ignores an exact
/// duplicate and keeps the first entry for a conflicting handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDirectiveCollection {
    entries: Vec<TagDirective>,
}

impl TagDirectiveCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_handle(&self, handle: &str) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    pub fn get(&self, handle: &str) -> Option<&TagDirective> {
        self.entries.iter().find(|entry| entry.handle == handle)
    }

    /// Add a directive unless its handle is already present.
    pub fn add(&mut self, directive: TagDirective) {
        if !self.contains_handle(&directive.handle) {
            self.entries.push(directive);
        }
    }

    /// Merge in the built-in `!` and `!!` directives.
    pub fn add_defaults(&mut self) {
        for directive in default_tag_directives() {
            self.add(directive);
        }
    }

    /// Whether this collection holds exactly the built-in defaults.
    pub fn is_default(&self) -> bool {
        self.entries == default_tag_directives()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagDirective> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_compatibility() {
        assert!(VersionDirective::new(1, 1).is_compatible());
        assert!(!VersionDirective::new(1, 2).is_compatible());
        assert!(!VersionDirective::new(2, 0).is_compatible());
    }

    #[test]
    fn insertion_order_and_handle_uniqueness() {
        let mut tags = TagDirectiveCollection::new();
        tags.add(TagDirective::new("!a!", "one"));
        tags.add(TagDirective::new("!b!", "two"));
        tags.add(TagDirective::new("!a!", "other"));
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("!a!").map(|t| t.prefix.as_str()), Some("one"));
        let handles: Vec<_> = tags.iter().map(|t| t.handle.as_str()).collect();
        assert_eq!(handles, ["!a!", "!b!"]);
    }

    #[test]
    fn defaults_detection() {
        let mut tags = TagDirectiveCollection::new();
        tags.add_defaults();
        assert!(tags.is_default());
        assert!(tags.contains_handle("!"));
        assert!(tags.contains_handle("!!"));
        tags.add(TagDirective::new("!x!", "tag:example.com,2020:"));
        assert!(!tags.is_default());
    }
}
