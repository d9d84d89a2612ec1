//! Identifier issuance within a single namespace.

use std::collections::HashSet;

/// Hands out identifiers that have not been issued before.
///
/// On a collision the allocator appends `1` to its last attempt and tries
/// again, so the third request for `Foo` yields `Foo11`, not `Foo2`.
/// Generated code depends on this exact sequence; keep it stable.
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator with `reserved` already marked as issued.
    pub fn seeded<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: reserved.into_iter().map(Into::into).collect(),
        }
    }

    /// Issue `preferred`, or the first free suffixed variant of it.
    pub fn get(&mut self, preferred: &str) -> String {
        let mut name = preferred.to_string();
        while self.used.contains(&name) {
            name.push('1');
        }
        self.used.insert(name.clone());
        name
    }
}

/// Remove `-`, `.`, `$` and `/`, upper-casing the character after each.
///
/// With `need_cap` the first character is upper-cased as well.
pub fn depunct(ident: &str, mut need_cap: bool) -> String {
    let mut out = String::with_capacity(ident.len());
    for c in ident.chars() {
        if matches!(c, '-' | '.' | '$' | '/') {
            need_cap = true;
            continue;
        }
        if need_cap {
            out.extend(c.to_uppercase());
            need_cap = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `foo-bar.baz` -> `FooBarBaz`.
pub fn initial_cap(ident: &str) -> String {
    depunct(ident, true)
}

/// [`initial_cap`] restricted to characters valid in a Rust type name.
pub fn type_ident(ident: &str) -> String {
    let mut name: String = initial_cap(ident)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'T');
    }
    if name == "Self" {
        name.push('_');
    }
    name
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ident_strips_invalid_characters() {
        assert_eq!(type_ident("Foo.@type"), "Footype");
        assert_eq!(type_ident("3d-model"), "T3dModel");
        assert_eq!(type_ident("self"), "Self_");
    }

    #[test]
    fn test_collisions_append_to_last_attempt() {
        let mut names = NameAllocator::new();
        assert_eq!(names.get("Foo"), "Foo");
        assert_eq!(names.get("Foo"), "Foo1");
        assert_eq!(names.get("Foo"), "Foo11");
        assert_eq!(names.get("Foo1"), "Foo111");
        assert_eq!(names.get("Bar"), "Bar");
    }

    #[test]
    fn test_seeded_names_are_taken() {
        let mut names = NameAllocator::seeded(["self", "execute"]);
        assert_eq!(names.get("self"), "self1");
        assert_eq!(names.get("execute"), "execute1");
        assert_eq!(names.get("fields"), "fields");
    }

    #[test]
    fn test_initial_cap() {
        assert_eq!(initial_cap("foo"), "Foo");
        assert_eq!(initial_cap("foo-bar"), "FooBar");
        assert_eq!(initial_cap("Activity.object.attachments"), "ActivityObjectAttachments");
        assert_eq!(initial_cap("drive.readonly/x$y"), "DriveReadonlyXY");
        assert_eq!(depunct("max-results", false), "maxResults");
    }
}
