// src/cache/keys.rs

use std::fmt::{self, Display, Write};

/// Deterministic cache key: `<namespace>:<resource>|name=value|name=value`.
///
/// Parameters are appended in the order the caller adds them, so every read
/// path builds its key through a single function. Values are escaped so that
/// separators inside user input cannot make two parameter sets collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(namespace: &str, resource: &str) -> Self {
        let mut raw = String::with_capacity(namespace.len() + resource.len() + 16);
        raw.push_str(namespace);
        raw.push(':');
        raw.push_str(resource);
        Self(raw)
    }

    /// Appends a `name=value` segment.
    pub fn param(mut self, name: &str, value: impl Display) -> Self {
        self.0.push('|');
        self.0.push_str(name);
        self.0.push('=');
        let mut rendered = String::new();
        // Writing into a String cannot fail.
        let _ = write!(rendered, "{}", value);
        escape_into(&mut self.0, &rendered);
        self
    }

    /// Appends a segment only when the value is present.
    pub fn opt_param<T: Display>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '|' => out.push_str("%7C"),
            '=' => out.push_str("%3D"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_parameters_build_identical_keys() {
        let a = CacheKey::new("cache", "quiz:list").param("user_id", 3).param("page", 1);
        let b = CacheKey::new("cache", "quiz:list").param("user_id", 3).param("page", 1);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "cache:quiz:list|user_id=3|page=1");
    }

    #[test]
    fn parameter_names_disambiguate_values() {
        let lesson = CacheKey::new("cache", "quiz:list").opt_param("lesson_id", Some(4));
        let class = CacheKey::new("cache", "quiz:list").opt_param("class_id", Some(4));
        assert_ne!(lesson, class);
    }

    #[test]
    fn absent_optional_parameter_is_omitted() {
        let key = CacheKey::new("cache", "quiz:list").opt_param::<i64>("lesson_id", None);
        assert_eq!(key.as_str(), "cache:quiz:list");
    }

    #[test]
    fn separators_inside_values_are_escaped() {
        let injected = CacheKey::new("ns", "r").param("type", "a|page=2");
        let honest = CacheKey::new("ns", "r").param("type", "a").param("page", 2);
        assert_ne!(injected, honest);
        assert_eq!(injected.as_str(), "ns:r|type=a%7Cpage%3D2");
    }

    #[test]
    fn percent_is_escaped_first_class() {
        let literal = CacheKey::new("ns", "r").param("type", "%7C");
        let pipe = CacheKey::new("ns", "r").param("type", "|");
        assert_ne!(literal, pipe);
    }
}
