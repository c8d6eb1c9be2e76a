//! Platform registry - the static table of supported key-delivery platforms
//!
//! Immutable process-wide state: build one registry at startup and inject
//! it into the components that need it.

use regex::Regex;

/// A key-delivery platform with its accepted code formats
#[derive(Debug, Clone)]
pub struct Platform {
    name: String,
    search_name: String,
    patterns: Vec<Regex>,
    example_keys: Vec<String>,
}

impl Platform {
    /// Create a platform from its display name, format patterns, and
    /// human-readable example formats
    pub fn new(
        name: &str,
        key_patterns: &[&str],
        example_keys: &[&str],
    ) -> Result<Self, regex::Error> {
        let patterns = key_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            search_name: name.to_lowercase(),
            patterns,
            example_keys: example_keys.iter().map(ToString::to_string).collect(),
        })
    }

    /// Display name (e.g. "Battle.net")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical lowercase name used for lookups and storage
    pub fn search_name(&self) -> &str {
        &self.search_name
    }

    /// Human-readable example key formats for help text
    pub fn example_keys(&self) -> &[String] {
        &self.example_keys
    }

    /// Whether a raw code matches any of this platform's formats
    pub fn is_valid_code(&self, code: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(code))
    }
}

/// Registry of all supported platforms
///
/// Lookup is by canonical lowercase name. `infer` tries platforms in
/// configuration order and returns the first whose pattern matches;
/// overlapping formats (e.g. 25-char Xbox/Windows codes) resolve to the
/// earlier entry.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
}

impl PlatformRegistry {
    /// Build a registry from an explicit platform list (configuration order
    /// is the `infer` priority order)
    pub fn new(platforms: Vec<Platform>) -> Self {
        Self { platforms }
    }

    /// The standard registry of the nine supported platforms
    pub fn standard() -> Self {
        let defs: &[(&str, &[&str], &[&str])] = &[
            (
                "GOG",
                &[
                    r"^[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}$",
                    r"^[a-zA-Z0-9]{18}$",
                ],
                &["AAAAA-BBBBB-CCCCC-DDDDD", "ABCDEABCDEABCDEABC (18 chars)"],
            ),
            (
                "Steam",
                &[
                    r"^[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}$",
                    r"^[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}$",
                    r"^[a-zA-Z0-9]{25}$",
                ],
                &[
                    "AAAAA-BBBBB-CCCCC",
                    "AAAAA-BBBBB-CCCCC-DDDDD-EEEEE",
                    "ABCDEABCDEABCDEABCDEABCDE (25 chars)",
                ],
            ),
            (
                "PlayStation",
                &[r"^[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}$"],
                &["AAAA-BBBB-CCCC"],
            ),
            (
                "Origin",
                &[r"^[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}$"],
                &["AAAA-BBBB-CCCC-DDDD-EEEE"],
            ),
            (
                "UPlay",
                &[
                    r"^[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}$",
                    r"^[a-zA-Z0-9]{3}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}$",
                ],
                &["AAAA-BBBB-CCCC-DDDD", "AAA-BBBB-CCCC-DDDD-EEEE"],
            ),
            (
                "Xbox",
                &[
                    r"^[a-zA-Z0-9]{25}$",
                    r"^[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}$",
                ],
                &[
                    "ABCDEABCDEABCDEABCDEABCDE (25 chars)",
                    "ABCDE-ABCDE-ABCDE-ABCDE-ABCDE",
                ],
            ),
            (
                "Switch",
                &[r"^[a-zA-Z0-9]{16}$"],
                &["ABCDABCDABCDABCD (16 chars)"],
            ),
            (
                "Windows",
                &[
                    r"^[a-zA-Z0-9]{25}$",
                    r"^[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{5}$",
                ],
                &[
                    "ABCDEABCDEABCDEABCDEABCDE (25 chars)",
                    "ABCDE-ABCDE-ABCDE-ABCDE-ABCDE",
                ],
            ),
            (
                "Battle.net",
                &[r"^[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{5}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}$"],
                &["ABCD-ABCD-ABCDE-ABCD-ABCD"],
            ),
        ];

        let platforms = defs
            .iter()
            .map(|(name, patterns, examples)| {
                Platform::new(name, patterns, examples).expect("static pattern is valid")
            })
            .collect();

        Self::new(platforms)
    }

    /// Look up a platform by name (case-insensitive)
    pub fn resolve(&self, name: &str) -> Option<&Platform> {
        let search_name = name.to_lowercase();
        self.platforms.iter().find(|p| p.search_name == search_name)
    }

    /// Infer the platform of a raw code: first configured match wins
    pub fn infer(&self, code: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.is_valid_code(code))
    }

    /// Whether a code is valid for the named platform
    pub fn validate(&self, name: &str, code: &str) -> bool {
        self.resolve(name).is_some_and(|p| p.is_valid_code(code))
    }

    /// All platforms in stable alphabetical order for display
    pub fn all(&self) -> Vec<&Platform> {
        let mut platforms: Vec<&Platform> = self.platforms.iter().collect();
        platforms.sort_by(|a, b| a.search_name.cmp(&b.search_name));
        platforms
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = PlatformRegistry::standard();
        assert_eq!(registry.resolve("STEAM").unwrap().name(), "Steam");
        assert_eq!(registry.resolve("battle.net").unwrap().name(), "Battle.net");
        assert!(registry.resolve("itch").is_none());
    }

    #[test]
    fn test_validate_steam_formats() {
        let registry = PlatformRegistry::standard();
        assert!(registry.validate("steam", "AAAAA-BBBBB-CCCCC"));
        assert!(registry.validate("steam", "AAAAA-BBBBB-CCCCC-DDDDD-EEEEE"));
        assert!(!registry.validate("steam", "AAAA-BBBB-CCCC"));
        assert!(!registry.validate("steam", "AAAAA-BBBBB"));
    }

    #[test]
    fn test_infer_first_match_wins() {
        let registry = PlatformRegistry::standard();
        // 25-char codes are valid for Steam, Xbox, and Windows; Steam is
        // configured first so it wins.
        let p = registry.infer("ABCDEABCDEABCDEABCDEABCDE").unwrap();
        assert_eq!(p.name(), "Steam");

        let p = registry.infer("AAAA-BBBB-CCCC").unwrap();
        assert_eq!(p.name(), "PlayStation");

        assert!(registry.infer("not a key").is_none());
    }

    #[test]
    fn test_all_is_alphabetical() {
        let registry = PlatformRegistry::standard();
        let names: Vec<&str> = registry.all().iter().map(|p| p.search_name()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 9);
    }
}
