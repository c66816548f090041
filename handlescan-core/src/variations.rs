//! Username variation generation
//!
//! Expands a username into the alternate spellings people actually register:
//! case folds, separator tweaks, numeric affixes (including plausible birth
//! years derived from the injected clock), domain-vocabulary suffixes,
//! accent stripping and simple leet substitution. Deterministic under a
//! fixed clock.

use std::collections::HashSet;
use std::sync::Arc;

use crate::clock::{SharedClock, SystemClock};

/// Small-integer affixes commonly appended to handles
const SMALL_NUMBERS: &[&str] = &["1", "2", "3", "7", "69", "123", "420", "666", "777", "1234"];

/// Country calling codes seen as handle suffixes
const REGIONAL_CODES: &[&str] = &["1", "7", "33", "44", "49", "91"];

/// Adult-industry account suffixes
const ADULT_SUFFIXES: &[&str] = &["xxx", "xo", "hot", "babe", "vip"];

/// Social-platform account suffixes
const SOCIAL_SUFFIXES: &[&str] = &["official", "real", "tv", "live", "yt"];

/// Professional account suffixes
const PRO_SUFFIXES: &[&str] = &["pro", "dev", "work", "hq"];

/// Backup / throwaway account suffixes
const BACKUP_SUFFIXES: &[&str] = &["backup", "alt", "2nd", "spare", "old", "new"];

/// Separators used for prefix/suffix variants and normalization
const SEPARATORS: &[char] = &['_', '-', '.'];

/// Oldest plausible account-holder age for birth-year affixes
const MAX_AGE: i32 = 40;

/// Youngest plausible account-holder age for birth-year affixes
const MIN_AGE: i32 = 18;

/// Generates ranked username variations
#[derive(Clone)]
pub struct VariationGenerator {
    clock: SharedClock,
}

impl Default for VariationGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl VariationGenerator {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }

    /// Generate the deduplicated, ranked variation list for a username.
    /// Empty or whitespace-only input yields an empty list.
    pub fn generate(&self, username: &str) -> Vec<String> {
        let original = username.trim();
        if original.is_empty() {
            return Vec::new();
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut variations: Vec<String> = Vec::new();
        let mut push = |v: String| {
            if !v.is_empty() && seen.insert(v.clone()) {
                variations.push(v);
            }
        };

        push(original.to_string());

        // Case folding
        push(original.to_lowercase());
        push(original.to_uppercase());
        push(capitalize(original));

        // Separator prefixes/suffixes
        for &sep in SEPARATORS {
            push(format!("{sep}{original}"));
            push(format!("{original}{sep}"));
        }

        // Separator normalization: strip separators, and swap between them
        let stripped = strip_separators(original);
        push(stripped.clone());
        for &sep in SEPARATORS {
            push(swap_separators(original, sep));
        }

        // Numeric affixes
        for &n in SMALL_NUMBERS {
            push(format!("{original}{n}"));
        }
        for year in self.birth_years() {
            push(format!("{original}{year}"));
            push(format!("{original}{:02}", year % 100));
        }
        for &code in REGIONAL_CODES {
            push(format!("{original}{code}"));
        }

        // Domain-vocabulary suffixes
        for list in [ADULT_SUFFIXES, SOCIAL_SUFFIXES, PRO_SUFFIXES, BACKUP_SUFFIXES] {
            for &suffix in list {
                push(format!("{original}{suffix}"));
                push(format!("{original}_{suffix}"));
            }
        }

        // Accent stripping
        push(strip_accents(original));

        // Simple leet substitution
        push(leetify(original));
        push(leetify(&stripped));

        rank(original, variations)
    }

    /// Plausible birth years for the current account-holder population
    fn birth_years(&self) -> impl Iterator<Item = i32> {
        let year = self.clock.year();
        (year - MAX_AGE)..=(year - MIN_AGE)
    }
}

/// Sort: original first, case-insensitive matches next, variants containing
/// the original by ascending length delta, then length, then lexicographic.
fn rank(original: &str, mut variations: Vec<String>) -> Vec<String> {
    let orig_lower = original.to_lowercase();
    let orig_len = original.len() as i64;

    variations.sort_by_cached_key(|v| {
        let class = if v == original {
            0u8
        } else if v.eq_ignore_ascii_case(original) {
            1
        } else if v.to_lowercase().contains(&orig_lower) {
            2
        } else {
            3
        };
        let delta = (v.len() as i64 - orig_len).abs();
        (class, delta, v.len(), v.clone())
    });

    variations
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

fn swap_separators(s: &str, to: char) -> String {
    s.chars()
        .map(|c| if SEPARATORS.contains(&c) { to } else { c })
        .collect()
}

/// Fold common accented Latin characters to their ASCII base
fn strip_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            'ñ' => 'n',
            'ç' => 'c',
            'ß' => 's',
            other => other,
        })
        .collect()
}

fn leetify(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_ascii_lowercase() {
            'a' => '4',
            'e' => '3',
            'i' => '1',
            'o' => '0',
            's' => '5',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn generator() -> VariationGenerator {
        VariationGenerator::new(Arc::new(FixedClock::at_year(2025)))
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let gen = generator();
        assert!(gen.generate("").is_empty());
        assert!(gen.generate("   ").is_empty());
    }

    #[test]
    fn test_original_is_first_and_unique() {
        let gen = generator();
        let variations = gen.generate("Alice_99");

        assert_eq!(variations[0], "Alice_99");
        assert!(!variations.is_empty());

        let unique: HashSet<_> = variations.iter().collect();
        assert_eq!(unique.len(), variations.len());
    }

    #[test]
    fn test_case_folds_rank_before_affixes() {
        let gen = generator();
        let variations = gen.generate("Alice");

        let lower_pos = variations.iter().position(|v| v == "alice").unwrap();
        let affix_pos = variations.iter().position(|v| v == "Alice123").unwrap();
        assert!(lower_pos < affix_pos);
    }

    #[test]
    fn test_birth_years_follow_clock() {
        let gen = VariationGenerator::new(Arc::new(FixedClock::at_year(2020)));
        let variations = gen.generate("bob");

        // 2020 - 18 = 2002 is the youngest plausible year
        assert!(variations.iter().any(|v| v == "bob2002"));
        assert!(!variations.iter().any(|v| v == "bob2003"));
    }

    #[test]
    fn test_deterministic_under_fixed_clock() {
        let a = generator().generate("charlie_x");
        let b = generator().generate("charlie_x");
        assert_eq!(a, b);
    }

    #[test]
    fn test_transform_families_present() {
        let gen = generator();
        let variations = gen.generate("mia.k");

        assert!(variations.iter().any(|v| v == "miak")); // separator stripped
        assert!(variations.iter().any(|v| v == "mia_k")); // separator swapped
        assert!(variations.iter().any(|v| v == "mia.kxxx")); // adult suffix
        assert!(variations.iter().any(|v| v == "m14.k")); // leet
    }

    #[test]
    fn test_accent_stripping() {
        let gen = generator();
        let variations = gen.generate("josé");
        assert!(variations.iter().any(|v| v == "jose"));
    }
}
