//! Role canonicalization.

use serde::{Deserialize, Serialize};

/// Canonical role categories.
///
/// Source data spells roles inconsistently ("JNG", "Middle", "bot", ...);
/// everything funnels into this fixed set, with unrecognized strings
/// falling through to `Uncategorized` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleClass {
    Top,
    Jungle,
    Mid,
    Adc,
    Support,
    Uncategorized,
}

impl RoleClass {
    /// Map a raw role string onto its canonical category.
    ///
    /// Matching is case-insensitive on the exact alias, not a substring
    /// search: "JNG" is jungle, "Mid Lane" is uncategorized.
    pub fn parse(role: &str) -> Self {
        match role.trim().to_lowercase().as_str() {
            "top" => RoleClass::Top,
            "jungle" | "jng" => RoleClass::Jungle,
            "mid" | "middle" => RoleClass::Mid,
            "adc" | "bot" | "bottom" => RoleClass::Adc,
            "support" | "sup" => RoleClass::Support,
            _ => RoleClass::Uncategorized,
        }
    }

    /// Human-readable label used in API responses.
    pub fn label(&self) -> &'static str {
        match self {
            RoleClass::Top => "Top",
            RoleClass::Jungle => "Jungle",
            RoleClass::Mid => "Mid",
            RoleClass::Adc => "ADC",
            RoleClass::Support => "Support",
            RoleClass::Uncategorized => "Uncategorized",
        }
    }
}

impl std::fmt::Display for RoleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_aliases() {
        assert_eq!(RoleClass::parse("Top"), RoleClass::Top);
        assert_eq!(RoleClass::parse("JNG"), RoleClass::Jungle);
        assert_eq!(RoleClass::parse("jungle"), RoleClass::Jungle);
        assert_eq!(RoleClass::parse("Middle"), RoleClass::Mid);
        assert_eq!(RoleClass::parse("bot"), RoleClass::Adc);
        assert_eq!(RoleClass::parse("Bottom"), RoleClass::Adc);
        assert_eq!(RoleClass::parse("ADC"), RoleClass::Adc);
        assert_eq!(RoleClass::parse("sup"), RoleClass::Support);
    }

    #[test]
    fn test_parse_unrecognized_falls_through() {
        // "Mid Lane" is not a listed alias; no substring matching.
        assert_eq!(RoleClass::parse("Mid Lane"), RoleClass::Uncategorized);
        assert_eq!(RoleClass::parse(""), RoleClass::Uncategorized);
        assert_eq!(RoleClass::parse("Carry"), RoleClass::Uncategorized);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(RoleClass::parse("  mid  "), RoleClass::Mid);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RoleClass::Adc.label(), "ADC");
        assert_eq!(RoleClass::Uncategorized.to_string(), "Uncategorized");
    }
}
