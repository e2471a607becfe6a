//! Category styling: which category a module code belongs to and which
//! color its bars are painted with.

use crate::domain::model::HexColor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const OTHER_CATEGORY: &str = "Other";
pub const DEFAULT_FALLBACK_COLOR: HexColor = HexColor(0xFFFFFF);

const BUILTIN_CATEGORIES: &[(&str, &str, u32)] = &[
    ("G-AIA", "AI & Machine Learning", 0xC6EFCE),
    ("G-SEC", "Security", 0xF8CBAD),
    ("G-OOP", "Object-Oriented Programming", 0xBDD7EE),
    ("G-NWP", "Network Programming", 0xFFE699),
    ("G-CCP", "Concurrent Programming", 0xE2EFDA),
    ("G-DOP", "DevOps", 0xD9E1F2),
    ("G-CNA", "Computer Numerical Analysis", 0xFCE4D6),
    ("G-ING", "Engineering", 0xDDEBF7),
    ("G-PMP", "Project Management", 0xFFF2CC),
    ("G-PRO", "Professional", 0xE2F0D9),
    ("G-ENG", "English", 0xF2F2F2),
    ("G-YEP", "Year-End Project", 0xFF9999),
    ("G-INN", "Innovation", 0xDDA0DD),
    ("G-CUS", "Customer/UX", 0xFFFACD),
    ("G-EPI", "Epitech Life", 0xD3D3D3),
    ("G-PDG", "Paradigms", 0xB0E0E6),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub name: String,
    pub color: HexColor,
}

/// Module-code prefix to category mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPalette {
    entries: BTreeMap<String, CategoryStyle>,
    fallback: CategoryStyle,
}

impl Default for CategoryPalette {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryPalette {
    pub fn new(entries: BTreeMap<String, CategoryStyle>, fallback_color: HexColor) -> Self {
        Self {
            entries,
            fallback: CategoryStyle {
                name: OTHER_CATEGORY.to_string(),
                color: fallback_color,
            },
        }
    }

    pub fn builtin() -> Self {
        let entries = BUILTIN_CATEGORIES
            .iter()
            .map(|(prefix, name, color)| {
                (
                    prefix.to_string(),
                    CategoryStyle {
                        name: name.to_string(),
                        color: HexColor(*color),
                    },
                )
            })
            .collect();
        Self::new(entries, DEFAULT_FALLBACK_COLOR)
    }

    /// Entries from `overrides` replace built-in ones with the same prefix.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, CategoryStyle>) -> Self {
        for (prefix, style) in overrides {
            self.entries.insert(prefix.clone(), style.clone());
        }
        self
    }

    pub fn with_fallback_color(mut self, color: HexColor) -> Self {
        self.fallback.color = color;
        self
    }

    /// Style of the longest configured prefix of `code`, or the fallback.
    pub fn resolve(&self, code: &str) -> &CategoryStyle {
        self.entries
            .iter()
            .filter(|(prefix, _)| code.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, style)| style)
            .unwrap_or(&self.fallback)
    }

    pub fn color_for(&self, category: &str) -> HexColor {
        self.entries
            .values()
            .find(|style| style.name == category)
            .map(|style| style.color)
            .unwrap_or(self.fallback.color)
    }
}
