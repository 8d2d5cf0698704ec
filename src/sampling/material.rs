//! Material code table - maps host material names to small wire codes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Codes shared by both built-in tables
const BASE_MATERIALS: &[(&str, u8)] = &[
    ("grass_block", 1),
    ("dirt", 2),
    ("stone", 3),
    ("sand", 4),
    ("water", 5),
    ("oak_log", 6),
    ("oak_leaves", 7),
    ("snow", 8),
    ("ice", 9),
    ("netherrack", 10),
    ("end_stone", 11),
    ("gravel", 12),
    ("cobblestone", 13),
    ("bedrock", 14),
    ("clay", 15),
    ("soul_sand", 16),
];

/// Additional codes in the extended table
const EXTENDED_MATERIALS: &[(&str, u8)] = &[
    ("mycelium", 17),
    ("podzol", 18),
    ("coarse_dirt", 19),
    ("sandstone", 20),
    ("oak_planks", 21),
    ("spruce_log", 22),
    ("birch_log", 23),
    ("jungle_log", 24),
    ("spruce_leaves", 25),
    ("birch_leaves", 26),
    ("jungle_leaves", 27),
    ("glass", 28),
    ("white_wool", 29),
    ("terracotta", 30),
];

/// Closed lookup from material name to code. Anything not listed is `UNKNOWN`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTable {
    codes: HashMap<String, u8>,
}

impl MaterialTable {
    /// Reserved code for unclassified materials
    pub const UNKNOWN: u8 = 0;

    /// Build a table from explicit entries
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, u8)>) -> Self {
        Self {
            codes: entries
                .into_iter()
                .map(|(name, code)| (name.to_string(), code))
                .collect(),
        }
    }

    /// Terrain-only table (codes 1-16)
    pub fn compact() -> Self {
        Self::from_entries(BASE_MATERIALS.iter().copied())
    }

    /// Terrain plus vegetation and building materials (codes 1-30)
    pub fn extended() -> Self {
        Self::from_entries(BASE_MATERIALS.iter().chain(EXTENDED_MATERIALS).copied())
    }

    /// Code for a material name. Namespaced forms such as `minecraft:stone`
    /// or `block.minecraft.stone` resolve like `stone`.
    pub fn code(&self, name: &str) -> u8 {
        self.codes
            .get(normalize(name))
            .copied()
            .unwrap_or(Self::UNKNOWN)
    }

    /// True if any entry maps to `code`
    pub fn contains_code(&self, code: u8) -> bool {
        self.codes.values().any(|&c| c == code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::extended()
    }
}

/// Strip a registry namespace or translation-key prefix
fn normalize(name: &str) -> &str {
    let name = name.strip_prefix("block.minecraft.").unwrap_or(name);
    match name.rfind(':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}
