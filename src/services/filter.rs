// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Curated filter engine: favorites-only, text search and curated tags.

use crate::models::Beach;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Trending beaches, in display order.
pub const TRENDING_ORDER: [&str; 2] = ["GWANGALLI", "SONGDO"];

/// Popular beaches, in display order.
pub const POPULAR_ORDER: [&str; 2] = ["HAEUNDAE", "GWANGALLI"];

/// Beaches hosting a festival.
pub const FESTIVAL_CODES: [&str; 1] = ["HAEUNDAE"];

/// Curated list selector. Independent of the live crowd status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CuratedTag {
    Trending,
    Popular,
    Festival,
}

impl CuratedTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CuratedTag::Trending => "trending",
            CuratedTag::Popular => "popular",
            CuratedTag::Festival => "festival",
        }
    }

    /// Member codes; for ranked tags the order is the display order.
    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            CuratedTag::Trending => &TRENDING_ORDER,
            CuratedTag::Popular => &POPULAR_ORDER,
            CuratedTag::Festival => &FESTIVAL_CODES,
        }
    }

    fn rank(&self, code: &str) -> Option<usize> {
        self.codes().iter().position(|c| *c == code)
    }
}

impl fmt::Display for CuratedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CuratedTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trending" => Ok(CuratedTag::Trending),
            "popular" => Ok(CuratedTag::Popular),
            "festival" => Ok(CuratedTag::Festival),
            other => Err(format!("unknown curated tag: {}", other)),
        }
    }
}

/// Transient list filter, held in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_query: String,
    pub show_favorites_only: bool,
    pub curated_tag: Option<CuratedTag>,
}

/// Apply `filter` to `beaches`.
///
/// Stages: favorites-only, then search, then curated tag. Total and
/// deterministic; the input is never reordered except by a ranked tag.
pub fn apply_filters(
    beaches: &[Beach],
    favorite_ids: &HashSet<String>,
    filter: &FilterState,
) -> Vec<Beach> {
    let needle = filter.search_query.trim().to_lowercase();

    let mut result: Vec<Beach> = beaches
        .iter()
        .filter(|b| !filter.show_favorites_only || favorite_ids.contains(&b.id))
        .filter(|b| needle.is_empty() || b.matches_query(&needle))
        .filter(|b| match filter.curated_tag {
            Some(tag) => tag.rank(&b.code).is_some(),
            None => true,
        })
        .cloned()
        .collect();

    if let Some(tag @ (CuratedTag::Trending | CuratedTag::Popular)) = filter.curated_tag {
        // Stable sort; ranks are unique per code.
        result.sort_by_key(|b| tag.rank(&b.code).unwrap_or(usize::MAX));
    }

    result
}

/// First beach whose name or code contains `query` (search submit).
pub fn first_match<'a>(beaches: &'a [Beach], query: &str) -> Option<&'a Beach> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    beaches.iter().find(|b| b.matches_query(&needle))
}
