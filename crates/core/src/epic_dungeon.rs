//! Epic dungeon bonus XP table.
//!
//! The epic dungeon is a time-limited bonus source that awards a fixed XP
//! payout per character level, only for the levels listed here (the gaps
//! are real -- some level bands have no dungeon variant). Values are the
//! base payout in billions of XP.
//!
//! Stacked event tiers map to effective multipliers: tier 4 is "base plus
//! four bonus runs" (x5 total) and tier 8 is "base plus eight" (x9 total).

use rust_decimal::Decimal;

use crate::xp_table::XpGain;

/// Base payout in billions per level, as (level, billions) rows.
///
/// Stored as decimal string literals so the fractional entries stay exact.
const BASE_XP_BILLIONS: &[(i32, &str)] = &[
    (260, "194.6"),
    (261, "197.4"),
    (262, "200.2"),
    (263, "203.0"),
    (264, "206.2"),
    (265, "232.0"),
    (266, "235.2"),
    (267, "238.4"),
    (270, "384.75"),
    (271, "403.05"),
    (272, "408.15"),
    (273, "430.65"),
    (274, "436.95"),
    (275, "491.10"),
    (276, "497.25"),
    (277, "504.30"),
    (278, "510.45"),
    (279, "517.50"),
    (280, "581.25"),
    (281, "589.20"),
    (282, "596.25"),
    (283, "604.20"),
    (284, "611.40"),
    (285, "687.30"),
    (286, "695.25"),
    (287, "704.25"),
    (288, "713.40"),
    (289, "721.50"),
    (290, "810.75"),
    (291, "819.90"),
    (292, "830.10"),
    (293, "840.45"),
    (294, "849.60"),
];

/// Effective payout multiplier for a stacked-bonus tier.
///
/// Tier 4 means base + 4 bonus runs (x5), tier 8 means base + 8 (x9).
/// Any other tier multiplies directly.
pub fn effective_multiplier(tier: i32) -> Decimal {
    match tier {
        4 => Decimal::new(5, 0),
        8 => Decimal::new(9, 0),
        n => Decimal::new(n as i64, 0),
    }
}

/// Bonus XP for a level at the given stacked-bonus tier.
///
/// Returns `None` when the level has no dungeon entry -- the bonus is
/// *unsupported* there, which callers must not collapse into zero.
pub fn bonus_xp(level: i32, tier: i32) -> Option<XpGain> {
    let base: Decimal = BASE_XP_BILLIONS
        .iter()
        .find(|(l, _)| *l == level)?
        .1
        .parse()
        .expect("bonus table literals are valid decimals");

    Some(XpGain::from_billions(base * effective_multiplier(tier)))
}
