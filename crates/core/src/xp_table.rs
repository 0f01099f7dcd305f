//! Per-level experience-requirement table and gained-XP arithmetic.
//!
//! The table ships as a row-per-level CSV (`Level, XP Required (Actual),
//! XP Required (Billions), XP Required (Trillions)`), covering the late-game
//! level band where users track daily progress. All arithmetic uses
//! [`Decimal`] -- the actual XP values overflow the exactly-representable
//! range of f64, and gained-XP must round-trip exactly
//! (`xp_gained(l, 0, 100) == required(l)`).
//!
//! Parsing is separated from file I/O: callers read the file and hand the
//! text to [`XpTable::parse`], so this crate stays I/O-free and the table
//! can be injected into application state once at startup.

use std::collections::BTreeMap;
use std::ops::Add;

use rust_decimal::Decimal;

use crate::error::CoreError;

/// 10^9 as a Decimal.
fn billion() -> Decimal {
    Decimal::new(1_000_000_000, 0)
}

/// 10^12 as a Decimal.
fn trillion() -> Decimal {
    Decimal::new(1_000_000_000_000, 0)
}

/// XP required to clear one level, in the three stored magnitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelXp {
    pub actual: Decimal,
    pub billions: Decimal,
    pub trillions: Decimal,
}

/// An experience quantity expressed in the three stored magnitudes.
///
/// The billions/trillions fields are always derived from `actual` in the
/// same computation, so the denormalized representations cannot drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XpGain {
    pub actual: Decimal,
    pub billions: Decimal,
    pub trillions: Decimal,
}

impl XpGain {
    /// Build all three magnitudes from an absolute XP quantity.
    pub fn from_actual(actual: Decimal) -> Self {
        Self {
            actual,
            billions: actual / billion(),
            trillions: actual / trillion(),
        }
    }

    /// Build all three magnitudes from a quantity expressed in billions.
    pub fn from_billions(billions: Decimal) -> Self {
        Self {
            actual: billions * billion(),
            billions,
            trillions: billions / Decimal::new(1_000, 0),
        }
    }

    pub fn zero() -> Self {
        Self::from_actual(Decimal::ZERO)
    }
}

impl Add for XpGain {
    type Output = XpGain;

    fn add(self, rhs: XpGain) -> XpGain {
        XpGain {
            actual: self.actual + rhs.actual,
            billions: self.billions + rhs.billions,
            trillions: self.trillions + rhs.trillions,
        }
    }
}

/// The per-level experience-requirement table, keyed by level.
#[derive(Debug, Clone)]
pub struct XpTable {
    levels: BTreeMap<i32, LevelXp>,
    /// XP accumulated before reaching each level, relative to the lowest
    /// table level. Derived once by summing requirements in level order.
    cumulative: BTreeMap<i32, Decimal>,
}

impl XpTable {
    /// Parse the CSV text of the table.
    ///
    /// The first line is treated as a header when it does not start with a
    /// digit. Blank lines are skipped. Rows must have exactly four columns
    /// with plain (unseparated) numbers.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let mut levels = BTreeMap::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line_no == 0 && !line.starts_with(|c: char| c.is_ascii_digit()) {
                continue; // header
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 4 {
                return Err(CoreError::Validation(format!(
                    "XP table line {}: expected 4 columns, got {}",
                    line_no + 1,
                    fields.len()
                )));
            }

            let level: i32 = fields[0].parse().map_err(|_| {
                CoreError::Validation(format!(
                    "XP table line {}: invalid level '{}'",
                    line_no + 1,
                    fields[0]
                ))
            })?;
            let parse_decimal = |s: &str| {
                s.parse::<Decimal>().map_err(|_| {
                    CoreError::Validation(format!(
                        "XP table line {}: invalid number '{s}'",
                        line_no + 1
                    ))
                })
            };

            levels.insert(
                level,
                LevelXp {
                    actual: parse_decimal(fields[1])?,
                    billions: parse_decimal(fields[2])?,
                    trillions: parse_decimal(fields[3])?,
                },
            );
        }

        if levels.is_empty() {
            return Err(CoreError::Validation("XP table contains no rows".into()));
        }

        let mut cumulative = BTreeMap::new();
        let mut running = Decimal::ZERO;
        for (level, xp) in &levels {
            cumulative.insert(*level, running);
            running += xp.actual;
        }

        Ok(Self { levels, cumulative })
    }

    /// XP requirements for a level, or `None` when outside the table.
    pub fn required(&self, level: i32) -> Option<&LevelXp> {
        self.levels.get(&level)
    }

    pub fn min_level(&self) -> i32 {
        *self.levels.keys().next().expect("table is never empty")
    }

    pub fn max_level(&self) -> i32 {
        *self.levels.keys().next_back().expect("table is never empty")
    }

    /// XP gained by moving from `old_percent` to `new_percent` of `level`.
    ///
    /// Total for every in-range percent pair: an equal pair yields zero and
    /// a decreasing pair a negative delta. Callers that treat a
    /// non-increasing pair as invalid input must reject it before calling.
    pub fn xp_gained(
        &self,
        level: i32,
        old_percent: Decimal,
        new_percent: Decimal,
    ) -> Result<XpGain, CoreError> {
        for (name, pct) in [("old_percent", old_percent), ("new_percent", new_percent)] {
            if pct < Decimal::ZERO || pct > Decimal::new(100, 0) {
                return Err(CoreError::Validation(format!(
                    "{name} must be between 0 and 100, got {pct}"
                )));
            }
        }

        let required = self.required(level).ok_or_else(|| {
            CoreError::Validation(format!(
                "Level {level} not in XP table ({}-{} supported)",
                self.min_level(),
                self.max_level()
            ))
        })?;

        let gained = required.actual * (new_percent - old_percent) / Decimal::new(100, 0);
        Ok(XpGain::from_actual(gained))
    }

    /// XP accumulated before reaching `level`, relative to the lowest table
    /// level. `None` when the level is outside the table.
    pub fn cumulative_start(&self, level: i32) -> Option<Decimal> {
        self.cumulative.get(&level).copied()
    }

    /// Percent progress into `level` given a cumulative total-XP reading,
    /// clamped to 0-100. `None` when the level is outside the table.
    pub fn progress_percent(&self, level: i32, total_xp: Decimal) -> Option<Decimal> {
        let required = self.required(level)?.actual;
        let start = self.cumulative_start(level)?;
        if required <= Decimal::ZERO {
            return None;
        }
        let pct = (total_xp - start) / required * Decimal::new(100, 0);
        Some(pct.clamp(Decimal::ZERO, Decimal::new(100, 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Level,XP Required (Actual),XP Required (Billions),XP Required (Trillions)
249,400000000000,400.00,0.400000
250,500000000000,500.00,0.500000
251,600000000000,600.00,0.600000
";

    fn table() -> XpTable {
        XpTable::parse(TABLE).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_rows_and_bounds() {
        let t = table();
        assert_eq!(t.min_level(), 249);
        assert_eq!(t.max_level(), 251);
        assert_eq!(t.required(250).unwrap().actual, dec("500000000000"));
        assert!(t.required(252).is_none());
    }

    #[test]
    fn rejects_empty_and_malformed_input() {
        assert!(XpTable::parse("").is_err());
        assert!(XpTable::parse("Level,A,B,C\n").is_err());
        assert!(XpTable::parse("250,1,2\n").is_err());
        assert!(XpTable::parse("250,one,2,3\n").is_err());
    }

    #[test]
    fn five_percent_of_level_250() {
        // The worked reference case: 500e9 XP * 5% = 25e9.
        let gain = table().xp_gained(250, dec("10.00"), dec("15.00")).unwrap();
        assert_eq!(gain.actual, dec("25000000000"));
        assert_eq!(gain.billions, dec("25"));
        assert_eq!(gain.trillions, dec("0.025"));
    }

    #[test]
    fn full_bar_equals_table_requirement_exactly() {
        let t = table();
        for level in [249, 250, 251] {
            let gain = t.xp_gained(level, Decimal::ZERO, dec("100")).unwrap();
            assert_eq!(gain.actual, t.required(level).unwrap().actual);
        }
    }

    #[test]
    fn equal_percents_yield_zero() {
        let gain = table().xp_gained(250, dec("42.42"), dec("42.42")).unwrap();
        assert_eq!(gain.actual, Decimal::ZERO);
        assert_eq!(gain.billions, Decimal::ZERO);
        assert_eq!(gain.trillions, Decimal::ZERO);
    }

    #[test]
    fn decreasing_percents_yield_negative_delta() {
        // The calculator is total; rejection of decreasing pairs is the
        // HTTP layer's job.
        let gain = table().xp_gained(250, dec("50"), dec("40")).unwrap();
        assert!(gain.actual < Decimal::ZERO);
    }

    #[test]
    fn out_of_range_percent_rejected() {
        let t = table();
        assert!(t.xp_gained(250, dec("-0.01"), dec("10")).is_err());
        assert!(t.xp_gained(250, dec("0"), dec("100.01")).is_err());
    }

    #[test]
    fn level_outside_table_rejected() {
        let err = table().xp_gained(199, dec("0"), dec("1")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("249-251"));
    }

    #[test]
    fn cumulative_start_sums_prior_levels() {
        let t = table();
        assert_eq!(t.cumulative_start(249).unwrap(), Decimal::ZERO);
        assert_eq!(t.cumulative_start(250).unwrap(), dec("400000000000"));
        assert_eq!(t.cumulative_start(251).unwrap(), dec("900000000000"));
        assert!(t.cumulative_start(252).is_none());
    }

    #[test]
    fn progress_percent_within_level() {
        let t = table();
        // 400e9 into the band puts us at the very start of 250.
        assert_eq!(
            t.progress_percent(250, dec("400000000000")).unwrap(),
            Decimal::ZERO
        );
        // Halfway through 250's 500e9 requirement.
        assert_eq!(
            t.progress_percent(250, dec("650000000000")).unwrap(),
            dec("50")
        );
    }

    #[test]
    fn progress_percent_is_clamped() {
        let t = table();
        assert_eq!(t.progress_percent(250, dec("0")).unwrap(), Decimal::ZERO);
        assert_eq!(
            t.progress_percent(250, dec("999999999999999")).unwrap(),
            dec("100")
        );
    }

    #[test]
    fn gain_addition_keeps_magnitudes_consistent() {
        let a = XpGain::from_actual(dec("1000000000"));
        let b = XpGain::from_billions(dec("2"));
        let sum = a + b;
        assert_eq!(sum.actual, dec("3000000000"));
        assert_eq!(sum.billions, dec("3"));
        assert_eq!(sum.trillions, dec("0.003"));
    }
}
