//! Duration range matching across the two stored duration units.
//!
//! A duration is stored as `(type, min, max)` where `type` is `hours` or
//! `days`, and one day counts as [`HOURS_PER_DAY`] duration-hours. The
//! `min_duration` / `max_duration` parameters are always in hours and match
//! records of either unit, converting the bound for `days` records.

use sea_orm::{ColumnTrait, Condition};

use super::conditions::parse_number;

/// One day equals this many duration-hours.
pub const HOURS_PER_DAY: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Hours,
    Days,
}

impl DurationUnit {
    pub const ALL: [Self; 2] = [Self::Hours, Self::Days];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }

    /// Express an hour bound in this unit.
    #[must_use]
    pub fn from_hours(self, hours: f64) -> f64 {
        match self {
            Self::Hours => hours,
            Self::Days => hours / HOURS_PER_DAY,
        }
    }
}

/// The three columns holding a stored duration.
#[derive(Debug, Clone, Copy)]
pub struct DurationColumns<C> {
    pub unit: C,
    pub min: C,
    pub max: C,
}

/// `min_duration=H`: `(hours AND min >= H) OR (days AND min >= H/8)`.
#[must_use]
pub fn min_duration<C: ColumnTrait>(columns: DurationColumns<C>, raw: &str) -> Option<Condition> {
    let hours = parse_number(raw)?;
    let condition = DurationUnit::ALL.into_iter().fold(Condition::any(), |any, unit| {
        any.add(
            Condition::all()
                .add(columns.unit.eq(unit.as_str()))
                .add(columns.min.gte(unit.from_hours(hours))),
        )
    });
    Some(condition)
}

/// `max_duration=H`: per unit with bound `B` (H or H/8),
/// `(max IS NOT NULL AND max <= B) OR (max IS NULL AND min <= B)`.
///
/// A record without `max` is a point value at `min`, not an open range.
#[must_use]
pub fn max_duration<C: ColumnTrait>(columns: DurationColumns<C>, raw: &str) -> Option<Condition> {
    let hours = parse_number(raw)?;
    let condition = DurationUnit::ALL.into_iter().fold(Condition::any(), |any, unit| {
        let bound = unit.from_hours(hours);
        any.add(
            Condition::all().add(columns.unit.eq(unit.as_str())).add(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(columns.max.is_not_null())
                            .add(columns.max.lte(bound)),
                    )
                    .add(
                        Condition::all()
                            .add(columns.max.is_null())
                            .add(columns.min.lte(bound)),
                    ),
            ),
        )
    });
    Some(condition)
}

/// `is_multi_day`: a `days` record whose longest duration exceeds one day.
/// The longest duration is `max`, or `min` for point values. `false` selects
/// the complement, hour-based records included.
#[must_use]
pub fn multi_day<C: ColumnTrait>(columns: DurationColumns<C>, multi_day: bool) -> Condition {
    let days = columns.unit.eq(DurationUnit::Days.as_str());
    if multi_day {
        return Condition::all().add(days).add(
            Condition::any()
                .add(columns.max.gt(1.0))
                .add(Condition::all().add(columns.max.is_null()).add(columns.min.gt(1.0))),
        );
    }
    Condition::any()
        .add(columns.unit.eq(DurationUnit::Hours.as_str()))
        .add(
            Condition::all().add(days).add(
                Condition::any()
                    .add(columns.max.lte(1.0))
                    .add(
                        Condition::all()
                            .add(columns.max.is_null())
                            .add(Condition::any().add(columns.min.is_null()).add(columns.min.lte(1.0))),
                    ),
            ),
        )
}
