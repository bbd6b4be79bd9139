//! Campaign tick count and its derived calendar fields.

/// Ticks per in-game hour.
pub const TICKS_PER_HOUR: i64 = 2500;
/// Hours per in-game day.
pub const HOURS_PER_DAY: i64 = 24;
/// Days per in-game season.
pub const DAYS_PER_SEASON: i64 = 21;
/// Seasons per in-game year.
pub const SEASONS_PER_YEAR: i64 = 4;
/// Calendar year the campaign clock starts at.
pub const BASE_YEAR: i64 = 1084;

const TICKS_PER_DAY: i64 = TICKS_PER_HOUR * HOURS_PER_DAY;
const DAYS_PER_YEAR: i64 = DAYS_PER_SEASON * SEASONS_PER_YEAR;

/// Wraps the single 64-bit tick count segment 0x0001 carries, exposing the
/// calendar fields derived from it. All derived fields are computed on
/// access rather than stored, so there is no way for them to drift from
/// `ticks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CampaignTime {
    pub ticks: i64,
}

impl CampaignTime {
    pub fn from_ticks(ticks: i64) -> Self {
        Self { ticks }
    }

    pub fn total_days(&self) -> i64 {
        self.ticks.div_euclid(TICKS_PER_DAY)
    }

    pub fn hour_of_day(&self) -> i64 {
        self.ticks.div_euclid(TICKS_PER_HOUR).rem_euclid(HOURS_PER_DAY)
    }

    pub fn year(&self) -> i64 {
        BASE_YEAR + self.total_days().div_euclid(DAYS_PER_YEAR)
    }

    pub fn season(&self) -> i64 {
        self.total_days().rem_euclid(DAYS_PER_YEAR).div_euclid(DAYS_PER_SEASON)
    }

    pub fn day_of_season(&self) -> i64 {
        self.total_days().rem_euclid(DAYS_PER_YEAR).rem_euclid(DAYS_PER_SEASON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ticks_is_the_base_year_day_zero() {
        let t = CampaignTime::from_ticks(0);
        assert_eq!(t.year(), BASE_YEAR);
        assert_eq!(t.season(), 0);
        assert_eq!(t.day_of_season(), 0);
        assert_eq!(t.hour_of_day(), 0);
        assert_eq!(t.total_days(), 0);
    }

    #[test]
    fn one_full_day_advances_total_days_not_hour() {
        let t = CampaignTime::from_ticks(TICKS_PER_DAY);
        assert_eq!(t.total_days(), 1);
        assert_eq!(t.hour_of_day(), 0);
    }

    #[test]
    fn partial_day_computes_hour_of_day() {
        let t = CampaignTime::from_ticks(TICKS_PER_HOUR * 5);
        assert_eq!(t.hour_of_day(), 5);
        assert_eq!(t.total_days(), 0);
    }

    #[test]
    fn one_full_year_advances_the_year_field() {
        let t = CampaignTime::from_ticks(TICKS_PER_DAY * DAYS_PER_YEAR);
        assert_eq!(t.year(), BASE_YEAR + 1);
        assert_eq!(t.season(), 0);
        assert_eq!(t.day_of_season(), 0);
    }

    #[test]
    fn season_and_day_of_season_roll_over_correctly() {
        // day 21 is the first day of the second season.
        let t = CampaignTime::from_ticks(TICKS_PER_DAY * DAYS_PER_SEASON);
        assert_eq!(t.season(), 1);
        assert_eq!(t.day_of_season(), 0);

        // day 20 is the last day of the first season.
        let t = CampaignTime::from_ticks(TICKS_PER_DAY * (DAYS_PER_SEASON - 1));
        assert_eq!(t.season(), 0);
        assert_eq!(t.day_of_season(), DAYS_PER_SEASON - 1);
    }
}
