//! Points, levels and drop speed

use std::time::Duration;

/// Points for clearing 1..=4 rows at level 1
pub const LINE_SCORES: [u64; 4] = [40, 100, 300, 1200];

/// Drop interval in milliseconds for levels 1..=9
pub const DROP_INTERVALS_MS: [u64; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Interval used past the end of the table
pub const MIN_DROP_INTERVAL_MS: u64 = 120;

/// Points for clearing `rows` rows at once on `level`.
/// More than four rows scale linearly from the four-row value.
pub fn score_for_rows(rows: usize, level: u32) -> u64 {
    let base = match rows {
        0 => 0,
        1..=4 => LINE_SCORES[rows - 1],
        n => LINE_SCORES[3] * n as u64 / 4,
    };
    base * u64::from(level.max(1))
}

/// Level reached after clearing `rows` rows in total
pub fn level_for(start_level: u32, rows: usize, rows_per_level: usize) -> u32 {
    let gained = rows / rows_per_level.max(1);
    start_level.saturating_add(u32::try_from(gained).unwrap_or(u32::MAX))
}

/// Drop interval for `level` (1-based) from `table`, never below `floor`
pub fn drop_interval(level: u32, table: &[Duration], floor: Duration) -> Duration {
    let index = level.saturating_sub(1) as usize;
    table.get(index).copied().unwrap_or(floor).max(floor)
}

pub fn default_drop_intervals() -> Vec<Duration> {
    DROP_INTERVALS_MS.iter().copied().map(Duration::from_millis).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_line_scores() {
        assert_eq!(score_for_rows(0, 1), 0);
        assert_eq!(score_for_rows(1, 1), 40);
        assert_eq!(score_for_rows(2, 1), 100);
        assert_eq!(score_for_rows(3, 1), 300);
        assert_eq!(score_for_rows(4, 1), 1200);
        assert_eq!(score_for_rows(4, 3), 3600);
    }

    #[test]
    fn test_more_than_four_rows_scale_linearly() {
        assert_eq!(score_for_rows(5, 1), 1500);
        assert_eq!(score_for_rows(8, 2), 4800);
    }

    #[test]
    fn test_level_zero_counts_as_one() {
        assert_eq!(score_for_rows(1, 0), 40);
    }

    #[test]
    fn test_level_progression() {
        assert_eq!(level_for(1, 0, 10), 1);
        assert_eq!(level_for(1, 9, 10), 1);
        assert_eq!(level_for(1, 10, 10), 2);
        assert_eq!(level_for(1, 35, 10), 4);
        assert_eq!(level_for(5, 3, 1), 8);
        assert_eq!(level_for(1, 5, 0), 6);
    }

    #[test]
    fn test_drop_interval_is_monotonic_with_floor() {
        let table = default_drop_intervals();
        let floor = Duration::from_millis(MIN_DROP_INTERVAL_MS);
        assert_eq!(drop_interval(1, &table, floor), Duration::from_millis(1000));
        assert_eq!(drop_interval(9, &table, floor), Duration::from_millis(160));
        assert_eq!(drop_interval(10, &table, floor), floor);
        assert_eq!(drop_interval(u32::MAX, &table, floor), floor);
        assert_eq!(drop_interval(0, &table, floor), Duration::from_millis(1000));

        let intervals: Vec<Duration> = (1..30).map(|level| drop_interval(level, &table, floor)).collect();
        assert!(intervals.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_floor_clamps_table() {
        let table = vec![Duration::from_millis(50)];
        let floor = Duration::from_millis(100);
        assert_eq!(drop_interval(1, &table, floor), floor);
    }
}
