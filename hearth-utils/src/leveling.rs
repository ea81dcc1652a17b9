/// Cumulative XP required to reach each level, starting with level 1.
pub const LEVEL_THRESHOLDS: [u64; 100] = [
    100, 250, 450, 700, 1_000, 1_350, 1_750, 2_200, 2_700, 3_250, 3_850, 4_500, 5_200, 5_950,
    6_750, 7_600, 8_500, 9_450, 10_450, 11_500, 12_600, 13_750, 14_950, 16_200, 17_500, 18_850,
    20_250, 21_700, 23_200, 24_750, 26_350, 28_000, 29_700, 31_450, 33_250, 35_100, 37_000,
    38_950, 40_950, 43_000, 45_100, 47_250, 49_450, 51_700, 54_000, 56_350, 58_750, 61_200,
    63_700, 66_250, 68_850, 71_500, 74_200, 76_950, 79_750, 82_600, 85_500, 88_450, 91_450,
    94_500, 97_600, 100_750, 103_950, 107_200, 110_500, 113_850, 117_250, 120_700, 124_200,
    127_750, 131_350, 135_000, 138_700, 142_450, 146_250, 150_100, 154_000, 157_950, 161_950,
    166_000, 170_100, 174_250, 178_450, 182_700, 187_000, 191_350, 195_750, 200_200, 204_700,
    209_250, 213_850, 218_500, 223_200, 227_950, 232_750, 237_600, 242_500, 247_450, 252_450,
    257_500,
];

pub const MAX_LEVEL: u32 = LEVEL_THRESHOLDS.len() as u32;

const PROGRESS_BAR_WIDTH: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub total_xp: u64,
    /// Cumulative XP at which the current level started.
    pub level_floor_xp: u64,
    /// Cumulative XP needed for the next level; equals the floor at max level.
    pub next_level_xp: u64,
    /// XP earned since the current level started.
    pub progress_xp: u64,
    /// XP span between the current and next level.
    pub required_xp: u64,
}

impl LevelProgress {
    pub fn for_xp(total_xp: u64) -> Self {
        let level = level_for_xp(total_xp);
        let level_floor_xp = level_floor(level);

        let next_level_xp = LEVEL_THRESHOLDS
            .get(level as usize)
            .copied()
            .unwrap_or(level_floor_xp);

        Self {
            level,
            total_xp,
            level_floor_xp,
            next_level_xp,
            progress_xp: total_xp.saturating_sub(level_floor_xp),
            required_xp: next_level_xp.saturating_sub(level_floor_xp),
        }
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    /// Rounded percentage toward the next level, 100 at max level.
    pub fn percent(&self) -> u64 {
        if self.required_xp == 0 {
            return 100;
        }

        let scaled = self.progress_xp.saturating_mul(100) + self.required_xp / 2;
        (scaled / self.required_xp).min(100)
    }

    pub fn remaining_xp(&self) -> u64 {
        self.next_level_xp.saturating_sub(self.total_xp)
    }
}

/// Number of thresholds reached by `total_xp`.
pub fn level_for_xp(total_xp: u64) -> u32 {
    LEVEL_THRESHOLDS.partition_point(|threshold| *threshold <= total_xp) as u32
}

fn level_floor(level: u32) -> u64 {
    match level {
        0 => 0,
        n => LEVEL_THRESHOLDS[(n as usize - 1).min(LEVEL_THRESHOLDS.len() - 1)],
    }
}

/// Text progress bar, e.g. `▰▰▰▱▱▱`.
pub fn progress_bar(percent: u64) -> String {
    let filled = (percent.min(100) as usize * PROGRESS_BAR_WIDTH + 50) / 100;
    let mut bar = "▰".repeat(filled);
    bar.push_str(&"▱".repeat(PROGRESS_BAR_WIDTH - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::{LEVEL_THRESHOLDS, LevelProgress, MAX_LEVEL, level_for_xp, progress_bar};

    #[test]
    fn thresholds_are_strictly_increasing() {
        assert!(LEVEL_THRESHOLDS.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(LEVEL_THRESHOLDS[0], 100);
        assert_eq!(LEVEL_THRESHOLDS[99], 257_500);
    }

    #[test]
    fn level_counts_reached_thresholds() {
        assert_eq!(level_for_xp(0), 0);
        assert_eq!(level_for_xp(99), 0);
        assert_eq!(level_for_xp(100), 1);
        assert_eq!(level_for_xp(249), 1);
        assert_eq!(level_for_xp(250), 2);
        assert_eq!(level_for_xp(257_499), 99);
        assert_eq!(level_for_xp(257_500), MAX_LEVEL);
        assert_eq!(level_for_xp(u64::MAX), MAX_LEVEL);
    }

    #[test]
    fn progress_inside_a_level() {
        let progress = LevelProgress::for_xp(175);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.level_floor_xp, 100);
        assert_eq!(progress.next_level_xp, 250);
        assert_eq!(progress.progress_xp, 75);
        assert_eq!(progress.required_xp, 150);
        assert_eq!(progress.percent(), 50);
        assert_eq!(progress.remaining_xp(), 75);
        assert!(!progress.is_max_level());
    }

    #[test]
    fn progress_from_zero() {
        let progress = LevelProgress::for_xp(33);
        assert_eq!(progress.level, 0);
        assert_eq!(progress.level_floor_xp, 0);
        assert_eq!(progress.next_level_xp, 100);
        assert_eq!(progress.percent(), 33);
    }

    #[test]
    fn max_level_reports_complete() {
        let progress = LevelProgress::for_xp(300_000);
        assert!(progress.is_max_level());
        assert_eq!(progress.required_xp, 0);
        assert_eq!(progress.percent(), 100);
        assert_eq!(progress.remaining_xp(), 0);
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0).chars().filter(|c| *c == '▰').count(), 0);
        assert_eq!(progress_bar(50).chars().filter(|c| *c == '▰').count(), 10);
        assert_eq!(progress_bar(100).chars().filter(|c| *c == '▱').count(), 0);
        assert_eq!(progress_bar(250).chars().count(), 20);
    }
}
