/// XP totals on both sides of a single award.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XpChange {
    pub previous_xp: u64,
    pub new_xp: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct LeaderboardEntry {
    pub user_id: u64,
    pub xp: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct XpTransfer {
    pub from_xp: u64,
    pub to_xp: u64,
}
