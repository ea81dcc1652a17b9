pub mod leveling;
pub mod presence;
pub mod voice;
pub mod welcome;
