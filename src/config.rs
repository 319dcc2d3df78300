use crate::common::PlayerId;

pub const BOARD_SIZE: usize = 10;
pub const MAX_SHIP_LENGTH: usize = 4;
pub const FLEET_SIZE: usize = 10;
/// Ship lengths of the standard fleet, largest first.
pub const FLEET: [usize; FLEET_SIZE] = [4, 3, 3, 2, 2, 2, 1, 1, 1, 1];

/// Reserved identity of the computer opponent. Sessions start at 1.
pub const BOT_ID: PlayerId = 0;

/// Default window for the bot's "thinking time" before each shot.
pub const BOT_MIN_DELAY_MS: u64 = 500;
pub const BOT_MAX_DELAY_MS: u64 = 1500;

/// Largest accepted frame (1 MB); a full fleet message is a few hundred bytes.
pub const MAX_FRAME_SIZE: u32 = 1_000_000;

/// Wire name of a ship by length.
pub fn ship_kind(length: usize) -> &'static str {
    match length {
        1 => "small",
        2 => "medium",
        3 => "large",
        4 => "huge",
        _ => "unknown",
    }
}

/// Runtime settings of the server process.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: std::string::String,
    pub bot_min_delay: std::time::Duration,
    pub bot_max_delay: std::time::Duration,
    /// Fix the RNG seed for reproducible games.
    pub seed: Option<u64>,
}

#[cfg(feature = "std")]
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".into(),
            bot_min_delay: std::time::Duration::from_millis(BOT_MIN_DELAY_MS),
            bot_max_delay: std::time::Duration::from_millis(BOT_MAX_DELAY_MS),
            seed: None,
        }
    }
}

#[cfg(feature = "std")]
impl ServerConfig {
    /// Reject settings the arbiter cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bot_min_delay > self.bot_max_delay {
            return Err(anyhow::anyhow!(
                "bot delay window is empty: min {:?} > max {:?}",
                self.bot_min_delay,
                self.bot_max_delay
            ));
        }
        Ok(())
    }
}
