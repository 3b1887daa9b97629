//! System-wide constants for the Draftmatch core.

/// Players per formed match in duel mode (two captains, no pool).
pub const DUEL_PLAYERS: usize = 2;

/// Players per formed match in squad mode (two captains, eight in the pool).
pub const SQUAD_PLAYERS: usize = 10;

/// Rating assumed for identities the rating directory does not know.
pub const DEFAULT_RATING: u32 = 1000;

/// Maximum identities a single lobby queue may hold (including joins held
/// while a draft is in progress).
pub const DEFAULT_MAX_PENDING: usize = 1_000;

/// Capacity of each per-lobby broadcast channel.
pub const BROADCAST_CHANNEL_CAPACITY: usize = 256;

/// Rating given to synthetic placeholder players by the placeholder fill policy.
pub const DEFAULT_PLACEHOLDER_RATING: u32 = 0;

/// Prefix for synthetic placeholder identities (`bot-1`, `bot-2`, ...).
pub const PLACEHOLDER_PREFIX: &str = "bot-";

/// The stock map pool.
pub const DEFAULT_MAPS: [&str; 7] = [
    "Sandstone",
    "Province",
    "Rust",
    "Zone 7",
    "Dune",
    "Breeze",
    "Hanami",
];

/// Upper rating bounds (exclusive) for skill levels 1 through 9.
/// Anything at or above the last bound is level 10.
pub const SKILL_LEVEL_BOUNDS: [u32; 9] = [1150, 1300, 1500, 1700, 1900, 2200, 2500, 2700, 3000];

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Draftmatch";
