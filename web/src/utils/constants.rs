//! Application constants

/// Directory service base URL.
pub const API_BASE: &str = "http://43.207.147.137:3001";

// RIZZ token contract (Polygon Amoy)
pub const RIZZ_CONTRACT_ADDRESS: &str = "0x7B7E367B6F328F16cfe61336928908cc91289353";
pub const RIZZ_SYMBOL: &str = "RIZZ";
pub const RIZZ_DECIMALS: u32 = 18;
/// One-time bonus minted by the contract's `register()`.
pub const WELCOME_BONUS_RIZZ: u64 = 5;

// Application chain: Polygon Amoy (80002)
pub const CHAIN_ID_HEX: &str = "0x13882";
pub const CHAIN_NAME: &str = "Polygon Amoy";
pub const CHAIN_RPC_URL: &str = "https://rpc-amoy.polygon.technology";
pub const CHAIN_EXPLORER_URL: &str = "https://amoy.polygonscan.com";
pub const NATIVE_CURRENCY_SYMBOL: &str = "POL";

// Registration form bounds (characters, after trimming)
pub const NICKNAME_MIN_CHARS: usize = 2;
pub const NICKNAME_MAX_CHARS: usize = 20;

/// Score used when the match endpoint fails or returns garbage.
pub const DEFAULT_MATCH_PERCENTAGE: u8 = 70;

/// Candidates fetched per discover-feed load.
pub const DISCOVER_FEED_LIMIT: usize = 20;

/// Probability that a like turns into a mutual match. The directory service
/// has no like/pass endpoint, so mutual interest is decided locally.
pub const MUTUAL_MATCH_PROBABILITY: f64 = 0.3;

// Timing
pub const REQUEST_TIMEOUT_MS: u32 = 10_000;
pub const RECEIPT_POLL_INTERVAL_MS: u32 = 2_000;
pub const RECEIPT_POLL_ATTEMPTS: u32 = 60;
pub const CHAT_REFRESH_INTERVAL_MS: u32 = 5_000;
pub const TOAST_DISMISS_MS: u32 = 4_000;
