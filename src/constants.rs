/// Constants module to avoid magic numbers in the codebase

// API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

// Response caches
pub const USER_CACHE_TTL_MS: u64 = 10 * 60 * 1000; // 10 minutes

// Image cache
pub const IMAGE_MEMORY_CAPACITY: usize = 50;
pub const IMAGE_JPEG_QUALITY: u8 = 85;
pub const IMAGE_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const IMAGE_READ_TIMEOUT_SECS: u64 = 10;
pub const IMAGE_CACHE_DIR_NAME: &str = "image_cache";
pub const IMAGE_USER_AGENT: &str = "Mozilla/5.0";

// Failure messages shown to the user
pub const MSG_EMPTY_RESPONSE_BODY: &str = "empty response body";
pub const MSG_UNPARSEABLE_ERROR: &str = "failed to parse error response";
pub const MSG_BLANK_URL: &str = "image url is blank";

// Storage
pub const APP_NAME: &str = "campus";
pub const TOKEN_FILE_NAME: &str = "session.token";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const ENV_PREFIX: &str = "CAMPUS_";
