pub const INVALID_INPUT: &str = "invalid_input";
pub const TOO_LARGE: &str = "too_large";
pub const RESOLUTION_FAILED: &str = "resolution_failed";
pub const FETCH_FAILED: &str = "fetch_failed";
pub const GATEWAY_FAILED: &str = "gateway_failed";
pub const PARSE_FAILED: &str = "parse_failed";
pub const RENDER_FAILED: &str = "render_failed";
pub const PUBLISH_FAILED: &str = "publish_failed";
pub const INTERNAL_ERROR: &str = "internal_error";
