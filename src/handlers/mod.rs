// handlers/mod.rs - HTTP handlers grouped by access tier
//
// public    - no authentication (banner, health, signup, login)
// protected - bearer token always required
// data      - game data passthrough; gated only when SECURITY_REQUIRE_AUTH is set

pub mod data;
pub mod protected;
pub mod public;
