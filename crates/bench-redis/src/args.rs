//! CLI argument definitions for the Redis backend.

use clap::Args;

/// Redis connection arguments.
#[derive(Args, Clone, Debug)]
pub struct RedisArgs {
    /// Redis URL (e.g., redis://:password@localhost:6379/0)
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,
}
