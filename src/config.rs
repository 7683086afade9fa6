//! Service configuration from environment variables.
//!
//! Model-client settings live in [`crate::llm::config`]; this module covers
//! the chat pipeline and the HTTP server. Unparseable values fall back to
//! their defaults.

use crate::markup::CompileLimits;

pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CHAT_MAX_HISTORY: usize = 20;
pub const DEFAULT_CHAT_MAX_IMAGES: usize = 4;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// CHAT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Most recent turns forwarded upstream.
    pub max_history: usize,
    /// Images forwarded per turn.
    pub max_images: usize,
    pub limits: CompileLimits,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_CHAT_MAX_TOKENS,
            temperature: DEFAULT_CHAT_TEMPERATURE,
            max_history: DEFAULT_CHAT_MAX_HISTORY,
            max_images: DEFAULT_CHAT_MAX_IMAGES,
            limits: CompileLimits::default(),
        }
    }
}

impl ChatSettings {
    /// `CHAT_MAX_TOKENS`, `CHAT_TEMPERATURE`, `CHAT_MAX_HISTORY`,
    /// `CHAT_MAX_IMAGES`, `COMPILE_MAX_DEPTH`, `COMPILE_MAX_NODES`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_tokens: env_parse("CHAT_MAX_TOKENS", defaults.max_tokens),
            temperature: env_parse("CHAT_TEMPERATURE", defaults.temperature),
            max_history: env_parse("CHAT_MAX_HISTORY", defaults.max_history).max(1),
            max_images: env_parse("CHAT_MAX_IMAGES", defaults.max_images),
            limits: CompileLimits {
                max_depth: env_parse("COMPILE_MAX_DEPTH", defaults.limits.max_depth).max(1),
                max_nodes: env_parse("COMPILE_MAX_NODES", defaults.limits.max_nodes).max(1),
            },
        }
    }
}

// =============================================================================
// SERVER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub body_limit: usize,
}

impl ServerConfig {
    /// `PORT`, `BODY_LIMIT_BYTES`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            body_limit: env_parse("BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT_BYTES),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
