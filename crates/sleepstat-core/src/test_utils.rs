//! Shared test utilities for unit tests
//!
//! Integration tests cannot see this module because it is `#[cfg(test)]`;
//! they keep their own helpers in `tests/common/mod.rs`.

use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

// Serializes environment variable modifications across tests
pub static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// RAII guard for environment variable manipulation in tests
///
/// Restores every touched variable when dropped, even if the test panics.
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    /// Create a new environment variable guard
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set an environment variable and save its original value for restoration
    pub fn set(&mut self, key: &str, value: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        // env::set_var is unsafe since Rust 2024; callers hold ENV_MUTEX
        unsafe {
            env::set_var(key, value);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}
