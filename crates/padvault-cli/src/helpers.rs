//! Input helpers: code prompting, content reading, key derivation.
//!
//! Codes never appear on the command line (shell history) - they are
//! prompted for, or read from environment variables for scripting.

use std::io::{IsTerminal, Read};

use dialoguer::Password;

use padvault_core::crypto::hash_code;
use padvault_core::storage::{Pad, PadLookup, SqlitePadStore};
use padvault_core::PadService;

/// Prompt for the pad code, or read from `PADVAULT_CODE`.
pub fn prompt_code() -> anyhow::Result<String> {
    if let Ok(value) = std::env::var("PADVAULT_CODE") {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }
    Password::new()
        .with_prompt("Pad code")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read code: {}", e))
}

/// Prompt for a new pad code with confirmation, or read from
/// `PADVAULT_CODE`.
pub fn prompt_new_code() -> anyhow::Result<String> {
    if let Ok(value) = std::env::var("PADVAULT_CODE") {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }
    Password::new()
        .with_prompt("Choose a pad code")
        .with_confirmation("Confirm pad code", "Codes do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read code: {}", e))
}

/// Prompt for the lock code, or read from `PADVAULT_LOCK_CODE`.
pub fn prompt_lock_code() -> anyhow::Result<String> {
    if let Ok(value) = std::env::var("PADVAULT_LOCK_CODE") {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }
    Password::new()
        .with_prompt("Lock code")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read lock code: {}", e))
}

/// Prompt for a new lock code with confirmation, or read from
/// `PADVAULT_LOCK_CODE`.
pub fn prompt_new_lock_code() -> anyhow::Result<String> {
    if let Ok(value) = std::env::var("PADVAULT_LOCK_CODE") {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }
    Password::new()
        .with_prompt("Choose a lock code")
        .with_confirmation("Confirm lock code", "Codes do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read lock code: {}", e))
}

/// Read pad content from the `--text` argument or stdin.
pub fn read_content(text: Option<String>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if std::io::stdin().is_terminal() {
        anyhow::bail!("Provide --text or pipe content on stdin.");
    }
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

/// Look up the pad for a code, mapping the non-found outcomes to
/// user-facing messages.
pub fn lookup_pad(service: &PadService<SqlitePadStore>, code: &str) -> anyhow::Result<Pad> {
    match service.open_pad(&hash_code(code))? {
        PadLookup::Found(pad) => Ok(pad),
        PadLookup::Expired => anyhow::bail!("This pad has self-destructed."),
        PadLookup::NotFound => anyhow::bail!("No pad exists for this code."),
    }
}
