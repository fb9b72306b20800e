use owo_colors::OwoColorize;

use padvault_core::crypto::{decode_salt, derive_key, encrypt_with_optional_lock, generate_salt, hash_code};
use padvault_core::error::PadError;
use padvault_core::service::CreatePadRequest;
use padvault_core::validation::count_words;

use crate::app::{AppContext, CLIENT_KEY};
use crate::helpers;

pub fn handle_create(ctx: &AppContext, text: Option<String>, locked: bool) -> anyhow::Result<()> {
    let service = ctx.open_service()?;

    let code = helpers::prompt_new_code()?;
    let lock_code = if locked {
        Some(helpers::prompt_new_lock_code()?)
    } else {
        None
    };
    let content = helpers::read_content(text)?;

    // All key material stays on this side of the store
    let salt = generate_salt();
    let salt_bytes = decode_salt(&salt)?;
    let primary = derive_key(&code, &salt_bytes)?;
    let lock = lock_code
        .as_deref()
        .map(|code| derive_key(code, &salt_bytes))
        .transpose()?;

    let sealed = encrypt_with_optional_lock(&content, &primary, lock.as_ref())?;

    let request = CreatePadRequest {
        pad_hash: hash_code(&code),
        payload: sealed.payload,
        salt,
        word_count: count_words(&content),
        is_locked: sealed.is_locked,
    };

    match service.create_pad(CLIENT_KEY, &request) {
        Ok(pad) => {
            println!("{} pad ({} words)", "Created".green(), pad.word_count);
            println!("The code cannot be recovered. Keep it safe.");
            Ok(())
        }
        Err(PadError::AlreadyExists) => {
            anyhow::bail!("A pad with this code already exists.")
        }
        Err(PadError::RateLimited) => anyhow::bail!("Rate limit exceeded. Try again shortly."),
        Err(e) => Err(e.into()),
    }
}
