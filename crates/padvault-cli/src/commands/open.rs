use padvault_core::crypto::{decode_salt, decrypt_with_optional_lock, derive_key};
use padvault_core::error::PadError;

use crate::app::AppContext;
use crate::helpers;

pub fn handle_open(ctx: &AppContext, meta: bool) -> anyhow::Result<()> {
    let service = ctx.open_service()?;

    let code = helpers::prompt_code()?;
    let pad = helpers::lookup_pad(&service, &code)?;

    let salt_bytes = decode_salt(&pad.salt)?;
    let primary = derive_key(&code, &salt_bytes)?;
    let payload = pad.payload();

    let plaintext = match decrypt_with_optional_lock(&payload, &primary, pad.is_locked, None) {
        Ok(text) => text,
        Err(PadError::LockCodeRequired) => {
            let lock_code = helpers::prompt_lock_code()?;
            let lock = derive_key(&lock_code, &salt_bytes)?;
            decrypt_with_optional_lock(&payload, &primary, pad.is_locked, Some(&lock))
                .map_err(|_| anyhow::anyhow!("Invalid code(s)."))?
        }
        // Never hint at which layer or code failed
        Err(_) => anyhow::bail!("Invalid code(s)."),
    };

    if meta {
        println!("words: {}", pad.word_count);
        println!("locked: {}", pad.is_locked);
        println!("version: {}", pad.version);
        println!("updated: {}", pad.updated_at.to_rfc3339());
        match pad.self_destruct_at {
            Some(at) => println!("self-destructs: {}", at.to_rfc3339()),
            None => println!("self-destructs: never"),
        }
        println!();
    }

    println!("{plaintext}");
    Ok(())
}
