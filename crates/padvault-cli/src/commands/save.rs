use owo_colors::OwoColorize;

use padvault_core::crypto::{decode_salt, derive_key, encrypt_with_optional_lock};
use padvault_core::error::PadError;
use padvault_core::service::UpdatePadRequest;
use padvault_core::validation::count_words;

use crate::app::AppContext;
use crate::helpers;

pub fn handle_save(ctx: &AppContext, text: Option<String>) -> anyhow::Result<()> {
    let service = ctx.open_service()?;

    let code = helpers::prompt_code()?;
    let pad = helpers::lookup_pad(&service, &code)?;
    let content = helpers::read_content(text)?;

    let salt_bytes = decode_salt(&pad.salt)?;
    let primary = derive_key(&code, &salt_bytes)?;
    // A locked pad stays locked: re-sealing needs the lock code too
    let lock = if pad.is_locked {
        Some(derive_key(&helpers::prompt_lock_code()?, &salt_bytes)?)
    } else {
        None
    };

    let sealed = encrypt_with_optional_lock(&content, &primary, lock.as_ref())?;

    let request = UpdatePadRequest {
        pad_id: pad.id,
        payload: sealed.payload,
        word_count: count_words(&content),
        is_locked: sealed.is_locked,
        self_destruct_at: pad.self_destruct_at,
        expected_version: pad.version,
    };

    match service.update_pad(&request) {
        Ok(updated) => {
            println!(
                "{} ({} words, version {})",
                "Saved".green(),
                updated.word_count,
                updated.version
            );
            Ok(())
        }
        Err(PadError::Conflict) => anyhow::bail!(
            "The pad changed since you opened it. Open it again for the latest version, then save."
        ),
        Err(PadError::NotFound(_)) => anyhow::bail!("The pad no longer exists."),
        Err(e) => Err(e.into()),
    }
}
