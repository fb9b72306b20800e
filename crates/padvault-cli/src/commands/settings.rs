use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use padvault_core::error::PadError;
use padvault_core::service::SettingsUpdateRequest;

use crate::app::AppContext;
use crate::helpers;

pub fn handle_settings(ctx: &AppContext, at: Option<String>, clear: bool) -> anyhow::Result<()> {
    if at.is_none() && !clear {
        anyhow::bail!("Pass --at <time> or --clear.");
    }

    let self_destruct_at = at
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| anyhow::anyhow!("Invalid time {:?}: {}", raw, e))
        })
        .transpose()?;

    let service = ctx.open_service()?;
    let code = helpers::prompt_code()?;
    let pad = helpers::lookup_pad(&service, &code)?;

    let request = SettingsUpdateRequest {
        pad_id: pad.id,
        self_destruct_at,
    };

    match service.update_settings(&request) {
        Ok(updated) => {
            match updated.self_destruct_at {
                Some(at) => println!(
                    "{} self-destruct set for {}",
                    "Updated:".green(),
                    at.to_rfc3339()
                ),
                None => println!("{} self-destruct cleared", "Updated:".green()),
            }
            Ok(())
        }
        Err(PadError::NotFound(_)) => anyhow::bail!("The pad no longer exists."),
        Err(e) => Err(e.into()),
    }
}
