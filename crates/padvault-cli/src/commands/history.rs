use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use uuid::Uuid;

use padvault_core::error::PadError;
use padvault_core::service::RestoreRevisionRequest;

use crate::app::AppContext;
use crate::helpers;

pub fn handle_list(ctx: &AppContext) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let code = helpers::prompt_code()?;
    let pad = helpers::lookup_pad(&service, &code)?;

    let revisions = service.list_revisions(pad.id)?;
    if revisions.is_empty() {
        println!("No revisions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Revision", "Created"]);
    for (index, revision) in revisions.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            revision.id.to_string(),
            revision.created_at.to_rfc3339(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn handle_restore(ctx: &AppContext, revision_id: Uuid) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let code = helpers::prompt_code()?;
    let pad = helpers::lookup_pad(&service, &code)?;

    let request = RestoreRevisionRequest {
        pad_id: pad.id,
        revision_id,
        expected_version: pad.version,
    };

    match service.restore_revision(&request) {
        Ok(restored) => {
            println!(
                "{} revision {} (now version {})",
                "Restored".green(),
                revision_id,
                restored.version
            );
            Ok(())
        }
        Err(PadError::Conflict) => anyhow::bail!(
            "The pad changed since you opened it. Open it again for the latest version, then retry."
        ),
        Err(PadError::NotFound(_)) => {
            anyhow::bail!("No such revision for this pad.")
        }
        Err(e) => Err(e.into()),
    }
}

pub fn handle_clear(ctx: &AppContext, yes: bool) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let code = helpers::prompt_code()?;
    let pad = helpers::lookup_pad(&service, &code)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete all revisions for this pad?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    service.clear_revisions(pad.id)?;
    println!("{} revision history", "Cleared".green());
    Ok(())
}
