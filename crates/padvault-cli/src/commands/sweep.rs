use padvault_core::error::PadError;

use crate::app::AppContext;

pub fn handle_sweep(ctx: &AppContext, secret: Option<String>) -> anyhow::Result<()> {
    let service = ctx.open_service()?;

    match service.trigger_sweep(secret.as_deref()) {
        Ok(count) => {
            println!("Swept {} expired pad(s).", count);
            Ok(())
        }
        Err(PadError::Unauthorized) => anyhow::bail!("Invalid or missing sweep secret."),
        Err(e) => Err(e.into()),
    }
}
