use owo_colors::OwoColorize;

use crate::app::AppContext;

pub fn handle_init(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.open_service()?;
    println!(
        "{} pad store at {}",
        "Initialized".green(),
        ctx.store_path().display()
    );
    Ok(())
}
