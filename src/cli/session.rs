use crate::forum::SessionScope;

use super::Context;
use super::prompt::{confirm_action, scope_or_pick};

pub fn run_drop_sessions(ctx: &Context, scope: Option<String>, yes: bool) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let scope = SessionScope::parse(&scope_or_pick(&forum, scope, ctx.non_interactive)?);

    let message = match &scope {
        SessionScope::All => "Drop sessions in ALL domains?".to_string(),
        SessionScope::Domain(name) => format!("Drop all sessions in \"{name}\"?"),
    };
    if !confirm_action(&message, yes, ctx.non_interactive)? {
        println!("Cancelled.");
        return Ok(());
    }

    let dropped = forum.admin().drop_sessions(&scope)?;
    match scope {
        SessionScope::All => println!("Dropped {dropped} session(s) across all domains"),
        SessionScope::Domain(name) => println!("Dropped {dropped} session(s) in \"{name}\""),
    }

    Ok(())
}
