use inquire::MultiSelect;

use crate::forum::Forum;
use crate::types::RoleFlags;
use crate::validation::{validate_email, validate_username};

use super::prompt::{confirm_action, domain_or_pick, new_password, text_or_prompt};
use super::{Context, UserArgs};

/// Resolves the domain and username, prompting for whichever is missing.
fn user_target(forum: &Forum, ctx: &Context, args: UserArgs) -> anyhow::Result<(String, String)> {
    let domain = domain_or_pick(forum, args.domain, ctx.non_interactive)?;
    let username = text_or_prompt(
        args.username,
        "username",
        "Username:",
        validate_username,
        ctx.non_interactive,
    )?;
    Ok((domain, username))
}

pub fn run_create_user(
    ctx: &Context,
    args: UserArgs,
    email: Option<String>,
    moderator: bool,
    password_stdin: bool,
) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let (domain, username) = user_target(&forum, ctx, args)?;
    if let Some(email) = &email {
        validate_email(email).map_err(anyhow::Error::msg)?;
    }
    let password = new_password(password_stdin, ctx.non_interactive)?;

    let roles = if moderator {
        RoleFlags::MODERATOR
    } else {
        RoleFlags::USER
    };
    forum
        .admin()
        .create_user(&domain, &username, &password, roles, email.as_deref())?;

    println!("Created user \"{username}\" in \"{domain}\"");
    Ok(())
}

pub fn run_create_admin_user(ctx: &Context, args: UserArgs, password_stdin: bool) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let (domain, username) = user_target(&forum, ctx, args)?;
    let password = new_password(password_stdin, ctx.non_interactive)?;

    forum.admin().create_admin_user(&domain, &username, &password)?;

    println!("Created admin user \"{username}\" in \"{domain}\"");
    Ok(())
}

pub fn run_change_password(
    ctx: &Context,
    args: UserArgs,
    evict_sessions: bool,
    password_stdin: bool,
) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let (domain, username) = user_target(&forum, ctx, args)?;
    let password = new_password(password_stdin, ctx.non_interactive)?;

    forum
        .admin()
        .change_password(&domain, &username, &password, evict_sessions)?;

    if evict_sessions {
        println!("Changed password for \"{username}\" and dropped their sessions");
    } else {
        println!("Changed password for \"{username}\"");
    }
    Ok(())
}

pub fn run_ban_user(ctx: &Context, args: UserArgs) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let (domain, username) = user_target(&forum, ctx, args)?;

    let dropped = forum.admin().ban_user(&domain, &username)?;
    println!("Banned \"{username}\" in \"{domain}\" ({dropped} session(s) dropped)");
    Ok(())
}

pub fn run_unban_user(ctx: &Context, args: UserArgs) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let (domain, username) = user_target(&forum, ctx, args)?;

    forum.admin().unban_user(&domain, &username)?;
    println!("Unbanned \"{username}\" in \"{domain}\"");
    Ok(())
}

pub fn run_set_roles(ctx: &Context, args: UserArgs, roles: Option<String>) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let (domain, username) = user_target(&forum, ctx, args)?;

    let roles = match roles {
        Some(list) => RoleFlags::parse_many(&list)
            .ok_or_else(|| anyhow::anyhow!("Invalid roles '{list}' (expected user, mod, admin)"))?,
        None if ctx.non_interactive => {
            anyhow::bail!("--roles is required in non-interactive mode")
        }
        None => {
            let picked = MultiSelect::new("Roles:", vec!["mod", "admin"]).prompt()?;
            picked
                .iter()
                .filter_map(|r| RoleFlags::parse(r))
                .fold(RoleFlags::USER, RoleFlags::union)
        }
    };

    forum.admin().set_roles(&domain, &username, roles)?;
    println!("Set roles of \"{username}\" to {roles}");
    Ok(())
}

pub fn run_list_users(ctx: &Context, domain: Option<String>, json: bool) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domain = domain_or_pick(&forum, domain, ctx.non_interactive)?;
    let users = forum.admin().list_users(&domain)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users in \"{domain}\".");
        return Ok(());
    }
    for user in &users {
        let banned = if user.is_banned { "  [banned]" } else { "" };
        println!("{}  {}{}", user.username, user.roles(), banned);
    }
    Ok(())
}

pub fn run_delete_user(ctx: &Context, args: UserArgs, yes: bool) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let (domain, username) = user_target(&forum, ctx, args)?;

    let message = format!("Delete user \"{username}\" from \"{domain}\"?");
    if !confirm_action(&message, yes, ctx.non_interactive)? {
        println!("Cancelled.");
        return Ok(());
    }

    forum.admin().delete_user(&domain, &username)?;
    println!("Deleted user \"{username}\"");
    Ok(())
}

pub fn run_logout_user(ctx: &Context, args: UserArgs) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let (domain, username) = user_target(&forum, ctx, args)?;

    let dropped = forum.admin().logout_user(&domain, &username)?;
    println!("Dropped {dropped} session(s) for \"{username}\"");
    Ok(())
}
