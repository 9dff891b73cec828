use serde::Serialize;

use crate::forum::DomainInfo;
use crate::types::{ConfigEntry, Domain};
use crate::validation::{CONFIG_KEYS, validate_domain_name, validate_forum_name};

use super::Context;
use super::prompt::{any_value, confirm_action, domain_or_pick, text_or_prompt};

const REDACTED: &str = "********";

#[derive(Serialize)]
struct InfoOutput {
    schema_version: Option<String>,
    domains: Vec<DomainInfo>,
}

pub fn run_create_domain(
    ctx: &Context,
    domain: Option<String>,
    forum_name: Option<String>,
) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domain = text_or_prompt(
        domain,
        "domain",
        "Domain name:",
        validate_domain_name,
        ctx.non_interactive,
    )?;
    let forum_name = text_or_prompt(
        forum_name,
        "forum-name",
        "Forum name:",
        validate_forum_name,
        ctx.non_interactive,
    )?;

    forum.admin().create_domain(&domain, &forum_name)?;
    println!("Created domain \"{domain}\"");
    Ok(())
}

pub fn run_rename_domain(
    ctx: &Context,
    domain: Option<String>,
    new_name: Option<String>,
) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domain = domain_or_pick(&forum, domain, ctx.non_interactive)?;
    let new_name = text_or_prompt(
        new_name,
        "new-name",
        "New domain name:",
        validate_domain_name,
        ctx.non_interactive,
    )?;

    forum.admin().rename_domain(&domain, &new_name)?;
    println!("Renamed domain \"{domain}\" to \"{new_name}\"");
    Ok(())
}

pub fn run_list_domains(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domains = forum.admin().list_domains()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&domains)?);
        return Ok(());
    }

    if domains.is_empty() {
        println!("No domains found.");
        return Ok(());
    }
    for domain in &domains {
        println!("{}", domain_line(domain));
    }
    Ok(())
}

fn domain_line(domain: &Domain) -> String {
    let mut flags = Vec::new();
    if domain.read_only {
        flags.push("read-only");
    }
    if domain.signup_disabled {
        flags.push("signup disabled");
    }
    if flags.is_empty() {
        format!("{}  {}", domain.domain_name, domain.forum_name)
    } else {
        format!(
            "{}  {}  [{}]",
            domain.domain_name,
            domain.forum_name,
            flags.join(", ")
        )
    }
}

pub fn run_delete_domain(ctx: &Context, domain: Option<String>, yes: bool) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domain = domain_or_pick(&forum, domain, ctx.non_interactive)?;

    let message = format!("Delete domain \"{domain}\" with all its users, sessions and content?");
    if !confirm_action(&message, yes, ctx.non_interactive)? {
        println!("Cancelled.");
        return Ok(());
    }

    forum.admin().delete_domain(&domain)?;
    println!("Deleted domain \"{domain}\"");
    Ok(())
}

pub fn run_set_forum_name(
    ctx: &Context,
    domain: Option<String>,
    forum_name: Option<String>,
) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domain = domain_or_pick(&forum, domain, ctx.non_interactive)?;
    let forum_name = text_or_prompt(
        forum_name,
        "forum-name",
        "Forum name:",
        validate_forum_name,
        ctx.non_interactive,
    )?;

    forum.admin().set_forum_name(&domain, &forum_name)?;
    println!("Updated forum name of \"{domain}\"");
    Ok(())
}

pub fn run_set_read_only(ctx: &Context, domain: Option<String>, read_only: bool) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domain = domain_or_pick(&forum, domain, ctx.non_interactive)?;

    forum.admin().set_read_only(&domain, read_only)?;
    if read_only {
        println!("Domain \"{domain}\" is now read-only");
    } else {
        println!("Domain \"{domain}\" is now writable");
    }
    Ok(())
}

pub fn run_set_signup_disabled(
    ctx: &Context,
    domain: Option<String>,
    disabled: bool,
) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domain = domain_or_pick(&forum, domain, ctx.non_interactive)?;

    forum.admin().set_signup_disabled(&domain, disabled)?;
    if disabled {
        println!("Signup disabled for \"{domain}\"");
    } else {
        println!("Signup enabled for \"{domain}\"");
    }
    Ok(())
}

pub fn run_set_config(
    ctx: &Context,
    domain: Option<String>,
    key: Option<String>,
    value: Option<String>,
) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let domain = domain_or_pick(&forum, domain, ctx.non_interactive)?;

    let key = match key {
        Some(key) => key,
        None if ctx.non_interactive => {
            anyhow::bail!("--key is required in non-interactive mode")
        }
        None => inquire::Select::new("Key:", CONFIG_KEYS.to_vec())
            .prompt()?
            .to_string(),
    };
    let value = text_or_prompt(value, "value", "Value:", any_value, ctx.non_interactive)?;

    forum.admin().set_config(&domain, &key, &value)?;
    println!("Set {key} for \"{domain}\"");
    Ok(())
}

fn redact(entry: ConfigEntry) -> ConfigEntry {
    if entry.key.ends_with("_pass") {
        ConfigEntry {
            key: entry.key,
            value: REDACTED.to_string(),
        }
    } else {
        entry
    }
}

pub fn run_info(ctx: &Context, domain: Option<String>, json: bool) -> anyhow::Result<()> {
    let forum = ctx.open_forum()?;
    let admin = forum.admin();

    let names: Vec<String> = match domain {
        Some(name) => vec![name],
        None => admin
            .list_domains()?
            .into_iter()
            .map(|d| d.domain_name)
            .collect(),
    };

    let mut domains = Vec::with_capacity(names.len());
    for name in &names {
        let mut info = admin.info(name)?;
        info.config = info.config.into_iter().map(redact).collect();
        domains.push(info);
    }

    let output = InfoOutput {
        schema_version: forum.store().current_version()?,
        domains,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("Orangeforum Status");
    println!("{}", "─".repeat(18));
    println!(
        "Schema version: {}",
        output.schema_version.as_deref().unwrap_or("none")
    );
    println!("Domains:        {}", output.domains.len());
    for info in &output.domains {
        println!();
        println!("{}", domain_line(&info.domain));
        println!("  Users:     {}", info.stats.users);
        println!("  Sessions:  {}", info.stats.sessions);
        println!("  Topics:    {}", info.stats.topics);
        println!("  Comments:  {}", info.stats.comments);
        for entry in &info.config {
            println!("  {} = {}", entry.key, entry.value);
        }
    }
    println!();

    Ok(())
}
