use std::io::{self, BufRead};

use inquire::validator::Validation;
use inquire::{Confirm, Password, Select, Text};

use crate::forum::Forum;

/// Returns `value`, or prompts for it. In non-interactive mode a missing value
/// is an error naming the flag.
pub fn text_or_prompt(
    value: Option<String>,
    flag: &str,
    label: &str,
    validate: fn(&str) -> Result<(), String>,
    non_interactive: bool,
) -> anyhow::Result<String> {
    if let Some(value) = value {
        validate(&value).map_err(anyhow::Error::msg)?;
        return Ok(value);
    }
    if non_interactive {
        anyhow::bail!("--{flag} is required in non-interactive mode");
    }

    Ok(Text::new(label)
        .with_validator(move |input: &str| {
            Ok(validate(input)
                .map(|()| Validation::Valid)
                .unwrap_or_else(|e| Validation::Invalid(e.into())))
        })
        .prompt()?)
}

/// Returns `value`, or lets the operator pick from the existing domains.
pub fn domain_or_pick(
    forum: &Forum,
    value: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    if non_interactive {
        anyhow::bail!("--domain is required in non-interactive mode");
    }

    let names: Vec<String> = forum
        .domains()
        .list()?
        .into_iter()
        .map(|d| d.domain_name)
        .collect();
    if names.is_empty() {
        anyhow::bail!("No domains found. Create one with 'orangeforum create-domain'.");
    }

    Ok(Select::new("Domain:", names).prompt()?)
}

const ALL_DOMAINS_CHOICE: &str = "All domains (*)";

/// Returns `value`, or lets the operator pick one domain or all of them.
/// The result is a domain name or `*`.
pub fn scope_or_pick(
    forum: &Forum,
    value: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    if non_interactive {
        anyhow::bail!("a domain name or '*' is required in non-interactive mode");
    }

    let names = forum
        .domains()
        .list()?
        .into_iter()
        .map(|d| d.domain_name)
        .collect();
    let choice = Select::new("Sessions to drop:", scope_choices(names)).prompt()?;
    Ok(scope_from_choice(choice))
}

fn scope_choices(mut names: Vec<String>) -> Vec<String> {
    names.push(ALL_DOMAINS_CHOICE.to_string());
    names
}

fn scope_from_choice(choice: String) -> String {
    if choice == ALL_DOMAINS_CHOICE {
        "*".to_string()
    } else {
        choice
    }
}

/// Reads a new password from stdin or a hidden prompt with confirmation.
/// The password is never echoed.
pub fn new_password(password_stdin: bool, non_interactive: bool) -> anyhow::Result<String> {
    let password = if password_stdin {
        read_password_stdin()?
    } else if non_interactive {
        anyhow::bail!("--password-stdin is required in non-interactive mode");
    } else {
        Password::new("Password:")
            .with_custom_confirmation_message("Confirm password:")
            .with_custom_confirmation_error_message("Passwords do not match")
            .prompt()?
    };

    if password.trim().is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}

/// First line of stdin, without the line terminator.
pub fn read_password_stdin() -> anyhow::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(Confirm::new(message).with_default(false).prompt()?)
    }
}

pub fn any_value(_: &str) -> Result<(), String> {
    Ok(())
}
