const MAX_DOMAIN_NAME_LEN: usize = 120;
const MAX_FORUM_NAME_LEN: usize = 120;
const MAX_USERNAME_LEN: usize = 32;
const MAX_EMAIL_LEN: usize = 250;
const MAX_CONFIG_VALUE_LEN: usize = 120;

/// Domain-scoped configuration keys an operator may set.
pub const CONFIG_KEYS: &[&str] = &[
    "header_msg",
    "group_creation_disabled",
    "image_upload_enabled",
    "file_upload_enabled",
    "allow_group_subscription",
    "allow_topic_subscription",
    "data_dir",
    "default_from_mail",
    "smtp_host",
    "smtp_port",
    "smtp_user",
    "smtp_pass",
];

fn validate_name(
    name: &str,
    entity: &str,
    max_len: usize,
    extra: char,
    allowed_desc: &str,
) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if name.len() > max_len {
        return Err(format!("{entity} name cannot exceed {max_len} characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == extra)
    {
        return Err(format!("{entity} name can only contain {allowed_desc}"));
    }
    if name.starts_with('-') || name.starts_with(extra) {
        return Err(format!(
            "{entity} name cannot start with '-' or '{extra}'"
        ));
    }
    Ok(())
}

/// Domain names are hostnames: matched exactly, case preserved.
pub fn validate_domain_name(name: &str) -> Result<(), String> {
    validate_name(
        name,
        "Domain",
        MAX_DOMAIN_NAME_LEN,
        '.',
        "alphanumeric characters, hyphens, and periods",
    )
}

pub fn validate_username(name: &str) -> Result<(), String> {
    validate_name(
        name,
        "User",
        MAX_USERNAME_LEN,
        '_',
        "alphanumeric characters, hyphens, and underscores",
    )
}

pub fn validate_forum_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Forum name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_FORUM_NAME_LEN {
        return Err(format!(
            "Forum name cannot exceed {MAX_FORUM_NAME_LEN} characters"
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("Email cannot exceed {MAX_EMAIL_LEN} characters"));
    }
    match email.split_once('@') {
        Some((local, host)) if !local.is_empty() && !host.is_empty() => Ok(()),
        _ => Err(format!("Invalid email address: {email}")),
    }
}

pub fn validate_config(key: &str, value: &str) -> Result<(), String> {
    if !CONFIG_KEYS.contains(&key) {
        return Err(format!(
            "Unknown config key '{key}' (expected one of: {})",
            CONFIG_KEYS.join(", ")
        ));
    }
    if value.chars().count() > MAX_CONFIG_VALUE_LEN {
        return Err(format!(
            "Config value cannot exceed {MAX_CONFIG_VALUE_LEN} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_names() {
        assert!(validate_domain_name("a.example").is_ok());
        assert!(validate_domain_name("Forum-1.Example.ORG").is_ok());
        assert!(validate_domain_name("127.0.0.1").is_ok());
        assert!(validate_domain_name("").is_err());
        assert!(validate_domain_name(".example").is_err());
        assert!(validate_domain_name("a example").is_err());
        assert!(validate_domain_name("a/b").is_err());
        assert!(validate_domain_name(&"a".repeat(121)).is_err());
    }

    #[test]
    fn test_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_the-2nd").is_ok());
        assert!(validate_username("_alice").is_err());
        assert!(validate_username("alice.b").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_emails() {
        assert!(validate_email("alice@a.example").is_ok());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@a.example").is_err());
    }

    #[test]
    fn test_config_keys() {
        assert!(validate_config("header_msg", "Welcome").is_ok());
        assert!(validate_config("version", "9").is_err());
        assert!(validate_config("header_msg", &"x".repeat(121)).is_err());
    }
}
