/// Version "0": base tables for every tenant-scoped entity.
///
/// No `IF NOT EXISTS`: this only runs against a store without a version
/// marker, and leftover tables from a half-initialized store must fail loudly.
pub const SCHEMA_V0: &str = r#"
-- Domains are tenants; one per hostname
CREATE TABLE domains (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain_name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Key/value settings; domain_id NULL = global (schema version lives here)
CREATE TABLE config (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain_id INTEGER REFERENCES domains(id) ON DELETE CASCADE,
    k TEXT NOT NULL,
    v TEXT NOT NULL
);

CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    username TEXT NOT NULL,
    passwd_hash TEXT NOT NULL,         -- argon2id PHC string, never plaintext
    email TEXT,
    is_admin INTEGER NOT NULL DEFAULT 0,
    is_mod INTEGER NOT NULL DEFAULT 0,
    is_banned INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),

    UNIQUE(domain_id, username)
);

CREATE TABLE sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Content tables belong to the content layer but follow the same domain_id discipline
CREATE TABLE topics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    is_sticky INTEGER NOT NULL DEFAULT 0,
    n_comments INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content TEXT NOT NULL,
    is_sticky INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_config_domain_k ON config(domain_id, k);
CREATE INDEX idx_users_domain_email ON users(domain_id, email);
CREATE INDEX idx_users_domain_admin ON users(domain_id, is_admin);
CREATE INDEX idx_users_domain_mod ON users(domain_id, is_mod);
CREATE INDEX idx_sessions_domain_user ON sessions(domain_id, user_id);
CREATE INDEX idx_sessions_domain_token ON sessions(domain_id, token);
CREATE INDEX idx_topics_domain_sticky_created ON topics(domain_id, is_sticky, created_at);
CREATE INDEX idx_topics_domain_sticky_updated ON topics(domain_id, is_sticky, updated_at);
CREATE INDEX idx_topics_domain_user ON topics(domain_id, user_id, updated_at);
CREATE INDEX idx_comments_domain_topic ON comments(domain_id, topic_id, is_sticky, created_at);
CREATE INDEX idx_comments_domain_user ON comments(domain_id, user_id, updated_at);
"#;

/// Version "1": domain settings move from `config` rows onto the domain row,
/// and session tokens become unique per domain.
pub const SCHEMA_V1: &str = r#"
ALTER TABLE domains ADD COLUMN forum_name TEXT NOT NULL DEFAULT '';
ALTER TABLE domains ADD COLUMN signup_disabled INTEGER NOT NULL DEFAULT 0;
ALTER TABLE domains ADD COLUMN read_only INTEGER NOT NULL DEFAULT 0;

UPDATE domains SET forum_name = COALESCE(
    (SELECT v FROM config
     WHERE config.domain_id = domains.id AND config.k = 'forum_name'
     ORDER BY config.id DESC LIMIT 1),
    domain_name
);

UPDATE domains SET signup_disabled = 1
WHERE id IN (
    SELECT domain_id FROM config
    WHERE k = 'signup_disabled' AND v IN ('1', 'true') AND domain_id IS NOT NULL
);

DELETE FROM config WHERE domain_id IS NOT NULL AND k IN ('forum_name', 'signup_disabled');

-- Keep the newest row per (scope, key) so the unique index can be built
DELETE FROM config WHERE id NOT IN (
    SELECT MAX(id) FROM config GROUP BY COALESCE(domain_id, 0), k
);
CREATE UNIQUE INDEX idx_config_scope_key ON config(COALESCE(domain_id, 0), k);

DELETE FROM sessions WHERE id NOT IN (
    SELECT MAX(id) FROM sessions GROUP BY domain_id, token
);
DROP INDEX idx_sessions_domain_token;
CREATE UNIQUE INDEX idx_sessions_domain_token ON sessions(domain_id, token);
"#;
