mod server;

pub use server::{DEFAULT_DB_FILE, ForumConfig, ServerConfig, SessionsConfig, StoreConfig};
