mod middleware;
mod password;
mod session;

pub use middleware::{AuthError, ForumDomain, RequireSession, bearer_token, strip_port};
pub use password::PasswordHasher;
pub use session::{TOKEN_LENGTH, generate_session_token, is_well_formed};
