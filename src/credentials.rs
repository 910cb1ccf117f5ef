use std::fmt;
use std::path::PathBuf;

/// Env var holding the server's default upstream key.
pub const SERVER_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Env var a client may use for its own key instead of typing it in.
pub const CLIENT_KEY_VAR: &str = "COPYCODE_API_KEY";

/// An API key that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Return candidate .env paths in priority order.
fn env_file_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/copycode/.env"));
    }
    paths.push(PathBuf::from(".env"));
    paths
}

/// Load .env files into the process environment.
///
/// Earlier files win because dotenvy does not overwrite variables that are
/// already set, and variables exported by the shell win over every file.
pub fn load_env_files() {
    for path in env_file_paths() {
        if path.exists()
            && let Err(e) = dotenvy::from_path(&path)
        {
            tracing::warn!(path = %path.display(), "failed to load env file: {e}");
        }
    }
}

/// Read a non-empty environment variable.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// The key a client starts with: its own var first, then the server var so a
/// single `.env` works for both halves on one machine.
pub fn load_client_key() -> Option<ApiKey> {
    env_var(CLIENT_KEY_VAR)
        .or_else(|| env_var(SERVER_KEY_VAR))
        .and_then(ApiKey::new)
}

/// Pick the request's key if it has one, otherwise the server default.
pub fn resolve_key(request_key: Option<&str>, server_default: Option<&ApiKey>) -> Option<ApiKey> {
    request_key
        .and_then(ApiKey::new)
        .or_else(|| server_default.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_are_rejected() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new(" sk-ant \n").unwrap().expose(), "sk-ant");
    }

    #[test]
    fn debug_output_hides_key() {
        let key = ApiKey::new("sk-ant-secret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }

    #[test]
    fn request_key_wins_over_default() {
        let default = ApiKey::new("server").unwrap();
        let key = resolve_key(Some("client"), Some(&default)).unwrap();
        assert_eq!(key.expose(), "client");
    }

    #[test]
    fn empty_request_key_falls_back_to_default() {
        let default = ApiKey::new("server").unwrap();
        let key = resolve_key(Some(""), Some(&default)).unwrap();
        assert_eq!(key.expose(), "server");
    }

    #[test]
    fn no_key_anywhere_resolves_to_none() {
        assert!(resolve_key(None, None).is_none());
        assert!(resolve_key(Some("  "), None).is_none());
    }
}
