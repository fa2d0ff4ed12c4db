//! `Set-Cookie` values for the access token.
//!
//! Policy:
//! - Production: `Secure; SameSite=None` (frontend is served from another origin)
//! - Development: `SameSite=Strict`, no `Secure` (plain http on localhost)
use crate::config::AppEnv;

pub const TOKEN_COOKIE_NAME: &str = "token";

pub fn token_cookie(token: &str, max_age_seconds: u64, app_env: AppEnv) -> String {
    format!(
        "{TOKEN_COOKIE_NAME}={token}; HttpOnly; Path=/; Max-Age={max_age_seconds}; {}",
        same_site(app_env)
    )
}

pub fn clear_token_cookie(app_env: AppEnv) -> String {
    format!(
        "{TOKEN_COOKIE_NAME}=; HttpOnly; Path=/; Max-Age=0; {}",
        same_site(app_env)
    )
}

fn same_site(app_env: AppEnv) -> &'static str {
    if app_env.is_production() {
        "Secure; SameSite=None"
    } else {
        "SameSite=Strict"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_cookie_is_secure_cross_site() {
        let cookie = token_cookie("abc", 3600, AppEnv::Production);
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
    }

    #[test]
    fn development_cookie_is_strict_without_secure() {
        let cookie = token_cookie("abc", 3600, AppEnv::Development);
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cookie = clear_token_cookie(AppEnv::Development);
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
