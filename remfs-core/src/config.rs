//! The two documented environment variables that locate the server (spec
//! §4.1, §6): `server15440` (address) and `serverport15440` (port), each
//! falling back to a documented default when unset.

/// Default peer address for the active endpoint, used when `server15440`
/// is unset.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
/// Default TCP port for both endpoints, used when `serverport15440` is unset.
pub const DEFAULT_PORT: u16 = 15440;

/// The address and port a client should connect to, or a server should
/// bind, absent an explicit override (e.g. the server binary's
/// `--bind-port` flag).
pub fn address() -> String {
    std::env::var("server15440").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string())
}

pub fn port() -> u16 {
    std::env::var("serverport15440")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_documented_defaults_when_unset() {
        std::env::remove_var("server15440");
        std::env::remove_var("serverport15440");

        assert_eq!(address(), DEFAULT_ADDRESS);
        assert_eq!(port(), DEFAULT_PORT);
    }
}
