// Startup banner
// Human-readable summary of where the server can be reached and how it is set up

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use crate::config::Config;
use crate::handler::diagnostics::{LOGS_PATH, TEST_PATH};

/// Build the banner printed once the listener is bound.
///
/// Network URLs are listed only when bound to all interfaces; with no
/// usable address the network line falls back to `localhost`.
pub fn banner_lines(
    config: &Config,
    root: &Path,
    addr: SocketAddr,
    network: &[Ipv4Addr],
) -> Vec<String> {
    let port = addr.port();
    let local_host = if addr.ip().is_unspecified() {
        "localhost".to_string()
    } else {
        addr.ip().to_string()
    };
    let local_url = format!("http://{local_host}:{port}");

    let mut lines = vec![
        "======================================".to_string(),
        format!("ParkMaster server v{}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!("  Local:    {local_url}"),
    ];

    if addr.ip().is_unspecified() {
        if network.is_empty() {
            lines.push(format!("  Network:  http://localhost:{port}"));
        }
        for ip in network {
            lines.push(format!("  Network:  http://{ip}:{port}"));
        }
    }

    lines.push(String::new());
    lines.push(format!("  Profile:  {}", config.server.profile));
    lines.push(format!("  Root:     {}", root.display()));
    lines.push(format!("  Assets:   {}", config.site.assets_prefix));
    lines.push(format!("  Cache:    {}", on_off(config.http.enable_cache)));
    lines.push(format!(
        "  Headers:  security {}, cors {}",
        on_off(config.http.security_headers),
        on_off(config.http.enable_cors)
    ));
    lines.push(format!(
        "  Logging:  level {}, access log {} ({})",
        config.logging.level,
        on_off(config.logging.access_log),
        config.logging.access_log_format
    ));

    if config.diagnostics.enabled {
        lines.push(String::new());
        lines.push(format!("  Test URL: {local_url}{TEST_PATH}"));
        lines.push(format!("  Logs URL: {local_url}{LOGS_PATH}"));
    }

    lines.push("======================================".to_string());
    lines
}

const fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[String]) -> String {
        lines.join("\n")
    }

    #[test]
    fn test_lists_every_network_address() {
        let cfg = Config::defaults().unwrap();
        let lines = banner_lines(
            &cfg,
            Path::new("/srv/dist"),
            "0.0.0.0:3000".parse().unwrap(),
            &[Ipv4Addr::new(192, 168, 1, 20), Ipv4Addr::new(10, 0, 0, 5)],
        );
        let text = text(&lines);
        assert!(text.contains("Local:    http://localhost:3000"));
        assert!(text.contains("Network:  http://192.168.1.20:3000"));
        assert!(text.contains("Network:  http://10.0.0.5:3000"));
        assert!(text.contains("Root:     /srv/dist"));
        assert!(!text.contains("Test URL"));
    }

    #[test]
    fn test_no_addresses_falls_back_to_localhost() {
        let cfg = Config::defaults().unwrap();
        let lines = banner_lines(&cfg, Path::new("dist"), "0.0.0.0:5000".parse().unwrap(), &[]);
        assert!(text(&lines).contains("Network:  http://localhost:5000"));
    }

    #[test]
    fn test_loopback_bind_hides_network_urls() {
        let mut cfg = Config::defaults().unwrap();
        cfg.diagnostics.enabled = true;
        let lines = banner_lines(
            &cfg,
            Path::new("dist"),
            "127.0.0.1:5000".parse().unwrap(),
            &[Ipv4Addr::new(192, 168, 1, 20)],
        );
        let text = text(&lines);
        assert!(text.contains("Local:    http://127.0.0.1:5000"));
        assert!(!text.contains("Network"));
        assert!(text.contains("Test URL: http://127.0.0.1:5000/test"));
        assert!(text.contains("Logs URL: http://127.0.0.1:5000/logs"));
    }
}
