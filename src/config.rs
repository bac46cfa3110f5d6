use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_WEEKLY_GOAL_KG: f64 = 35.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Weekly kg-CO₂e target used by goal comparisons.
    pub weekly_goal_kg: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let weekly_goal_kg = std::env::var("WEEKLY_GOAL_KG")
            .ok()
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| *value > 0.0)
            .unwrap_or(DEFAULT_WEEKLY_GOAL_KG);

        Self {
            host,
            port,
            log_level,
            weekly_goal_kg,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
