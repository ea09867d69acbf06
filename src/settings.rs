use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub listen: String,
}

#[derive(Debug, Deserialize)]
pub struct Diagnostics {
    /// Exposes the full store at `/api/debug`. Keep off in production.
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub diagnostics: Diagnostics,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.listen", "0.0.0.0:3000")?
            .set_default("diagnostics.enabled", false)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("REFERRALS").separator("__"));

        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.listen", format!("0.0.0.0:{}", port))?;
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_config_file() {
        let settings = Settings::new("does-not-exist.toml").unwrap();

        assert!(!settings.diagnostics.enabled);
        assert!(settings.server.listen.starts_with("0.0.0.0:"));
    }
}
