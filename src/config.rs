use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, time::Duration};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub questions_path: String,
    pub max_sessions: usize,
    /// Seconds a game may sit untouched before it is discarded
    pub session_idle_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            game: GameConfig {
                questions_path: "./questions.json".to_string(),
                max_sessions: 64,
                session_idle_timeout: 1800,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or(defaults.server.host),
            port: match env::var("PORT") {
                Ok(port) => port.parse().context("PORT must be a number")?,
                Err(_) => defaults.server.port,
            },
        };

        let game = GameConfig {
            questions_path: env::var("QUESTIONS_PATH").unwrap_or(defaults.game.questions_path),
            max_sessions: match env::var("MAX_SESSIONS") {
                Ok(max) => max.parse().context("MAX_SESSIONS must be a number")?,
                Err(_) => defaults.game.max_sessions,
            },
            session_idle_timeout: match env::var("SESSION_IDLE_TIMEOUT") {
                Ok(secs) => secs
                    .parse()
                    .context("SESSION_IDLE_TIMEOUT must be a number of seconds")?,
                Err(_) => defaults.game.session_idle_timeout,
            },
        };

        Ok(Config { server, game })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.game.session_idle_timeout)
    }
}
