use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub root_email: String,
    pub root_password: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let root_email = env::var("ROOT_EMAIL").unwrap_or_else(|_| "admin@admin.com".to_string());
        let root_password = env::var("ROOT_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
        Ok(Self {
            database_url,
            host,
            port,
            root_email,
            root_password,
        })
    }
}
