use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the demo binary writes the transaction history CSV.
    pub export_path: String,
    /// Seed the demo catalog on startup.
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let export_path =
            env::var("WARUNG_EXPORT_PATH").unwrap_or_else(|_| "transactions.csv".to_string());
        let seed_demo_data = env::var("WARUNG_SEED_DEMO")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);
        Ok(Self {
            export_path,
            seed_demo_data,
        })
    }
}
