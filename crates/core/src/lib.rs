pub mod domain;
pub mod indicators;
pub mod io;
pub mod pipeline;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub panel_path: Option<String>,
        pub output_path: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                panel_path: std::env::var("TRADE_PANEL_PATH").ok(),
                output_path: std::env::var("TRADE_OUTPUT_PATH").ok(),
            })
        }

        pub fn require_panel_path(&self) -> anyhow::Result<&str> {
            self.panel_path
                .as_deref()
                .context("TRADE_PANEL_PATH is required")
        }
    }
}
