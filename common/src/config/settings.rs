use dotenvy::dotenv;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
struct Cli {
    port: Option<u16>,
    config: Option<String>,
}

fn parse_cli_from_args<I, S>(args: I) -> Cli
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut cli = Cli::default();
    let mut iter = args.into_iter().map(Into::into);

    // Skip binary name
    let _ = iter.next();

    while let Some(arg) = iter.next() {
        if let Some(raw_port) = arg.strip_prefix("--port=") {
            if let Ok(port) = raw_port.parse::<u16>() {
                cli.port = Some(port);
            }
            continue;
        }

        if arg == "--port" {
            if let Some(raw_port) = iter.next() {
                if let Ok(port) = raw_port.parse::<u16>() {
                    cli.port = Some(port);
                }
            }
            continue;
        }

        if let Some(raw_config) = arg.strip_prefix("--config=") {
            if !raw_config.is_empty() {
                cli.config = Some(raw_config.to_string());
            }
            continue;
        }

        if arg == "--config" {
            if let Some(config) = iter.next() {
                if !config.is_empty() {
                    cli.config = Some(config);
                }
            }
        }
    }

    cli
}

fn parse_cli() -> Cli {
    parse_cli_from_args(std::env::args())
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

fn default_static_dir() -> String {
    "static".to_string()
}

/// Seed source. Without a path the built-in catalog is used.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CatalogSettings {
    pub path: Option<String>,
}

impl Settings {
    #[allow(clippy::result_large_err)]
    pub fn new() -> Result<Self, figment::Error> {
        dotenv().ok();
        Self::figment(parse_cli()).extract()
    }

    fn figment(cli: Cli) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        figment = figment.merge(Toml::file("/etc/activities/config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(config_dir.join("activities/config.toml")));
        }

        figment = figment.merge(Toml::file("activities.toml"));

        let config_path = cli
            .config
            .or_else(|| std::env::var("ACTIVITIES_CONFIG_PATH").ok());
        if let Some(config_path) = config_path {
            figment = figment.merge(Toml::file(config_path));
        }

        figment = figment.merge(Env::prefixed("ACTIVITIES_").ignore(&["config_path"]).split("__"));

        if let Some(port) = cli.port {
            figment = figment.merge(("port", port));
        }

        figment
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            port: 8000,
            static_dir: default_static_dir(),
            catalog: CatalogSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_from_args, Cli, Settings};

    #[test]
    fn parse_cli_ignores_unknown_flags() {
        let cli = parse_cli_from_args(["api-bin", "--quiet", "--nocapture", "--port", "4010"]);

        assert_eq!(cli.port, Some(4010));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn parse_cli_supports_equals_syntax() {
        let cli = parse_cli_from_args(["api-bin", "--config=local.toml", "--port=3111"]);

        assert_eq!(cli.port, Some(3111));
        assert_eq!(cli.config.as_deref(), Some("local.toml"));
    }

    #[test]
    fn parse_cli_ignores_invalid_port_values() {
        let cli = parse_cli_from_args(["api-bin", "--port", "invalid"]);

        assert_eq!(cli.port, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn defaults_serve_builtin_catalog() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.static_dir, "static");
        assert!(settings.catalog.path.is_none());
    }

    #[test]
    fn layers_apply_in_precedence_order() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "activities.toml",
                r#"
                    port = 9000
                    static_dir = "public"

                    [catalog]
                    path = "seed.json"
                "#,
            )?;
            jail.set_env("ACTIVITIES_PORT", "9100");
            jail.set_env("ACTIVITIES_CATALOG__PATH", "env-seed.json");

            let settings: Settings = Settings::figment(Cli::default()).extract()?;
            assert_eq!(settings.port, 9100);
            assert_eq!(settings.static_dir, "public");
            assert_eq!(settings.catalog.path.as_deref(), Some("env-seed.json"));

            let cli = Cli {
                port: Some(9200),
                config: None,
            };
            let settings: Settings = Settings::figment(cli).extract()?;
            assert_eq!(settings.port, 9200);
            Ok(())
        });
    }
}
