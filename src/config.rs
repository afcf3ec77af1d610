use anyhow::Context;

/// Settings for the shared edge-config token store. All three credentials are
/// needed to talk to it; `team_id` scopes the administrative API when the
/// config lives under a team.
pub struct EdgeConfigSettings {
    pub config_id: String,
    pub read_token: String,
    pub api_token: String,
    pub team_id: Option<String>,
}

pub struct Config {
    pub salesforce_domain: String,
    pub salesforce_client_id: String,
    pub salesforce_client_secret: String,
    pub salesforce_username: String,
    pub salesforce_password: String,
    pub salesforce_security_token: String,
    pub edge_config: Option<EdgeConfigSettings>,
    pub chat_preview_root: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let edge_config = match (
            optional("EDGE_CONFIG_ID"),
            optional("EDGE_CONFIG_READ_TOKEN"),
            optional("VERCEL_API_TOKEN"),
        ) {
            (Some(config_id), Some(read_token), Some(api_token)) => Some(EdgeConfigSettings {
                config_id,
                read_token,
                api_token,
                team_id: optional("VERCEL_TEAM_ID"),
            }),
            _ => None,
        };

        Ok(Self {
            salesforce_domain: required("SALESFORCE_DOMAIN")?,
            salesforce_client_id: required("SALESFORCE_CLIENT_ID")?,
            salesforce_client_secret: required("SALESFORCE_CLIENT_SECRET")?,
            salesforce_username: required("SALESFORCE_USERNAME")?,
            salesforce_password: required("SALESFORCE_PASSWORD")?,
            salesforce_security_token: required("SALESFORCE_SECURITY_TOKEN")?,
            edge_config,
            chat_preview_root: optional("INKEEP_CHAT_PREVIEW_ROOT"),
            port: optional("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set (copy .env.example to .env)"))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
