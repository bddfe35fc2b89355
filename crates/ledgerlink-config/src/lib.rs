use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path (minus extension) the file loader looks at, relative to the working
/// directory. JSON is what deployments historically shipped.
const CONFIG_FILE: &str = "config/config";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// How the application registered with the provider. Only `public` apps sign
/// with a shared consumer secret; the other two use uploaded RSA key pairs
/// and are rejected when the provider client is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Public,
    Private,
    Partner,
}

impl FromStr for AppType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "partner" => Ok(Self::Partner),
            other => Err(format!("unknown app type '{other}'")),
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Partner => "partner",
        };
        write!(f, "{s}")
    }
}

/// OAuth1 signature methods this client can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum SignatureMethod {
    #[default]
    #[serde(rename = "HMAC-SHA1")]
    HmacSha1,
    #[serde(rename = "PLAINTEXT")]
    Plaintext,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_app_type")]
    pub app_type: AppType,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Absolute URL the provider redirects the browser back to after the user
    /// authorizes; must route to the `/access` handler.
    pub callback_url: String,
    #[serde(default)]
    pub signature_method: SignatureMethod,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// Provider OAuth1 + API endpoints. Defaults are the hosted provider's
/// published URLs; overridable for sandboxes and tests.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_request_token_url")]
    pub request_token_url: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_access_token_url")]
    pub access_token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            request_token_url: default_request_token_url(),
            authorize_url: default_authorize_url(),
            access_token_url: default_access_token_url(),
            api_base_url: default_api_base_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Cookie signing key material, at least 32 bytes. A random key is
    /// generated at boot when unset, which invalidates sessions on restart.
    pub key: Option<String>,
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default = "default_templates_glob")]
    pub templates_glob: String,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            templates_glob: default_templates_glob(),
            assets_dir: default_assets_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3200
}

fn default_app_type() -> AppType {
    AppType::Public
}

fn default_request_token_url() -> String {
    "https://api.xero.com/oauth/RequestToken".to_string()
}

fn default_authorize_url() -> String {
    "https://api.xero.com/oauth/Authorize".to_string()
}

fn default_access_token_url() -> String {
    "https://api.xero.com/oauth/AccessToken".to_string()
}

fn default_api_base_url() -> String {
    "https://api.xero.com/api.xro/2.0".to_string()
}

fn default_templates_glob() -> String {
    "templates/**/*.html".to_string()
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

impl Config {
    /// Load configuration from `config/config.json`, falling back to the
    /// environment variables deployments have always used when the file is
    /// absent.
    pub fn load() -> Result<Self, String> {
        match Self::from_file() {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    "No usable config file ({}). Falling back to environment variables.",
                    e
                );
                Self::from_env_fallback()
            }
        }
    }

    fn from_file() -> Result<Self, String> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE))
            .build()
            .map_err(|e| e.to_string())?;

        settings.try_deserialize().map_err(|e| e.to_string())
    }

    /// Environment fallback. Variable names predate this codebase and are
    /// kept verbatim so existing deployments keep working: `APPTYPE`,
    /// `authorizeCallbackUrl`, `consumerKey`, `consumerSecret`, `PORT`.
    fn from_env_fallback() -> Result<Self, String> {
        let consumer_key =
            std::env::var("consumerKey").map_err(|_| "consumerKey is not set".to_string())?;
        let consumer_secret =
            std::env::var("consumerSecret").map_err(|_| "consumerSecret is not set".to_string())?;
        let callback_url = std::env::var("authorizeCallbackUrl")
            .map_err(|_| "authorizeCallbackUrl is not set".to_string())?;
        let app_type = match std::env::var("APPTYPE") {
            Ok(raw) => raw.parse::<AppType>()?,
            Err(_) => default_app_type(),
        };
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);

        Ok(Self {
            server: ServerConfig {
                host: default_host(),
                port,
            },
            provider: ProviderConfig {
                app_type,
                consumer_key,
                consumer_secret,
                callback_url,
                signature_method: SignatureMethod::default(),
                endpoints: EndpointsConfig::default(),
            },
            session: SessionConfig::default(),
            ui: UiConfig::default(),
        })
    }
}
