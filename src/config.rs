use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiCfg {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Transport default when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageCfg {
    /// JSON file backing the client's local storage (token + session)
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PaymentCfg {
    #[serde(default)]
    pub publishable_key: Option<String>,
    #[serde(default = "default_stripe_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IdentityCfg {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_identity_base")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogCfg {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiCfg,
    #[serde(default)]
    pub storage: StorageCfg,
    #[serde(default)]
    pub payment: PaymentCfg,
    #[serde(default)]
    pub identity: IdentityCfg,
    #[serde(default)]
    pub catalog: CatalogCfg,
}

fn default_api_base_url() -> String { "http://localhost:5000".to_string() }
fn default_stripe_api_base() -> String { "https://api.stripe.com".to_string() }
fn default_identity_base() -> String { "https://identitytoolkit.googleapis.com".to_string() }
fn default_page_size() -> u32 { 6 }
fn default_storage_path() -> String {
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => format!("{}/.scholarstream/storage.json", home.trim_end_matches('/')),
        _ => ".scholarstream/storage.json".to_string(),
    }
}

impl Default for ApiCfg {
    fn default() -> Self { Self { base_url: default_api_base_url(), request_timeout_secs: None } }
}

impl Default for StorageCfg {
    fn default() -> Self { Self { path: default_storage_path() } }
}

impl Default for PaymentCfg {
    fn default() -> Self { Self { publishable_key: None, api_base: default_stripe_api_base() } }
}

impl Default for IdentityCfg {
    fn default() -> Self { Self { api_key: None, base_url: default_identity_base() } }
}

impl Default for CatalogCfg {
    fn default() -> Self { Self { page_size: default_page_size() } }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiCfg::default(),
            storage: StorageCfg::default(),
            payment: PaymentCfg::default(),
            identity: IdentityCfg::default(),
            catalog: CatalogCfg::default(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and then `SCHOLARSTREAM_<SECTION>__<KEY>`
    /// variables, e.g. `SCHOLARSTREAM_API__BASE_URL`. A few flat names used by
    /// the web build are accepted as fallbacks.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("SCHOLARSTREAM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: AppConfig = settings.try_deserialize()?;

        // Map flat env names onto the nested structure
        // API_BASE_URL, STRIPE_PUBLISHABLE_KEY, FIREBASE_API_KEY
        if std::env::var("SCHOLARSTREAM_API__BASE_URL").is_err() {
            if let Ok(v) = std::env::var("API_BASE_URL") {
                cfg.api.base_url = v;
            }
        }
        if cfg.payment.publishable_key.is_none() {
            cfg.payment.publishable_key = std::env::var("STRIPE_PUBLISHABLE_KEY").ok();
        }
        if cfg.identity.api_key.is_none() {
            cfg.identity.api_key = std::env::var("FIREBASE_API_KEY").ok();
        }

        if cfg.catalog.page_size == 0 {
            anyhow::bail!("SCHOLARSTREAM_CATALOG__PAGE_SIZE must be at least 1");
        }
        url::Url::parse(&cfg.api.base_url)
            .map_err(|e| anyhow::anyhow!("invalid api base url {:?}: {}", cfg.api.base_url, e))?;

        Ok(cfg)
    }
}
