use crate::admin::AdminPolicy;
use log::{info, warn};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Csv,
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(StoreBackend::Csv),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

impl StoreBackend {
    fn default_path(self) -> &'static str {
        match self {
            StoreBackend::Csv | StoreBackend::Memory => "database/responses.csv",
            StoreBackend::Sqlite => "database/responses.sqlite",
        }
    }
}

/// Runtime settings, read once at startup
#[derive(Clone, Debug)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub store: StoreBackend,
    pub store_path: PathBuf,
    pub admin_policy: AdminPolicy,
    /// Where `/login` sends the browser
    pub login_url: String,
    /// State/province that counts as local
    pub local_region: String,
    /// Minimum time a chart change keeps the loading indicator up
    pub render_delay: Duration,
    pub page_size: usize,
    pub cookie_max_age: Duration,
    pub regions_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            store: StoreBackend::Csv,
            store_path: PathBuf::from(StoreBackend::Csv.default_path()),
            admin_policy: AdminPolicy::Identity {
                allow_list: Vec::new(),
            },
            login_url: "/".to_string(),
            local_region: "District of Columbia".to_string(),
            render_delay: Duration::from_millis(500),
            page_size: 20,
            cookie_max_age: Duration::from_secs(24 * 60 * 60),
            regions_file: None,
        }
    }
}

impl Config {
    /// Read the configuration from `CHECKIN_*` environment variables
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    ///
    /// Missing keys keep their defaults; invalid values are logged and
    /// replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let store: StoreBackend = try_load(&lookup, "CHECKIN_STORE", defaults.store);
        let store_path = lookup("CHECKIN_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(store.default_path()));

        let admin_policy = match lookup("CHECKIN_ADMIN_POLICY").as_deref().map(str::trim) {
            Some("secret") => match lookup("CHECKIN_ADMIN_CODE") {
                Some(code) if !code.trim().is_empty() => AdminPolicy::SharedSecret {
                    code: code.trim().to_string(),
                },
                _ => {
                    warn!("CHECKIN_ADMIN_POLICY=secret without CHECKIN_ADMIN_CODE, admin panel disabled");
                    AdminPolicy::Identity {
                        allow_list: Vec::new(),
                    }
                }
            },
            Some("identity") | None => AdminPolicy::Identity {
                allow_list: lookup("CHECKIN_ADMIN_EMAILS")
                    .map(|emails| parse_list(&emails))
                    .unwrap_or_default(),
            },
            Some(other) => {
                warn!("Invalid CHECKIN_ADMIN_POLICY value: {other}, using identity");
                AdminPolicy::Identity {
                    allow_list: lookup("CHECKIN_ADMIN_EMAILS")
                        .map(|emails| parse_list(&emails))
                        .unwrap_or_default(),
                }
            }
        };

        let render_delay_ms: u64 = try_load(
            &lookup,
            "CHECKIN_RENDER_DELAY_MS",
            defaults.render_delay.as_millis() as u64,
        );
        let cookie_max_age: u64 = try_load(
            &lookup,
            "CHECKIN_COOKIE_MAX_AGE",
            defaults.cookie_max_age.as_secs(),
        );
        let page_size: usize = try_load(&lookup, "CHECKIN_PAGE_SIZE", defaults.page_size);

        Config {
            bind: lookup("CHECKIN_BIND").unwrap_or(defaults.bind),
            port: try_load(&lookup, "CHECKIN_PORT", defaults.port),
            store,
            store_path,
            admin_policy,
            login_url: lookup("CHECKIN_LOGIN_URL").unwrap_or(defaults.login_url),
            local_region: lookup("CHECKIN_LOCAL_REGION").unwrap_or(defaults.local_region),
            render_delay: Duration::from_millis(render_delay_ms),
            page_size: page_size.max(1),
            cookie_max_age: Duration::from_secs(cookie_max_age),
            regions_file: lookup("CHECKIN_REGIONS_FILE").map(PathBuf::from),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default: {default}");
            default
        }),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    let list: Vec<String> = raw
        .split(',')
        .map(|item| item.trim().to_ascii_lowercase())
        .filter(|item| !item.is_empty())
        .collect();
    info!("{} admin address(es) configured", list.len());
    list
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreBackend::Csv => "csv",
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Memory => "memory",
        };
        f.write_str(name)
    }
}
