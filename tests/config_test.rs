use checkin::admin::AdminPolicy;
use checkin::config::{Config, StoreBackend};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn from_pairs(pairs: &[(&str, &str)]) -> Config {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| values.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = from_pairs(&[]);

    assert_eq!(config.address(), "127.0.0.1:3000");
    assert_eq!(config.store, StoreBackend::Csv);
    assert_eq!(config.store_path, PathBuf::from("database/responses.csv"));
    assert_eq!(config.local_region, "District of Columbia");
    assert_eq!(config.render_delay, Duration::from_millis(500));
    assert_eq!(config.page_size, 20);
    assert_eq!(config.cookie_max_age, Duration::from_secs(86400));
    assert_eq!(config.login_url, "/");
    assert_eq!(config.regions_file, None);
    assert_eq!(
        config.admin_policy,
        AdminPolicy::Identity {
            allow_list: Vec::new()
        }
    );
}

#[test]
fn test_values_are_read() {
    let config = from_pairs(&[
        ("CHECKIN_BIND", "0.0.0.0"),
        ("CHECKIN_PORT", "8080"),
        ("CHECKIN_STORE", "SQLite"),
        ("CHECKIN_ADMIN_EMAILS", "Staff@Example.org, pastor@example.org,,"),
        ("CHECKIN_LOCAL_REGION", "Maryland"),
        ("CHECKIN_RENDER_DELAY_MS", "0"),
        ("CHECKIN_PAGE_SIZE", "50"),
        ("CHECKIN_REGIONS_FILE", "regions.json"),
    ]);

    assert_eq!(config.address(), "0.0.0.0:8080");
    assert_eq!(config.store, StoreBackend::Sqlite);
    assert_eq!(config.store_path, PathBuf::from("database/responses.sqlite"));
    assert_eq!(config.local_region, "Maryland");
    assert!(config.render_delay.is_zero());
    assert_eq!(config.page_size, 50);
    assert_eq!(config.regions_file, Some(PathBuf::from("regions.json")));
    assert_eq!(
        config.admin_policy,
        AdminPolicy::Identity {
            allow_list: vec!["staff@example.org".to_string(), "pastor@example.org".to_string()]
        }
    );
}

#[test]
fn test_invalid_values_fall_back() {
    let config = from_pairs(&[
        ("CHECKIN_PORT", "lots"),
        ("CHECKIN_STORE", "postgres"),
        ("CHECKIN_PAGE_SIZE", "0"),
        ("CHECKIN_ADMIN_POLICY", "everyone"),
    ]);

    assert_eq!(config.port, 3000);
    assert_eq!(config.store, StoreBackend::Csv);
    assert_eq!(config.page_size, 1, "Page size is at least one");
    assert!(!config.admin_policy.uses_secret());
}

#[test]
fn test_secret_policy() {
    let config = from_pairs(&[
        ("CHECKIN_ADMIN_POLICY", "secret"),
        ("CHECKIN_ADMIN_CODE", " easter2024 "),
    ]);
    assert_eq!(
        config.admin_policy,
        AdminPolicy::SharedSecret {
            code: "easter2024".to_string()
        }
    );

    // Without a code nobody can unlock the panel
    let config = from_pairs(&[("CHECKIN_ADMIN_POLICY", "secret")]);
    assert!(!config.admin_policy.uses_secret());
    assert!(!config.admin_policy.allows_email("staff@example.org"));
}
