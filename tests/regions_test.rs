use checkin::regions::RegionDirectory;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_builtin_lists() {
    let regions = RegionDirectory::builtin();

    assert_eq!(regions.countries()[0].name, "United States", "United States is listed first");
    assert_eq!(regions.country_code("United States"), Some("USA"));
    assert_eq!(regions.country_code("  canada "), Some("CAN"));
    assert_eq!(regions.country_code("Atlantis"), None);
    assert!(regions.states().iter().any(|s| s.name == "District of Columbia" && s.code == "DC"));
    assert_eq!(regions.states().len(), 51);
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regions.json");
    fs::write(
        &path,
        r#"{"countries": [{"name": "Ghana", "code": "GHA"}, {"name": "Kenya", "code": "KEN"}]}"#,
    )
    .unwrap();

    let regions = RegionDirectory::load(Some(path.as_path()));
    assert_eq!(regions.countries().len(), 2);
    assert_eq!(regions.country_code("kenya"), Some("KEN"));
    assert_eq!(regions.country_code("United States"), None);
    assert_eq!(regions.states().len(), 51, "Missing states fall back to the built-in list");
}

#[test]
fn test_bad_file_falls_back_to_builtin() {
    let dir = tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "not json").unwrap();
    let empty = dir.path().join("empty.json");
    fs::write(&empty, r#"{"countries": []}"#).unwrap();

    for path in [broken, empty, dir.path().join("missing.json")] {
        let regions = RegionDirectory::load(Some(path.as_path()));
        assert_eq!(regions.country_code("United States"), Some("USA"), "Fallback for {}", path.display());
    }

    assert_eq!(RegionDirectory::load(None).countries().len(), RegionDirectory::builtin().countries().len());
}
