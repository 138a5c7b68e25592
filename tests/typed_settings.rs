use confstore::repo::config_repo::{
    API_VERSION_SETTING, CLIENT_CERTIFICATE_THUMBPRINT_SETTING, IGNORE_SSL_SETTING,
    SAFEGUARD_ADDRESS_SETTING,
};
use confstore::{ConfigurationRepository, Setting, SqliteConfigurationRepository};

#[test]
fn address_roundtrip() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    assert_eq!(store.safeguard_address().unwrap(), None);

    store
        .set_safeguard_address(Some("safeguard.example.com"))
        .unwrap();
    assert_eq!(
        store.safeguard_address().unwrap().as_deref(),
        Some("safeguard.example.com")
    );
}

#[test]
fn writing_absent_address_stores_empty_and_reads_back_absent() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store.set_safeguard_address(Some("old.example.com")).unwrap();
    store.set_safeguard_address(None).unwrap();

    assert_eq!(store.safeguard_address().unwrap(), None);

    // The raw layer still holds a record with an empty value; only the
    // typed projection collapses empty to absent.
    let raw = store.get_setting(SAFEGUARD_ADDRESS_SETTING).unwrap().unwrap();
    assert_eq!(raw.value, "");
}

#[test]
fn thumbprint_roundtrip_and_empty_reads_absent() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store
        .set_client_certificate_thumbprint(Some("AB12CD34EF56"))
        .unwrap();
    assert_eq!(
        store.client_certificate_thumbprint().unwrap().as_deref(),
        Some("AB12CD34EF56")
    );

    store
        .set_setting(&Setting::new(CLIENT_CERTIFICATE_THUMBPRINT_SETTING, ""))
        .unwrap();
    assert_eq!(store.client_certificate_thumbprint().unwrap(), None);
}

#[test]
fn api_version_roundtrip() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    assert_eq!(store.api_version().unwrap(), None);

    store.set_api_version(Some(4)).unwrap();
    assert_eq!(store.api_version().unwrap(), Some(4));

    let raw = store.get_setting(API_VERSION_SETTING).unwrap().unwrap();
    assert_eq!(raw.value, "4");
}

#[test]
fn corrupt_api_version_reads_as_absent_not_an_error() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store
        .set_setting(&Setting::new(API_VERSION_SETTING, "three"))
        .unwrap();

    assert_eq!(store.api_version().unwrap(), None);
}

#[test]
fn ignore_ssl_parses_booleans_and_rejects_garbage() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store
        .set_setting(&Setting::new(IGNORE_SSL_SETTING, "true"))
        .unwrap();
    assert_eq!(store.ignore_ssl().unwrap(), Some(true));

    store
        .set_setting(&Setting::new(IGNORE_SSL_SETTING, "notabool"))
        .unwrap();
    assert_eq!(store.ignore_ssl().unwrap(), None);
}

#[test]
fn ignore_ssl_write_stores_canonical_text() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store.set_ignore_ssl(Some(false)).unwrap();

    let raw = store.get_setting(IGNORE_SSL_SETTING).unwrap().unwrap();
    assert_eq!(raw.value, "false");
    assert_eq!(store.ignore_ssl().unwrap(), Some(false));
}

#[test]
fn writing_absent_typed_values_is_roundtrip_stable() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store.set_api_version(None).unwrap();
    store.set_ignore_ssl(None).unwrap();
    store.set_client_certificate_thumbprint(None).unwrap();

    assert_eq!(store.api_version().unwrap(), None);
    assert_eq!(store.ignore_ssl().unwrap(), None);
    assert_eq!(store.client_certificate_thumbprint().unwrap(), None);

    // Each write still produced a stored record with an empty value.
    for name in [
        API_VERSION_SETTING,
        IGNORE_SSL_SETTING,
        CLIENT_CERTIFICATE_THUMBPRINT_SETTING,
    ] {
        let raw = store.get_setting(name).unwrap().unwrap();
        assert_eq!(raw.value, "");
    }
}
