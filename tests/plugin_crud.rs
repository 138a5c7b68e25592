use confstore::{ConfigurationRepository, Plugin, Setting, SqliteConfigurationRepository};
use serde_json::json;
use std::collections::HashSet;

#[test]
fn save_returns_exactly_what_get_returns() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    let plugin = sample_plugin("HashiCorpVault");
    let saved = store.save_plugin_configuration(&plugin).unwrap();
    let loaded = store.get_plugin_by_name("HashiCorpVault").unwrap().unwrap();

    assert_eq!(saved, plugin);
    assert_eq!(loaded, saved);
}

#[test]
fn get_unknown_plugin_is_absent_not_an_error() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    assert_eq!(store.get_plugin_by_name("Unregistered").unwrap(), None);
}

#[test]
fn upsert_replaces_the_whole_record() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store
        .save_plugin_configuration(&sample_plugin("AzureKeyVault"))
        .unwrap();

    // Replacement drops the old configuration keys entirely.
    let mut replacement = Plugin::new("AzureKeyVault");
    replacement.enabled = true;
    replacement
        .configuration
        .insert("tenant".to_string(), json!("contoso"));
    store.save_plugin_configuration(&replacement).unwrap();

    let loaded = store.get_plugin_by_name("AzureKeyVault").unwrap().unwrap();
    assert_eq!(loaded, replacement);
    assert!(!loaded.configuration.contains_key("mount"));
    assert_eq!(store.get_all_plugins().unwrap().len(), 1);
}

#[test]
fn get_all_returns_each_identity_once() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    for name in ["VaultA", "VaultB", "VaultC"] {
        store.save_plugin_configuration(&sample_plugin(name)).unwrap();
    }
    // Re-upserting an existing name must not add a record.
    store
        .save_plugin_configuration(&sample_plugin("VaultB"))
        .unwrap();

    let names: HashSet<String> = store
        .get_all_plugins()
        .unwrap()
        .into_iter()
        .map(|plugin| plugin.name)
        .collect();

    assert_eq!(names.len(), 3);
    assert!(names.contains("VaultA"));
    assert!(names.contains("VaultB"));
    assert!(names.contains("VaultC"));
}

#[test]
fn delete_by_name_is_a_noop_when_absent() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store.delete_plugin_by_name("NeverRegistered").unwrap();

    store
        .save_plugin_configuration(&sample_plugin("OneShot"))
        .unwrap();
    store.delete_plugin_by_name("OneShot").unwrap();
    store.delete_plugin_by_name("OneShot").unwrap();

    assert_eq!(store.get_plugin_by_name("OneShot").unwrap(), None);
}

#[test]
fn plugin_and_setting_namespaces_are_independent() {
    let store = SqliteConfigurationRepository::open_in_memory().unwrap();

    store
        .set_setting(&Setting::new("Shared", "setting value"))
        .unwrap();
    store
        .save_plugin_configuration(&sample_plugin("Shared"))
        .unwrap();

    store.delete_plugin_by_name("Shared").unwrap();

    assert_eq!(store.get_plugin_by_name("Shared").unwrap(), None);
    let setting = store.get_setting("Shared").unwrap().unwrap();
    assert_eq!(setting.value, "setting value");
}

fn sample_plugin(name: &str) -> Plugin {
    let mut plugin = Plugin::new(name);
    plugin.display_name = Some(format!("{name} secrets plugin"));
    plugin.description = Some("pushes credentials to an external vault".to_string());
    plugin
        .configuration
        .insert("mount".to_string(), json!("secret/devops"));
    plugin
        .configuration
        .insert("timeout_seconds".to_string(), json!(30));
    plugin
}
