//! Configuration repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable upsert/query/remove APIs over the three record tables.
//! - Keep SQL and document encoding inside the persistence boundary.
//!
//! # Invariants
//! - Upsert is keyed on record identity: insert when absent, otherwise
//!   replace the whole record. No partial field merge anywhere.
//! - The closed check and the query run under one lock acquisition; a
//!   concurrent `close` can never yank the handle from an in-flight call.
//! - Read paths reject undecodable persisted documents instead of masking
//!   them; typed setting accessors are the one deliberate exception and
//!   map bad values to absent.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::configuration::Configuration;
use crate::model::plugin::Plugin;
use crate::model::setting::Setting;
use log::{debug, info};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Default on-disk location of the backing database, relative to the
/// process working directory.
pub const DEFAULT_DB_FILE: &str = "Configuration.db";

/// Well-known setting names backing the typed accessors.
pub const SAFEGUARD_ADDRESS_SETTING: &str = "SafeguardAddress";
pub const CLIENT_CERTIFICATE_THUMBPRINT_SETTING: &str = "ClientCertificateThumbprint";
pub const API_VERSION_SETTING: &str = "ApiVersion";
pub const IGNORE_SSL_SETTING: &str = "IgnoreSsl";

// The configuration table is constrained to this single row.
const CONFIGURATION_ID: i64 = 1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for configuration persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// The store has been closed and its backing handle released.
    Closed,
    Db(DbError),
    /// A record could not be encoded into its document form.
    Encode(serde_json::Error),
    /// Persisted state that no longer decodes into a record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "configuration store is closed"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode record document: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Closed => None,
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access contract for the three configuration record kinds.
///
/// Consumed by service bootstrap (typed accessors), plugin management and
/// administrative handlers. Implementations are synchronous; each call
/// round-trips to the backing store.
pub trait ConfigurationRepository {
    fn get_all_settings(&self) -> RepoResult<Vec<Setting>>;
    fn get_setting(&self, name: &str) -> RepoResult<Option<Setting>>;
    fn set_setting(&self, setting: &Setting) -> RepoResult<()>;
    fn remove_setting(&self, name: &str) -> RepoResult<()>;

    fn get_configuration(&self) -> RepoResult<Option<Configuration>>;
    fn save_configuration(&self, configuration: &Configuration) -> RepoResult<()>;
    fn delete_configuration(&self) -> RepoResult<()>;

    fn get_all_plugins(&self) -> RepoResult<Vec<Plugin>>;
    fn get_plugin_by_name(&self, name: &str) -> RepoResult<Option<Plugin>>;
    /// Upserts the plugin record and returns the stored record, so callers
    /// can chain without an immediate re-read.
    fn save_plugin_configuration(&self, plugin: &Plugin) -> RepoResult<Plugin>;
    fn delete_plugin_by_name(&self, name: &str) -> RepoResult<()>;

    /// Appliance network address. Empty stored text reads as absent.
    fn safeguard_address(&self) -> RepoResult<Option<String>>;
    fn set_safeguard_address(&self, value: Option<&str>) -> RepoResult<()>;

    /// Client certificate thumbprint. Empty stored text reads as absent.
    fn client_certificate_thumbprint(&self) -> RepoResult<Option<String>>;
    fn set_client_certificate_thumbprint(&self, value: Option<&str>) -> RepoResult<()>;

    /// API version. Anything that does not parse as a decimal integer
    /// reads as absent; corrupt data never fails this accessor.
    fn api_version(&self) -> RepoResult<Option<u32>>;
    fn set_api_version(&self, value: Option<u32>) -> RepoResult<()>;

    /// TLS verification opt-out flag. Anything other than `true`/`false`
    /// (case-insensitive) reads as absent.
    fn ignore_ssl(&self) -> RepoResult<Option<bool>>;
    fn set_ignore_ssl(&self, value: Option<bool>) -> RepoResult<()>;
}

/// SQLite-backed configuration repository.
///
/// Owns the connection for the process lifetime. All operations serialize
/// on an internal lock that also carries the closed state, so disposal is
/// race-free with respect to in-flight operations.
pub struct SqliteConfigurationRepository {
    conn: Mutex<Option<Connection>>,
}

impl SqliteConfigurationRepository {
    /// Opens the store at [`DEFAULT_DB_FILE`] in the working directory.
    pub fn open_default() -> RepoResult<Self> {
        Self::open(DEFAULT_DB_FILE)
    }

    /// Opens (or creates) the store at `path`.
    ///
    /// # Errors
    /// Any failure to open or bootstrap the backing file is fatal to
    /// construction and returned to the caller.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let conn = open_db(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Opens an in-memory store. Used by tests and embedders that do not
    /// want an on-disk file.
    pub fn open_in_memory() -> RepoResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Closes the backing database and marks the store closed.
    ///
    /// Idempotent: closing an already-closed store does nothing. Every
    /// operation after this returns [`RepoError::Closed`].
    pub fn close(&self) {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            info!("event=db_close module=repo status=ok");
        }
    }

    /// Returns whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    // Runs `op` against the live connection, holding the lock for the
    // whole closed-check-and-use sequence. Lock poisoning is unwrapped to
    // the inner value: no operation mutates guarded state partially.
    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard.as_ref().ok_or(RepoError::Closed)?;
        op(conn)
    }

    fn get_simple_setting(&self, name: &str) -> RepoResult<Option<String>> {
        Ok(self.get_setting(name)?.map(|setting| setting.value))
    }

    // `None` is normalized to the empty string; the store never persists
    // a missing value field.
    fn set_simple_setting(&self, name: &str, value: Option<&str>) -> RepoResult<()> {
        self.set_setting(&Setting::new(name, value.unwrap_or_default()))
    }
}

impl ConfigurationRepository for SqliteConfigurationRepository {
    fn get_all_settings(&self) -> RepoResult<Vec<Setting>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name, value FROM settings;")?;
            let mut rows = stmt.query([])?;
            let mut settings = Vec::new();

            while let Some(row) = rows.next()? {
                settings.push(Setting {
                    name: row.get("name")?,
                    value: row.get("value")?,
                });
            }

            Ok(settings)
        })
    }

    fn get_setting(&self, name: &str) -> RepoResult<Option<Setting>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name, value FROM settings WHERE name = ?1;")?;
            let mut rows = stmt.query([name])?;

            if let Some(row) = rows.next()? {
                return Ok(Some(Setting {
                    name: row.get("name")?,
                    value: row.get("value")?,
                }));
            }

            Ok(None)
        })
    }

    fn set_setting(&self, setting: &Setting) -> RepoResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value;",
                params![setting.name.as_str(), setting.value.as_str()],
            )?;

            debug!(
                "event=setting_upsert module=repo status=ok name={}",
                setting.name
            );
            Ok(())
        })
    }

    fn remove_setting(&self, name: &str) -> RepoResult<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM settings WHERE name = ?1;", [name])?;

            debug!("event=setting_remove module=repo status=ok name={name} removed={removed}");
            Ok(())
        })
    }

    fn get_configuration(&self) -> RepoResult<Option<Configuration>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT document FROM configuration WHERE id = ?1;")?;
            let mut rows = stmt.query([CONFIGURATION_ID])?;

            if let Some(row) = rows.next()? {
                let raw: String = row.get("document")?;
                return Ok(Some(decode_document("configuration", "1", &raw)?));
            }

            Ok(None)
        })
    }

    fn save_configuration(&self, configuration: &Configuration) -> RepoResult<()> {
        let document = encode_document(configuration)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO configuration (id, document) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET document = excluded.document;",
                params![CONFIGURATION_ID, document],
            )?;

            debug!("event=configuration_save module=repo status=ok");
            Ok(())
        })
    }

    fn delete_configuration(&self) -> RepoResult<()> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM configuration WHERE id = ?1;",
                [CONFIGURATION_ID],
            )?;

            debug!("event=configuration_delete module=repo status=ok removed={removed}");
            Ok(())
        })
    }

    fn get_all_plugins(&self) -> RepoResult<Vec<Plugin>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name, document FROM plugins;")?;
            let mut rows = stmt.query([])?;
            let mut plugins = Vec::new();

            while let Some(row) = rows.next()? {
                let name: String = row.get("name")?;
                let raw: String = row.get("document")?;
                plugins.push(decode_document("plugins", &name, &raw)?);
            }

            Ok(plugins)
        })
    }

    fn get_plugin_by_name(&self, name: &str) -> RepoResult<Option<Plugin>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT document FROM plugins WHERE name = ?1;")?;
            let mut rows = stmt.query([name])?;

            if let Some(row) = rows.next()? {
                let raw: String = row.get("document")?;
                return Ok(Some(decode_document("plugins", name, &raw)?));
            }

            Ok(None)
        })
    }

    fn save_plugin_configuration(&self, plugin: &Plugin) -> RepoResult<Plugin> {
        let document = encode_document(plugin)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO plugins (name, document) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET document = excluded.document;",
                params![plugin.name.as_str(), document],
            )?;

            debug!(
                "event=plugin_upsert module=repo status=ok name={}",
                plugin.name
            );
            Ok(plugin.clone())
        })
    }

    fn delete_plugin_by_name(&self, name: &str) -> RepoResult<()> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM plugins WHERE name = ?1;", [name])?;

            debug!("event=plugin_delete module=repo status=ok name={name} removed={removed}");
            Ok(())
        })
    }

    fn safeguard_address(&self) -> RepoResult<Option<String>> {
        Ok(self
            .get_simple_setting(SAFEGUARD_ADDRESS_SETTING)?
            .filter(|value| !value.is_empty()))
    }

    fn set_safeguard_address(&self, value: Option<&str>) -> RepoResult<()> {
        self.set_simple_setting(SAFEGUARD_ADDRESS_SETTING, value)
    }

    fn client_certificate_thumbprint(&self) -> RepoResult<Option<String>> {
        Ok(self
            .get_simple_setting(CLIENT_CERTIFICATE_THUMBPRINT_SETTING)?
            .filter(|value| !value.is_empty()))
    }

    fn set_client_certificate_thumbprint(&self, value: Option<&str>) -> RepoResult<()> {
        self.set_simple_setting(CLIENT_CERTIFICATE_THUMBPRINT_SETTING, value)
    }

    fn api_version(&self) -> RepoResult<Option<u32>> {
        Ok(self
            .get_simple_setting(API_VERSION_SETTING)?
            .as_deref()
            .and_then(parse_api_version))
    }

    fn set_api_version(&self, value: Option<u32>) -> RepoResult<()> {
        let text = value.map(|version| version.to_string());
        self.set_simple_setting(API_VERSION_SETTING, text.as_deref())
    }

    fn ignore_ssl(&self) -> RepoResult<Option<bool>> {
        Ok(self
            .get_simple_setting(IGNORE_SSL_SETTING)?
            .as_deref()
            .and_then(parse_ignore_ssl))
    }

    fn set_ignore_ssl(&self, value: Option<bool>) -> RepoResult<()> {
        let text = value.map(|flag| flag.to_string());
        self.set_simple_setting(IGNORE_SSL_SETTING, text.as_deref())
    }
}

impl Drop for SqliteConfigurationRepository {
    fn drop(&mut self) {
        self.close();
    }
}

fn encode_document<T: Serialize>(record: &T) -> RepoResult<String> {
    serde_json::to_string(record).map_err(RepoError::Encode)
}

fn decode_document<T: DeserializeOwned>(
    table: &str,
    identity: &str,
    raw: &str,
) -> RepoResult<T> {
    serde_json::from_str(raw).map_err(|err| {
        RepoError::InvalidData(format!(
            "unreadable document for `{identity}` in {table}: {err}"
        ))
    })
}

/// Fallible parse for the stored API version; never panics or errors.
fn parse_api_version(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Fallible parse for the stored ignore-SSL flag; never panics or errors.
fn parse_ignore_ssl(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
