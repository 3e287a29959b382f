//! Config validation tests for api-hub-config.
// crates/api-hub-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate defaults, limits, and cross-field constraints.
// Purpose: Ensure api-hub.toml parsing stays strict and fail-closed.
// =============================================================================

use std::fs;
use std::path::PathBuf;

use api_hub_config::ApiHubConfig;
use api_hub_config::ConfigError;
use api_hub_config::DEFAULT_BIND;
use api_hub_config::MAX_CONFIG_FILE_SIZE;
use api_hub_config::StoreType;
use api_hub_store_sqlite::SqliteStoreMode;
use api_hub_store_sqlite::SqliteSyncMode;
use tempfile::TempDir;

type TestResult = Result<(), String>;

fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = ApiHubConfig::from_toml("").map_err(|err| err.to_string())?;
    if config.server.bind != DEFAULT_BIND {
        return Err(format!("unexpected bind {}", config.server.bind));
    }
    if config.server.max_body_bytes != 1024 * 1024 || config.server.allow_non_loopback {
        return Err("unexpected server defaults".to_string());
    }
    if config.server.default_scenario != "success" || !config.server.audit.enabled {
        return Err("unexpected scenario or audit defaults".to_string());
    }
    if config.store.store_type != StoreType::Memory || config.store.sqlite_config().is_some() {
        return Err("default store must be in-memory".to_string());
    }
    if config.export.out_dir != PathBuf::from(".") {
        return Err("unexpected export directory".to_string());
    }
    Ok(())
}

#[test]
fn sqlite_store_settings_flow_into_store_config() -> TestResult {
    let config = ApiHubConfig::from_toml(
        r#"
[store]
type = "sqlite"
path = "data/hub.db"
busy_timeout_ms = 250
journal_mode = "delete"
sync_mode = "normal"
"#,
    )
    .map_err(|err| err.to_string())?;
    let sqlite = config.store.sqlite_config().ok_or("expected sqlite config")?;
    if sqlite.path != PathBuf::from("data/hub.db") || sqlite.busy_timeout_ms != 250 {
        return Err("sqlite path or timeout not propagated".to_string());
    }
    if sqlite.journal_mode != SqliteStoreMode::Delete || sqlite.sync_mode != SqliteSyncMode::Normal
    {
        return Err("sqlite pragmas not propagated".to_string());
    }
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    assert_invalid(ApiHubConfig::from_toml("[server]\nport = 80\n"), "config parse error")?;
    assert_invalid(ApiHubConfig::from_toml("[metrics]\nenabled = true\n"), "config parse error")
}

#[test]
fn sqlite_store_requires_path() -> TestResult {
    assert_invalid(
        ApiHubConfig::from_toml("[store]\ntype = \"sqlite\"\n"),
        "sqlite store requires path",
    )
}

#[test]
fn memory_store_rejects_path() -> TestResult {
    assert_invalid(
        ApiHubConfig::from_toml("[store]\ntype = \"memory\"\npath = \"hub.db\"\n"),
        "memory store must not set path",
    )
}

#[test]
fn non_loopback_bind_requires_opt_in() -> TestResult {
    assert_invalid(
        ApiHubConfig::from_toml("[server]\nbind = \"0.0.0.0:8787\"\n"),
        "non-loopback bind requires allow_non_loopback",
    )?;
    let config =
        ApiHubConfig::from_toml("[server]\nbind = \"0.0.0.0:8787\"\nallow_non_loopback = true\n")
            .map_err(|err| err.to_string())?;
    let addr = config.server.bind_addr().map_err(|err| err.to_string())?;
    if addr.port() != 8787 {
        return Err("unexpected port".to_string());
    }
    Ok(())
}

#[test]
fn malformed_bind_is_rejected() -> TestResult {
    assert_invalid(
        ApiHubConfig::from_toml("[server]\nbind = \"localhost\"\n"),
        "invalid bind address",
    )
}

#[test]
fn zero_body_limit_and_blank_scenario_are_rejected() -> TestResult {
    assert_invalid(
        ApiHubConfig::from_toml("[server]\nmax_body_bytes = 0\n"),
        "max_body_bytes must be greater than zero",
    )?;
    assert_invalid(
        ApiHubConfig::from_toml("[server]\ndefault_scenario = \"  \"\n"),
        "default_scenario must be non-empty",
    )
}

#[test]
fn blank_audit_path_is_rejected() -> TestResult {
    assert_invalid(
        ApiHubConfig::from_toml("[server.audit]\npath = \" \"\n"),
        "audit.path must be non-empty",
    )
}

#[test]
fn load_reads_explicit_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("api-hub.toml");
    fs::write(&path, "[server]\ndefault_scenario = \"error\"\n[export]\nout_dir = \"docs\"\n")
        .map_err(|err| err.to_string())?;
    let config = ApiHubConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.server.default_scenario != "error" || config.export.out_dir != PathBuf::from("docs")
    {
        return Err("file values not applied".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    assert_invalid(ApiHubConfig::load(Some(&dir.path().join("absent.toml"))), "config io error")
}

#[test]
fn load_rejects_oversized_and_non_utf8_files() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let large = dir.path().join("large.toml");
    fs::write(&large, "#".repeat(MAX_CONFIG_FILE_SIZE + 1)).map_err(|err| err.to_string())?;
    assert_invalid(ApiHubConfig::load(Some(&large)), "config file exceeds size limit")?;
    let binary = dir.path().join("binary.toml");
    fs::write(&binary, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(ApiHubConfig::load(Some(&binary)), "config file must be utf-8")
}
