use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_bamboo_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("BAMBOO_CONFIG_PATH", "/tmp/bamboo-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/bamboo-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("bamboo")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("bamboo")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
paths = ["/music", "/more-music"]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false
max_depth = 3
min_track_duration_secs = 30

[session]
progress_tick_ms = 500

[ui]
header_text = "hello"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BAMBOO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("BAMBOO__SESSION__PROGRESS_TICK_MS");

    let s = Settings::load().unwrap();
    assert_eq!(
        s.library.paths,
        vec![
            std::path::PathBuf::from("/music"),
            std::path::PathBuf::from("/more-music")
        ]
    );
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.max_depth, Some(3));
    assert_eq!(s.library.min_track_duration_secs, 30);
    assert_eq!(s.session.progress_tick_ms, 500);
    assert_eq!(s.ui.header_text, "hello");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[session]
progress_tick_ms = 1000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BAMBOO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("BAMBOO__SESSION__PROGRESS_TICK_MS", "250");

    let s = Settings::load().unwrap();
    assert_eq!(s.session.progress_tick_ms, 250);
}

#[test]
fn defaults_keep_the_sixty_second_floor_and_one_second_tick() {
    let s = Settings::default();
    assert_eq!(s.library.min_track_duration_secs, 60);
    assert_eq!(s.session.progress_tick_ms, 1000);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_zero_tick() {
    let mut s = Settings::default();
    s.session.progress_tick_ms = 0;
    assert!(s.validate().is_err());
}
