//! Common test utilities and fixtures
#![allow(dead_code)]

use std::path::Path;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialize test logging (call once per test module)
pub fn init_logging() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::from_default_env().add_directive("smbscout=debug".parse().unwrap());

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Write a file of `size` zero bytes, creating parent directories
pub fn write_file(root: &Path, relative: &str, size: usize) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, vec![0u8; size]).unwrap();
}
