//! Runtime configuration
//!
//! Everything is read from environment variables so the host process can
//! point the bindings at vendor libraries without a rebuild:
//!
//! - `VG_EGL_LIBRARY`: EGL library (default: the loader's `libEGL.so.1`)
//! - `VG_EGL_BCM_HOST_LIBRARY`: Broadcom host library (default `libbcm_host.so`)
//! - `VG_EGL_GLES_LIBRARY`: GLES library (default `libGLESv2.so`)
//! - `VG_EGL_LCD`: dispmanx display number (default 0, the main LCD)
//! - `VG_EGL_LAYER`: dispmanx layer of the full-screen element (default 0)

use std::path::PathBuf;
use std::str::FromStr;

use crate::{Error, Result};

pub const ENV_EGL_LIBRARY: &str = "VG_EGL_LIBRARY";
pub const ENV_BCM_HOST_LIBRARY: &str = "VG_EGL_BCM_HOST_LIBRARY";
pub const ENV_GLES_LIBRARY: &str = "VG_EGL_GLES_LIBRARY";
pub const ENV_LCD: &str = "VG_EGL_LCD";
pub const ENV_LAYER: &str = "VG_EGL_LAYER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub egl_library: Option<PathBuf>,
    pub bcm_host_library: PathBuf,
    pub gles_library: PathBuf,
    pub lcd: u16,
    pub layer: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            egl_library: None,
            bcm_host_library: PathBuf::from("libbcm_host.so"),
            gles_library: PathBuf::from("libGLESv2.so"),
            lcd: 0,
            layer: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_EGL_LIBRARY) {
            config.egl_library = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(ENV_BCM_HOST_LIBRARY) {
            config.bcm_host_library = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_GLES_LIBRARY) {
            config.gles_library = PathBuf::from(path);
        }
        if let Some(lcd) = lookup(ENV_LCD) {
            config.lcd = parse(ENV_LCD, &lcd)?;
        }
        if let Some(layer) = lookup(ENV_LAYER) {
            config.layer = parse(ENV_LAYER, &layer)?;
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{}={:?} is not a valid number", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.lcd, 0);
        assert!(config.egl_library.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_EGL_LIBRARY, "/opt/vc/lib/libbrcmEGL.so"),
            (ENV_GLES_LIBRARY, "/opt/vc/lib/libbrcmGLESv2.so"),
            (ENV_LCD, " 2 "),
            (ENV_LAYER, "-1"),
        ]))
        .unwrap();

        assert_eq!(
            config.egl_library,
            Some(PathBuf::from("/opt/vc/lib/libbrcmEGL.so"))
        );
        assert_eq!(config.gles_library, PathBuf::from("/opt/vc/lib/libbrcmGLESv2.so"));
        assert_eq!(config.bcm_host_library, PathBuf::from("libbcm_host.so"));
        assert_eq!(config.lcd, 2);
        assert_eq!(config.layer, -1);
    }

    #[test]
    fn test_invalid_number() {
        let err = Config::from_lookup(lookup_from(&[(ENV_LCD, "hdmi")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(ENV_LCD));
    }
}
