//! Configuration for the extraction service.
//!
//! All behaviour is controlled through [`AppConfig`], constructed once at
//! startup and passed by reference into the components that need it. There
//! is deliberately no ambient global state: the upload directory, model id
//! and generation knobs travel explicitly so tests can build isolated
//! configs and two servers with different settings could share a process.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};

/// Configuration for the extraction pipeline and server.
///
/// Built via [`AppConfig::builder()`] or [`AppConfig::default()`].
///
/// # Example
/// ```rust
/// use medreport_extract::AppConfig;
///
/// let config = AppConfig::builder()
///     .upload_dir("Uploads")
///     .model("gemini-1.5-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory uploads are persisted into. Created at startup; files are
    /// overwritten on name collision and never deleted by the service.
    /// Default: `Uploads`.
    pub upload_dir: PathBuf,

    /// Gemini model id used for every extraction call.
    /// Default: `gemini-1.5-flash`.
    pub model: String,

    /// Sampling temperature for the extraction call. Default: 0.3.
    ///
    /// Low but non-zero: the report layout varies enough that a little
    /// sampling freedom helps the model recover odd table shapes without
    /// drifting into invented values.
    pub temperature: f32,

    /// Maximum tokens the model may generate per page. Default: 1000.
    ///
    /// A report page rarely yields more than a few dozen key/value lines;
    /// 1000 tokens covers that while keeping a runaway reply bounded.
    pub max_output_tokens: usize,

    /// Maximum rendered page dimension (width or height) in pixels.
    /// Default: 2000.
    ///
    /// A safety cap independent of the page's physical size: an A0 page
    /// would otherwise rasterise to an image large enough to exhaust
    /// memory and blow past the API upload limit.
    pub max_rendered_pixels: u32,

    /// Per-model-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("Uploads"),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.3,
            max_output_tokens: 1000,
            max_rendered_pixels: 2000,
            api_timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Create a new builder for `AppConfig`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn upload_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.upload_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AppConfig, ExtractError> {
        let c = &self.config;
        if c.model.is_empty() {
            return Err(ExtractError::InvalidConfig("model id must not be empty".into()));
        }
        if c.max_output_tokens == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_rendered_pixels < 100 {
            return Err(ExtractError::InvalidConfig(format!(
                "max_rendered_pixels must be ≥ 100, got {}",
                c.max_rendered_pixels
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let c = AppConfig::default();
        assert_eq!(c.upload_dir, PathBuf::from("Uploads"));
        assert_eq!(c.model, "gemini-1.5-flash");
        assert_eq!(c.temperature, 0.3);
        assert_eq!(c.max_output_tokens, 1000);
    }

    #[test]
    fn builder_rejects_zero_pixel_cap() {
        let err = AppConfig::builder().max_rendered_pixels(0).build();
        assert!(matches!(err, Err(ExtractError::InvalidConfig(_))));
    }

    #[test]
    fn temperature_is_clamped() {
        let c = AppConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }
}
