use crate::compose::ShadowStyle;
use crate::constants::{
    DOCUMENT_QUALITY, HIGH_FIDELITY_QUALITY, MAX_QUALITY_SCALE, SCREEN_IMAGE_QUALITY,
};
use crate::geometry::TransformLimits;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Export and composition configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportOptions {
    // Quality scale per output kind
    pub screen_quality: f32,
    pub high_fidelity_quality: f32,
    pub document_quality: f32,

    // Raster encoding for image kinds
    pub encoding: ImageEncoding,

    // Appearance
    pub shadow: ShadowStyle,

    // Overlay bounds
    pub limits: TransformLimits,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            screen_quality: SCREEN_IMAGE_QUALITY,
            high_fidelity_quality: HIGH_FIDELITY_QUALITY,
            document_quality: DOCUMENT_QUALITY,
            encoding: ImageEncoding::Png,
            shadow: ShadowStyle::default(),
            limits: TransformLimits::default(),
        }
    }
}

impl ExportOptions {
    /// Quality scale used when a caller does not pass one
    pub fn default_quality(&self, kind: ExportKind) -> f32 {
        match kind {
            ExportKind::ScreenImage => self.screen_quality,
            ExportKind::HighFidelityImage => self.high_fidelity_quality,
            ExportKind::Document => self.document_quality,
        }
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ComposeError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ComposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        for (name, quality) in [
            ("screen_quality", self.screen_quality),
            ("high_fidelity_quality", self.high_fidelity_quality),
            ("document_quality", self.document_quality),
        ] {
            if !(quality.is_finite() && quality > 0.0) {
                return Err(ComposeError::Config(format!(
                    "{name} must be a positive number, got {quality}"
                )));
            }
            if quality > MAX_QUALITY_SCALE {
                return Err(ComposeError::Config(format!(
                    "{name} must be at most {MAX_QUALITY_SCALE}, got {quality}"
                )));
            }
        }

        let limits = &self.limits;
        if !(limits.min_scale > 0.0 && limits.min_scale <= limits.max_scale) {
            return Err(ComposeError::Config(format!(
                "Scale range {}..{} is invalid",
                limits.min_scale, limits.max_scale
            )));
        }
        if limits.padding < 0.0 {
            return Err(ComposeError::Config("Padding cannot be negative".to_string()));
        }

        if let ImageEncoding::Jpeg { quality } = self.encoding {
            if quality == 0 || quality > 100 {
                return Err(ComposeError::Config(format!(
                    "JPEG quality must be within 1..=100, got {quality}"
                )));
            }
        }

        Ok(())
    }
}
