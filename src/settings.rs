use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "RenderSettings::default_shadow_map_size")]
    pub shadow_map_size: u32,
    #[serde(default = "RenderSettings::default_environment_map_size")]
    pub environment_map_size: u32,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub present_mode: PresentModeSetting,
    #[serde(default = "RenderSettings::default_show_shadow_map")]
    pub show_shadow_map: bool,
    #[serde(default = "RenderSettings::default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default)]
    pub placeholder_models: bool,
    #[serde(default)]
    pub vegetation: VegetationSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shadow_map_size: Self::default_shadow_map_size(),
            environment_map_size: Self::default_environment_map_size(),
            resolution: Resolution::default(),
            present_mode: PresentModeSetting::default(),
            show_shadow_map: Self::default_show_shadow_map(),
            model_dir: Self::default_model_dir(),
            placeholder_models: false,
            vegetation: VegetationSettings::default(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    /// Parses and validates settings from JSON text.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let settings = serde_json::from_str::<RenderSettings>(contents)?;
        info!("Loaded render settings");
        Ok(settings.validate())
    }

    fn validate(mut self) -> Self {
        if self.shadow_map_size == 0 {
            warn!("Shadow map size must be greater than zero. Using default value.");
            self.shadow_map_size = Self::default_shadow_map_size();
        }

        if self.environment_map_size == 0 {
            warn!("Environment map size must be greater than zero. Using default value.");
            self.environment_map_size = Self::default_environment_map_size();
        }

        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        if !(self.vegetation.extent.is_finite() && self.vegetation.extent > 0.0) {
            warn!(
                "Vegetation extent {} is not a positive number. Using default value.",
                self.vegetation.extent
            );
            self.vegetation.extent = VegetationSettings::default().extent;
        }

        self
    }

    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let desired = self.present_mode.to_wgpu();
        if available.contains(&desired) {
            return desired;
        }

        warn!(
            "Requested present mode {:?} is not supported. Falling back to FIFO.",
            desired
        );

        if available.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            available
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        }
    }

    const fn default_shadow_map_size() -> u32 {
        2048
    }

    const fn default_environment_map_size() -> u32 {
        400
    }

    const fn default_show_shadow_map() -> bool {
        true
    }

    fn default_model_dir() -> PathBuf {
        PathBuf::from("assets/models")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// How the tree variants are scattered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegetationSettings {
    #[serde(default = "VegetationSettings::default_attempts")]
    pub attempts: usize,
    #[serde(default = "VegetationSettings::default_extent")]
    pub extent: f32,
    /// Fixed seed for reproducible layouts; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl VegetationSettings {
    const fn default_attempts() -> usize {
        20
    }

    const fn default_extent() -> f32 {
        15.0
    }
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            attempts: Self::default_attempts(),
            extent: Self::default_extent(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    #[default]
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
    AutoVsync,
    AutoNoVsync,
}

impl PresentModeSetting {
    fn to_wgpu(&self) -> wgpu::PresentMode {
        match self {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let invalid = RenderSettings {
            shadow_map_size: 0,
            environment_map_size: 0,
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            vegetation: VegetationSettings {
                extent: -3.0,
                ..VegetationSettings::default()
            },
            ..RenderSettings::default()
        };

        let validated = invalid.validate();
        let defaults = RenderSettings::default();

        assert_eq!(validated.shadow_map_size, defaults.shadow_map_size);
        assert_eq!(validated.environment_map_size, defaults.environment_map_size);
        assert_eq!(validated.resolution.width, Resolution::default().width);
        assert_eq!(validated.resolution.height, Resolution::default().height);
        assert_eq!(validated.vegetation.extent, 15.0);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings = RenderSettings::from_json(
            r#"{
                "shadow_map_size": 1024,
                "placeholder_models": true,
                "vegetation": { "seed": 7 }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.shadow_map_size, 1024);
        assert_eq!(settings.environment_map_size, 400);
        assert!(settings.placeholder_models);
        assert!(settings.show_shadow_map);
        assert_eq!(settings.vegetation.attempts, 20);
        assert_eq!(settings.vegetation.seed, Some(7));
        assert_eq!(settings.model_dir, PathBuf::from("assets/models"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(RenderSettings::from_json("{ shadow_map_size: }").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = RenderSettings::load_from_path("definitely/not/here/settings.json");
        assert_eq!(settings.shadow_map_size, 2048);
        assert_eq!(settings.vegetation.attempts, 20);
    }

    #[test]
    fn present_mode_returns_desired_when_available() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];

        assert_eq!(
            settings.present_mode(&available),
            wgpu::PresentMode::Mailbox
        );
    }

    #[test]
    fn present_mode_falls_back_to_fifo_then_first_available() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        assert_eq!(
            settings.present_mode(&[wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate]),
            wgpu::PresentMode::Fifo
        );
        assert_eq!(
            settings.present_mode(&[wgpu::PresentMode::Immediate]),
            wgpu::PresentMode::Immediate
        );
    }
}
