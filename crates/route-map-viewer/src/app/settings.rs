use clap::Parser;
use route_map_lib::{Credential, SurfaceConfig, sample};

/// Default public access token used when the user has not supplied one
pub const DEFAULT_ACCESS_TOKEN: &str =
    "pk.eyJ1IjoibWFwYm94IiwiYSI6ImNpejY4NXVycTA2emYycXBndHRqcmZ3N3gifQ.rJcFIG214AriISLbB6B5aw";

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Interactive route map viewer for the Media Maratón de Quibdó
pub struct Settings {
    /// Mapping engine access token (overrides the built-in default)
    #[clap(long, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Basemap style identifier
    #[clap(long, default_value = "dark-v11")]
    pub style: String,

    /// Initial zoom level
    #[clap(long, default_value = "13.0")]
    pub zoom: f64,

    /// Initial camera pitch in degrees (ignored by flat tile basemaps)
    #[clap(long, default_value = "45.0")]
    pub pitch: f64,
}

impl Settings {
    pub fn from_cli() -> Self {
        Self::parse()
    }

    /// The credential to start with: CLI override or the built-in default
    pub fn credential(&self) -> Credential {
        match &self.access_token {
            Some(token) => Credential::new(token.clone()),
            None => Credential::new(DEFAULT_ACCESS_TOKEN),
        }
    }

    pub fn surface_config(&self) -> SurfaceConfig {
        SurfaceConfig {
            style: self.style.clone(),
            center: sample::default_center(),
            zoom: self.zoom,
            pitch: self.pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_credential_used_without_override() {
        let settings = Settings::parse_from(["route-map-viewer"]);
        assert_eq!(settings.credential().as_str(), DEFAULT_ACCESS_TOKEN);
    }

    #[test]
    fn test_cli_token_overrides_default() {
        let settings =
            Settings::parse_from(["route-map-viewer", "--access-token", "pk.from-cli"]);
        assert_eq!(settings.credential().as_str(), "pk.from-cli");
    }

    #[test]
    fn test_surface_config_defaults() {
        let settings = Settings::parse_from(["route-map-viewer"]);
        let config = settings.surface_config();
        assert_eq!(config.style, "dark-v11");
        assert!((config.zoom - 13.0).abs() < f64::EPSILON);
    }
}
