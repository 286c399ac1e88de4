use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};

use crate::services::classifier::{default_commercial_terms, default_residential_terms};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub manifest: ManifestSettings,
    pub columns: ColumnOverrides,
    pub filters: FilterSettings,
    pub classifier: ClassifierSettings,
    pub casadinha: CasadinhaSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ManifestSettings {
    pub sheet: Option<String>,  // None = primeira aba
    pub header_scan_rows: usize,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            sheet: None,
            header_scan_rows: 15,
        }
    }
}

/// Colunas forçadas: índice base zero ("3") ou nome do cabeçalho ("Endereço")
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ColumnOverrides {
    pub cage: Option<String>,
    pub address: Option<String>,
    pub sequence: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub neighborhood: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FilterSettings {
    /// Aceita grafias próximas de bairro ("Meirelles" para "Meireles")
    pub fuzzy_neighborhoods: bool,
    pub neighborhood_threshold: f64,  // Jaro-Winkler por palavra, só com fuzzy_neighborhoods
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            fuzzy_neighborhoods: false,
            neighborhood_threshold: 0.9,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifierSettings {
    pub terms_file: Option<String>,  // YAML com commercial_terms/residential_terms
    pub commercial_terms: Vec<String>,
    pub residential_terms: Vec<String>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            terms_file: None,
            commercial_terms: default_commercial_terms(),
            residential_terms: default_residential_terms(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CasadinhaSettings {
    pub radius_m: f64,
}

impl Default for CasadinhaSettings {
    fn default() -> Self {
        Self {
            radius_m: casadinha::DEFAULT_RADIUS_M,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: String,
    pub sheet_name: String,
    pub include_classification: bool,
    pub include_stop_key: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            sheet_name: "Romaneio".to_string(),
            include_classification: true,
            include_stop_key: true,
        }
    }
}

impl Settings {
    /// Carrega configuração em camadas:
    /// config/default → config/{RUN_MODE} → arquivo explícito → WAZE_HUMANO__*
    pub fn load(explicit: Option<&str>) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // WAZE_HUMANO__CASADINHA__RADIUS_M=15
        builder = builder.add_source(
            Environment::with_prefix("WAZE_HUMANO")
                .separator("__")
                .try_parsing(true),
        );

        let s = builder.build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.manifest.header_scan_rows, 15);
        assert_eq!(settings.casadinha.radius_m, 10.0);
        assert_eq!(settings.export.sheet_name, "Romaneio");
        assert!(!settings.filters.fuzzy_neighborhoods);
        assert!(settings.classifier.commercial_terms.iter().any(|t| t == "FARMACIA"));
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fortaleza.yaml");
        std::fs::write(
            &path,
            "casadinha:\n  radius_m: 25.0\ncolumns:\n  cage: \"0\"\nexport:\n  sheet_name: Circuit\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();

        assert_eq!(settings.casadinha.radius_m, 25.0);
        assert_eq!(settings.columns.cage.as_deref(), Some("0"));
        assert_eq!(settings.export.sheet_name, "Circuit");
        // Campos ausentes mantêm o padrão
        assert_eq!(settings.manifest.header_scan_rows, 15);
        assert!(settings.export.include_stop_key);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        assert!(Settings::load(Some("/nao/existe/config.yaml")).is_err());
    }
}
