pub mod settings;

pub use settings::{
    CasadinhaSettings, ClassifierSettings, ColumnOverrides, ExportSettings, FilterSettings,
    ManifestSettings, Settings,
};
