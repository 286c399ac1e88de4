//! Tipos de erro para o crate casadinha

use thiserror::Error;

/// Erros do agrupamento de paradas
#[derive(Debug, Error)]
pub enum CasadinhaError {
    /// Raio negativo, infinito ou NaN
    #[error("Invalid merge radius: {0} (expected a finite value >= 0)")]
    InvalidRadius(f64),

    /// Índice de coluna além da largura da planilha
    #[error("Column {role} index {index} is out of range (table width {width})")]
    ColumnOutOfRange {
        role: &'static str,
        index: usize,
        width: usize,
    },
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, CasadinhaError>;
