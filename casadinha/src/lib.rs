//! Motor de casadinhas para o Circuit
//!
//! Uma "casadinha" são dois ou mais pacotes entregues na mesma parada física.
//! Este crate agrupa linhas de um romaneio que apontam para o mesmo endereço
//! e colapsa cada grupo numa única parada, economizando paradas no app de rotas.
//!
//! Heurística de agrupamento:
//!
//! - Extrai o número da casa e o nome normalizado da rua de cada endereço
//! - Ordena por (número, rua) para que duplicatas fiquem adjacentes
//! - Une vizinhos com o mesmo número e (mesma rua OU distância ≤ raio)
//! - Cada grupo vira uma linha: endereço mais longo, sequências unidas,
//!   demais colunas do primeiro membro que tiver valor
//! - Saída reordenada pela sequência original da rota
//!
//! # Exemplo Básico
//!
//! ```
//! use casadinha::{merge_stops, MergeOptions, StopColumns};
//!
//! let rows = vec![
//!     vec!["Rua das Flores, 120".to_string(), "3".to_string()],
//!     vec!["Rua das Flores, 120 - Apto 2".to_string(), "1".to_string()],
//!     vec!["Avenida Central, 45".to_string(), "2".to_string()],
//! ];
//! let columns = StopColumns::new(0).with_sequence(1);
//!
//! let outcome = merge_stops(&rows, &columns, &MergeOptions::default()).unwrap();
//!
//! assert_eq!(outcome.rows.len(), 2);
//! assert_eq!(outcome.rows[0][0], "Rua das Flores, 120 - Apto 2");
//! assert_eq!(outcome.rows[0][1], "1,3");
//! ```

pub mod cluster;
pub mod error;
pub mod distance;
pub mod matching;

// Re-exports principais
pub use cluster::{merge_stops, Cluster, MergeOptions, MergeOutcome, StopColumns};
pub use error::{CasadinhaError, Result};
pub use distance::Coordinate;
pub use matching::StopKey;

/// Raio padrão (metros) para considerar duas coordenadas o mesmo ponto
pub const DEFAULT_RADIUS_M: f64 = 10.0;
