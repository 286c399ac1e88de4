//! Chave de parada e estatísticas de paradas por romaneio
//!
//! Dois pacotes com a mesma chave são entregues na mesma parada. A chave usa
//! só rua + número (dois primeiros trechos do endereço), ignorando complemento
//! e bairro.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::Manifest;
use crate::utils::normalization::clean_string;

/// Reduz um endereço à sua chave de parada
///
/// # Exemplos
/// ```
/// use waze_humano::services::stop_key::stop_key;
///
/// assert_eq!(stop_key("Rua José Vilar, 1300, apto 402"), "RUAJOSEVILAR1300");
/// assert_eq!(stop_key("Rua José Vilar, 1300 - Bloco B"), "RUAJOSEVILAR1300BLOCOB");
/// assert_eq!(stop_key("Avenida Washington Soares"), "AVENIDAWASHINGTONSOARES");
/// ```
pub fn stop_key(address: &str) -> String {
    let mut parts = address.split(',');
    let street = parts.next().unwrap_or_default().trim();
    let base = match parts.next() {
        Some(number) => format!("{} {}", street, number.trim()),
        None => street.to_string(),
    };
    clean_string(&base)
}

/// Uma parada e quantos pacotes ela recebe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopCount {
    pub key: String,
    /// Primeiro endereço original visto com essa chave
    pub address: String,
    pub packages: usize,
}

/// Distribuição de pacotes por parada
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopStats {
    pub packages: usize,
    pub stops: usize,
    pub mean_packages_per_stop: f64,
    pub max_packages_per_stop: usize,
    pub single_package_stops: usize,
    /// Paradas na ordem em que aparecem no romaneio
    pub per_stop: Vec<StopCount>,
}

/// Calcula as paradas únicas de um romaneio
pub fn stop_stats(manifest: &Manifest, address_column: usize) -> StopStats {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut per_stop: Vec<StopCount> = Vec::new();

    for address in manifest.column(address_column) {
        let key = stop_key(address);
        match index.get(&key) {
            Some(&pos) => per_stop[pos].packages += 1,
            None => {
                index.insert(key.clone(), per_stop.len());
                per_stop.push(StopCount {
                    key,
                    address: address.to_string(),
                    packages: 1,
                });
            }
        }
    }

    let packages = manifest.len();
    let stops = per_stop.len();

    StopStats {
        packages,
        stops,
        mean_packages_per_stop: if stops == 0 { 0.0 } else { packages as f64 / stops as f64 },
        max_packages_per_stop: per_stop.iter().map(|s| s.packages).max().unwrap_or(0),
        single_package_stops: per_stop.iter().filter(|s| s.packages == 1).count(),
        per_stop,
    }
}

/// Chave de parada de cada linha (coluna CHAVE_STOP da exportação)
pub fn stop_keys(manifest: &Manifest, address_column: usize) -> Vec<String> {
    manifest.column(address_column).map(stop_key).collect()
}
