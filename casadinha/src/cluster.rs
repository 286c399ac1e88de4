//! Agrupamento de paradas adjacentes em casadinhas

use std::cmp::Ordering;

use tracing::debug;

use crate::distance::Coordinate;
use crate::error::{CasadinhaError, Result};
use crate::matching::StopKey;
use crate::DEFAULT_RADIUS_M;

/// Posição (base zero) das colunas usadas no agrupamento
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopColumns {
    pub address: usize,
    pub sequence: Option<usize>,
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
}

impl StopColumns {
    pub fn new(address: usize) -> Self {
        Self {
            address,
            sequence: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_sequence(mut self, sequence: usize) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_coordinates(mut self, latitude: usize, longitude: usize) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    fn validate(&self, width: usize) -> Result<()> {
        let roles = [
            ("address", Some(self.address)),
            ("sequence", self.sequence),
            ("latitude", self.latitude),
            ("longitude", self.longitude),
        ];

        for (role, index) in roles {
            if let Some(index) = index {
                if index >= width {
                    return Err(CasadinhaError::ColumnOutOfRange { role, index, width });
                }
            }
        }
        Ok(())
    }
}

/// Parâmetros do agrupamento
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Distância máxima (metros) para unir endereços com ruas escritas diferente
    pub radius_m: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
        }
    }
}

/// Linhas originais que viraram uma única parada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Índices das linhas de entrada, em ordem crescente
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn is_casadinha(&self) -> bool {
        self.members.len() > 1
    }
}

/// Resultado do agrupamento: `rows[i]` é o colapso de `clusters[i]`
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub rows: Vec<Vec<String>>,
    pub clusters: Vec<Cluster>,
}

impl MergeOutcome {
    /// Quantas paradas foram economizadas
    pub fn saved_stops(&self) -> usize {
        self.clusters.iter().map(|c| c.members.len() - 1).sum()
    }

    pub fn casadinhas(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter().filter(|c| c.is_casadinha())
    }
}

struct Entry {
    index: usize,
    key: StopKey,
    coordinate: Option<Coordinate>,
}

impl Entry {
    fn belongs_with(&self, other: &Entry, radius_m: f64) -> bool {
        if !self.key.same_number(&other.key) {
            return false;
        }
        if self.key.same_street(&other.key) {
            return true;
        }
        match (&self.coordinate, &other.coordinate) {
            (Some(a), Some(b)) => a.within(b, radius_m),
            _ => false,
        }
    }
}

/// Une linhas que representam a mesma parada física
///
/// Células ausentes em linhas curtas são lidas como vazias; a saída sempre tem
/// a largura da linha mais larga.
pub fn merge_stops(
    rows: &[Vec<String>],
    columns: &StopColumns,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    if !options.radius_m.is_finite() || options.radius_m < 0.0 {
        return Err(CasadinhaError::InvalidRadius(options.radius_m));
    }
    if rows.is_empty() {
        return Ok(MergeOutcome::default());
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    columns.validate(width)?;

    let mut entries: Vec<Entry> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| Entry {
            index,
            key: StopKey::from_address(cell(row, columns.address)),
            coordinate: match (columns.latitude, columns.longitude) {
                (Some(lat), Some(lon)) => Coordinate::parse(cell(row, lat), cell(row, lon)),
                _ => None,
            },
        })
        .collect();

    // sort_by é estável: empates mantêm a ordem original
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current = vec![entries[0].index];
    for pair in entries.windows(2) {
        if pair[0].belongs_with(&pair[1], options.radius_m) {
            current.push(pair[1].index);
        } else {
            groups.push(std::mem::replace(&mut current, vec![pair[1].index]));
        }
    }
    groups.push(current);

    let mut collapsed: Vec<(Cluster, Vec<String>)> = groups
        .into_iter()
        .map(|mut members| {
            members.sort_unstable();
            let row = collapse(rows, &members, columns, width);
            (Cluster { members }, row)
        })
        .collect();

    collapsed.sort_by(|(ca, ra), (cb, rb)| {
        let seq_a = columns.sequence.and_then(|s| numeric_prefix(&ra[s]));
        let seq_b = columns.sequence.and_then(|s| numeric_prefix(&rb[s]));
        compare_route_order(seq_a, seq_b).then_with(|| ca.members[0].cmp(&cb.members[0]))
    });

    let (clusters, merged_rows): (Vec<Cluster>, Vec<Vec<String>>) = collapsed.into_iter().unzip();

    debug!(
        "🧩 Casadinhas: {} linhas → {} paradas",
        rows.len(),
        merged_rows.len()
    );

    Ok(MergeOutcome {
        rows: merged_rows,
        clusters,
    })
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Primeiro valor não vazio da coluna entre os membros
fn first_filled<'a>(rows: &'a [Vec<String>], members: &[usize], column: usize) -> &'a str {
    members
        .iter()
        .map(|&m| cell(&rows[m], column))
        .find(|value| !value.trim().is_empty())
        .unwrap_or("")
}

fn collapse(rows: &[Vec<String>], members: &[usize], columns: &StopColumns, width: usize) -> Vec<String> {
    let first = &rows[members[0]];
    let mut merged: Vec<String> = (0..width)
        .map(|i| first_filled(rows, members, i).to_string())
        .collect();

    // Latitude e longitude vêm juntas do primeiro membro com coordenada válida
    if let (Some(lat), Some(lon)) = (columns.latitude, columns.longitude) {
        let located = members
            .iter()
            .map(|&m| &rows[m])
            .find(|row| Coordinate::parse(cell(row, lat), cell(row, lon)).is_some());
        if let Some(row) = located {
            merged[lat] = cell(row, lat).to_string();
            merged[lon] = cell(row, lon).to_string();
        }
    }

    // Endereço mais longo = mais completo; empate fica com o primeiro
    let mut longest = cell(first, columns.address);
    for &member in &members[1..] {
        let candidate = cell(&rows[member], columns.address);
        if candidate.chars().count() > longest.chars().count() {
            longest = candidate;
        }
    }
    merged[columns.address] = longest.to_string();

    if let Some(seq) = columns.sequence {
        let values = members.iter().map(|&m| cell(&rows[m], seq));
        merged[seq] = merge_sequences(values);
    }

    merged
}

/// União ordenada das sequências, separadas por vírgula
///
/// Valores já combinados ("3,7") são desmembrados antes da união.
pub fn merge_sequences<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let mut parts: Vec<&str> = values
        .into_iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    parts.sort_by(|a, b| compare_sequence_values(a, b));
    parts.dedup();
    parts.join(",")
}

fn compare_sequence_values(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Dígitos iniciais da sequência ("12,15" → 12)
pub fn numeric_prefix(value: &str) -> Option<u64> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn compare_route_order(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
