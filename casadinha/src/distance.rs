//! Coordenadas GPS e distância geodésica entre paradas

use ::geo::{Distance, Haversine, Point};

/// Coordenada WGS84 de uma parada
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Cria uma coordenada validando os limites de latitude/longitude
    ///
    /// `(0, 0)` é tratado como ausente: planilhas exportam zero quando não há GPS.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon)
            && !(lat == 0.0 && lon == 0.0);

        valid.then_some(Self { lat, lon })
    }

    /// Lê latitude/longitude de células de texto
    ///
    /// Aceita vírgula decimal ("-3,7319").
    ///
    /// # Exemplos
    ///
    /// ```
    /// use casadinha::Coordinate;
    ///
    /// assert!(Coordinate::parse("-3,7319", "-38.5267").is_some());
    /// assert!(Coordinate::parse("", "-38.5267").is_none());
    /// assert!(Coordinate::parse("0", "0").is_none());
    /// ```
    pub fn parse(lat: &str, lon: &str) -> Option<Self> {
        Self::new(parse_decimal(lat)?, parse_decimal(lon)?)
    }

    /// Distância em metros pela fórmula de Haversine
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let a = Point::new(self.lon, self.lat);
        let b = Point::new(other.lon, other.lat);
        Haversine::distance(a, b)
    }

    pub fn within(&self, other: &Coordinate, radius_m: f64) -> bool {
        self.distance_m(other) <= radius_m
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".").parse().ok()
    } else {
        trimmed.parse().ok()
    }
}
