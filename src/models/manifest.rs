//! Romaneio em memória: cabeçalhos e linhas como texto

use serde::Serialize;

/// Planilha de entregas já convertida para texto
///
/// As linhas podem ter larguras diferentes; células ausentes valem "".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Manifest {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Linha (base zero) da planilha onde estava o cabeçalho, contando linhas em branco
    pub header_row: Option<usize>,
    pub source: String,
}

impl Manifest {
    /// Monta o romaneio a partir da grade bruta
    ///
    /// Com `header_row`, essa linha vira cabeçalho e só as seguintes são dados
    /// (linhas anteriores, como títulos do relatório, são descartadas).
    /// Sem cabeçalho, as colunas recebem nomes `COLUNA_1..N`.
    ///
    /// `header_row` fica com o índice na grade; o leitor da planilha o troca
    /// pela linha real quando descartou linhas em branco.
    pub fn from_grid(mut grid: Vec<Vec<String>>, header_row: Option<usize>, source: impl Into<String>) -> Self {
        let (headers, rows, header_row) = match header_row {
            Some(idx) if idx < grid.len() => {
                let rows = grid.split_off(idx + 1);
                let headers = grid.pop().unwrap_or_default();
                (headers, rows, Some(idx))
            }
            _ => (Vec::new(), grid, None),
        };

        let mut manifest = Self {
            headers,
            rows,
            header_row,
            source: source.into(),
        };
        manifest.pad_headers();
        manifest
    }

    fn pad_headers(&mut self) {
        let width = self.width();
        for i in self.headers.len()..width {
            self.headers.push(format!("COLUNA_{}", i + 1));
        }
        for (i, header) in self.headers.iter_mut().enumerate() {
            if header.trim().is_empty() {
                *header = format!("COLUNA_{}", i + 1);
            }
        }
    }

    /// Largura da linha mais larga (incluindo o cabeçalho)
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Valores de uma coluna, na ordem das linhas
    pub fn column(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, column))
    }

    pub fn header(&self, column: usize) -> &str {
        self.headers.get(column).map(String::as_str).unwrap_or("")
    }

    /// Novo romaneio com as linhas que passam no predicado
    pub fn retain_rows(&self, mut keep: impl FnMut(&[String]) -> bool) -> Manifest {
        Manifest {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
            header_row: self.header_row,
            source: self.source.clone(),
        }
    }

    /// Substitui as linhas mantendo cabeçalho e origem
    pub fn with_rows(&self, rows: Vec<Vec<String>>) -> Manifest {
        let mut manifest = Manifest {
            headers: self.headers.clone(),
            rows,
            header_row: self.header_row,
            source: self.source.clone(),
        };
        manifest.pad_headers();
        manifest
    }

    /// Acrescenta uma coluna no fim; `values` deve ter uma entrada por linha
    pub fn push_column(&mut self, name: &str, values: Vec<String>) {
        let width = self.width();
        self.headers.resize(width, String::new());
        self.pad_headers();
        self.headers.push(name.to_string());

        for (row, value) in self.rows.iter_mut().zip(values) {
            row.resize(width, String::new());
            row.push(value);
        }
    }

    /// Linhas com todas as colunas preenchidas até a largura total
    pub fn padded_rows(&self) -> Vec<Vec<String>> {
        let width = self.width();
        self.rows
            .iter()
            .map(|r| {
                let mut row = r.clone();
                row.resize(width, String::new());
                row
            })
            .collect()
    }
}
