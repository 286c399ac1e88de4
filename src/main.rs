/// Waze Humano: filtro de romaneios Shopee
///
/// Fluxo:
/// - Lê o romaneio (xlsx/xls/ods/csv) e detecta cabeçalho e colunas
/// - Filtra por gaiola e/ou bairro
/// - Classifica endereços (comércio/residencial)
/// - Junta casadinhas e exporta para o Circuit

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use waze_humano::config::Settings;
use waze_humano::services::{answer_question, cage_overview, run, RouteRequest, RouteResult};
use waze_humano::utils::logging::*;
use waze_humano::utils::{fit_cell, truncate_chars};

/// Waze Humano - filtro de romaneios e casadinhas para o Circuit
#[derive(Parser)]
#[command(name = "waze-humano")]
#[command(version)]
#[command(about = "Filtro de romaneios Shopee: gaiolas, paradas e casadinhas", long_about = None)]
struct Cli {
    /// Arquivo de configuração extra (yaml/toml/json)
    #[arg(short = 'c', long, env = "WAZE_HUMANO_CONFIG", global = true)]
    config: Option<String>,

    /// Formato de saída (json, pretty)
    #[arg(short = 'o', long, default_value = "pretty", global = true)]
    output: OutputFormat,

    /// Modo verbose para debug
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Comando a executar
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, PartialEq)]
enum OutputFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(format!("Formato desconhecido: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Lista as gaiolas do romaneio com pacotes e paradas
    Gaiolas {
        /// Romaneio (xlsx, xls, ods ou csv)
        arquivo: PathBuf,
    },

    /// Conta paradas únicas (opcionalmente de uma gaiola)
    Paradas {
        arquivo: PathBuf,

        /// Código da gaiola (ex: B-50)
        #[arg(short = 'g', long)]
        gaiola: Option<String>,

        /// Quantas paradas listar
        #[arg(short = 't', long, default_value_t = 15)]
        top: usize,
    },

    /// Filtra por gaiola/bairro, classifica e exporta
    Filtrar {
        arquivo: PathBuf,

        #[arg(short = 'g', long)]
        gaiola: Option<String>,

        /// Bairro (pode repetir: -b Aldeota -b Meireles)
        #[arg(short = 'b', long = "bairro")]
        bairros: Vec<String>,

        /// Aceita grafias próximas do bairro ("Meirelles")
        #[arg(long = "bairro-aproximado")]
        aproximado: bool,

        /// Arquivo de saída (.xlsx ou .csv); padrão: romaneio_<GAIOLA>_<data>.xlsx
        #[arg(short = 's', long)]
        saida: Option<PathBuf>,
    },

    /// Junta casadinhas e exporta a planilha para o Circuit
    Circuit {
        arquivo: PathBuf,

        #[arg(short = 'g', long)]
        gaiola: Option<String>,

        #[arg(short = 'b', long = "bairro")]
        bairros: Vec<String>,

        #[arg(long = "bairro-aproximado")]
        aproximado: bool,

        #[arg(short = 's', long)]
        saida: Option<PathBuf>,

        /// Raio (metros) para unir endereços escritos de forma diferente
        #[arg(short = 'r', long)]
        raio: Option<f64>,
    },

    /// Responde "quantas paradas tem a gaiola X?" sem sair da máquina
    Consultar {
        arquivo: PathBuf,

        /// Pergunta livre mencionando a gaiola
        pergunta: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_route_result(result: &RouteResult) {
    let report = &result.report;
    println!("📂 {}", report.source);
    if let Some(cage) = &report.cage {
        println!("🎯 Gaiola {}", cage);
    }
    println!(
        "📦 Pacotes: {} de {} | 📍 Paradas: {}",
        report.filtered_packages, report.total_packages, report.stops
    );
    println!("🏪 Comércio: {} | 🏠 Residencial: {}", report.commercial, report.residential);
    if let Some(merged) = report.merged_stops {
        println!("🧩 Casadinhas: {} → {} paradas no Circuit", report.casadinhas, merged);
    }
    if let Some(path) = &report.output {
        println!("💾 Arquivo: {}", path);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Inicializar tracing (stderr, para não misturar com a saída JSON)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if dotenv_loaded {
        tracing::debug!("✅ Arquivo .env carregado com sucesso");
    }

    // Carregar configurações
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    let result = execute(&cli, &mut settings);
    if let Err(e) = &result {
        log_error(&format!("❌ {:#}", e));
    }
    result
}

fn execute(cli: &Cli, settings: &mut Settings) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Gaiolas { arquivo } => {
            let overview = cage_overview(settings, arquivo)?;
            if cli.output == OutputFormat::Json {
                return print_json(&overview);
            }
            if overview.is_empty() {
                log_warning("⚠️ Nenhuma gaiola encontrada");
            }
            println!("{} {} PARADAS", fit_cell("GAIOLA", 8), fit_cell("PACOTES", 8));
            for cage in &overview {
                println!(
                    "{} {} {}",
                    fit_cell(&cage.code, 8),
                    fit_cell(&cage.packages.to_string(), 8),
                    cage.stops
                );
            }
        }

        Commands::Paradas { arquivo, gaiola, top } => {
            let request = RouteRequest {
                input: arquivo.clone(),
                cage: gaiola.clone(),
                ..Default::default()
            };
            let result = run(settings, &request)?;
            if cli.output == OutputFormat::Json {
                return print_json(&result.stats);
            }

            let stats = &result.stats;
            println!("📦 Total de PACOTES: {}", stats.packages);
            println!("📍 Total de PARADAS: {}", stats.stops);
            println!("- Média de pacotes por parada: {:.1}", stats.mean_packages_per_stop);
            println!("- Parada com mais pacotes: {} pacotes", stats.max_packages_per_stop);
            println!("- Paradas com 1 pacote: {}", stats.single_package_stops);
            println!();
            for (i, stop) in stats.per_stop.iter().take(*top).enumerate() {
                println!("{:>3}. {} ({} pacotes)", i + 1, truncate_chars(&stop.address, 60), stop.packages);
            }
        }

        Commands::Filtrar {
            arquivo,
            gaiola,
            bairros,
            aproximado,
            saida,
        } => {
            if *aproximado {
                settings.filters.fuzzy_neighborhoods = true;
            }
            let request = RouteRequest {
                input: arquivo.clone(),
                cage: gaiola.clone(),
                neighborhoods: bairros.clone(),
                merge_casadinhas: false,
                export: true,
                output: saida.clone(),
            };
            let result = run(settings, &request)?;
            if cli.output == OutputFormat::Json {
                return print_json(&result.report);
            }
            print_route_result(&result);
        }

        Commands::Circuit {
            arquivo,
            gaiola,
            bairros,
            aproximado,
            saida,
            raio,
        } => {
            if *aproximado {
                settings.filters.fuzzy_neighborhoods = true;
            }
            if let Some(radius) = raio {
                settings.casadinha.radius_m = *radius;
            }
            let request = RouteRequest {
                input: arquivo.clone(),
                cage: gaiola.clone(),
                neighborhoods: bairros.clone(),
                merge_casadinhas: true,
                export: true,
                output: saida.clone(),
            };
            let result = run(settings, &request)?;
            if cli.output == OutputFormat::Json {
                return print_json(&result.report);
            }
            print_route_result(&result);
        }

        Commands::Consultar { arquivo, pergunta } => {
            let answer = answer_question(settings, arquivo, pergunta)?;
            if cli.output == OutputFormat::Json {
                return print_json(&answer);
            }
            log_info(&format!("🔍 Gaiola detectada: {}", answer.cage));
            println!("🤖 {}", answer.answer);
        }
    }

    Ok(())
}
