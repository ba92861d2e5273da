//! Predio application binary - composition root.
//!
//! Ties the Predio crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Load the property catalog (JSON file, or built-in sample listings)
//! 3. Backfill missing listing embeddings and build the similarity index
//! 4. Wire conversation memory and the search service
//! 5. Dispatch the subcommand (search, repl, show, snapshot, reset)

mod cli;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncBufReadExt;

use predio_core::config::PredioConfig;
use predio_core::error::PredioError;
use predio_core::types::{Property, PropertyType};
use predio_memory::{ConversationMemory, ExtractiveCompletion, TurnRole};
use predio_search::{PropertyCatalog, SearchOutcome, SearchService};
use predio_vector::{DynEmbeddingService, MockEmbedding, SimilarityIndex};

use cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first, so the log level can come from it.
    let config_file = args.resolve_config_path();
    let config = PredioConfig::load_or_default(&config_file);

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Predio v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Inventory. Listings that ship without an embedding get one here, so
    // the index never holds unscorable rows for them.
    let inventory_file = args.resolve_inventory_path(&config.general.inventory_file);
    let mut properties = PropertyCatalog::load_json(&inventory_file)?.all().to_vec();

    let embedder = MockEmbedding::new(config.search.embedding_dim);
    let filled = backfill_embeddings(&mut properties, &embedder).await?;
    if filled > 0 {
        tracing::info!(filled, "Backfilled listing embeddings");
    }

    let catalog = Arc::new(PropertyCatalog::from_properties(properties)?);
    let index = Arc::new(SimilarityIndex::from_properties(
        Box::new(embedder),
        catalog.all(),
    ));

    // Memory and the search service.
    let memory = Arc::new(ConversationMemory::new(
        config.memory.clone(),
        Box::new(ExtractiveCompletion::default()),
    ));
    let service = SearchService::new(
        config.search.clone(),
        config.extraction.clone(),
        Arc::clone(&catalog),
        Arc::clone(&index),
        Arc::clone(&memory),
    );

    match args.command {
        Command::Search {
            query,
            user,
            limit,
            json,
        } => {
            let outcome = service.search(&query, &user, limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }
        Command::Repl { user } => run_repl(&service, &memory, &user).await?,
        Command::Show { id } => match service.get_by_id(&id) {
            Some(property) => print_property_card(&property),
            None => println!("No existe la propiedad '{}'.", id),
        },
        Command::Snapshot { user } => {
            let snapshot = service.snapshot(&user).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Reset { user } => {
            service.reset(&user).await?;
            println!("Memoria de '{}' reiniciada.", user);
        }
    }

    Ok(())
}

/// Generate embeddings for listings that shipped without one.
async fn backfill_embeddings(
    properties: &mut [Property],
    embedder: &dyn DynEmbeddingService,
) -> Result<usize, PredioError> {
    let mut filled = 0;
    for property in properties.iter_mut().filter(|p| p.embedding.is_empty()) {
        let text = format!("{} {}", property.title, property.description);
        property.embedding = embedder.embed_boxed(text.trim()).await?;
        filled += 1;
    }
    Ok(filled)
}

/// Interactive conversation loop. Each line is a query; the turn and the
/// reply both land in conversation memory, so summarization exercises the
/// same path a hosted deployment would.
async fn run_repl(
    service: &SearchService,
    memory: &ConversationMemory,
    user: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Cuéntame qué estás buscando (escribe \"salir\" para terminar).");
    prompt()?;

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        if query.is_empty() {
            prompt()?;
            continue;
        }
        if query.eq_ignore_ascii_case("salir") {
            break;
        }

        memory.record_turn(user, TurnRole::User, query).await?;
        let outcome = service.search(query, user, None).await?;
        print_outcome(&outcome);

        let reply = if outcome.properties.is_empty() {
            "No encontré propiedades con esos criterios.".to_string()
        } else {
            format!(
                "Encontré {} propiedades que podrían interesarte.",
                outcome.properties.len()
            )
        };
        memory.record_turn(user, TurnRole::Assistant, &reply).await?;
        prompt()?;
    }

    println!("¡Hasta pronto!");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

fn print_outcome(outcome: &SearchOutcome) {
    if outcome.degraded {
        println!("(resultados solo por filtros; la búsqueda semántica no está disponible)");
    }
    if outcome.properties.is_empty() {
        println!("No encontré propiedades que coincidan con tus criterios.");
        return;
    }
    if outcome.properties.len() == 1 {
        println!("Encontré esta propiedad que podría interesarte:");
    } else {
        println!(
            "Encontré {} propiedades que podrían interesarte:",
            outcome.properties.len()
        );
    }
    for (i, property) in outcome.properties.iter().enumerate() {
        println!("{}. {}", i + 1, property.title);
        println!(
            "   {} | {} hab | {} baños | {} m² | {}",
            format_cop(property.price),
            property.bedrooms,
            property.bathrooms,
            property.area,
            property.location
        );
    }
}

fn print_property_card(property: &Property) {
    println!("{} [{}]", property.title, property.id);
    println!("  Precio: {}", format_cop(property.price));
    println!(
        "  {} habitaciones | {} baños | {} m²",
        property.bedrooms, property.bathrooms, property.area
    );
    println!("  Zona: {} | Tipo: {}", property.location, type_label(property.property_type));
    if !property.amenities.is_empty() {
        let amenities: Vec<&str> = property.amenities.iter().map(String::as_str).collect();
        println!("  Características: {}", amenities.join(", "));
    }
    if !property.description.is_empty() {
        println!("  {}", property.description);
    }
    if !property.url.is_empty() {
        println!("  Ver detalles: {}", property.url);
    }
}

fn type_label(property_type: PropertyType) -> &'static str {
    match property_type {
        PropertyType::Apartment => "apartamento",
        PropertyType::House => "casa",
        PropertyType::Other => "otro",
    }
}

/// Format a COP price with dots as thousand separators.
fn format_cop(price: u64) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}
