use crate::config::Settings;
use crate::context::{assemble, ContextBundle};
use crate::embedding::{document_text, Embedder};
use crate::error::{Error, Result};
use crate::extractor::{load_document, Segmenter};
use crate::llm::Generator;
use crate::model::{Category, RecipeRecord};
use crate::query;
use crate::store::RecipeStore;
use std::io::{BufRead, Write};
use tracing::info;

/// Extract recipe records from a document and print a summary.
pub async fn extract(settings: &Settings, input: Option<String>) -> Result<()> {
    let records = extract_records(settings, input)?;

    println!("Extracted {} recipes\n", records.len());
    for record in &records {
        println!(
            "  {}  [{}]  page {}  ({} ingredient lines{})",
            record.header,
            record.category_label(),
            record.position.page,
            record.ingredients.lines().count(),
            if record.tip.is_some() { ", tip" } else { "" },
        );
    }

    Ok(())
}

/// Full ingest pipeline: extract, embed, rebuild the vector table.
pub async fn ingest(settings: &Settings, input: Option<String>) -> Result<()> {
    println!("[1/3] Extracting recipes...");
    let records = extract_records(settings, input)?;
    if records.is_empty() {
        return Err(Error::MalformedRecord(
            "document produced no valid recipe records".to_string(),
        ));
    }
    println!("  {} recipes extracted", records.len());

    println!("[2/3] Generating embeddings...");
    let embedder = Embedder::new().await?;
    let texts: Vec<String> = records.iter().map(document_text).collect();
    let embeddings = embedder.embed_documents(texts).await?;
    println!("  {} embeddings generated", embeddings.len());

    println!("[3/3] Uploading to vector store...");
    let store = connect_store(settings).await?;
    let uploaded = store
        .replace_all(&records, &embeddings, embedder.dimensions())
        .await?;

    println!(
        "\n\u{2713} Ingest complete: {} recipes indexed in table '{}'",
        uploaded, settings.store.table
    );
    Ok(())
}

/// Retrieval only: print annotated candidates for a query.
pub async fn search(settings: &Settings, raw_query: &str, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(settings.retrieval.top_k);

    let embedder = Embedder::new().await?;
    let store = connect_store(settings).await?;
    let bundle = retrieve(settings, &embedder, &store, raw_query, limit).await?;

    if bundle.matches.is_empty() {
        println!("No matching recipes found.");
        return Ok(());
    }

    for (i, candidate) in bundle.matches.iter().enumerate() {
        let record = &candidate.record;
        println!(
            "{}. {}  [{}]  score {:.3}  coverage {:.0}%",
            i + 1,
            record.header,
            record.category_label(),
            candidate.score,
            candidate.coverage() * 100.0,
        );
        if !candidate.found.is_empty() {
            println!("   have: {}", candidate.found.join(", "));
        }
        if !candidate.missing.is_empty() {
            println!("   missing: {}", candidate.missing.join(", "));
        }
    }

    Ok(())
}

/// Full pipeline: retrieve, assemble and generate recommendations.
pub async fn ask(settings: &Settings, raw_query: &str, top_k: Option<usize>) -> Result<()> {
    let api_key = settings.require_api_key()?.to_string();
    let top_k = top_k.unwrap_or(settings.retrieval.top_k);

    let embedder = Embedder::new().await?;
    let store = connect_store(settings).await?;
    let generator = Generator::new(&settings.generation, &api_key);

    let response = run_query(settings, &embedder, &store, &generator, raw_query, top_k).await?;
    println!("{response}");
    Ok(())
}

/// Interactive loop over stdin using the same query grammar as `ask`.
pub async fn repl(settings: &Settings) -> Result<()> {
    let api_key = settings.require_api_key()?.to_string();

    let embedder = Embedder::new().await?;
    let store = connect_store(settings).await?;
    let generator = Generator::new(&settings.generation, &api_key);

    println!("Larder interactive mode");
    println!("  - ingredients separated by commas (e.g. 'chicken, rice, onion')");
    println!("  - add 'filter:CATEGORY' to restrict the category");
    println!("  - add requirements after '|' (e.g. 'chicken | quick and easy')");
    println!("  - 'quit' to exit\n");
    println!("Categories:");
    for category in Category::ALL {
        println!("  - {category}");
    }
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("larder> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        let top_k = settings.retrieval.top_k;
        match run_query(settings, &embedder, &store, &generator, line, top_k).await {
            Ok(response) => println!("\n{response}\n"),
            // A rejected query or a collaborator failure ends the request,
            // not the session.
            Err(e) => println!("Error: {e}\n"),
        }
    }

    println!("Happy cooking!");
    Ok(())
}

/// Show vector table statistics.
pub async fn stats(settings: &Settings) -> Result<()> {
    let store = connect_store(settings).await?;
    let count = store.count().await?;
    println!("Table '{}': {} recipes", settings.store.table, count);
    Ok(())
}

fn extract_records(settings: &Settings, input: Option<String>) -> Result<Vec<RecipeRecord>> {
    let path = input
        .map(Into::into)
        .unwrap_or_else(|| settings.dataset.path.clone());
    info!(path = %path.display(), "loading cookbook document");

    let document = load_document(&path)?;
    let segmenter = Segmenter::new(settings.extractor.label_max_len);
    Ok(segmenter.segment(&document).collect())
}

async fn connect_store(settings: &Settings) -> Result<RecipeStore> {
    let path = settings.store.db_path.to_string_lossy();
    RecipeStore::connect(&path, &settings.store.table).await
}

/// Parse, retrieve and assemble a context bundle for one query.
async fn retrieve(
    settings: &Settings,
    embedder: &Embedder,
    store: &RecipeStore,
    raw_query: &str,
    top_k: usize,
) -> Result<ContextBundle> {
    let request = query::parse(raw_query)?;
    info!(ingredients = %request.query_text(), "searching");

    let query_embedding = embedder.embed_query(&request.query_text()).await?;
    let candidates = store
        .search(&query_embedding, top_k, request.category)
        .await?;
    info!(candidates = candidates.len(), "retrieval complete");

    Ok(assemble(
        &request,
        candidates,
        settings.retrieval.context_budget,
        settings.retrieval.max_field_chars,
    ))
}

async fn run_query(
    settings: &Settings,
    embedder: &Embedder,
    store: &RecipeStore,
    generator: &Generator,
    raw_query: &str,
    top_k: usize,
) -> Result<String> {
    let bundle = retrieve(settings, embedder, store, raw_query, top_k).await?;

    if bundle.matches.is_empty() {
        return Ok(
            "Sorry, no recipes matched your ingredients. Try different ingredients or remove the category filter."
                .to_string(),
        );
    }

    generator.recommend(&bundle).await
}
