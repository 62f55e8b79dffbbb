//! Command implementations for the Hoplon CLI.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ServiceConfig;
use crate::document::Document;
use crate::error::{HoplonError, Result};
use crate::matcher::InMemoryMatcher;
use crate::query::{SearchParams, SuggestParams};
use crate::schema::IndexConfig;
use crate::search::SearchService;
use crate::storage::FileRepository;
use crate::synonym::InMemorySynonymRegistry;

/// Execute a CLI command.
pub fn execute_command(args: HoplonArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args))
}

/// Everything a command needs: the service and the concrete registry it
/// persists synonyms from.
struct Context {
    service: SearchService,
    synonyms: Arc<InMemorySynonymRegistry>,
}

async fn open_context(args: &HoplonArgs) -> Result<Context> {
    let config = match &args.config {
        Some(path) => ServiceConfig::load_from_file(path)?,
        None => ServiceConfig::default(),
    };
    let repository = FileRepository::open(&args.data_dir).await?;

    let synonyms_file = args.synonyms_file();
    let synonyms = if synonyms_file.exists() {
        debug!("Loading synonyms from {}", synonyms_file.display());
        InMemorySynonymRegistry::load_from_file(&synonyms_file)?
    } else {
        InMemorySynonymRegistry::new()
    };
    let synonyms = Arc::new(synonyms);

    let service = SearchService::with_config(
        Arc::new(repository),
        Arc::new(InMemoryMatcher::new()),
        synonyms.clone(),
        config,
    );
    Ok(Context { service, synonyms })
}

async fn run(args: HoplonArgs) -> Result<()> {
    let context = open_context(&args).await?;

    match &args.command {
        Command::CreateIndex(create_args) => create_index(&context, create_args, &args).await,
        Command::AddDocuments(add_args) => add_documents(&context, add_args, &args).await,
        Command::Search(search_args) => search(&context, search_args, &args).await,
        Command::Suggest(suggest_args) => suggest(&context, suggest_args, &args).await,
        Command::GetDocument(doc_args) => get_document(&context, doc_args, &args).await,
        Command::DeleteDocument(doc_args) => delete_document(&context, doc_args, &args).await,
        Command::DeleteIndex(index_args) => delete_index(&context, index_args, &args).await,
        Command::List => list_indexes(&context, &args).await,
        Command::Synonyms(synonym_command) => synonyms(&context, synonym_command, &args).await,
    }
}

/// Create or reconfigure an index.
async fn create_index(context: &Context, create_args: &CreateIndexArgs, args: &HoplonArgs) -> Result<()> {
    let config = IndexConfig::new(&create_args.fields, &create_args.store_fields)
        .with_id_field(&create_args.id_field);
    let documents = match &create_args.documents {
        Some(path) => load_documents(path)?,
        None => Vec::new(),
    };

    let start = Instant::now();
    let count = context
        .service
        .index_documents(&create_args.index, documents, config)
        .await?;

    let result = IndexingResult {
        index: create_args.index.clone(),
        documents_indexed: count,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    output_result("Index created", &result, args)
}

/// Add documents to an existing index, keeping its configuration.
async fn add_documents(context: &Context, add_args: &AddDocumentsArgs, args: &HoplonArgs) -> Result<()> {
    let config = context.service.index_config(&add_args.index).await?;
    let documents = load_documents(&add_args.document_file)?;
    info!(
        "Adding {} documents from {}",
        documents.len(),
        add_args.document_file.display()
    );

    let start = Instant::now();
    let count = context
        .service
        .index_documents(&add_args.index, documents, config)
        .await?;

    let result = IndexingResult {
        index: add_args.index.clone(),
        documents_indexed: count,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    output_result("Documents added", &result, args)
}

async fn search(context: &Context, search_args: &SearchArgs, args: &HoplonArgs) -> Result<()> {
    let mut params = SearchParams::new(&search_args.query)
        .offset(search_args.offset)
        .limit(search_args.limit.unwrap_or(context.service.config().default_limit));
    if let Some(filter) = parse_filters(&search_args.filters)? {
        params = params.filter(filter);
    }
    if !search_args.sort.is_empty() {
        params = params.sort_by(&search_args.sort);
    }
    if !search_args.facets.is_empty() {
        params = params.facets(&search_args.facets);
    }

    let response = context.service.search(&search_args.index, params).await?;
    output_search_response(&response, args)
}

async fn suggest(context: &Context, suggest_args: &SuggestArgs, args: &HoplonArgs) -> Result<()> {
    let mut params = SuggestParams::new(&suggest_args.query)
        .limit(suggest_args.limit.unwrap_or(context.service.config().suggest_limit));
    if let Some(filter) = parse_filters(&suggest_args.filters)? {
        params = params.filter(filter);
    }

    let response = context.service.suggest(&suggest_args.index, params).await?;
    output_suggest_response(&response, args)
}

async fn get_document(context: &Context, doc_args: &DocumentArgs, args: &HoplonArgs) -> Result<()> {
    let document = context
        .service
        .get_document(&doc_args.index, &doc_args.id)
        .await?
        .ok_or_else(|| {
            HoplonError::not_found(format!(
                "Document \"{}\" not found in index \"{}\"",
                doc_args.id, doc_args.index
            ))
        })?;
    output_result("Document", &document, args)
}

async fn delete_document(context: &Context, doc_args: &DocumentArgs, args: &HoplonArgs) -> Result<()> {
    let deleted = context
        .service
        .delete_document(&doc_args.index, &doc_args.id)
        .await?;
    let result = DeletionResult {
        index: doc_args.index.clone(),
        id: Some(doc_args.id.clone()),
        deleted,
    };
    output_result("Document deletion", &result, args)
}

async fn delete_index(context: &Context, index_args: &IndexArgs, args: &HoplonArgs) -> Result<()> {
    let deleted = context.service.delete_index(&index_args.index).await?;
    let result = DeletionResult {
        index: index_args.index.clone(),
        id: None,
        deleted,
    };
    output_result("Index deletion", &result, args)
}

async fn list_indexes(context: &Context, args: &HoplonArgs) -> Result<()> {
    let mut listings = Vec::new();
    for name in context.service.list_indexes().await? {
        let state = context.service.index_state(&name).await?;
        let config = context.service.repository().get_index_config(&name).await?;
        let (fields, store_fields) = config
            .map(|config| (config.fields, config.store_fields))
            .unwrap_or_default();
        listings.push(IndexListing {
            name,
            state: format!("{state:?}").to_lowercase(),
            fields,
            store_fields,
        });
    }
    output_result("Indexes", &listings, args)
}

async fn synonyms(context: &Context, command: &SynonymCommand, args: &HoplonArgs) -> Result<()> {
    match command {
        SynonymCommand::Add { words } => {
            context.service.add_synonym_group(words.clone()).await?;
            save_synonyms(context, args)?;
        }
        SynonymCommand::Delete { word } => {
            if !context.service.delete_synonym(word).await? {
                return Err(HoplonError::not_found(format!(
                    "Word \"{word}\" is not in any synonym group"
                )));
            }
            save_synonyms(context, args)?;
        }
        SynonymCommand::List => {}
    }

    let result = SynonymGroups {
        groups: context.service.list_synonym_groups().await?,
    };
    output_result("Synonym groups", &result, args)
}

fn save_synonyms(context: &Context, args: &HoplonArgs) -> Result<()> {
    let path = args.synonyms_file();
    fs::create_dir_all(&args.data_dir)?;
    context.synonyms.save_to_file(&path)?;
    debug!("Saved synonyms to {}", path.display());
    Ok(())
}

/// Load documents from a JSON array, a single JSON object or JSON Lines.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let content = fs::read_to_string(path).map_err(|e| {
        HoplonError::other(format!(
            "Failed to read document file '{}': {e}",
            path.display()
        ))
    })?;
    parse_documents(&content)
}

fn parse_documents(content: &str) -> Result<Vec<Document>> {
    let values = match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => items,
        Ok(object @ Value::Object(_)) => vec![object],
        Ok(other) => {
            return Err(HoplonError::validation(format!(
                "Expected documents as JSON objects, found {other}"
            )));
        }
        Err(_) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(number, line)| {
                serde_json::from_str::<Value>(line).map_err(|e| {
                    HoplonError::validation(format!("Invalid JSON on line {}: {e}", number + 1))
                })
            })
            .collect::<Result<Vec<_>>>()?,
    };
    values.into_iter().map(Document::from_value).collect()
}
