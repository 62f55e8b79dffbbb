//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::args::{HoplonArgs, OutputFormat};
use crate::document::value::stringify_value;
use crate::error::Result;
use crate::search::{SearchResponse, SuggestResponse};

/// Result structure for index creation and document loading.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexingResult {
    pub index: String,
    pub documents_indexed: usize,
    pub duration_ms: u64,
}

/// Result structure for deletions.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletionResult {
    pub index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub deleted: bool,
}

/// Result structure for index listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexListing {
    pub name: String,
    pub state: String,
    pub fields: Vec<String>,
    pub store_fields: Vec<String>,
}

/// Result structure for synonym commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct SynonymGroups {
    pub groups: Vec<Vec<String>>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &HoplonArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output a search response.
pub fn output_search_response(response: &SearchResponse, args: &HoplonArgs) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return output_json(response, args);
    }

    println!(
        "Found {} hits for \"{}\" (page {}/{}, {} ms)",
        response.nb_hits,
        response.query,
        response.page,
        response.total_pages,
        response.processing_time_ms
    );
    for (rank, hit) in response.hits.iter().enumerate() {
        println!();
        println!(
            "{}. [{}] score {:.4}",
            response.offset + rank + 1,
            hit.id,
            hit.score
        );
        for (field, value) in &hit.fields {
            println!("   {field}: {}", render(value));
        }
    }

    if let Some(distribution) = &response.facet_distribution {
        println!();
        println!("Facets:");
        for (field, counts) in distribution {
            let mut counts: Vec<_> = counts.iter().collect();
            counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let rendered: Vec<_> = counts
                .into_iter()
                .map(|(value, count)| format!("{value} ({count})"))
                .collect();
            println!("  {field}: {}", rendered.join(", "));
        }
    }
    if let Some(stats) = &response.facet_stats {
        for (field, stat) in stats {
            println!("  {field}: min {} max {}", stat.min, stat.max);
        }
    }
    Ok(())
}

/// Output a suggest response.
pub fn output_suggest_response(response: &SuggestResponse, args: &HoplonArgs) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return output_json(response, args);
    }
    if response.suggestions.is_empty() {
        println!("No suggestions for \"{}\"", response.query);
    }
    for suggestion in &response.suggestions {
        println!("{suggestion}");
    }
    Ok(())
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &HoplonArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
    }
    let value = serde_json::to_value(result)?;
    print_value(&value, 1);
    Ok(())
}

fn print_value(value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Object(_) => {
                        println!("{indent}{key}:");
                        print_value(value, depth + 1);
                    }
                    Value::Array(items) if items.iter().any(Value::is_object) => {
                        println!("{indent}{key}:");
                        print_value(value, depth + 1);
                    }
                    other => println!("{indent}{key}: {}", render(other)),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) => {
                        print_value(item, depth);
                        println!();
                    }
                    other => println!("{indent}- {}", render(other)),
                }
            }
        }
        other => println!("{indent}{}", render(other)),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(items) => items.iter().map(stringify_value).collect::<Vec<_>>().join(", "),
        other => stringify_value(other),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &HoplonArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
