//! End-to-end tests for the search pipeline: filter, facet, sort and paginate.

use hoplon::document::Document;
use hoplon::error::{HoplonError, Result};
use hoplon::query::{Filter, RangeOperator, SearchParams};
use hoplon::schema::IndexConfig;
use hoplon::search::SearchService;
use serde_json::{Value, json};

const CATEGORIES: [&str; 3] = ["books", "games", "music"];

fn catalog() -> Vec<Document> {
    (0..25)
        .map(|i: usize| {
            let rating = if i % 5 == 0 { Value::Null } else { json!(i % 4) };
            Document::from_value(json!({
                "sku": format!("p{i:02}"),
                "title": format!("product number {i}"),
                "category": CATEGORIES[i % 3],
                "price": i,
                "rating": rating,
            }))
            .unwrap()
        })
        .collect()
}

async fn service() -> Result<SearchService> {
    let service = SearchService::in_memory();
    let config = IndexConfig::new(["title", "category"], ["sku", "title", "category", "price", "rating"])
        .with_id_field("sku");
    service.index_documents("catalog", catalog(), config).await?;
    Ok(service)
}

#[tokio::test]
async fn test_pagination_over_browse_all() -> Result<()> {
    let service = service().await?;

    let first = service
        .search("catalog", SearchParams::new("").limit(10))
        .await?;
    assert_eq!(first.nb_hits, 25);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.page, 1);
    assert_eq!(first.hits.len(), 10);
    assert_eq!(first.hits[0].id, "p00");
    assert!(first.exhaustive_nb_hits);

    let last = service
        .search("catalog", SearchParams::new("").offset(20).limit(10))
        .await?;
    assert_eq!(last.page, 3);
    assert_eq!(last.hits.len(), 5);
    assert_eq!(last.hits[0].id, "p20");

    Ok(())
}

#[tokio::test]
async fn test_filter_facet_and_sort() -> Result<()> {
    let service = service().await?;

    let filter = Filter::new()
        .eq("category", json!("books"))
        .range("price", RangeOperator::Gte, json!("10"));
    let params = SearchParams::new("product")
        .filter(filter)
        .sort_by(["price:desc"])
        .facets(["category", "price", "unknown"]);

    let response = service.search("catalog", params).await?;
    let ids: Vec<_> = response.hits.iter().map(|hit| hit.id.as_str()).collect();
    assert_eq!(ids, vec!["p24", "p21", "p18", "p15", "p12"]);

    let distribution = response.facet_distribution.unwrap();
    assert_eq!(distribution["category"]["books"], 5);
    assert_eq!(distribution["category"].len(), 1);
    assert!(!distribution.contains_key("unknown"));

    let stats = response.facet_stats.unwrap();
    assert_eq!(stats["price"].min, 12.0);
    assert_eq!(stats["price"].max, 24.0);
    assert_eq!(stats["price"].count, 5);

    Ok(())
}

#[tokio::test]
async fn test_null_sorting_and_tie_break() -> Result<()> {
    let service = service().await?;

    let response = service
        .search(
            "catalog",
            SearchParams::new("").limit(25).sort_by(["rating:asc", "price:desc"]),
        )
        .await?;

    let ratings: Vec<_> = response.hits.iter().map(|hit| hit.get("rating").cloned()).collect();
    // Nulls go last in ascending order.
    let first_null = ratings
        .iter()
        .position(|rating| rating == &Some(Value::Null))
        .unwrap();
    assert!(ratings[first_null..].iter().all(|r| r == &Some(Value::Null)));
    assert_eq!(first_null, 20);

    // Among the null ratings, price descends.
    let null_ids: Vec<_> = response.hits[first_null..].iter().map(|hit| hit.id.as_str()).collect();
    assert_eq!(null_ids, vec!["p20", "p15", "p10", "p05", "p00"]);

    // Ties on rating fall through to price.
    let zero_ids: Vec<_> = response
        .hits
        .iter()
        .filter(|hit| hit.get("rating") == Some(&json!(0)))
        .map(|hit| hit.id.as_str())
        .collect();
    assert_eq!(zero_ids, vec!["p24", "p16", "p12", "p08", "p04"]);

    Ok(())
}

#[tokio::test]
async fn test_hits_are_shaped_to_stored_fields() -> Result<()> {
    let service = SearchService::in_memory();
    service
        .index_documents(
            "notes",
            vec![Document::from_value(json!({"id": 1, "body": "hello world", "secret": "x"}))?],
            IndexConfig::new(["body"], ["id", "author"]),
        )
        .await?;

    let response = service.search("notes", SearchParams::new("hello")).await?;
    let hit = serde_json::to_value(&response.hits[0])?;
    assert_eq!(hit["id"], json!("1"));
    assert_eq!(hit["author"], Value::Null);
    assert!(hit.get("secret").is_none());
    assert!(hit.get("body").is_none());
    assert_eq!(hit["terms"], json!(["hello"]));

    Ok(())
}

#[tokio::test]
async fn test_invalid_requests() -> Result<()> {
    let service = service().await?;

    let err = SearchParams::from_json(json!({"query": "x", "filter": {"price": {"near": 3}}}))
        .unwrap_err();
    assert!(matches!(err, HoplonError::Validation(_)));

    let err = service
        .index_documents("bad", vec![], IndexConfig::new(Vec::<String>::new(), ["id"]))
        .await
        .unwrap_err();
    assert!(matches!(err, HoplonError::Validation(_)));

    Ok(())
}
