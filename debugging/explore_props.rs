//! Run the explore pipeline against the seed catalog and print the decoded
//! state plus the resulting page.
//! Usage:
//!   cargo run --bin explore_props -- type=anime rating=4
//!   cargo run --bin explore_props -- genres=Drama decade=1990 sort=rating page=2

use anyhow::{anyhow, Result};
use axum::extract::FromRequestParts;
use axum::http::Request;
use axum_extra::extract::Query;
use owlist::catalog;
use owlist::filter::{self, ExploreQuery, ExploreState, ITEMS_PER_PAGE};
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let uri = format!("/explore?{}", args.join("&"));
    let (mut parts, _) = Request::builder().uri(uri.as_str()).body(())?.into_parts();
    let Query(query) = Query::<ExploreQuery>::from_request_parts(&mut parts, &())
        .await
        .map_err(|e| anyhow!("Invalid query {}: {:?}", uri, e))?;

    let state = ExploreState::from_query(query);
    let results = filter::apply(catalog::media(), &state.filters, state.sort);
    let page = filter::paginate(&results, state.page, ITEMS_PER_PAGE);

    let out = json!({
        "state": state,
        "canonical": state.with_page(page.page).href(),
        "total_items": page.total_items,
        "page": page.page,
        "total_pages": page.total_pages,
        "items": page
            .items
            .iter()
            .map(|m| json!({ "id": m.id, "title": m.title, "year": m.year, "rating": m.rating }))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
