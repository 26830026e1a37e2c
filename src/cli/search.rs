use tabled::Table;

use crate::{
    spotify::normalize::normalize_search_results,
    types::{PlayingType, SearchTableRow},
    warning,
};

use super::{context, fail, spinner};

pub async fn search(query: &str, kind: PlayingType) {
    let ctx = context();

    let pb = spinner(&format!("Searching {kind}s..."));
    let response = ctx.client.search(query, kind).await;
    pb.finish_and_clear();

    let response = match response {
        Ok(Some(response)) => response,
        Ok(None) => {
            warning!("Nothing to search for.");
            return;
        }
        Err(e) => fail(e),
    };

    let hits = normalize_search_results(&response, kind);
    if hits.is_empty() {
        warning!("Search for {} returned nothing", query.trim());
        return;
    }

    let rows: Vec<SearchTableRow> = hits
        .into_iter()
        .map(|hit| SearchTableRow {
            name: hit.name,
            artists: hit.artists,
            id: hit.id,
        })
        .collect();
    println!("{}", Table::new(rows));
}
