use tabled::Table;

use crate::{
    info,
    spotify::normalize::normalize_recently_played,
    types::RecentTableRow,
};

use super::{context, fail, spinner};

/// Prints the recently played tracks, most recent first.
pub async fn recent() {
    let ctx = context();

    let pb = spinner("Fetching recently played tracks...");
    let page = ctx.client.get_recently_played().await;
    pb.finish_and_clear();

    let records = match page {
        Ok(page) => normalize_recently_played(&page),
        Err(e) => fail(e),
    };

    if records.is_empty() {
        info!("Nothing played recently.");
        return;
    }

    let rows: Vec<RecentTableRow> = records
        .into_iter()
        .enumerate()
        .map(|(index, r)| RecentTableRow {
            index: index + 1,
            name: r.name,
            artists: r.artists,
            album: r.album.unwrap_or_default(),
            duration: r.duration,
        })
        .collect();

    println!("{}", Table::new(rows));
    info!("Log one of them with `spotlog log --recent <#>`.");
}
