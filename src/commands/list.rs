//! List the posts in the content repository

use anyhow::Result;
use std::io::Write;

use crate::cms::{ContentClient, Predicate, QueryOptions};
use crate::content::summaries;
use crate::helpers::{format_publication_date, DateStyle};
use crate::SpaceTraveling;

const LIST_PAGE_SIZE: usize = 100;

/// Print every post, newest first
pub async fn run(site: &SpaceTraveling) -> Result<()> {
    let client = site.client()?;
    let mut out = Vec::new();
    run_with_client(site, &client, &mut out).await?;
    std::io::stdout().write_all(&out)?;
    Ok(())
}

pub async fn run_with_client(
    site: &SpaceTraveling,
    client: &dyn ContentClient,
    out: &mut dyn Write,
) -> Result<()> {
    let cms = &site.config.cms;
    let style = DateStyle::from_config(&site.config)?;
    let options = QueryOptions {
        page_size: Some(LIST_PAGE_SIZE),
        orderings: Some(cms.orderings.clone()).filter(|o| !o.is_empty()),
        fetch: cms.fetch.clone(),
        ..Default::default()
    };

    let mut page = client
        .query_posts(&[Predicate::document_type(&cms.document_type)], &options)
        .await?;
    writeln!(out, "Posts ({}):", page.total_results_size)?;

    loop {
        for post in summaries(std::mem::take(&mut page.results))? {
            writeln!(
                out,
                "  {} - {} [{}]",
                format_publication_date(post.first_publication_date.as_ref(), &style),
                post.title,
                post.uid
            )?;
        }
        match page.next_page.take() {
            Some(cursor) => page = client.fetch_page(&cursor).await?,
            None => break,
        }
    }

    Ok(())
}
