use crate::query::formatters::{OutputFormat, format_owners, format_stats};
use crate::repository::OwnerRepository;
use anyhow::Result;

pub struct ListQuery {
    pub limit: Option<usize>,
    pub oldest_first: bool,
}

pub fn cmd_list(repo: &OwnerRepository, query: ListQuery, format: &OutputFormat) -> Result<()> {
    let owners = repo.list(!query.oldest_first, query.limit)?;
    let output = format_owners(&owners, format);
    println!("{output}");

    Ok(())
}

pub fn cmd_current(repo: &OwnerRepository, format: &OutputFormat) -> Result<()> {
    let latest: Vec<_> = repo.latest()?.into_iter().collect();
    let output = format_owners(&latest, format);
    println!("{output}");

    Ok(())
}

pub fn cmd_stats(repo: &OwnerRepository, format: &OutputFormat) -> Result<()> {
    let stats = repo.get_statistics()?;
    let output = format_stats(&stats, format);
    println!("{output}");

    Ok(())
}
