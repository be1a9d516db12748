use super::models::{OwnerRecord, StoredOwner};
use crate::hex::hex_to_int;
use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, Row, params};

pub struct OwnerRepository<'a> {
    conn: &'a rusqlite::Connection,
}

#[derive(Debug, PartialEq, Eq)]
pub struct OwnerStats {
    pub total_records: usize,
    pub unique_owners: usize,
    pub earliest_block: Option<u64>,
    pub latest_block: Option<u64>,
}

impl<'a> OwnerRepository<'a> {
    const INSERT_OWNER: &'static str = "INSERT INTO owners (
            new_owner_address, timestamp, transaction_hash, block_number
        ) VALUES (?1, ?2, ?3, ?4)";

    const DELETE_ALL: &'static str = "DELETE FROM owners";

    const SELECT_OWNER: &'static str =
        "SELECT id, new_owner_address, timestamp, transaction_hash, block_number FROM owners";

    pub fn new(conn: &'a rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Swaps the whole record set for `records`, kept in the given order.
    ///
    /// Runs as one transaction, so readers see either the previous set or the new one and
    /// a failure part way leaves the previous set in place.
    pub fn replace_all(&self, records: &[OwnerRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut count = 0;

        tx.execute(Self::DELETE_ALL, [])
            .context("Failed to clear owners")?;
        {
            let mut stmt = tx.prepare(Self::INSERT_OWNER)?;

            for record in records {
                count += stmt
                    .execute(params![
                        record.new_owner_address,
                        record.timestamp,
                        record.transaction_hash,
                        record.block_number,
                    ])
                    .with_context(|| {
                        format!("Failed to insert owner from tx {}", record.transaction_hash)
                    })?;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// All records in discovery order, or newest first.
    pub fn list(&self, newest_first: bool, limit: Option<usize>) -> Result<Vec<StoredOwner>> {
        let mut query = Self::SELECT_OWNER.to_string();
        query.push_str(if newest_first {
            " ORDER BY id DESC"
        } else {
            " ORDER BY id ASC"
        });
        if let Some(limit) = limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn.prepare(&query)?;
        let owners = stmt
            .query_map([], Self::row_to_owner)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(owners)
    }

    pub fn records(&self) -> Result<Vec<OwnerRecord>> {
        Ok(self
            .list(false, None)?
            .into_iter()
            .map(|stored| stored.record)
            .collect())
    }

    /// The most recently discovered owner change, i.e. the current owner.
    pub fn latest(&self) -> Result<Option<StoredOwner>> {
        let query = format!("{} ORDER BY id DESC LIMIT 1", Self::SELECT_OWNER);
        let owner = self
            .conn
            .query_row(&query, [], Self::row_to_owner)
            .optional()?;
        Ok(owner)
    }

    pub fn count(&self) -> Result<usize> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM owners", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_statistics(&self) -> Result<OwnerStats> {
        let total_records = self.count()?;

        let unique_owners: usize = self.conn.query_row(
            "SELECT COUNT(DISTINCT lower(new_owner_address)) FROM owners",
            [],
            |row| row.get(0),
        )?;

        // block numbers are stored as hex text, so ordering happens here
        let mut stmt = self.conn.prepare("SELECT block_number FROM owners")?;
        let blocks = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|block| {
                let block = block?;
                hex_to_int(&block)
                    .with_context(|| format!("Invalid block number in database: {block}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(OwnerStats {
            total_records,
            unique_owners,
            earliest_block: blocks.iter().min().copied(),
            latest_block: blocks.iter().max().copied(),
        })
    }

    fn row_to_owner(row: &Row) -> rusqlite::Result<StoredOwner> {
        Ok(StoredOwner {
            id: row.get(0)?,
            record: OwnerRecord {
                new_owner_address: row.get(1)?,
                timestamp: row.get(2)?,
                transaction_hash: row.get(3)?,
                block_number: row.get(4)?,
            },
        })
    }
}
