/// One owner change, as rebuilt from a log and its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRecord {
    pub new_owner_address: String,
    /// Unix seconds, decimal.
    pub timestamp: String,
    pub transaction_hash: String,
    /// Hex, as received on the wire.
    pub block_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOwner {
    pub id: i64,
    pub record: OwnerRecord,
}
