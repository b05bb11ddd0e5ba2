//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `campaigns` - Campaign state snapshots (key: campaign id, big-endian)
//! - `events` - Append-only audit log (key: event_id, UUIDv7 time-ordered)
//! - `indices` - `campaign_id || event_id` index for per-campaign history
//! - `meta` - Engine metadata (next sequential campaign id)
//!
//! Every mutation is committed as one `WriteBatch`: the campaign snapshot,
//! its audit event, the index entry, and the id counter land together or not
//! at all. Reads after a returned write always observe the write.

use crate::{
    campaign::Campaign,
    config::Config,
    error::{Error, Result},
    types::{CampaignId, CustodyEvent},
};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DBCompactionStyle, IteratorMode, Options, WriteBatch, DB};
use std::sync::Arc;
use uuid::Uuid;

/// Column family names
const CF_CAMPAIGNS: &str = "campaigns";
const CF_EVENTS: &str = "events";
const CF_INDICES: &str = "indices";
const CF_META: &str = "meta";

/// Meta key holding the next sequential campaign id
const META_NEXT_ID: &[u8] = b"next_campaign_id";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        // Universal compaction for write-heavy workload
        db_opts.set_compaction_style(DBCompactionStyle::Universal);

        // Column family descriptors
        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_CAMPAIGNS, Self::cf_options_campaigns()),
            ColumnFamilyDescriptor::new(CF_EVENTS, Self::cf_options_events()),
            ColumnFamilyDescriptor::new(CF_INDICES, Self::cf_options_indices()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];

        // Open database
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db: Arc::new(db) })
    }

    // Column family options

    fn cf_options_campaigns() -> Options {
        let mut opts = Options::default();
        // Campaign state is frequently read, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_events() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts.set_bottommost_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_options_indices() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        // Indices benefit from bloom filters
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false); // 10 bits per key
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Campaign operations

    /// Commit a campaign snapshot, its audit event, and (on create) the id
    /// counter as one atomic write
    pub fn put_campaign_atomic(
        &self,
        campaign: &Campaign,
        event: &CustodyEvent,
        next_id: Option<u64>,
    ) -> Result<()> {
        let mut batch = WriteBatch::default();

        // 1. Campaign snapshot
        let cf_campaigns = self.cf_handle(CF_CAMPAIGNS)?;
        let campaign_key = campaign.id().get().to_be_bytes();
        let campaign_value = bincode::serialize(campaign)?;
        batch.put_cf(cf_campaigns, campaign_key, &campaign_value);

        // 2. Audit event
        let cf_events = self.cf_handle(CF_EVENTS)?;
        let event_value = bincode::serialize(event)?;
        batch.put_cf(cf_events, event.event_id.as_bytes(), &event_value);

        // 3. Index: campaign_id || event_id -> empty
        let cf_indices = self.cf_handle(CF_INDICES)?;
        let idx_key = Self::index_key_campaign_event(campaign.id(), Some(event.event_id));
        batch.put_cf(cf_indices, &idx_key, []);

        // 4. Id counter (creates only)
        if let Some(next_id) = next_id {
            let cf_meta = self.cf_handle(CF_META)?;
            batch.put_cf(cf_meta, META_NEXT_ID, next_id.to_be_bytes());
        }

        // Atomic commit
        self.db.write(batch)?;

        tracing::debug!(
            campaign_id = %campaign.id(),
            event_id = %event.event_id,
            "Campaign state committed"
        );

        Ok(())
    }

    /// Get campaign snapshot by id
    pub fn get_campaign(&self, id: CampaignId) -> Result<Campaign> {
        let cf = self.cf_handle(CF_CAMPAIGNS)?;
        let key = id.get().to_be_bytes();

        let value = self
            .db
            .get_cf(cf, key)?
            .ok_or(Error::CampaignNotFound(id.get()))?;

        let campaign: Campaign = bincode::deserialize(&value)?;
        Ok(campaign)
    }

    /// Load every stored campaign, in id order
    pub fn load_campaigns(&self) -> Result<Vec<Campaign>> {
        let cf = self.cf_handle(CF_CAMPAIGNS)?;

        let mut campaigns = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            let campaign: Campaign = bincode::deserialize(&value)?;
            campaigns.push(campaign);
        }

        Ok(campaigns)
    }

    /// Next sequential campaign id (1 for a fresh store)
    pub fn next_campaign_id(&self) -> Result<u64> {
        let cf = self.cf_handle(CF_META)?;

        match self.db.get_cf(cf, META_NEXT_ID)? {
            Some(bytes) => {
                let bytes: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| Error::Storage("Corrupt next_campaign_id".to_string()))?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(1),
        }
    }

    // Audit log operations

    /// Get audit event by ID
    pub fn get_event(&self, event_id: Uuid) -> Result<CustodyEvent> {
        let cf = self.cf_handle(CF_EVENTS)?;

        let value = self
            .db
            .get_cf(cf, event_id.as_bytes())?
            .ok_or_else(|| Error::Storage(format!("Event not found: {}", event_id)))?;

        let event: CustodyEvent = bincode::deserialize(&value)?;
        Ok(event)
    }

    /// Get a campaign's audit events in chronological order (via index)
    pub fn events_for_campaign(&self, id: CampaignId) -> Result<Vec<CustodyEvent>> {
        let cf_indices = self.cf_handle(CF_INDICES)?;

        // Scan index: campaign_id || event_id
        let prefix = Self::index_key_campaign_event(id, None);
        let iter = self.db.prefix_iterator_cf(cf_indices, &prefix);

        let mut events = Vec::new();
        for item in iter {
            let (key, _) = item?;

            // Prefix iteration can run past the prefix
            if key.len() < 24 || key[..8] != prefix[..] {
                break;
            }

            let event_id_bytes: [u8; 16] = key[8..24]
                .try_into()
                .map_err(|_| Error::Storage("Corrupt event index key".to_string()))?;
            let event = self.get_event(Uuid::from_bytes(event_id_bytes))?;
            events.push(event);
        }

        // UUIDv7 keys sort by creation time, so index order is chronological
        Ok(events)
    }

    // Index key helpers

    fn index_key_campaign_event(id: CampaignId, event_id: Option<Uuid>) -> Vec<u8> {
        let mut key = id.get().to_be_bytes().to_vec();
        if let Some(eid) = event_id {
            key.extend_from_slice(eid.as_bytes());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::types::{AccountId, EventKind};
    use tempfile::TempDir;

    fn test_config() -> (Config, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (config, temp_dir)
    }

    fn test_campaign(id: u64) -> Campaign {
        Campaign::new(
            CampaignId::new(id),
            AccountId::new("0xcreator"),
            Amount::from_base_units(1_000),
            86_400,
        )
    }

    fn created_event(campaign: &Campaign) -> CustodyEvent {
        CustodyEvent::new(
            campaign.id(),
            EventKind::CampaignCreated {
                creator: campaign.creator().clone(),
                goal: campaign.goal(),
                deadline: campaign.deadline(),
            },
        )
    }

    #[test]
    fn test_storage_open() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();
        assert_eq!(storage.next_campaign_id().unwrap(), 1);
    }

    #[test]
    fn test_put_and_get_campaign() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let campaign = test_campaign(1);
        let event = created_event(&campaign);
        storage.put_campaign_atomic(&campaign, &event, Some(2)).unwrap();

        let retrieved = storage.get_campaign(CampaignId::new(1)).unwrap();
        assert_eq!(retrieved.id(), campaign.id());
        assert_eq!(retrieved.goal(), campaign.goal());
        assert_eq!(storage.next_campaign_id().unwrap(), 2);
    }

    #[test]
    fn test_get_missing_campaign() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        assert!(matches!(
            storage.get_campaign(CampaignId::new(42)),
            Err(Error::CampaignNotFound(42))
        ));
    }

    #[test]
    fn test_load_campaigns_in_id_order() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        for id in 1..=3 {
            let campaign = test_campaign(id);
            let event = created_event(&campaign);
            storage
                .put_campaign_atomic(&campaign, &event, Some(id + 1))
                .unwrap();
        }

        let campaigns = storage.load_campaigns().unwrap();
        assert_eq!(campaigns.len(), 3);
        let ids: Vec<u64> = campaigns.iter().map(|c| c.id().get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_events_for_campaign() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let mut campaign = test_campaign(1);
        let created = created_event(&campaign);
        storage.put_campaign_atomic(&campaign, &created, Some(2)).unwrap();

        let alice = AccountId::new("0xalice");
        let new_total = campaign
            .contribute(&alice, Amount::from_base_units(500))
            .unwrap();
        let contributed = CustodyEvent::new(
            campaign.id(),
            EventKind::ContributionRecorded {
                contributor: alice,
                amount: Amount::from_base_units(500),
                new_total,
            },
        );
        storage.put_campaign_atomic(&campaign, &contributed, None).unwrap();

        // Unrelated campaign should not leak into the history
        let other = test_campaign(2);
        let other_event = created_event(&other);
        storage.put_campaign_atomic(&other, &other_event, Some(3)).unwrap();

        let events = storage.events_for_campaign(CampaignId::new(1)).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].kind, EventKind::CampaignCreated { .. }));
        assert!(matches!(
            events[1].kind,
            EventKind::ContributionRecorded { .. }
        ));
    }

    #[test]
    fn test_reopen_preserves_state() {
        let (config, _temp) = test_config();

        {
            let storage = Storage::open(&config).unwrap();
            let campaign = test_campaign(1);
            let event = created_event(&campaign);
            storage.put_campaign_atomic(&campaign, &event, Some(2)).unwrap();
        }

        let storage = Storage::open(&config).unwrap();
        assert_eq!(storage.next_campaign_id().unwrap(), 2);
        assert_eq!(storage.load_campaigns().unwrap().len(), 1);
    }
}
