use dashmap::DashMap;
use twilight_model::id::{Id, marker::GuildMarker};

use crate::uplink::{ManagedShard, ShardStatsProvider, ShardStatus};

/// Update sent by a shard runner to the collector.
#[derive(Debug, Clone)]
pub struct ShardInfo {
    pub shard_id: u32,
    pub latency_ms: Option<u128>,
    pub guilds: Option<usize>,
    pub status: Option<ShardStatus>,
}

impl ShardInfo {
    pub fn new(shard_id: u32) -> Self {
        Self {
            shard_id,
            latency_ms: None,
            guilds: None,
            status: None,
        }
    }

    pub fn latency(mut self, latency_ms: u128) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    pub fn guilds(mut self, guilds: usize) -> Self {
        self.guilds = Some(guilds);
        self
    }

    pub fn status(mut self, status: ShardStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Latest known statistics of every shard run by this process.
pub struct ShardStatsRegistry {
    total_shards: u32,
    shards: DashMap<u32, ManagedShard>,
}

impl ShardStatsRegistry {
    pub fn new(total_shards: u32, shard_ids: &[u32]) -> Self {
        let shards = shard_ids
            .iter()
            .map(|&id| {
                (
                    id,
                    ManagedShard {
                        id,
                        guilds: 0,
                        latency_ms: None,
                        status: ShardStatus::Connecting,
                    },
                )
            })
            .collect();
        Self {
            total_shards,
            shards,
        }
    }

    pub fn total_shards(&self) -> u32 {
        self.total_shards
    }

    /// Updates from shards this process does not manage are dropped.
    pub fn apply(&self, info: ShardInfo) {
        let Some(mut shard) = self.shards.get_mut(&info.shard_id) else {
            tracing::warn!(shard_id = info.shard_id, "Update for unmanaged shard");
            return;
        };
        if let Some(latency_ms) = info.latency_ms {
            shard.latency_ms = Some(latency_ms);
        }
        if let Some(guilds) = info.guilds {
            shard.guilds = guilds;
        }
        if let Some(status) = info.status {
            shard.status = status;
        }
    }

    pub fn get(&self, shard_id: u32) -> Option<ManagedShard> {
        self.shards.get(&shard_id).map(|shard| shard.clone())
    }

    /// The shard Discord routes this guild's events through.
    pub fn shard_for_guild(&self, guild_id: Id<GuildMarker>) -> u32 {
        let total = u64::from(self.total_shards.max(1));
        u32::try_from((guild_id.get() >> 22) % total).unwrap_or_default()
    }

    pub fn total_guilds(&self) -> usize {
        self.shards.iter().map(|shard| shard.guilds).sum()
    }

    pub fn average_latency(&self) -> Option<u128> {
        let latencies: Vec<u128> = self
            .shards
            .iter()
            .filter_map(|shard| shard.latency_ms)
            .collect();
        if latencies.is_empty() {
            return None;
        }
        Some(latencies.iter().sum::<u128>() / latencies.len() as u128)
    }
}

impl ShardStatsProvider for ShardStatsRegistry {
    fn managed_shards(&self) -> Vec<ManagedShard> {
        let mut shards: Vec<ManagedShard> =
            self.shards.iter().map(|shard| shard.clone()).collect();
        shards.sort_by_key(|shard| shard.id);
        shards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_shards_start_connecting() {
        let registry = ShardStatsRegistry::new(4, &[1, 3]);
        let shards = registry.managed_shards();
        assert_eq!(shards.len(), 2);
        assert_eq!(shards[0].id, 1);
        assert_eq!(shards[1].id, 3);
        assert!(shards.iter().all(|s| s.status == ShardStatus::Connecting));
        assert_eq!(registry.average_latency(), None);
    }

    #[test]
    fn test_apply_only_overwrites_present_fields() {
        let registry = ShardStatsRegistry::new(1, &[0]);
        registry.apply(ShardInfo::new(0).guilds(10).status(ShardStatus::Ready));
        registry.apply(ShardInfo::new(0).latency(42));

        let shard = registry.get(0).unwrap();
        assert_eq!(shard.guilds, 10);
        assert_eq!(shard.latency_ms, Some(42));
        assert_eq!(shard.status, ShardStatus::Ready);
    }

    #[test]
    fn test_unmanaged_shard_updates_are_ignored() {
        let registry = ShardStatsRegistry::new(2, &[0]);
        registry.apply(ShardInfo::new(1).guilds(99));
        assert!(registry.get(1).is_none());
        assert_eq!(registry.total_guilds(), 0);
    }

    #[test]
    fn test_aggregates() {
        let registry = ShardStatsRegistry::new(3, &[0, 1, 2]);
        registry.apply(ShardInfo::new(0).guilds(5).latency(30));
        registry.apply(ShardInfo::new(1).guilds(7).latency(50));
        registry.apply(ShardInfo::new(2).guilds(1));

        assert_eq!(registry.total_guilds(), 13);
        assert_eq!(registry.average_latency(), Some(40));
    }

    #[test]
    fn test_shard_for_guild() {
        let registry = ShardStatsRegistry::new(4, &[0, 1, 2, 3]);
        let guild_id = Id::new(81_384_788_765_712_384);
        assert_eq!(registry.shard_for_guild(guild_id), ((81_384_788_765_712_384u64 >> 22) % 4) as u32);

        let single = ShardStatsRegistry::new(1, &[0]);
        assert_eq!(single.shard_for_guild(guild_id), 0);
    }
}
