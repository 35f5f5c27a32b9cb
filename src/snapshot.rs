use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::format::PLACEHOLDER;

/// Fiscal summary of one regime, every figure already formatted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegimeRecord {
    pub regime: String,
    #[serde(rename = "cout_moyen_40")]
    pub cost_40y: String,
    #[serde(rename = "cout_moyen_detention")]
    pub cost_holding_period: String,
    #[serde(rename = "cout_global_40")]
    pub global_cost_40y: String,
    #[serde(rename = "cout_global_detention")]
    pub global_cost_holding_period: String,
    #[serde(rename = "fisc_plus_value_40")]
    pub capital_gains_tax_40y: String,
    #[serde(rename = "fisc_plus_value_detention")]
    pub capital_gains_tax_holding_period: String,
    #[serde(rename = "cout_global")]
    pub total_cost: String,
}

impl RegimeRecord {
    /// Record shown when the workbook could not answer for this regime.
    pub fn unavailable(regime: impl Into<String>) -> Self {
        let p = || PLACEHOLDER.to_string();
        RegimeRecord {
            regime: regime.into(),
            cost_40y: p(),
            cost_holding_period: p(),
            global_cost_40y: p(),
            global_cost_holding_period: p(),
            capital_gains_tax_40y: p(),
            capital_gains_tax_holding_period: p(),
            total_cost: p(),
        }
    }

    /// The seven figures in table column order.
    pub fn figures(&self) -> [&str; 7] {
        [
            self.cost_40y.as_str(),
            self.cost_holding_period.as_str(),
            self.global_cost_40y.as_str(),
            self.global_cost_holding_period.as_str(),
            self.capital_gains_tax_40y.as_str(),
            self.capital_gains_tax_holding_period.as_str(),
            self.total_cost.as_str(),
        ]
    }
}

/// Everything currently displayed, built in one go and never mutated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Input echo as (label, formatted value), in field order.
    #[serde(with = "ordered_map")]
    pub input_data: Vec<(String, String)>,
    pub fiscal_data: Vec<RegimeRecord>,
}

impl Snapshot {
    pub fn input(&self, label: &str) -> Option<&str> {
        self.input_data
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn regime(&self, name: &str) -> Option<&RegimeRecord> {
        self.fiscal_data.iter().find(|r| r.regime == name)
    }
}

/// Serializes the input echo as a JSON object while keeping field order.
mod ordered_map {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(entries: &[(String, String)], s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, String)>, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Vec<(String, String)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    entries.push((k, v));
                }
                Ok(entries)
            }
        }

        d.deserialize_map(EntriesVisitor)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    attached: bool,
    snapshot: Option<Arc<Snapshot>>,
}

/// The last computed snapshot, shared between the foreground worker and the
/// web view. Stale data is served until the next [`SnapshotCache::set`].
#[derive(Debug, Default)]
pub struct SnapshotCache {
    state: Mutex<CacheState>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // State is only ever replaced in single assignments, so a poisoned
        // lock still guards a consistent value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `None` until a snapshot has been computed.
    pub fn get(&self) -> Option<Arc<Snapshot>> {
        self.lock().snapshot.clone()
    }

    pub fn set(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.lock().snapshot = Some(snapshot.clone());
        snapshot
    }

    pub fn is_attached(&self) -> bool {
        self.lock().attached
    }

    /// Records whether a workbook is open. Detaching drops the snapshot.
    pub fn set_attached(&self, attached: bool) {
        let mut state = self.lock();
        state.attached = attached;
        if !attached {
            state.snapshot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            input_data: vec![
                ("Prix d'acquisition".into(), "250 000 €".into()),
                ("Travaux".into(), "0 €".into()),
            ],
            fiscal_data: vec![RegimeRecord::unavailable("SCI IR")],
        }
    }

    #[test]
    fn empty_cache_has_nothing_available() {
        let cache = SnapshotCache::new();
        assert!(cache.get().is_none());
        assert!(!cache.is_attached());
    }

    #[test]
    fn get_returns_the_last_set_snapshot() {
        let cache = SnapshotCache::new();
        cache.set(sample());
        assert_eq!(*cache.get().unwrap(), sample());

        let mut other = sample();
        other.input_data.clear();
        cache.set(other.clone());
        assert_eq!(*cache.get().unwrap(), other);
    }

    #[test]
    fn detaching_drops_the_snapshot() {
        let cache = SnapshotCache::new();
        cache.set_attached(true);
        cache.set(sample());
        cache.set_attached(false);
        assert!(cache.get().is_none());
    }

    #[test]
    fn json_keeps_field_order_and_wire_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        let acq = json.find("Prix d'acquisition").unwrap();
        let works = json.find("Travaux").unwrap();
        assert!(acq < works);
        assert!(json.contains("\"cout_moyen_40\":\"-\""));

        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
