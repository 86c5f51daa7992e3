use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::inventory_adjustment::{self, Entity as InventoryAdjustment};
use crate::errors::ServiceError;

use super::lock_rows;

/// Width of the numeric suffix. Sequences longer than two digits keep
/// growing naturally (`-99` is followed by `-100`).
const MIN_SUFFIX_WIDTH: usize = 2;

/// Allocates monotonically increasing, human-readable reference codes of the
/// form `PREFIX-NN`.
///
/// Must be called on the same transaction as the write that consumes the
/// reference: the locking read serializes concurrent appliers allocating in
/// the same period, and a rollback releases the number with the rest of the
/// write.
pub struct ReferenceSequencer;

impl ReferenceSequencer {
    /// `ADJ-YYYYMM` style prefix for the given instant.
    pub fn monthly_prefix(kind: &str, now: DateTime<Utc>) -> String {
        format!("{}-{}", kind, now.format("%Y%m"))
    }

    /// Returns the next unused reference for the prefix, `PREFIX-01` when
    /// none exist yet.
    pub async fn next_reference<C: ConnectionTrait>(
        conn: &C,
        prefix: &str,
    ) -> Result<String, ServiceError> {
        let pattern = format!("{}-%", prefix);
        let select = InventoryAdjustment::find()
            .filter(inventory_adjustment::Column::Reference.like(&pattern));
        let existing = lock_rows(select, conn.get_database_backend())
            .all(conn)
            .await?;

        let max = existing
            .iter()
            .filter_map(|adj| adj.reference.as_deref())
            .filter_map(|reference| Self::suffix_of(reference, prefix))
            .max()
            .unwrap_or(0);

        Ok(format!(
            "{}-{:0width$}",
            prefix,
            max + 1,
            width = MIN_SUFFIX_WIDTH
        ))
    }

    fn suffix_of(reference: &str, prefix: &str) -> Option<u32> {
        reference
            .strip_prefix(prefix)?
            .strip_prefix('-')?
            .parse()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn monthly_prefix_formats_year_and_month() {
        let now = Utc.with_ymd_and_hms(2025, 9, 14, 12, 0, 0).unwrap();
        assert_eq!(ReferenceSequencer::monthly_prefix("ADJ", now), "ADJ-202509");
    }

    #[test]
    fn suffix_parsing_ignores_foreign_prefixes() {
        assert_eq!(ReferenceSequencer::suffix_of("ADJ-202509-07", "ADJ-202509"), Some(7));
        assert_eq!(ReferenceSequencer::suffix_of("ADJ-202510-07", "ADJ-202509"), None);
        assert_eq!(ReferenceSequencer::suffix_of("ADJ-202509-xx", "ADJ-202509"), None);
    }
}
