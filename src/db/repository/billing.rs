use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::BillingRow;

use super::query::ScopedQuery;

/// Billing rows for a batch of appointments, oldest first so that a
/// later row for the same appointment overrides an earlier one when
/// folded into a map.
pub fn fetch_billing(
    conn: &Connection,
    appointment_ids: &[String],
) -> Result<Vec<BillingRow>, DatabaseError> {
    if appointment_ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = ScopedQuery::new().in_list("b.appointment_id", appointment_ids);
    let sql = format!(
        "SELECT b.id, b.appointment_id, b.amount, b.currency, b.payment_status, b.paid_at
         FROM billing b
         WHERE 1=1{}
         ORDER BY b.appointment_id, b.created_at, b.id",
        query.sql_suffix()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(query.param_refs().as_slice(), |row| {
        Ok(BillingRow {
            id: row.get("id")?,
            appointment_id: row.get("appointment_id")?,
            amount: row.get("amount")?,
            currency: row.get("currency")?,
            payment_status: row.get("payment_status")?,
            paid_at: row.get("paid_at")?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
