use super::{ContextRow, PaymentStore, WindowRow};
use crate::{
    error::IntelResult,
    types::{PaymentStatus, TransactionRecord},
};
use rusqlite::{params, OptionalExtension, Row};

impl PaymentStore {
    // ── Transactions ──────────────────────────────────────────────

    pub fn insert_transaction(&self, t: &TransactionRecord) -> IntelResult<()> {
        self.conn.execute(
            "INSERT INTO transactions (
                transaction_id, customer_id, amount, payment_status, country,
                payment_method, device_type, retry_attempts, transaction_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &t.transaction_id,
                &t.customer_id,
                t.amount,
                t.payment_status.as_str(),
                &t.country,
                &t.payment_method,
                &t.device_type,
                t.retry_attempts as i64,
                &t.transaction_time,
            ],
        )?;
        Ok(())
    }

    /// Insert many rows inside one SQLite transaction.
    pub fn insert_transactions(&mut self, rows: &[TransactionRecord]) -> IntelResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (
                    transaction_id, customer_id, amount, payment_status, country,
                    payment_method, device_type, retry_attempts, transaction_time
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for t in rows {
                stmt.execute(params![
                    &t.transaction_id,
                    &t.customer_id,
                    t.amount,
                    t.payment_status.as_str(),
                    &t.country,
                    &t.payment_method,
                    &t.device_type,
                    t.retry_attempts as i64,
                    &t.transaction_time,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Remove every row. Only the seeder calls this.
    pub fn clear_transactions(&self) -> IntelResult<usize> {
        let removed = self.conn.execute("DELETE FROM transactions", [])?;
        Ok(removed)
    }

    pub fn transaction_count(&self) -> IntelResult<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn find_transaction(&self, transaction_id: &str) -> IntelResult<Option<TransactionRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT transaction_id, customer_id, amount, payment_status, country,
                        payment_method, device_type, retry_attempts, transaction_time
                 FROM transactions WHERE transaction_id = ?1",
                params![transaction_id],
                read_transaction,
            )
            .optional()?;
        Ok(record)
    }

    /// Rows with `from <= transaction_time < until`, in insertion order.
    pub fn window_rows(&self, from: &str, until: &str) -> IntelResult<Vec<WindowRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT payment_status, country, payment_method, amount
             FROM transactions
             WHERE transaction_time >= ?1 AND transaction_time < ?2
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![from, until], |row| {
            Ok(WindowRow {
                payment_status: PaymentStatus::parse(&row.get::<_, String>(0)?),
                country: row.get(1)?,
                payment_method: row.get(2)?,
                amount: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Failed transactions on record for a customer, the given one included.
    pub fn customer_failure_count(&self, customer_id: &str) -> IntelResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions
             WHERE customer_id = ?1 AND payment_status = ?2",
            params![customer_id, PaymentStatus::FAILED],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    /// Amounts of every successful transaction in the store.
    pub fn successful_amounts(&self) -> IntelResult<Vec<f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT amount FROM transactions WHERE payment_status = ?1")?;
        let rows = stmt.query_map(params![PaymentStatus::SUCCESS], |row| row.get::<_, f64>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn context_rows(&self) -> IntelResult<Vec<ContextRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT amount, payment_status, device_type, retry_attempts
             FROM transactions ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ContextRow {
                amount: row.get(0)?,
                payment_status: PaymentStatus::parse(&row.get::<_, String>(1)?),
                device_type: row.get(2)?,
                retry_attempts: row.get::<_, i64>(3)?.max(0) as u32,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn read_transaction(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    Ok(TransactionRecord {
        transaction_id: row.get(0)?,
        customer_id: row.get(1)?,
        amount: row.get(2)?,
        payment_status: PaymentStatus::parse(&row.get::<_, String>(3)?),
        country: row.get(4)?,
        payment_method: row.get(5)?,
        device_type: row.get(6)?,
        retry_attempts: row.get::<_, i64>(7)?.max(0) as u32,
        transaction_time: row.get(8)?,
    })
}
