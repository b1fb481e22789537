//! Transaction helper keeping the caller's error type intact.

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::warn;

pub use futures::future::BoxFuture;

/// Runs `f` inside a transaction. Commits on `Ok`, rolls back on `Err`.
///
/// ```rust,ignore
/// let summary = with_transaction(&db, |txn| {
///     Box::pin(async move { reconcile_product(txn, product_id, None).await })
/// })
/// .await?;
/// ```
pub async fn with_transaction<F, T, E>(db: &DatabaseConnection, f: F) -> Result<T, E>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> BoxFuture<'a, Result<T, E>>,
    E: From<DbErr>,
{
    let txn = db.begin().await?;
    match f(&txn).await {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(err)
        }
    }
}
