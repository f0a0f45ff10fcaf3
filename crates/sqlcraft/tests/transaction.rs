//! Compile-only checks for transaction and savepoint APIs.

#![allow(dead_code)]

use sqlcraft::{Database, Mutation, SqlResult, Table, TransactionExt};

fn accounts() -> Table {
    Table::with_fields("accounts", &["id", "balance"])
}

async fn _transaction_macro_compiles(client: &mut tokio_postgres::Client) -> SqlResult<()> {
    let db = Database::new("postgres");
    let accounts = accounts();
    let balance = accounts.field("balance");

    sqlcraft::transaction!(client, tx, {
        db.update(&accounts)
            .set(balance.clone(), balance.sub(100))
            .where_(accounts.field("id").eq(1))
            .execute(&tx)
            .await?;

        sqlcraft::savepoint!(tx, sp, {
            db.delete_from(&accounts)
                .where_(balance.lt(0))
                .execute(&sp)
                .await?;
            Ok(())
        })?;

        sqlcraft::savepoint!(tx, "audit", sp, {
            db.insert_into(&accounts).values((2, 0)).execute(&sp).await?;
            Ok(())
        })
    })
}

async fn _savepoint_handle_compiles(client: &mut tokio_postgres::Client) -> SqlResult<()> {
    let db = Database::new("postgres");
    let accounts = accounts();

    let mut tx = client.transaction().await?;
    {
        let sp = tx.savepoint_named("before_cleanup").await?;
        db.delete_from(&accounts).execute(&sp).await?;
        sp.release().await?;
    }
    {
        let sp = tx.savepoint_anonymous().await?;
        db.update(&accounts)
            .set(accounts.field("balance"), 0)
            .execute(&sp)
            .await?;
        sp.rollback().await?;
    }
    tx.commit().await?;
    Ok(())
}
