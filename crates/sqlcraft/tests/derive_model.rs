#![allow(dead_code)]

use sqlcraft::{Database, FromRow, Model, Query, SqlResult, Table};

#[derive(Clone, Model)]
#[sqlcraft(table = "users")]
struct User {
    id: i64,
    #[sqlcraft(column = "user_name")]
    name: String,
    #[sqlcraft(skip)]
    cached: Option<String>,
}

#[derive(Clone, Model)]
struct OrderItem {
    order_id: i64,
    sku: String,
    quantity: i32,
    price: Option<f64>,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    #[sqlcraft(column = "user_name")]
    name: String,
    #[sqlcraft(skip)]
    note: Option<String>,
}

fn user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        cached: None,
    }
}

#[test]
fn model_constants() {
    assert_eq!(User::TABLE, "users");
    assert_eq!(User::FIELDS, &["id", "user_name"]);
    assert_eq!(OrderItem::TABLE, "order_item");
    assert_eq!(OrderItem::FIELDS, &["order_id", "sku", "quantity", "price"]);
    assert_eq!(User::table_ref().field_names(), vec!["id", "user_name"]);
}

#[test]
fn model_values_follow_fields() {
    let values = user(1, "alice").values();
    assert_eq!(values.len(), 2);
    assert_eq!(user(1, "alice").table().name(), "users");
}

#[test]
fn insert_models() {
    let users = vec![user(1, "alice"), user(2, "bob")];
    let sql = Database::new("mysql")
        .insert_into(&User::table_ref())
        .models(&users)
        .render()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `users` (`id`, `user_name`) VALUES (1, 'alice'), (2, 'bob')"
    );
}

#[test]
fn insert_models_with_nulls() {
    let items = [OrderItem {
        order_id: 7,
        sku: "A-1".into(),
        quantity: 3,
        price: None,
    }];
    let sql = Database::new("postgres")
        .insert_into(&OrderItem::table_ref())
        .models(items)
        .render()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"order_item\" (\"order_id\", \"sku\", \"quantity\", \"price\") \
         VALUES (7, E'A-1', 3, NULL)"
    );
}

#[test]
fn models_for_another_table_are_rejected() {
    let err = Database::new("mysql")
        .insert_into(&Table::new("admins"))
        .models([user(1, "root")])
        .render()
        .unwrap_err();
    assert!(err.to_string().contains("invalid table from model"));
}

async fn _fetch_user_rows_compiles(client: &tokio_postgres::Client) -> SqlResult<Vec<UserRow>> {
    let users = User::table_ref();
    Database::new("postgres")
        .select(users.fields())
        .where_(users.field("id").gt(0))
        .fetch_all(client)
        .await
}
