//! PostgreSQL repository tests
//!
//! Skipped unless `DATABASE_URL` is set. Every test works on fresh users
//! so runs do not interfere with each other.

use assert_matches::assert_matches;
use uuid::Uuid;

use cardapio::backend::auth::users::NewUser;
use cardapio::backend::store::{
    CatalogRepository, ItemChanges, NewItem, PgRepository, StoreError, UserRepository,
};

use crate::common::{pg_repository, unique_suffix};

async fn new_user(repo: &PgRepository) -> Uuid {
    let suffix = unique_suffix();
    repo.create_user(NewUser {
        username: format!("u{}", suffix),
        email: format!("{}@cardapio.test", suffix),
        password_hash: "hash".into(),
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let Some(repo) = pg_repository().await else {
        return;
    };
    let suffix = unique_suffix();
    let first = NewUser {
        username: format!("u{}", suffix),
        email: format!("a{}@cardapio.test", suffix),
        password_hash: "hash".into(),
    };
    let second = NewUser {
        username: format!("u{}", suffix),
        email: format!("b{}@cardapio.test", suffix),
        password_hash: "hash".into(),
    };
    repo.create_user(first).await.unwrap();
    assert_matches!(repo.create_user(second).await, Err(StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_category_delete_cascades() {
    let Some(repo) = pg_repository().await else {
        return;
    };
    let user = new_user(&repo).await;
    let category = repo.create_category(user, "Bebidas").await.unwrap();
    repo.create_item(
        user,
        NewItem {
            category_id: category.id,
            name: "Suco".into(),
            description: None,
            price: 8.0,
        },
    )
    .await
    .unwrap();

    assert_eq!(repo.delete_category(user, category.id).await.unwrap(), 1);
    assert!(repo.list_items(user, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_item_order_is_applied_atomically() {
    let Some(repo) = pg_repository().await else {
        return;
    };
    let user = new_user(&repo).await;
    let category = repo.create_category(user, "Pratos").await.unwrap();
    let mut ids = Vec::new();
    for (i, name) in ["A", "B", "C"].iter().enumerate() {
        let item = repo
            .create_item(
                user,
                NewItem {
                    category_id: category.id,
                    name: name.to_string(),
                    description: None,
                    price: i as f64,
                },
            )
            .await
            .unwrap();
        assert_eq!(item.sort_order, i as i32);
        ids.push(item.id);
    }

    let ranks = vec![(ids[2], 0), (ids[0], 1), (ids[1], 2)];
    repo.apply_item_order(user, category.id, &ranks).await.unwrap();
    let names: Vec<String> = repo
        .list_items(user, Some(category.id))
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["C", "A", "B"]);

    // A rank list naming another user's item is rejected as a whole
    let other = new_user(&repo).await;
    let result = repo.apply_item_order(other, category.id, &ranks).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_staged_price_round_trip() {
    let Some(repo) = pg_repository().await else {
        return;
    };
    let user = new_user(&repo).await;
    let category = repo.create_category(user, "Pratos").await.unwrap();
    let item = repo
        .create_item(
            user,
            NewItem {
                category_id: category.id,
                name: "Feijoada".into(),
                description: Some("Sábado".into()),
                price: 40.0,
            },
        )
        .await
        .unwrap();

    let staged = repo
        .update_item(
            user,
            item.id,
            ItemChanges {
                new_price: Some(Some(44.0)),
                backup_price: Some(Some(40.0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(staged.price, 40.0);
    assert_eq!(staged.new_price, Some(44.0));
    assert_eq!(staged.backup_price, Some(40.0));

    let cleared = repo
        .update_item(
            user,
            item.id,
            ItemChanges {
                new_price: Some(None),
                ..ItemChanges::price(44.0)
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.price, 44.0);
    assert_eq!(cleared.new_price, None);
    assert_eq!(cleared.description.as_deref(), Some("Sábado"));
}
