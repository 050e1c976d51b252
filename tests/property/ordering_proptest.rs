//! Property-based tests for reorder rank planning

use std::collections::HashSet;

use proptest::prelude::*;
use uuid::Uuid;

use cardapio::backend::store::{CatalogRepository, MemoryRepository, NewItem};
use cardapio::shared::ordering::plan_ranks;

/// A sibling count and a permutation of `0..count`
fn permutation() -> impl Strategy<Value = Vec<usize>> {
    (1usize..8).prop_flat_map(|len| Just((0..len).collect::<Vec<_>>()).prop_shuffle())
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

/// Persist a permutation of categories, returning the submitted ids and the read-back
async fn reorder_categories(order: &[usize]) -> (Vec<Uuid>, Vec<(Uuid, i32)>) {
    let repo = MemoryRepository::new();
    let user_id = Uuid::new_v4();
    let mut created = Vec::new();
    for i in 0..order.len() {
        created.push(repo.create_category(user_id, &format!("Categoria {}", i)).await.unwrap().id);
    }
    let submitted: Vec<Uuid> = order.iter().map(|&i| created[i]).collect();
    let ranks = plan_ranks(&created, &submitted).unwrap();
    repo.apply_category_order(user_id, &ranks).await.unwrap();

    let read_back = repo
        .list_categories(user_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| (c.id, c.sort_order))
        .collect();
    (submitted, read_back)
}

/// Same as `reorder_categories`, for the items of one category
async fn reorder_items(order: &[usize]) -> (Vec<Uuid>, Vec<(Uuid, i32)>) {
    let repo = MemoryRepository::new();
    let user_id = Uuid::new_v4();
    let category_id = repo.create_category(user_id, "Bebidas").await.unwrap().id;
    let mut created = Vec::new();
    for i in 0..order.len() {
        let item = repo
            .create_item(
                user_id,
                NewItem {
                    category_id,
                    name: format!("Item {}", i),
                    description: None,
                    price: 10.0,
                },
            )
            .await
            .unwrap();
        created.push(item.id);
    }
    let submitted: Vec<Uuid> = order.iter().map(|&i| created[i]).collect();
    let ranks = plan_ranks(&created, &submitted).unwrap();
    repo.apply_item_order(user_id, category_id, &ranks).await.unwrap();

    let read_back = repo
        .list_items(user_id, Some(category_id))
        .await
        .unwrap()
        .into_iter()
        .map(|i| (i.id, i.sort_order))
        .collect();
    (submitted, read_back)
}

fn expected_ranks(submitted: &[Uuid]) -> Vec<(Uuid, i32)> {
    submitted
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position as i32))
        .collect()
}

/// Sibling ids plus a shuffled subset of them
fn siblings_and_submission() -> impl Strategy<Value = (Vec<u32>, Vec<u32>)> {
    prop::collection::hash_set(0u32..10_000, 0..40)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|current| {
            let len = current.len();
            (Just(current.clone()), prop::sample::subsequence(current, 0..=len))
        })
        .prop_flat_map(|(current, subset)| (Just(current), Just(subset).prop_shuffle()))
}

proptest! {
    #[test]
    fn ranks_are_a_permutation_of_siblings((current, submitted) in siblings_and_submission()) {
        let ranks = plan_ranks(&current, &submitted).unwrap();
        if submitted.is_empty() {
            prop_assert!(ranks.is_empty());
        } else {
            prop_assert_eq!(ranks.len(), current.len());
            let ids: HashSet<u32> = ranks.iter().map(|(id, _)| *id).collect();
            let expected: HashSet<u32> = current.iter().copied().collect();
            prop_assert_eq!(ids, expected);
            let positions: Vec<i32> = ranks.iter().map(|(_, rank)| *rank).collect();
            prop_assert_eq!(positions, (0..current.len() as i32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn submitted_ids_come_first_in_order((current, submitted) in siblings_and_submission()) {
        let ranks = plan_ranks(&current, &submitted).unwrap();
        for (position, id) in submitted.iter().enumerate() {
            prop_assert_eq!(ranks[position], (*id, position as i32));
        }
    }

    #[test]
    fn unknown_ids_are_rejected(current in prop::collection::vec(0u32..1000, 1..20), stranger in 1000u32..2000) {
        let submitted = vec![current[0], stranger];
        prop_assert!(plan_ranks(&current, &submitted).is_err());
    }

    #[test]
    fn persisted_category_order_reads_back(order in permutation()) {
        let (submitted, read_back) = block_on(reorder_categories(&order));
        prop_assert_eq!(read_back, expected_ranks(&submitted));
    }

    #[test]
    fn persisted_item_order_reads_back(order in permutation()) {
        let (submitted, read_back) = block_on(reorder_items(&order));
        prop_assert_eq!(read_back, expected_ranks(&submitted));
    }
}
