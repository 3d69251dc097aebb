//! Macro-generated test suite for `OrderStore` contract validation.
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_create_and_find`: create then fetch by order id, all fields intact
//! - `test_find_missing`: unknown id is `NotFound`
//! - `test_duplicate_order_id`: second insert is `DuplicateKey`, first untouched
//! - `test_update_status`: status set, `updated_at` bumped, `created_at` kept
//! - `test_update_missing`: unknown id is `NotFound`
//! - `test_transition_compare_and_set`: writes only from the expected status
//! - `test_transition_missing`: unknown id is `NotFound`, not a conflict
//! - `test_delete`: delete then fetch is `NotFound`; second delete too
//!
//! ## Queries
//! - `test_find_all_newest_first`
//! - `test_find_by_status`: follows status changes
//! - `test_find_by_owner`: guest orders never match
//!
//! ## Aggregates
//! - `test_stats_empty`: every status present with zero
//! - `test_stats_counts_and_sums`
//!
//! ## Concurrency
//! - `test_concurrent_creates`: distinct ids all land
//! - `test_concurrent_same_id`: exactly one insert wins
//! - `test_concurrent_transitions`: one writer wins from a shared status
//! - `test_ping`

/// Generate a full `OrderStore` conformance test suite.
///
/// `$factory` must evaluate to a fresh, empty store. It is re-evaluated for
/// each test.
#[macro_export]
macro_rules! order_store_tests {
    ($factory:expr) => {
        mod order_store_contract_tests {
            use super::*;
            use cakeshop::core::error::StoreError;
            use cakeshop::core::order::OrderStatus;
            use cakeshop::core::store::OrderStore;
            use rust_decimal::Decimal;
            use std::sync::Arc;

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_find() {
                let store = $factory;
                let order = sample_order("ORDER-1");

                let created = store.create(order.clone()).await.unwrap();
                assert_eq!(created, order);

                let found = store.find_by_id("ORDER-1").await.unwrap();
                assert_eq!(found, order);
                assert_eq!(found.total_price, Decimal::new(5299, 2));
                assert_eq!(found.design.toppings, vec!["sprinkles"]);
            }

            #[tokio::test]
            async fn test_find_missing() {
                let store = $factory;
                let err = store.find_by_id("ORDER-404").await.unwrap_err();
                assert_eq!(
                    err,
                    StoreError::NotFound {
                        order_id: "ORDER-404".to_string()
                    }
                );
            }

            #[tokio::test]
            async fn test_duplicate_order_id() {
                let store = $factory;
                let first = sample_order("ORDER-DUP");
                store.create(first.clone()).await.unwrap();

                let mut second = sample_order("ORDER-DUP");
                second.customer_name = "Someone Else".to_string();
                let err = store.create(second).await.unwrap_err();
                assert!(matches!(err, StoreError::DuplicateKey { ref order_id } if order_id == "ORDER-DUP"));

                assert_eq!(store.find_by_id("ORDER-DUP").await.unwrap(), first);
                assert_eq!(store.find_all().await.unwrap().len(), 1);
            }

            #[tokio::test]
            async fn test_update_status() {
                let store = $factory;
                let order = order_with("ORDER-U", OrderStatus::Pending, None, 5299, 60);
                store.create(order.clone()).await.unwrap();

                let updated = store
                    .update_status("ORDER-U", OrderStatus::Preparing)
                    .await
                    .unwrap();
                assert_eq!(updated.status, OrderStatus::Preparing);
                assert_eq!(updated.created_at, order.created_at);
                assert!(updated.updated_at > order.updated_at);

                let found = store.find_by_id("ORDER-U").await.unwrap();
                assert_eq!(found.status, OrderStatus::Preparing);
                assert_eq!(found.total_price, order.total_price);
            }

            #[tokio::test]
            async fn test_update_missing() {
                let store = $factory;
                let err = store
                    .update_status("ORDER-404", OrderStatus::Ready)
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::NotFound { .. }));
                assert!(store.find_all().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_transition_compare_and_set() {
                let store = $factory;
                let order = order_with("ORDER-T", OrderStatus::Pending, None, 5299, 60);
                store.create(order.clone()).await.unwrap();

                let updated = store
                    .transition("ORDER-T", OrderStatus::Pending, OrderStatus::Preparing)
                    .await
                    .unwrap();
                assert_eq!(updated.status, OrderStatus::Preparing);
                assert!(updated.updated_at > order.updated_at);

                // Stale expectation: rejected, record untouched
                let err = store
                    .transition("ORDER-T", OrderStatus::Pending, OrderStatus::Cancelled)
                    .await
                    .unwrap_err();
                assert_eq!(
                    err,
                    StoreError::StatusConflict {
                        order_id: "ORDER-T".to_string(),
                        actual: OrderStatus::Preparing,
                    }
                );
                let found = store.find_by_id("ORDER-T").await.unwrap();
                assert_eq!(found, updated);
                assert!(store
                    .find_by_status(OrderStatus::Cancelled)
                    .await
                    .unwrap()
                    .is_empty());
            }

            #[tokio::test]
            async fn test_transition_missing() {
                let store = $factory;
                let err = store
                    .transition("ORDER-404", OrderStatus::Pending, OrderStatus::Ready)
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::NotFound { .. }));
            }

            #[tokio::test]
            async fn test_delete() {
                let store = $factory;
                store.create(sample_order("ORDER-D")).await.unwrap();
                store.create(sample_order("ORDER-KEEP")).await.unwrap();

                store.delete("ORDER-D").await.unwrap();
                assert!(matches!(
                    store.find_by_id("ORDER-D").await,
                    Err(StoreError::NotFound { .. })
                ));
                assert!(matches!(
                    store.delete("ORDER-D").await,
                    Err(StoreError::NotFound { .. })
                ));
                assert_eq!(order_ids(&store.find_all().await.unwrap()), vec!["ORDER-KEEP"]);
            }

            // ==================================================================
            // Queries
            // ==================================================================

            #[tokio::test]
            async fn test_find_all_newest_first() {
                let store = $factory;
                store
                    .create(order_with("ORDER-OLD", OrderStatus::Pending, None, 100, 300))
                    .await
                    .unwrap();
                store
                    .create(order_with("ORDER-NEW", OrderStatus::Pending, None, 100, 0))
                    .await
                    .unwrap();
                store
                    .create(order_with("ORDER-MID", OrderStatus::Pending, None, 100, 120))
                    .await
                    .unwrap();

                let all = store.find_all().await.unwrap();
                assert_eq!(order_ids(&all), vec!["ORDER-NEW", "ORDER-MID", "ORDER-OLD"]);
            }

            #[tokio::test]
            async fn test_find_by_status() {
                let store = $factory;
                store
                    .create(order_with("ORDER-A", OrderStatus::Pending, None, 100, 20))
                    .await
                    .unwrap();
                store
                    .create(order_with("ORDER-B", OrderStatus::Ready, None, 100, 10))
                    .await
                    .unwrap();
                store
                    .create(order_with("ORDER-C", OrderStatus::Pending, None, 100, 0))
                    .await
                    .unwrap();

                let pending = store.find_by_status(OrderStatus::Pending).await.unwrap();
                assert_eq!(order_ids(&pending), vec!["ORDER-C", "ORDER-A"]);

                store
                    .update_status("ORDER-A", OrderStatus::Ready)
                    .await
                    .unwrap();
                let pending = store.find_by_status(OrderStatus::Pending).await.unwrap();
                assert_eq!(order_ids(&pending), vec!["ORDER-C"]);
                let ready = store.find_by_status(OrderStatus::Ready).await.unwrap();
                assert_eq!(order_ids(&ready), vec!["ORDER-B", "ORDER-A"]);

                assert!(store
                    .find_by_status(OrderStatus::Cancelled)
                    .await
                    .unwrap()
                    .is_empty());
            }

            #[tokio::test]
            async fn test_find_by_owner() {
                let store = $factory;
                store
                    .create(order_with("ORDER-1", OrderStatus::Pending, Some("alice"), 100, 20))
                    .await
                    .unwrap();
                store
                    .create(order_with("ORDER-2", OrderStatus::Pending, Some("bob"), 100, 10))
                    .await
                    .unwrap();
                store
                    .create(order_with("ORDER-3", OrderStatus::Completed, Some("alice"), 100, 0))
                    .await
                    .unwrap();
                store.create(sample_order("ORDER-GUEST")).await.unwrap();

                let alice = store.find_by_owner("alice").await.unwrap();
                assert_eq!(order_ids(&alice), vec!["ORDER-3", "ORDER-1"]);
                assert!(store.find_by_owner("carol").await.unwrap().is_empty());
            }

            // ==================================================================
            // Aggregates
            // ==================================================================

            #[tokio::test]
            async fn test_stats_empty() {
                let store = $factory;
                let stats = store.aggregate_stats(today()).await.unwrap();
                assert_eq!(stats.total_count, 0);
                assert_eq!(stats.count_by_status.len(), 5);
                assert!(stats.count_by_status.values().all(|c| *c == 0));
                assert_eq!(stats.sum_of_total_price, Decimal::ZERO);
            }

            #[tokio::test]
            async fn test_stats_counts_and_sums() {
                let store = $factory;
                store
                    .create(order_with("ORDER-1", OrderStatus::Pending, None, 5299, 0))
                    .await
                    .unwrap();
                store
                    .create(order_with("ORDER-2", OrderStatus::Completed, None, 4199, 0))
                    .await
                    .unwrap();
                // Two days old: counted in totals, not in today
                store
                    .create(order_with("ORDER-3", OrderStatus::Pending, None, 1001, 2 * 24 * 3600))
                    .await
                    .unwrap();

                let stats = store.aggregate_stats(today()).await.unwrap();
                assert_eq!(stats.total_count, 3);
                assert_eq!(stats.count(OrderStatus::Pending), 2);
                assert_eq!(stats.count(OrderStatus::Completed), 1);
                assert_eq!(stats.count(OrderStatus::Ready), 0);
                assert_eq!(stats.sum_of_total_price, Decimal::new(10499, 2));
                assert_eq!(stats.today_count, 2);
                assert_eq!(stats.today_sum, Decimal::new(9498, 2));
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_creates() {
                let store = Arc::new($factory);

                let handles: Vec<_> = (0..20)
                    .map(|i| {
                        let store = store.clone();
                        tokio::spawn(async move {
                            store.create(sample_order(&format!("ORDER-C{}", i))).await
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.await.unwrap().unwrap();
                }
                assert_eq!(store.find_all().await.unwrap().len(), 20);
            }

            #[tokio::test]
            async fn test_concurrent_same_id() {
                let store = Arc::new($factory);

                let handles: Vec<_> = (0..10)
                    .map(|_| {
                        let store = store.clone();
                        tokio::spawn(async move { store.create(sample_order("ORDER-RACE")).await })
                    })
                    .collect();

                let mut won = 0;
                for handle in handles {
                    match handle.await.unwrap() {
                        Ok(_) => won += 1,
                        Err(StoreError::DuplicateKey { .. }) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
                assert_eq!(won, 1);
                assert_eq!(store.find_all().await.unwrap().len(), 1);
            }

            #[tokio::test]
            async fn test_concurrent_transitions() {
                let store = Arc::new($factory);
                store
                    .create(order_with("ORDER-CAS", OrderStatus::Ready, None, 100, 0))
                    .await
                    .unwrap();

                let targets = [OrderStatus::Completed, OrderStatus::Cancelled];
                let handles: Vec<_> = (0..10)
                    .map(|i| {
                        let store = store.clone();
                        let target = targets[i % 2];
                        tokio::spawn(async move {
                            store.transition("ORDER-CAS", OrderStatus::Ready, target).await
                        })
                    })
                    .collect();

                let mut winners = Vec::new();
                for handle in handles {
                    match handle.await.unwrap() {
                        Ok(order) => winners.push(order.status),
                        Err(StoreError::StatusConflict { .. }) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
                assert_eq!(winners.len(), 1);
                let found = store.find_by_id("ORDER-CAS").await.unwrap();
                assert_eq!(found.status, winners[0]);
            }

            #[tokio::test]
            async fn test_ping() {
                let store = $factory;
                store.ping().await.unwrap();
                assert!(!store.backend_name().is_empty());
            }
        }
    };
}
