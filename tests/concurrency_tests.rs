mod common;

use common::{harness, pet_order};
use ecotrack::models::OrderStatus;
use ecotrack::repositories::{OrderRepository, RouteRepository};
use ecotrack::test_utils::GeoScript;
use ecotrack::utils::errors::AppError;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_selection_has_single_winner() {
    for _ in 0..20 {
        let h = harness(GeoScript::Distance(20.0)).await;
        let route = h.state.workflow.create(pet_order(), &h.client).await.unwrap().route.unwrap();
        let economy = route.option_by_name("economy").unwrap().id;
        let express = route.option_by_name("express").unwrap().id;

        let first_state = h.state.clone();
        let second_state = h.state.clone();
        let first_user = h.logistic.clone();
        let second_user = h.second_logistic.clone();
        let route_id = route.id;

        let first = tokio::spawn(async move { first_state.workflow.select_route(route_id, economy, &first_user).await });
        let second =
            tokio::spawn(async move { second_state.workflow.select_route(route_id, express, &second_user).await });
        let (first, second) = tokio::join!(first, second);
        let outcomes = [(economy, first.unwrap()), (express, second.unwrap())];

        let winners: Vec<_> = outcomes.iter().filter(|(_, result)| result.is_ok()).collect();
        assert_eq!(winners.len(), 1);
        let losers: Vec<_> = outcomes
            .iter()
            .filter(|(_, result)| matches!(result, Err(AppError::AlreadySelected { .. })))
            .collect();
        assert_eq!(losers.len(), 1);

        let stored = h.store.find_route(route_id).await.unwrap().unwrap();
        assert_eq!(stored.selected_option_id, Some(winners[0].0));
        let order = h.store.find_order(route.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Accepted);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_route_generation_creates_one_route() {
    let h = harness(GeoScript::Distance(20.0)).await;
    h.store.set_fail_route_inserts(true);
    let order = h.state.workflow.create(pet_order(), &h.client).await.unwrap().order;
    assert_eq!(order.status, OrderStatus::Pending);
    h.store.set_fail_route_inserts(false);

    let generators: Vec<_> = (0..4)
        .map(|_| {
            let routes = h.state.routes.clone();
            let order = order.clone();
            tokio::spawn(async move { routes.generate_routes(&order).await })
        })
        .collect();

    let mut created = 0;
    for handle in generators {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::DuplicateRoute { order_id }) => assert_eq!(order_id, order.id),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(h.store.route_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_racing_advance_keeps_valid_state() {
    let h = harness(GeoScript::Distance(20.0)).await;
    let creation = h.state.workflow.create(pet_order(), &h.client).await.unwrap();
    let route = creation.route.unwrap();
    h.state
        .workflow
        .select_route(route.id, route.options[0].id, &h.logistic)
        .await
        .unwrap();
    let order_id = creation.order.id;

    let cancel_state = h.state.clone();
    let advance_state = h.state.clone();
    let client = h.client.clone();
    let manager = h.manager.clone();

    let (cancelled, advanced) = tokio::join!(
        tokio::spawn(async move { cancel_state.workflow.cancel(order_id, &client).await }),
        tokio::spawn(async move { advance_state.workflow.advance(order_id, OrderStatus::Processing, &manager).await }),
    );

    // La cancelación siempre gana: o antes del avance, o reintentando después
    assert_eq!(cancelled.unwrap().unwrap().status, OrderStatus::Cancelled);
    let advanced = advanced.unwrap();
    assert!(advanced.is_ok() || matches!(advanced, Err(AppError::InvalidTransition { .. })));

    let stored = h.store.find_order(order_id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Cancelled);
    assert_eq!(stored.price, creation.order.price);
}
