// ABOUTME: Unit tests for the membership set managers
// ABOUTME: Toggle conflicts, set independence, self-follow rules, and lookup checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(missing_docs, clippy::unwrap_used)]

mod helpers;

use helpers::{create_test_db, seed_recipe_row, seed_user};
use ladle::database::memberships::is_subscribed;
use ladle::database::MembershipLookup;
use ladle::errors::ErrorCode;
use ladle::models::Recipe;
use ladle::test_utils::create_test_user;

#[tokio::test]
async fn test_favoriting_twice_is_a_conflict() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &user).await;
    seed_user(&db, &author).await;
    let recipe = Recipe::new(author.id, "Soup".into(), "media/s.png".into(), "Boil.".into(), 30);
    seed_recipe_row(&db, &recipe).await;

    db.memberships().add_favorite(user.id, recipe.id).await.unwrap();
    let err = db
        .memberships()
        .add_favorite(user.id, recipe.id)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::AlreadyExists);
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn test_unfavoriting_when_never_favorited_is_a_conflict() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &user).await;
    seed_user(&db, &author).await;
    let recipe = Recipe::new(author.id, "Soup".into(), "media/s.png".into(), "Boil.".into(), 30);
    seed_recipe_row(&db, &recipe).await;

    let err = db
        .memberships()
        .remove_favorite(user.id, recipe.id)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotPresent);
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn test_favorite_and_cart_are_independent() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &user).await;
    seed_user(&db, &author).await;
    let recipe = Recipe::new(author.id, "Soup".into(), "media/s.png".into(), "Boil.".into(), 30);
    seed_recipe_row(&db, &recipe).await;

    db.memberships().add_favorite(user.id, recipe.id).await.unwrap();

    assert!(db.memberships().exists_favorite(user.id, recipe.id).await.unwrap());
    assert!(!db.memberships().exists_in_cart(user.id, recipe.id).await.unwrap());

    // Adding to cart after favoriting still succeeds
    db.memberships().add_to_cart(user.id, recipe.id).await.unwrap();
    assert!(db.memberships().exists_in_cart(user.id, recipe.id).await.unwrap());

    // Removing from cart leaves the favorite intact
    db.memberships().remove_from_cart(user.id, recipe.id).await.unwrap();
    assert!(db.memberships().exists_favorite(user.id, recipe.id).await.unwrap());
}

#[tokio::test]
async fn test_cart_double_add_and_double_remove_are_conflicts() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &user).await;
    seed_user(&db, &author).await;
    let recipe = Recipe::new(author.id, "Soup".into(), "media/s.png".into(), "Boil.".into(), 30);
    seed_recipe_row(&db, &recipe).await;

    db.memberships().add_to_cart(user.id, recipe.id).await.unwrap();
    assert_eq!(
        db.memberships()
            .add_to_cart(user.id, recipe.id)
            .await
            .unwrap_err()
            .code,
        ErrorCode::AlreadyExists
    );

    db.memberships().remove_from_cart(user.id, recipe.id).await.unwrap();
    assert_eq!(
        db.memberships()
            .remove_from_cart(user.id, recipe.id)
            .await
            .unwrap_err()
            .code,
        ErrorCode::NotPresent
    );
}

#[tokio::test]
async fn test_cannot_follow_self() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    seed_user(&db, &user).await;

    let err = db.memberships().add_follow(user.id, user.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SelfReference);
    assert_eq!(err.http_status(), 400);

    let err = db
        .memberships()
        .remove_follow(user.id, user.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SelfReference);
}

#[tokio::test]
async fn test_follow_twice_is_a_conflict() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &user).await;
    seed_user(&db, &author).await;

    db.memberships().add_follow(user.id, author.id).await.unwrap();
    let err = db
        .memberships()
        .add_follow(user.id, author.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyExists);
}

#[tokio::test]
async fn test_unfollow_when_not_following_is_a_conflict() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &user).await;
    seed_user(&db, &author).await;

    let err = db
        .memberships()
        .remove_follow(user.id, author.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotPresent);
}

#[tokio::test]
async fn test_follow_listing_and_count() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    let alice = create_test_user("alice@example.com", "alice");
    let bob = create_test_user("bob@example.com", "bob");
    seed_user(&db, &user).await;
    seed_user(&db, &alice).await;
    seed_user(&db, &bob).await;

    db.memberships().add_follow(user.id, alice.id).await.unwrap();
    db.memberships().add_follow(user.id, bob.id).await.unwrap();

    let authors = db
        .memberships()
        .list_followed_authors(user.id, 50, 0)
        .await
        .unwrap();
    assert_eq!(authors.len(), 2);
    assert_eq!(db.memberships().count_follows(user.id).await.unwrap(), 2);

    // Follow edges are directional
    assert_eq!(db.memberships().count_follows(alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_is_subscribed_is_false_for_anonymous_callers() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;

    let memberships = db.memberships();
    assert!(!is_subscribed(&memberships, None, author.id).await.unwrap());
}

#[tokio::test]
async fn test_is_subscribed_reflects_follow_state() {
    let db = create_test_db().await;
    let user = create_test_user("u@example.com", "user");
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &user).await;
    seed_user(&db, &author).await;

    let memberships = db.memberships();
    assert!(!is_subscribed(&memberships, Some(user.id), author.id).await.unwrap());

    memberships.add_follow(user.id, author.id).await.unwrap();
    assert!(is_subscribed(&memberships, Some(user.id), author.id).await.unwrap());
}
