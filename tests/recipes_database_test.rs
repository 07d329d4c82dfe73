// ABOUTME: Unit tests for the recipes database manager
// ABOUTME: Covers transactional create/update, set replacement, validation, and cascades
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(missing_docs, clippy::unwrap_used)]

mod helpers;

use helpers::{create_test_db, seed_ingredient, seed_tag, seed_user};
use ladle::database::recipes::{CreateRecipeRequest, RecipeFilter, UpdateRecipeRequest};
use ladle::errors::ErrorCode;
use ladle::models::IngredientLine;
use ladle::test_utils::{create_test_ingredient, create_test_tag, create_test_user};
use uuid::Uuid;

fn line(ingredient_id: Uuid, amount: i64) -> IngredientLine {
    IngredientLine {
        ingredient_id,
        amount,
    }
}

fn basic_request(lines: Vec<IngredientLine>, tags: Vec<Uuid>) -> CreateRecipeRequest {
    CreateRecipeRequest {
        name: "Omelette".to_owned(),
        image: "media/omelette.png".to_owned(),
        text: "Whisk and fry.".to_owned(),
        cooking_time: 10,
        tags,
        ingredients: lines,
    }
}

#[tokio::test]
async fn test_create_stores_all_lines_with_matching_amounts() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    let milk = create_test_ingredient("milk", "ml");
    seed_ingredient(&db, &eggs).await;
    seed_ingredient(&db, &milk).await;

    let recipe = db
        .recipes()
        .create(author.id, &basic_request(vec![line(eggs.id, 2), line(milk.id, 150)], vec![]))
        .await
        .unwrap();

    let lines = db.recipes().lines_for(recipe.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    let eggs_line = lines.iter().find(|l| l.id == eggs.id).unwrap();
    assert_eq!(eggs_line.amount, 2);
    let milk_line = lines.iter().find(|l| l.id == milk.id).unwrap();
    assert_eq!(milk_line.amount, 150);
}

#[tokio::test]
async fn test_create_with_empty_ingredient_list_fails() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;

    let err = db
        .recipes()
        .create(author.id, &basic_request(vec![], vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_create_with_duplicate_ingredient_fails_regardless_of_amounts() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;

    let err = db
        .recipes()
        .create(
            author.id,
            &basic_request(vec![line(eggs.id, 2), line(eggs.id, 7)], vec![]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(db.recipes().count(&RecipeFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_with_unknown_ingredient_fails() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;

    let err = db
        .recipes()
        .create(author.id, &basic_request(vec![line(Uuid::new_v4(), 1)], vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_create_with_unknown_tag_fails() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;

    let err = db
        .recipes()
        .create(
            author.id,
            &basic_request(vec![line(eggs.id, 1)], vec![Uuid::new_v4()]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_update_fully_replaces_ingredient_set() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    let milk = create_test_ingredient("milk", "ml");
    let flour = create_test_ingredient("flour", "g");
    seed_ingredient(&db, &eggs).await;
    seed_ingredient(&db, &milk).await;
    seed_ingredient(&db, &flour).await;

    let recipe = db
        .recipes()
        .create(author.id, &basic_request(vec![line(eggs.id, 2), line(milk.id, 150)], vec![]))
        .await
        .unwrap();

    db.recipes()
        .update(
            recipe.id,
            &UpdateRecipeRequest {
                ingredients: Some(vec![line(flour.id, 300)]),
                ..UpdateRecipeRequest::default()
            },
        )
        .await
        .unwrap();

    let lines = db.recipes().lines_for(recipe.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].id, flour.id);
    assert_eq!(lines[0].amount, 300);
}

#[tokio::test]
async fn test_update_fully_replaces_tag_set() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;
    let breakfast = create_test_tag("Breakfast", "breakfast");
    let dinner = create_test_tag("Dinner", "dinner");
    seed_tag(&db, &breakfast).await;
    seed_tag(&db, &dinner).await;

    let recipe = db
        .recipes()
        .create(
            author.id,
            &basic_request(vec![line(eggs.id, 1)], vec![breakfast.id]),
        )
        .await
        .unwrap();

    db.recipes()
        .update(
            recipe.id,
            &UpdateRecipeRequest {
                tags: Some(vec![dinner.id]),
                ..UpdateRecipeRequest::default()
            },
        )
        .await
        .unwrap();

    let tags = db.recipes().tags_for(recipe.id).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, dinner.id);
}

#[tokio::test]
async fn test_update_without_sets_leaves_them_unchanged() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;

    let recipe = db
        .recipes()
        .create(author.id, &basic_request(vec![line(eggs.id, 2)], vec![]))
        .await
        .unwrap();

    let updated = db
        .recipes()
        .update(
            recipe.id,
            &UpdateRecipeRequest {
                name: Some("Scramble".to_owned()),
                ..UpdateRecipeRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Scramble");
    assert_eq!(updated.text, recipe.text);
    assert_eq!(updated.author_id, author.id);
    let lines = db.recipes().lines_for(recipe.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].amount, 2);
}

#[tokio::test]
async fn test_failed_update_leaves_recipe_unmodified() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;

    let recipe = db
        .recipes()
        .create(author.id, &basic_request(vec![line(eggs.id, 2)], vec![]))
        .await
        .unwrap();

    // Duplicate ingredient in the replacement set is rejected
    let err = db
        .recipes()
        .update(
            recipe.id,
            &UpdateRecipeRequest {
                name: Some("Broken".to_owned()),
                ingredients: Some(vec![line(eggs.id, 1), line(eggs.id, 3)]),
                ..UpdateRecipeRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let unchanged = db.recipes().get_required(recipe.id).await.unwrap();
    assert_eq!(unchanged.name, "Omelette");
    let lines = db.recipes().lines_for(recipe.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].amount, 2);
}

#[tokio::test]
async fn test_update_missing_recipe_is_not_found() {
    let db = create_test_db().await;
    let err = db
        .recipes()
        .update(Uuid::new_v4(), &UpdateRecipeRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_delete_cascades_to_lines_and_memberships() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    let fan = create_test_user("b@example.com", "fan");
    seed_user(&db, &author).await;
    seed_user(&db, &fan).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;

    let recipe = db
        .recipes()
        .create(author.id, &basic_request(vec![line(eggs.id, 2)], vec![]))
        .await
        .unwrap();

    db.memberships().add_favorite(fan.id, recipe.id).await.unwrap();
    db.memberships().add_to_cart(fan.id, recipe.id).await.unwrap();

    assert!(db.recipes().delete(recipe.id).await.unwrap());

    assert!(db.recipes().get(recipe.id).await.unwrap().is_none());
    assert!(db.recipes().lines_for(recipe.id).await.unwrap().is_empty());
    use ladle::database::MembershipLookup;
    assert!(!db.memberships().exists_favorite(fan.id, recipe.id).await.unwrap());
    assert!(!db.memberships().exists_in_cart(fan.id, recipe.id).await.unwrap());
}

#[tokio::test]
async fn test_list_filters_are_conjunctive() {
    let db = create_test_db().await;
    let alice = create_test_user("alice@example.com", "alice");
    let bob = create_test_user("bob@example.com", "bob");
    seed_user(&db, &alice).await;
    seed_user(&db, &bob).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;
    let breakfast = create_test_tag("Breakfast", "breakfast");
    seed_tag(&db, &breakfast).await;

    let tagged = db
        .recipes()
        .create(
            alice.id,
            &basic_request(vec![line(eggs.id, 1)], vec![breakfast.id]),
        )
        .await
        .unwrap();
    let untagged = db
        .recipes()
        .create(alice.id, &basic_request(vec![line(eggs.id, 1)], vec![]))
        .await
        .unwrap();
    let bobs = db
        .recipes()
        .create(
            bob.id,
            &basic_request(vec![line(eggs.id, 1)], vec![breakfast.id]),
        )
        .await
        .unwrap();

    // Author filter alone
    let filter = RecipeFilter {
        authors: vec![alice.id],
        ..RecipeFilter::default()
    };
    let found = db.recipes().list(&filter).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|r| r.author_id == alice.id));

    // Author AND tag slug
    let filter = RecipeFilter {
        authors: vec![alice.id],
        tag_slugs: vec!["breakfast".to_owned()],
        ..RecipeFilter::default()
    };
    let found = db.recipes().list(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, tagged.id);

    // No filter returns everything
    let all = db.recipes().list(&RecipeFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|r| r.id == untagged.id));
    assert!(all.iter().any(|r| r.id == bobs.id));
}

#[tokio::test]
async fn test_list_membership_restrictions() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    let fan = create_test_user("b@example.com", "fan");
    seed_user(&db, &author).await;
    seed_user(&db, &fan).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;

    let liked = db
        .recipes()
        .create(author.id, &basic_request(vec![line(eggs.id, 1)], vec![]))
        .await
        .unwrap();
    let other = db
        .recipes()
        .create(author.id, &basic_request(vec![line(eggs.id, 1)], vec![]))
        .await
        .unwrap();

    db.memberships().add_favorite(fan.id, liked.id).await.unwrap();

    let filter = RecipeFilter {
        favorited_by: Some(fan.id),
        ..RecipeFilter::default()
    };
    let found = db.recipes().list(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, liked.id);

    // No restriction lists both
    let all = db.recipes().list(&RecipeFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|r| r.id == other.id));
}

#[tokio::test]
async fn test_summaries_by_author_respects_limit_and_count() {
    let db = create_test_db().await;
    let author = create_test_user("a@example.com", "author");
    seed_user(&db, &author).await;
    let eggs = create_test_ingredient("eggs", "pcs");
    seed_ingredient(&db, &eggs).await;

    for _ in 0..3 {
        db.recipes()
            .create(author.id, &basic_request(vec![line(eggs.id, 1)], vec![]))
            .await
            .unwrap();
    }

    let limited = db
        .recipes()
        .summaries_by_author(author.id, Some(2))
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);

    let count = db.recipes().count_by_author(author.id).await.unwrap();
    assert_eq!(count, 3);
}
