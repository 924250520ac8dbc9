// Copyright 2025 Cowboy AI, LLC.

//! End-to-end scenarios: parties saved through the registry with the
//! category checker registered as a validation hook.

use party_categories::{
    Category, CategoryConstraintChecker, CategoryError, ConstraintViolation,
    InMemoryCategoryStore, Party, PartyCategoryDomain, PartyRegistry, ValidationContext,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn registry_for(store: &InMemoryCategoryStore) -> PartyRegistry {
    let mut registry = PartyRegistry::new();
    registry.register(Box::new(CategoryConstraintChecker::new(store.clone())));
    registry
}

#[test]
fn party_without_required_category_is_rejected() {
    let store = InMemoryCategoryStore::new();
    store
        .insert(Category::view("Category Required").required(true))
        .unwrap();
    let category = store.insert(Category::new("Category")).unwrap();
    let registry = registry_for(&store);

    let party = Party::new("Party").with_categories([category.id]);
    let err = registry
        .create(vec![party.clone()], &ValidationContext::default())
        .unwrap_err();

    assert_eq!(
        err.violation(),
        Some(&ConstraintViolation::MissingRequiredCategory {
            party_id: party.id,
            party: "Party".to_string(),
            missing: vec!["Category Required".to_string()],
        })
    );
    assert_eq!(
        err.to_string(),
        "The party \"Party\" is missing some required categories: Category Required"
    );
    assert!(registry.is_empty().unwrap());
}

#[test]
fn disabled_check_lets_invalid_party_through() {
    let store = InMemoryCategoryStore::new();
    store
        .insert(Category::view("Category Required").required(true))
        .unwrap();
    let category = store.insert(Category::new("Category")).unwrap();
    let registry = registry_for(&store);

    let context = json!({ "check_categories": false });
    let ctx = ValidationContext::from_context_map(context.as_object().unwrap()).unwrap();

    let party = Party::new("Party").with_categories([category.id]);
    let ids = registry.create(vec![party.clone()], &ctx).unwrap();

    assert_eq!(ids, vec![party.id]);
    let stored = registry.get(party.id).unwrap();
    assert!(stored.has_category(category.id));
}

#[test]
fn two_sizes_under_unique_root_are_rejected() {
    let store = InMemoryCategoryStore::new();
    let size = store.insert(Category::view("Size").unique(true)).unwrap();
    let small = store.insert(Category::new("Small").with_parent(size.id)).unwrap();
    let large = store.insert(Category::new("Large").with_parent(size.id)).unwrap();
    let registry = registry_for(&store);

    let mut party = Party::new("Party");
    party.add_category(&small).unwrap();
    party.add_category(&large).unwrap();

    let err = registry
        .create(vec![party], &ValidationContext::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CategoryError::Violation(ConstraintViolation::RepeatedUniqueCategory { ref party, .. })
            if party == "Party"
    ));

    let mut party = Party::new("Party");
    party.add_category(&small).unwrap();
    assert!(registry
        .create(vec![party], &ValidationContext::default())
        .is_ok());
}

#[test]
fn one_bad_party_rejects_the_whole_batch() {
    let store = InMemoryCategoryStore::new();
    let sector = store.insert(Category::view("Sector").required(true)).unwrap();
    let retail = store.insert(Category::new("Retail").with_parent(sector.id)).unwrap();
    let registry = registry_for(&store);

    let good = Party::new("Good").with_categories([retail.id]);
    let bad = Party::new("Bad");
    let err = registry
        .create(vec![good, bad.clone()], &ValidationContext::default())
        .unwrap_err();

    assert_eq!(err.violation().map(|v| v.party_id()), Some(bad.id));
    assert!(registry.is_empty().unwrap());
}

#[test]
fn updates_are_validated_against_the_current_taxonomy() {
    let store = InMemoryCategoryStore::new();
    let customer = store.insert(Category::new("Customer")).unwrap();
    let registry = registry_for(&store);

    let party = Party::new("Acme").with_categories([customer.id]);
    registry
        .create(vec![party.clone()], &ValidationContext::default())
        .unwrap();

    // A new required branch applies to the next write without rebuilding the checker.
    let sector = store.insert(Category::view("Sector").required(true)).unwrap();
    let retail = store.insert(Category::new("Retail").with_parent(sector.id)).unwrap();

    let err = registry
        .write(vec![party.clone()], &ValidationContext::default())
        .unwrap_err();
    assert!(err.is_violation());

    let fixed = party.clone().with_categories([customer.id, retail.id]);
    registry
        .write(vec![fixed], &ValidationContext::default())
        .unwrap();
    assert!(registry.get(party.id).unwrap().has_category(retail.id));
}

#[test]
fn audit_finds_parties_imported_without_checks() {
    let store = InMemoryCategoryStore::new();
    store.insert(Category::view("Sector").required(true)).unwrap();
    let registry = registry_for(&store);

    registry
        .create(
            vec![Party::new("Imported A"), Party::new("Imported B")],
            &ValidationContext::skip_categories(),
        )
        .unwrap();

    let checker = CategoryConstraintChecker::new(store);
    let reports = checker.audit(&registry.all().unwrap()).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| !r.is_valid()));
}

#[test]
fn party_selection_excludes_view_categories() {
    let store = InMemoryCategoryStore::new();
    let size = store.insert(Category::view("Size").unique(true)).unwrap();
    let small = store.insert(Category::new("Small").with_parent(size.id)).unwrap();

    let names: Vec<String> = PartyCategoryDomain::selectable(&store)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Small"]);

    let mut party = Party::new("Acme");
    assert!(party.add_category(&size).is_err());
    assert!(party.add_category(&small).unwrap());
}
