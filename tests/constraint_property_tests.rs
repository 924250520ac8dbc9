// Copyright 2025 Cowboy AI, LLC.

//! Property tests: the checker agrees with a brute-force walk of the parent
//! chain for random two-level taxonomies.

use std::collections::{BTreeSet, HashMap};

use party_categories::{
    Category, CategoryId, ConstraintSet, ConstraintViolation, InMemoryCategoryStore, Party,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct RootSpec {
    view: bool,
    required: bool,
    unique: bool,
    children: usize,
}

fn root_spec() -> impl Strategy<Value = RootSpec> {
    (any::<bool>(), any::<bool>(), any::<bool>(), 0usize..4).prop_map(
        |(view, required, unique, children)| RootSpec {
            view,
            required,
            unique,
            children,
        },
    )
}

struct Built {
    store: InMemoryCategoryStore,
    categories: Vec<Category>,
}

fn build(roots: &[RootSpec]) -> Built {
    let store = InMemoryCategoryStore::new();
    let mut categories = Vec::new();
    for (i, spec) in roots.iter().enumerate() {
        let root = if spec.view {
            Category::view(format!("root{i}"))
        } else {
            Category::new(format!("root{i}"))
        };
        let root = store
            .insert(root.required(spec.required).unique(spec.unique))
            .unwrap();
        for j in 0..spec.children {
            let child = store
                .insert(Category::new(format!("root{i}.{j}")).with_parent(root.id))
                .unwrap();
            categories.push(child);
        }
        categories.push(root);
    }
    Built { store, categories }
}

fn strictly_below(
    parents: &HashMap<CategoryId, Option<CategoryId>>,
    id: CategoryId,
    root: CategoryId,
) -> bool {
    let mut current = parents.get(&id).copied().flatten();
    while let Some(node) = current {
        if node == root {
            return true;
        }
        current = parents.get(&node).copied().flatten();
    }
    false
}

/// (has missing required, has repeated unique)
fn oracle(categories: &[Category], assigned: &BTreeSet<CategoryId>) -> (bool, bool) {
    let parents: HashMap<_, _> = categories.iter().map(|c| (c.id, c.parent)).collect();
    let mut missing = false;
    let mut repeated = false;
    for c in categories {
        let count = assigned
            .iter()
            .filter(|a| strictly_below(&parents, **a, c.id))
            .count();
        if c.enforces_required() && count == 0 {
            missing = true;
        }
        if c.enforces_unique() && count > 1 {
            repeated = true;
        }
    }
    (missing, repeated)
}

proptest! {
    #[test]
    fn checker_matches_parent_chain_oracle(
        roots in proptest::collection::vec(root_spec(), 1..5),
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let built = build(&roots);
        let assigned: BTreeSet<CategoryId> = picks
            .iter()
            .map(|i| built.categories[i.index(built.categories.len())].id)
            .collect();
        let party = Party::new("Prop").with_categories(assigned.iter().copied());

        let set = ConstraintSet::load(&built.store).unwrap();
        let (missing, repeated) = oracle(&built.categories, &assigned);

        match set.check(&party) {
            Ok(()) => prop_assert!(!missing && !repeated),
            Err(ConstraintViolation::MissingRequiredCategory { missing: names, .. }) => {
                prop_assert!(missing);
                prop_assert!(!names.is_empty() && names.len() <= 3);
            }
            Err(ConstraintViolation::RepeatedUniqueCategory { .. }) => {
                prop_assert!(!missing && repeated);
            }
        }
        prop_assert_eq!(set.audit(&party).len(), missing as usize + repeated as usize);
    }
}
