//! # Default Catalog
//!
//! The seed inventory a fresh register starts with.
//!
//! Seed items carry fixed slug ids rather than generated UUIDs. Two
//! brand-new registers that both seed themselves and then sync produce
//! identical rows, and the reconciler's insert dedupe collapses them
//! instead of doubling the menu.

use crate::stock;
use crate::types::{Item, ItemOption};

/// Builds the stand's starting menu.
pub fn default_catalog() -> Vec<Item> {
    let mut items = vec![
        Item {
            id: "munchie-bags".into(),
            name: "Munchie Bags".into(),
            price_cents: 500,
            stock: 20,
            options: Vec::new(),
            color: "bg-orange-500".into(),
            icon: "🛍️".into(),
        },
        Item {
            id: "chips".into(),
            name: "Chips".into(),
            price_cents: 200,
            stock: 0,
            options: vec![
                ItemOption::new("Hot Cheetos lime", 4),
                ItemOption::new("Hot Cheetos", 5),
                ItemOption::new("Hot Funyuns", 5),
                ItemOption::new("Hot Doritos", 5),
                ItemOption::new("Hot Fritos", 5),
            ],
            color: "bg-blue-500".into(),
            icon: "🍟".into(),
        },
        Item {
            id: "rice-krispies".into(),
            name: "Rice Krispies".into(),
            price_cents: 100,
            stock: 30,
            options: Vec::new(),
            color: "bg-cyan-400".into(),
            icon: "🥣".into(),
        },
        Item {
            id: "fruit-foot".into(),
            name: "Fruit by the Foot".into(),
            price_cents: 100,
            stock: 30,
            options: Vec::new(),
            color: "bg-rose-500".into(),
            icon: "🍬".into(),
        },
    ];

    for item in &mut items {
        stock::recompute_derived(item);
    }

    items
}
