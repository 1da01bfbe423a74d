//! Built-in demo receipt.

use super::model::{Item, Receipt};

/// Returns the demo receipt used when trying the app without a photo.
pub fn demo_receipt() -> Receipt {
    Receipt {
        restaurant: "Panda Express".to_string(),
        subtotal: 29.30,
        tax: 2.86,
        tip: 4.40,
        total: 36.56,
        items: vec![
            Item {
                id: 1,
                name: "Bowl (Orange Chicken + Fried Rice)".to_string(),
                price: 10.60,
            },
            Item {
                id: 2,
                name: "Plate (Orange Chicken + Broccoli Beef + Fried Rice)".to_string(),
                price: 12.20,
            },
            Item {
                id: 3,
                name: "Veggie Spring Roll".to_string(),
                price: 2.10,
            },
            Item {
                id: 4,
                name: "Veggie Spring Roll".to_string(),
                price: 2.10,
            },
            Item {
                id: 5,
                name: "Soda".to_string(),
                price: 2.30,
            },
        ],
    }
}
