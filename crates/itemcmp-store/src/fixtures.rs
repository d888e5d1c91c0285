use chrono::{TimeZone, Utc};
use itemcmp_types::{Product, ProductDraft, SellerId};
use rust_decimal::Decimal;

pub(crate) fn product(id: i64, seller: &str) -> Product {
    let mut draft = ProductDraft::new(id, format!("Product {id}"), Decimal::new(1999, 2));
    draft.brand = Some("Acme".into());
    draft.image_url = Some(format!("https://img.example/{id}.png"));
    draft.rating = Some(Decimal::new(42, 1));
    draft
        .specifications
        .insert("color".into(), "graphite".into());
    Product::from_draft(
        draft,
        SellerId::new(seller).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    )
}
