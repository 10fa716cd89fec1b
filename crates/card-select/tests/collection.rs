mod common;

use std::sync::Arc;

use common::{FakeSource, FakeTransfer, services};
use manos_block_core::HostApi;
use manos_card_select::{
    CardSelectConfig, FileRef, InputOutcome, ItemCollection, ItemSeed, LinkState, LinkVariant,
};
use serde_json::{Value, json};

fn collection() -> ItemCollection {
    let config = Arc::new(CardSelectConfig::default().with_defaults());
    ItemCollection::new(
        config,
        services(FakeSource::new(&[("7", "Seven")]), FakeTransfer::ok()),
        &HostApi::default(),
    )
}

fn loaded(data: Value) -> ItemCollection {
    let mut items = collection();
    items.deserialize(&data);
    items
}

#[test]
fn round_trip_keeps_items_in_order() {
    let data = json!({
        "items": [
            { "title": "<b>One</b>", "description": "first", "linkType": "blog", "entityId": "7" },
            { "title": "Two", "description": "", "linkType": "custom", "entityId": "", "customLink": "https://example.com" },
            {
                "title": "Three", "description": "third", "linkType": "file", "entityId": "",
                "file": { "id": "5", "name": "a.pdf", "extension": "pdf", "url": "/files/a.pdf", "size": 2048 }
            }
        ]
    });

    let items = loaded(data.clone());
    let saved = items.serialize().to_value();
    assert_eq!(saved, data);

    let again = loaded(saved.clone());
    assert_eq!(again.serialize().to_value(), saved);
}

#[test]
fn edits_through_foreign_inputs_keep_each_items_link_type() {
    let items = loaded(json!({
        "items": [
            { "title": "Link", "linkType": "custom" },
            { "title": "Post", "linkType": "blog" },
            { "title": "Doc", "linkType": "file" }
        ]
    }));
    let variants = |items: &ItemCollection| -> Vec<LinkVariant> {
        items.items().iter().map(|item| item.variant().clone()).collect()
    };
    let before = variants(&items);

    let [link, post, doc] = items.items() else {
        panic!("expected three items");
    };
    assert_eq!(
        link.on_file_attached(FileRef::new("a.pdf", "/files/a.pdf")),
        InputOutcome::Blocked
    );
    assert_eq!(post.on_custom_url_input("https://example.com"), InputOutcome::Blocked);
    assert_eq!(doc.on_custom_url_input("https://example.com"), InputOutcome::Blocked);

    let saved = items.serialize().to_value();
    let link_types: Vec<_> = saved["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["linkType"].clone())
        .collect();
    assert_eq!(link_types, vec![json!("custom"), json!("blog"), json!("file")]);

    let again = loaded(saved);
    assert_eq!(variants(&again), before);
    assert!(again.items().iter().all(|item| item.link_state() == LinkState::Empty));
}

#[test]
fn legacy_article_links_migrate_to_the_default_type() {
    let items = loaded(json!({
        "items": [{ "title": "Old", "linkType": "article", "entityId": "7" }]
    }));

    assert_eq!(items.items()[0].variant(), &LinkVariant::reference("blog"));
    assert_eq!(
        items.items()[0].link_state(),
        LinkState::Reference {
            type_key: "blog".to_string(),
            id: "7".to_string()
        }
    );

    let saved = items.serialize().to_value();
    assert_eq!(saved["items"][0]["linkType"], "blog");
    assert_eq!(saved["items"][0]["entityId"], "7");
    assert_eq!(loaded(saved.clone()).serialize().to_value(), saved);
}

#[test]
fn missing_link_type_and_numeric_ids() {
    let items = loaded(json!({ "items": [{ "title": "T", "entityId": 12 }] }));
    let record = &items.serialize().items[0];
    assert_eq!(record.link_type.as_deref(), Some("blog"));
    assert_eq!(record.entity_id, "12");
    assert_eq!(record.description, "");
}

#[test]
fn documents_without_items_get_one_empty_item() {
    for data in [json!({}), json!({ "items": null }), Value::Null] {
        let items = loaded(data);
        assert_eq!(items.len(), 1);
        assert_eq!(items.items()[0].variant(), &LinkVariant::reference("blog"));
        assert_eq!(items.items()[0].link_state(), LinkState::Empty);
    }

    assert!(loaded(json!({ "items": [] })).is_empty());
}

#[test]
fn blog_item_with_empty_fields_starts_unblocked() {
    let items = loaded(json!({
        "items": [{ "file": null, "entityId": "", "customLink": "", "linkType": "blog" }]
    }));
    let item = &items.items()[0];
    assert_eq!(item.variant(), &LinkVariant::reference("blog"));
    assert_eq!(item.link_state(), LinkState::Empty);
    assert!(item.compute_blocking_state().all_enabled());
}

#[test]
fn unreadable_records_become_empty_items() {
    let items = loaded(json!({ "items": ["oops", { "title": "ok", "linkType": "custom" }] }));
    assert_eq!(items.len(), 2);
    assert_eq!(items.items()[1].variant(), &LinkVariant::CustomUrl);
    assert_eq!(items.serialize().items[1].title, "ok");
}

#[test]
fn mismatched_values_follow_the_link_type() {
    let items = loaded(json!({
        "items": [{
            "linkType": "custom", "customLink": "https://a.test", "entityId": "5",
            "file": { "url": "/f.txt", "name": "f.txt" }
        }]
    }));
    let record = &items.serialize().items[0];
    assert_eq!(record.custom_link.as_deref(), Some("https://a.test"));
    assert_eq!(record.entity_id, "");
    assert_eq!(record.file, None);
}

#[test]
fn capacity_holds_for_any_add_sequence() {
    let mut items = collection();
    let variants = [
        LinkVariant::File,
        LinkVariant::CustomUrl,
        LinkVariant::reference("blog"),
        LinkVariant::File,
        LinkVariant::reference("blog"),
    ];
    for variant in variants.iter().cycle().take(12) {
        items.add_item(variant.clone(), ItemSeed::default());
        assert!(items.len() <= items.max_items());
    }
    assert_eq!(items.len(), 3);
    assert!(items.is_full());
}

#[test]
fn zero_item_limit_is_respected() {
    let config = CardSelectConfig::from_json(Some(&json!({ "maxEntityQuantity": 0 })));
    let mut items = ItemCollection::new(
        Arc::new(config),
        services(FakeSource::new(&[]), FakeTransfer::ok()),
        &HostApi::default(),
    );
    assert!(items.is_full());
    assert_eq!(items.add_item(LinkVariant::CustomUrl, ItemSeed::default()), None);

    items.deserialize(&json!({ "items": [{ "linkType": "custom" }] }));
    assert!(items.is_empty());
}

#[test]
fn overflowing_documents_are_truncated() {
    let record = json!({ "linkType": "custom", "customLink": "https://a.test" });
    let items = loaded(json!({ "items": [record.clone(), record.clone(), record.clone(), record] }));
    assert_eq!(items.len(), 3);
}

#[test]
fn removal_keeps_relative_order() {
    let mut items = collection();
    let ids: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|title| {
            items
                .add_item(LinkVariant::CustomUrl, ItemSeed::default().title(title))
                .unwrap()
        })
        .collect();

    assert!(items.remove_item(ids[1]));
    let titles: Vec<_> = items
        .serialize()
        .items
        .into_iter()
        .map(|record| record.title)
        .collect();
    assert_eq!(titles, vec!["a", "c"]);
    assert!(items.add_item(LinkVariant::File, ItemSeed::default()).is_some());
}

#[test]
fn removed_items_are_destroyed_and_not_mounted() {
    let mut items = collection();
    let id = items
        .add_item(LinkVariant::reference("blog"), ItemSeed::default())
        .unwrap();
    let handle = items.item(id).cloned().unwrap();
    assert!(items.remove_item(id));
    assert!(handle.is_destroyed());
    assert!(items.take_unmounted().is_empty());
}
