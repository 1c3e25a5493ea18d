use datalayer_rpc::{DataStore, Error, MemoryStore, RawKey, StoreId};

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert("storeA", b"key", b"hello");
    store.insert("storeA", b"other", b"world");
    store.add_store("storeB");
    store
}

#[tokio::test]
async fn subscriptions_follow_insertion_order() {
    let store = seeded_store();
    let ids = store.subscriptions().await.unwrap();
    assert_eq!(ids, vec![StoreId::from("storeA"), StoreId::from("storeB")]);
}

#[tokio::test]
async fn keys_are_returned_in_wire_form() {
    let store = seeded_store();
    let keys = store.keys(&StoreId::from("storeA")).await.unwrap();
    assert_eq!(keys, vec![RawKey::new("0x6b6579"), RawKey::new("0x6f74686572")]);
    assert!(store.keys(&StoreId::from("storeB")).await.unwrap().is_empty());
    assert_eq!(store.keys_calls(), 2);
}

#[tokio::test]
async fn value_lookup_by_raw_key() {
    let store = seeded_store();
    let value = store
        .value(&StoreId::from("storeA"), &RawKey::new("0x6b6579"))
        .await
        .unwrap();
    assert_eq!(&value[..], b"hello");
}

#[tokio::test]
async fn overwriting_a_key_keeps_its_position() {
    let store = seeded_store();
    store.insert("storeA", b"key", b"HELLO");
    let keys = store.keys(&StoreId::from("storeA")).await.unwrap();
    assert_eq!(keys[0], RawKey::new("0x6b6579"));
    let value = store.value(&StoreId::from("storeA"), &keys[0]).await.unwrap();
    assert_eq!(&value[..], b"HELLO");
}

#[tokio::test]
async fn unknown_store_and_key_fail() {
    let store = seeded_store();
    let err = store.keys(&StoreId::from("nope")).await.unwrap_err();
    assert!(matches!(err, Error::UnknownStore(_)));

    let err = store
        .value(&StoreId::from("storeA"), &RawKey::new("0x00"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unsuccessful { .. }));
}

#[tokio::test]
async fn injected_failures_surface_as_errors() {
    let store = seeded_store();
    store.fail_store("storeA");
    assert!(matches!(
        store.keys(&StoreId::from("storeA")).await,
        Err(Error::Malformed { .. })
    ));

    store.fail_subscriptions(true);
    assert!(store.subscriptions().await.is_err());
    store.fail_subscriptions(false);
    assert!(store.subscriptions().await.is_ok());
}
