use firelayer::{memory::InMemoryStore, prelude::*};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Model)]
struct Book {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(skip)]
    meta: DocMeta,
}

#[tokio::test]
async fn connection_is_initialized_once() -> StoreResult<()> {
    assert!(!Connection::is_initialized());
    assert!(matches!(Book::find("b1").await, Err(StoreError::NotConnected)));
    assert!(matches!(Book::count().await, Err(StoreError::NotConnected)));

    let seeded = InMemoryStore::builder().seed(firelayer::bson::doc! {
        "books": { "b1": { "title": "Math" } },
    });
    assert!(Connection::initialize_with(seeded).await?);
    assert!(!Connection::initialize(InMemoryStore::new()));
    assert!(!Connection::initialize_with(InMemoryStore::builder()).await?);

    assert_eq!(Book::find("b1").await?.title, "Math");

    {
        let _guard = Connection::override_with(InMemoryStore::new());
        assert_eq!(Book::count().await?, 0);
    }

    assert_eq!(Book::count().await?, 1);

    Ok(())
}
