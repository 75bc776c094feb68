use firelayer::{memory::InMemoryStore, prelude::*};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
struct User {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(skip)]
    meta: DocMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
struct Book {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(skip)]
    tags: SubCollection<Tag>,
    #[serde(skip)]
    meta: DocMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
struct Tag {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(skip)]
    notes: SubCollection<Note>,
    #[serde(skip)]
    meta: DocMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
struct Note {
    #[serde(default)]
    id: Option<String>,
    body: String,
    #[serde(skip)]
    meta: DocMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Model)]
struct AdminUser {
    #[serde(default)]
    id: Option<String>,
    #[serde(skip)]
    meta: DocMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Model)]
#[model(name = "Shelf", collection = "library_shelves")]
struct ShelfRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    book: Option<DocumentRef>,
    #[serde(default)]
    placed_at: Option<Timestamp>,
    #[serde(skip)]
    meta: DocMeta,
}

fn book(title: &str, user_id: &str) -> Book {
    Book {
        title: title.to_string(),
        user_id: user_id.to_string(),
        authors: vec!["John".to_string(), "Mary".to_string()],
        ..Default::default()
    }
}

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

async fn three_books() -> StoreResult<()> {
    for title in ["Math", "History", "English"] {
        book(title, "12345").persist().await?;
    }
    Ok(())
}

fn library_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register::<User>()
        .register::<Book>()
        .belongs_to::<Book, User>("user_id", None)
        .has_many::<User, Book>("user_id", None);
    registry
}

#[tokio::test]
async fn saved_entities_round_trip() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    let mut math = book("Math", "12345");
    let id = math.save().await?;
    book("History", "12345").persist().await?;

    assert_eq!(math.id(), Some(id.as_str()));
    assert_eq!(Book::find(&id).await?, math);
    assert!(Book::exists(&id).await?);
    assert!(Book::exists(&format!("books/{id}")).await?);
    assert!(!Book::exists("books/missing").await?);

    let found = Book::filter("title", FieldOp::Eq, "Math").fetch().await?;
    assert_eq!(titles(&found), vec!["Math"]);

    Ok(())
}

#[tokio::test]
async fn missing_documents_fail_unless_empty_is_allowed() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    assert!(matches!(
        Book::find("missing").await,
        Err(StoreError::DocumentNotFound(id, collection)) if id == "missing" && collection == "books"
    ));

    let placeholder = Book::find_or_empty("missing").await?;
    assert_eq!(placeholder.id(), Some("missing"));
    assert_eq!(placeholder.title, "");
    assert!(placeholder.authors.is_empty());
    assert!(!Book::exists("missing").await?);
    assert_eq!(Book::count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn paths_follow_collection_names() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    assert_eq!(Book::collection_name(), "books");
    assert_eq!(AdminUser::collection_name(), "admin_users");
    assert_eq!(ShelfRecord::model_name(), "Shelf");
    assert_eq!(ShelfRecord::collection_name(), "library_shelves");

    let unsaved = book("Math", "12345");
    assert!(matches!(unsaved.path(), Err(StoreError::InvalidState(_))));
    assert!(matches!(unsaved.delete().await, Err(StoreError::InvalidState(_))));

    let saved = unsaved.persist().await?;
    assert_eq!(saved.path()?, format!("books/{}", saved.id().unwrap_or_default()));
    assert_eq!(saved.tags.path()?, format!("{}/tags", saved.path()?));

    Ok(())
}

#[tokio::test]
async fn subcollections_nest_under_their_owner() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    let math = book("Math", "12345").persist().await?;
    let mut tag = Tag {
        name: "science".to_string(),
        ..Default::default()
    };
    math.tags.add(&mut tag).await?;

    let tag_path = tag.path()?;
    assert_eq!(
        tag_path,
        format!("{}/tags/{}", math.path()?, tag.id().unwrap_or_default())
    );
    assert!(matches!(math.tags.add(&mut tag).await, Err(StoreError::InvalidState(_))));

    let mut note = Note {
        body: "algebra".to_string(),
        ..Default::default()
    };
    tag.notes.add(&mut note).await?;
    assert_eq!(
        note.path()?,
        format!("{tag_path}/notes/{}", note.id().unwrap_or_default())
    );

    assert!(Tag::exists(&tag_path).await?);
    assert!(!Tag::exists(&format!("{}/tags/missing", math.path()?)).await?);

    let found = Tag::find(&tag_path).await?;
    assert_eq!(found.name, "science");
    assert_eq!(found.path()?, tag_path);
    assert_eq!(found.meta().parent(), math.path().ok().as_deref());
    assert_eq!(found.notes.fetch().await?, vec![note.clone()]);

    let reloaded = Book::find(math.id().unwrap_or_default()).await?;
    let fetched = reloaded.tags.fetch().await?;
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].path()?, tag_path);

    assert_eq!(Tag::count().await?, 0);
    assert_eq!(math.subcollection::<Tag>()?.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn first_and_all_read_the_top_level_collection() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    assert_eq!(Book::first().await?, None);

    three_books().await?;

    assert!(Book::first().await?.is_some());
    assert_eq!(Book::all().fetch().await?.len(), 3);
    assert_eq!(Book::all().limit(2).fetch().await?.len(), 2);
    assert_eq!(Book::count().await?, 3);

    let streamed: Vec<Book> = Book::all().stream().try_collect().await?;
    assert_eq!(streamed.len(), 3);

    Ok(())
}

#[tokio::test]
async fn ordering_follows_direction() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());
    three_books().await?;

    let descending = Book::order("title", "DESCENDING")?.fetch().await?;
    assert_eq!(titles(&descending), vec!["Math", "History", "English"]);

    let ascending = Book::order("title", "ASCENDING")?.fetch().await?;
    assert_eq!(titles(&ascending), vec!["English", "History", "Math"]);

    let defaulted = Book::all().order_asc("title").fetch().await?;
    assert_eq!(titles(&defaulted), vec!["English", "History", "Math"]);

    assert!(matches!(
        Book::order("title", "sideways"),
        Err(StoreError::InvalidArgument(_))
    ));

    Ok(())
}

#[tokio::test]
async fn chained_queries_leave_the_base_untouched() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());
    three_books().await?;

    let base = Book::all();
    let filtered = base
        .filter("title", FieldOp::Ne, "Math")
        .order_by("title", OrderDirection::Descending);

    assert_eq!(titles(&filtered.fetch().await?), vec!["History", "English"]);
    assert_eq!(base.fetch().await?.len(), 3);

    let contains = Book::filter("authors", FieldOp::ArrayContains, "Mary")
        .fetch()
        .await?;
    assert_eq!(contains.len(), 3);

    let within = Book::filter("title", FieldOp::In, vec!["Math", "Poetry"])
        .fetch()
        .await?;
    assert_eq!(titles(&within), vec!["Math"]);

    Ok(())
}

#[tokio::test]
async fn updates_overwrite_the_document() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    let mut math = book("Math", "12345").persist().await?;
    math.update(|b| b.title = "Algebra".to_string()).await?;

    let found = Book::find(math.id().unwrap_or_default()).await?;
    assert_eq!(found.title, "Algebra");
    assert_eq!(Book::count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn deleted_entities_are_gone() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    let math = book("Math", "12345").persist().await?;
    let id = math.id().unwrap_or_default().to_string();

    assert!(math.delete().await?);
    assert!(!math.delete().await?);
    assert!(matches!(
        Book::find(&id).await,
        Err(StoreError::DocumentNotFound(..))
    ));

    Ok(())
}

#[tokio::test]
async fn json_shape_honors_options() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    let math = book("Math", "12345").persist().await?;
    let mut tag = Tag {
        name: "science".to_string(),
        ..Default::default()
    };
    math.tags.add(&mut tag).await?;
    let id = math.id().unwrap_or_default().to_string();
    let tag_id = tag.id().unwrap_or_default().to_string();

    assert_eq!(
        math.as_json(&JsonOptions::new()).await?,
        json!({
            "id": id,
            "title": "Math",
            "user_id": "12345",
            "authors": ["John", "Mary"],
        })
    );

    assert_eq!(
        math.as_json(&JsonOptions::new().recursive(true)).await?,
        json!({
            "id": id,
            "title": "Math",
            "user_id": "12345",
            "authors": ["John", "Mary"],
            "tags": [{ "id": tag_id, "name": "science", "notes": [] }],
        })
    );

    assert_eq!(
        math.as_json(&JsonOptions::new().excepts(["id", "authors"])).await?,
        json!({ "title": "Math", "user_id": "12345" })
    );

    assert_eq!(
        math.as_json(&JsonOptions::new().excepts(["authors", "user_id"]).include(["tags"]))
            .await?,
        json!({
            "id": id,
            "title": "Math",
            "tags": [{ "id": tag_id, "name": "science" }],
        })
    );

    assert!(matches!(
        math.as_json(&JsonOptions::new().include(["nonexistent"])).await,
        Err(StoreError::AttributeNotFound(model, name)) if model == "Book" && name == "nonexistent"
    ));

    Ok(())
}

#[tokio::test]
async fn relationships_are_symmetric() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());
    let registry = library_registry();

    let user = User {
        name: "Ada".to_string(),
        ..Default::default()
    }
    .persist()
    .await?;
    let user_id = user.id().unwrap_or_default().to_string();

    let math = book("Math", &user_id).persist().await?;
    let history = book("History", &user_id).persist().await?;
    book("English", "someone-else").persist().await?;

    let books = registry
        .related_many::<Book>(&user, "books")
        .await?
        .order_asc("title")
        .fetch()
        .await?;
    assert_eq!(titles(&books), vec!["History", "Math"]);

    for owned in [&math, &history] {
        assert_eq!(registry.related_one::<User>(owned, "user").await?, Some(user.clone()));
        assert_eq!(owned.belongs_to::<User>("user_id").await?, Some(user.clone()));
    }

    assert_eq!(user.has_many::<Book>("user_id")?.count().await?, 2);
    assert!(user.has_one::<Book>("user_id").await?.is_some());

    assert!(matches!(
        registry.related_one::<User>(&user, "books").await,
        Err(StoreError::TypeMismatch { .. })
    ));
    assert!(matches!(
        User::default().has_many::<Book>("user_id"),
        Err(StoreError::InvalidState(_))
    ));

    Ok(())
}

#[tokio::test]
async fn json_includes_relationships_and_computed_values() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());
    let mut registry = library_registry();
    registry.computed::<Book, _>("shout", |b| Ok(json!(b.title.to_uppercase())));

    let user = User {
        name: "Ada".to_string(),
        ..Default::default()
    }
    .persist()
    .await?;
    let user_id = user.id().unwrap_or_default().to_string();
    let math = book("Math", &user_id).persist().await?;

    let rendered = math
        .as_json(
            &JsonOptions::new()
                .excepts(["authors"])
                .include(["user", "shout"])
                .registry(&registry),
        )
        .await?;

    assert_eq!(
        rendered,
        json!({
            "id": math.id(),
            "title": "Math",
            "user_id": user_id,
            "user": { "id": user_id, "name": "Ada" },
            "shout": "MATH",
        })
    );

    let rendered = user
        .as_json(&JsonOptions::new().include(["books"]).registry(&registry))
        .await?;
    assert_eq!(rendered["books"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn pending_relations_resolve_by_name() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    let mut registry = Registry::new();
    registry
        .declare::<Book>(RelationKind::BelongsTo, "User", "user_id", Some("owner"))
        .declare::<Book>(RelationKind::HasOne, "Publisher", "book_id", None);
    assert_eq!(registry.pending().len(), 2);

    registry.register::<User>();
    let unresolved = registry.resolve();

    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].target, "Publisher");
    assert!(registry.pending().is_empty());

    let user = User {
        name: "Ada".to_string(),
        ..Default::default()
    }
    .persist()
    .await?;
    let math = book("Math", user.id().unwrap_or_default()).persist().await?;

    assert_eq!(registry.related_one::<User>(&math, "owner").await?, Some(user));

    Ok(())
}

#[tokio::test]
async fn document_refs_are_stored_as_paths() -> StoreResult<()> {
    let _guard = Connection::override_with(InMemoryStore::new());

    let math = book("Math", "12345").persist().await?;
    let mut shelf = ShelfRecord {
        book: Some(DocumentRef::to(&math)?),
        placed_at: Some(Timestamp::from_millis(0)),
        ..Default::default()
    };
    shelf.save().await?;

    let found = ShelfRecord::find(shelf.id().unwrap_or_default()).await?;
    let reference = found.book.clone().unwrap_or_else(|| DocumentRef::new(""));
    assert_eq!(reference.path(), math.path()?);
    let dereferenced = reference.get::<Book>().await?;
    assert_eq!(dereferenced.title, "Math");
    assert_eq!(dereferenced.path()?, math.path()?);

    assert_eq!(
        found.as_json(&JsonOptions::new().excepts(["id"])).await?,
        json!({
            "book": math.path()?,
            "placed_at": "1970-01-01T00:00:00+00:00",
        })
    );

    Ok(())
}
