use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::{SchemaManager, prelude::*};

use tenancy::{
    BootstrapUser, OwnedTable, OwnerState, RetrofitError, backfill_owner, constraint_installed,
    constraint_name, ensure_bootstrap_user, ensure_owner_column, ensure_users_table,
    install_ownership_constraint, owner_state, retrofit_tenancy,
};

const HASH_A: &str = "pbkdf2:sha256:600000$f3a1c09b2d4e8618$9c2e41a7b35d8f06c1e2\
                      a94d7b13f8205e6c4a2d910b837f4e5d6c7a8b9f0123";
const HASH_B: &str = "pbkdf2:sha256:600000$0b8d2c4f6a1e3957$1f4e8a2c6b0d3975e8a1\
                      c5f92b6d4e07318a5c9f2e6b0d4a7c1e8f3b5d92647";

const DEIMOS: BootstrapUser<'static> = BootstrapUser {
    username: "Deimos",
    password_hash: HASH_A,
};

#[derive(Iden)]
enum Gadgets {
    Table,
    Id,
    Label,
}

fn gadgets_table() -> TableCreateStatement {
    Table::create()
        .table(Gadgets::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Gadgets::Id)
                .integer()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Gadgets::Label).string().not_null())
        .to_owned()
}

fn gadgets_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx-gadgets-label")
            .table(Gadgets::Table)
            .col(Gadgets::Label)
            .to_owned(),
    ]
}

const GADGETS: OwnedTable =
    OwnedTable::new("gadgets", "id", &["id", "label"], gadgets_table, gadgets_indexes);

#[derive(Iden)]
enum Widgets {
    Table,
    Id,
    Note,
}

fn widgets_table() -> TableCreateStatement {
    Table::create()
        .table(Widgets::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Widgets::Id)
                .integer()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Widgets::Note).string())
        .to_owned()
}

fn widgets_indexes() -> Vec<IndexCreateStatement> {
    Vec::new()
}

const WIDGETS: OwnedTable =
    OwnedTable::new("widgets", "id", &["id", "note"], widgets_table, widgets_indexes);

// Not owned itself; a child of gadgets, the way sub_debts hangs off debts.
#[derive(Iden)]
enum Sprockets {
    Table,
    Id,
    GadgetId,
}

fn sprockets_table() -> TableCreateStatement {
    Table::create()
        .table(Sprockets::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Sprockets::Id)
                .integer()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Sprockets::GadgetId).integer().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk-sprockets-gadget_id")
                .from(Sprockets::Table, Sprockets::GadgetId)
                .to(Gadgets::Table, Gadgets::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

async fn db_with_tables() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let manager = SchemaManager::new(&db);
    manager.create_table(gadgets_table()).await.unwrap();
    for index in gadgets_indexes() {
        manager.create_index(index).await.unwrap();
    }
    manager.create_table(widgets_table()).await.unwrap();
    db
}

async fn seed_gadget(db: &DatabaseConnection, id: i32, label: &str, owner: Option<i32>) {
    let backend = db.get_database_backend();
    match owner {
        Some(owner) => db
            .execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO gadgets (id, label, user_id) VALUES (?, ?, ?)",
                vec![id.into(), label.into(), owner.into()],
            ))
            .await
            .unwrap(),
        None => db
            .execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO gadgets (id, label) VALUES (?, ?)",
                vec![id.into(), label.into()],
            ))
            .await
            .unwrap(),
    };
}

async fn gadget_owners(db: &DatabaseConnection) -> Vec<(i32, Option<i32>)> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT id, user_id FROM gadgets ORDER BY id;".to_string(),
        ))
        .await
        .unwrap();
    rows.iter()
        .map(|row| {
            (
                row.try_get("", "id").unwrap(),
                row.try_get("", "user_id").unwrap(),
            )
        })
        .collect()
}

async fn user_id_column_count(db: &DatabaseConnection, table: &str) -> usize {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            format!("PRAGMA table_info({table});"),
        ))
        .await
        .unwrap();
    rows.iter()
        .filter(|row| row.try_get::<String>("", "name").unwrap() == "user_id")
        .count()
}

async fn table_ddl(db: &DatabaseConnection, table: &str) -> String {
    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?",
            vec![table.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "sql").unwrap()
}

async fn user_count(db: &DatabaseConnection) -> usize {
    db.query_all(Statement::from_string(
        db.get_database_backend(),
        "SELECT id FROM users;".to_string(),
    ))
    .await
    .unwrap()
    .len()
}

#[tokio::test]
async fn owner_column_add_is_idempotent() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);

    assert!(ensure_owner_column(&manager, &GADGETS).await.unwrap());
    assert!(!ensure_owner_column(&manager, &GADGETS).await.unwrap());
    assert_eq!(user_id_column_count(&db, "gadgets").await, 1);
}

#[tokio::test]
async fn backfill_touches_only_null_rows() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    ensure_owner_column(&manager, &GADGETS).await.unwrap();

    seed_gadget(&db, 1, "one", None).await;
    seed_gadget(&db, 2, "two", Some(7)).await;

    assert_eq!(backfill_owner(&manager, &GADGETS, 1).await.unwrap(), 1);
    assert_eq!(
        gadget_owners(&db).await,
        vec![(1, Some(1)), (2, Some(7))]
    );

    // Second run finds nothing left to assign.
    assert_eq!(backfill_owner(&manager, &GADGETS, 1).await.unwrap(), 0);
}

#[tokio::test]
async fn constraint_install_is_idempotent() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    ensure_users_table(&manager).await.unwrap();
    let owner = ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();
    ensure_owner_column(&manager, &GADGETS).await.unwrap();
    seed_gadget(&db, 1, "one", None).await;
    backfill_owner(&manager, &GADGETS, owner).await.unwrap();

    install_ownership_constraint(&manager, &GADGETS).await.unwrap();
    install_ownership_constraint(&manager, &GADGETS).await.unwrap();

    let name = constraint_name("gadgets");
    let ddl = table_ddl(&db, "gadgets").await;
    assert_eq!(ddl.matches(name.as_str()).count(), 1);
    assert!(ddl.contains("ON DELETE CASCADE"));
    assert!(constraint_installed(&manager, &GADGETS).await.unwrap());

    // The rebuild kept the data and the indexes.
    assert_eq!(gadget_owners(&db).await, vec![(1, Some(owner))]);
    let indexes = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA index_list(gadgets);".to_string(),
        ))
        .await
        .unwrap();
    assert!(
        indexes
            .iter()
            .any(|row| row.try_get::<String>("", "name").unwrap() == "idx-gadgets-label")
    );
}

#[tokio::test]
async fn constraint_allows_null_owners_and_rejects_unknown_ones() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    ensure_users_table(&manager).await.unwrap();
    let deimos = ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();
    ensure_owner_column(&manager, &GADGETS).await.unwrap();
    seed_gadget(&db, 1, "one", Some(deimos)).await;
    install_ownership_constraint(&manager, &GADGETS).await.unwrap();

    // user_id stays nullable: an unassigned row is still a valid row.
    seed_gadget(&db, 2, "unclaimed", None).await;

    let err = db
        .execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO gadgets (id, label, user_id) VALUES (?, ?, ?)",
            vec![3.into(), "stray".into(), 999.into()],
        ))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"), "{err}");

    assert_eq!(
        gadget_owners(&db).await,
        vec![(1, Some(deimos)), (2, None)]
    );
}

#[tokio::test]
async fn deleting_owner_removes_owned_rows() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    ensure_users_table(&manager).await.unwrap();
    let deimos = ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();
    let phobos = ensure_bootstrap_user(
        &manager,
        &BootstrapUser {
            username: "Phobos",
            password_hash: HASH_B,
        },
    )
    .await
    .unwrap();

    ensure_owner_column(&manager, &GADGETS).await.unwrap();
    seed_gadget(&db, 1, "one", None).await;
    seed_gadget(&db, 2, "two", Some(phobos)).await;
    backfill_owner(&manager, &GADGETS, deimos).await.unwrap();
    install_ownership_constraint(&manager, &GADGETS).await.unwrap();

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "DELETE FROM users WHERE id = ?",
        vec![deimos.into()],
    ))
    .await
    .unwrap();

    assert_eq!(gadget_owners(&db).await, vec![(2, Some(phobos))]);
    assert_eq!(user_count(&db).await, 1);
}

#[tokio::test]
async fn orphaned_owner_blocks_constraint() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    ensure_users_table(&manager).await.unwrap();
    ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();
    ensure_owner_column(&manager, &GADGETS).await.unwrap();
    seed_gadget(&db, 1, "one", Some(999)).await;

    let err = install_ownership_constraint(&manager, &GADGETS)
        .await
        .unwrap_err();
    match err {
        RetrofitError::ReferentialIntegrity { table, orphans } => {
            assert_eq!(table, "gadgets");
            assert_eq!(orphans, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Nothing was touched: data intact, no constraint, no rebuild leftovers.
    assert_eq!(gadget_owners(&db).await, vec![(1, Some(999))]);
    assert!(!constraint_installed(&manager, &GADGETS).await.unwrap());
    assert!(!manager.has_table("gadgets_old").await.unwrap());
}

#[tokio::test]
async fn rebuild_keeps_child_tables_pointing_at_parent() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    manager.create_table(sprockets_table()).await.unwrap();
    ensure_users_table(&manager).await.unwrap();
    let deimos = ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();
    ensure_owner_column(&manager, &GADGETS).await.unwrap();
    seed_gadget(&db, 1, "one", None).await;
    backfill_owner(&manager, &GADGETS, deimos).await.unwrap();
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "INSERT INTO sprockets (id, gadget_id) VALUES (1, 1);".to_string(),
    ))
    .await
    .unwrap();

    install_ownership_constraint(&manager, &GADGETS).await.unwrap();

    // The rename must not drag the child's REFERENCES clause along to the
    // holding name.
    let ddl = table_ddl(&db, "sprockets").await;
    assert!(ddl.contains("\"gadgets\""), "{ddl}");
    assert!(!ddl.contains("gadgets_old"), "{ddl}");

    // Foreign key resolution on the child still works against the rebuilt
    // parent, and deletes chain users -> gadgets -> sprockets.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "INSERT INTO sprockets (id, gadget_id) VALUES (2, 1);".to_string(),
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "DELETE FROM users WHERE id = ?",
        vec![deimos.into()],
    ))
    .await
    .unwrap();
    assert!(gadget_owners(&db).await.is_empty());
    let sprockets = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT id FROM sprockets;".to_string(),
        ))
        .await
        .unwrap();
    assert!(sprockets.is_empty());
}

#[tokio::test]
async fn bootstrap_user_first_write_wins() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let manager = SchemaManager::new(&db);
    ensure_users_table(&manager).await.unwrap();

    let first = ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();
    let second = ensure_bootstrap_user(
        &manager,
        &BootstrapUser {
            username: "Deimos",
            password_hash: HASH_B,
        },
    )
    .await
    .unwrap();

    assert_eq!(first, second);
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT username, password_hash FROM users;".to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].try_get::<String>("", "password_hash").unwrap(),
        HASH_A
    );
}

#[tokio::test]
async fn state_tracks_retrofit_progress() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    ensure_users_table(&manager).await.unwrap();
    let owner = ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();
    seed_gadget(&db, 1, "one", None).await;

    assert_eq!(
        owner_state(&manager, &GADGETS).await.unwrap(),
        OwnerState::NoColumn
    );
    ensure_owner_column(&manager, &GADGETS).await.unwrap();
    assert_eq!(
        owner_state(&manager, &GADGETS).await.unwrap(),
        OwnerState::ColumnAdded
    );
    backfill_owner(&manager, &GADGETS, owner).await.unwrap();
    assert_eq!(
        owner_state(&manager, &GADGETS).await.unwrap(),
        OwnerState::Backfilled
    );
    install_ownership_constraint(&manager, &GADGETS).await.unwrap();
    assert_eq!(
        owner_state(&manager, &GADGETS).await.unwrap(),
        OwnerState::Constrained
    );
}

#[tokio::test]
async fn full_run_reaches_constrained_everywhere() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    seed_gadget(&db, 1, "one", None).await;

    let tables = [GADGETS, WIDGETS];
    let report = retrofit_tenancy(&manager, &tables, &DEIMOS).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.tables.len(), 2);
    assert_eq!(report.tables[0].rows_backfilled, 1);
    assert_eq!(report.tables[1].rows_backfilled, 0);
    for table in &tables {
        assert_eq!(
            owner_state(&manager, table).await.unwrap(),
            OwnerState::Constrained
        );
    }
    assert_eq!(user_count(&db).await, 1);

    let replay = retrofit_tenancy(&manager, &tables, &DEIMOS).await.unwrap();
    assert!(replay.is_complete());
    assert!(
        replay
            .tables
            .iter()
            .all(|outcome| !outcome.column_added && outcome.rows_backfilled == 0)
    );
    assert_eq!(replay.default_user_id, report.default_user_id);
    assert_eq!(user_count(&db).await, 1);
}

#[tokio::test]
async fn orchestration_resumes_partial_state() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    ensure_users_table(&manager).await.unwrap();
    let owner = ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();

    // gadgets is already halfway through; widgets has not been started.
    seed_gadget(&db, 1, "one", None).await;
    ensure_owner_column(&manager, &GADGETS).await.unwrap();
    backfill_owner(&manager, &GADGETS, owner).await.unwrap();
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "INSERT INTO widgets (id) VALUES (1);".to_string(),
    ))
    .await
    .unwrap();

    let report = retrofit_tenancy(&manager, &[GADGETS, WIDGETS], &DEIMOS)
        .await
        .unwrap();

    assert!(report.is_complete());
    let gadgets = &report.tables[0];
    assert!(!gadgets.column_added);
    assert_eq!(gadgets.rows_backfilled, 0);
    let widgets = &report.tables[1];
    assert!(widgets.column_added);
    assert_eq!(widgets.rows_backfilled, 1);
}

#[tokio::test]
async fn orchestration_continues_past_failed_table() {
    let db = db_with_tables().await;
    let manager = SchemaManager::new(&db);
    ensure_users_table(&manager).await.unwrap();
    ensure_bootstrap_user(&manager, &DEIMOS).await.unwrap();

    // gadgets carries an orphaned owner; widgets is clean.
    ensure_owner_column(&manager, &GADGETS).await.unwrap();
    seed_gadget(&db, 1, "one", Some(999)).await;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "INSERT INTO widgets (id) VALUES (1);".to_string(),
    ))
    .await
    .unwrap();

    let report = retrofit_tenancy(&manager, &[GADGETS, WIDGETS], &DEIMOS)
        .await
        .unwrap();

    assert!(!report.is_complete());
    let failed: Vec<&str> = report.failures().map(|outcome| outcome.table).collect();
    assert_eq!(failed, vec!["gadgets"]);

    let gadgets = &report.tables[0];
    assert_eq!(gadgets.state, OwnerState::Backfilled);
    assert!(matches!(
        gadgets.error,
        Some(RetrofitError::ReferentialIntegrity { .. })
    ));

    let widgets = &report.tables[1];
    assert_eq!(widgets.state, OwnerState::Constrained);
    assert_eq!(
        owner_state(&manager, &WIDGETS).await.unwrap(),
        OwnerState::Constrained
    );
}
