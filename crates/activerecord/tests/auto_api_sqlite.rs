//! Validated create/update/read from untrusted input on SQLite.

use std::sync::Arc;

use activerecord::bundles::{Password, Timestamps};
use activerecord::prelude::*;
use activerecord_sqlite::SqliteConnection;

struct Team;

impl Model for Team {
    const TABLE_NAME: &'static str = "teams";

    fn define(t: &mut TableBuilder) -> Result<()> {
        t.column(ColumnDef::new("name").sql_type("VARCHAR").length(64).not_null())?;
        Ok(())
    }
}

struct Player;

impl Model for Player {
    const TABLE_NAME: &'static str = "players";

    fn define(t: &mut TableBuilder) -> Result<()> {
        t.column(
            ColumnDef::new("name")
                .sql_type("VARCHAR")
                .length(64)
                .not_null()
                .validate(validate::max_length(64)),
        )?;
        t.column(
            ColumnDef::new("nickname")
                .sql_type("VARCHAR")
                .length(64)
                .immutable(),
        )?;
        t.column(
            ColumnDef::new("rating")
                .sql_type("INT")
                .default(1000)
                .not_null()
                .validate(validate::int_range(0, 3000)),
        )?;
        t.column(ColumnDef::new("id_team").relation(belongs_to::<Team>()).not_null())?;
        t.bundle(&Timestamps)?;
        t.bundle(&Password)?;
        Ok(())
    }
}

struct Fixture {
    teams: Record<Team>,
    players: Record<Player>,
}

fn fixture() -> Fixture {
    let conn: Arc<dyn Connection> =
        Arc::new(SqliteConnection::open_memory().expect("open sqlite"));
    let teams = Record::<Team>::new(Arc::clone(&conn)).unwrap();
    let players = Record::<Player>::new(conn).unwrap();
    teams.create_table().unwrap();
    players.create_table().unwrap();
    Fixture { teams, players }
}

fn team(f: &Fixture, name: &str) -> i64 {
    let mut team = f.teams.new_instance();
    team.set("name", name).unwrap();
    team.create().unwrap();
    team.id().unwrap()
}

const WRITABLE: &[&str] = &["name", "nickname", "rating", "id_team", "password"];
const READABLE: &[&str] = &["id", "name", "nickname", "rating", "id_team"];

#[test]
fn empty_input_reports_missing_required_field() {
    let f = fixture();
    let mut team = f.teams.new_instance();
    let errors = team.api_create(&Row::new(), &["name"], &["name"]).unwrap().unwrap_err();
    assert_eq!(errors.len(), 1);
    let error = errors.get("name").unwrap();
    assert_eq!(error.kind, ValidationErrorKind::Missing);
    assert_eq!(error.message, "The required field \"name\" is missing");
    assert!(!team.exists());
}

#[test]
fn create_applies_setters_defaults_and_hooks() {
    let f = fixture();
    let id_team = team(&f, "red");

    let input = Row::new()
        .with("name", "Ann")
        .with("nickname", "ace")
        .with("id_team", id_team)
        .with("password", "hunter2hunter2");
    let mut player = f.players.new_instance();
    let created = player.api_create(&input, WRITABLE, READABLE).unwrap().unwrap();

    assert_eq!(created.columns().next(), Some("id"));
    assert_eq!(created.get_str("name"), Some("Ann"));
    assert_eq!(created.get("rating").and_then(Value::to_i64), Some(1000));
    assert!(!created.contains("password"));

    let mut loaded = f.players.new_instance();
    loaded.read(player.id().unwrap()).unwrap();
    assert!(loaded.is_password("hunter2hunter2").unwrap());
    assert_ne!(loaded.get("password").unwrap(), Value::from("hunter2hunter2"));
    assert!(loaded.created_at().unwrap().is_some());
    assert!(loaded.last_modified_at().unwrap().is_some());
}

#[test]
fn rejected_create_writes_nothing() {
    let f = fixture();
    let id_team = team(&f, "blue");

    let input = Row::new()
        .with("name", "Bo")
        .with("rating", 9000)
        .with("id_team", id_team + 100)
        .with("password", "short")
        .with("id", 7)
        .with("color", "green");
    let mut writable = WRITABLE.to_vec();
    writable.extend(["id", "color"]);

    let mut player = f.players.new_instance();
    let errors = player.api_create(&input, &writable, READABLE).unwrap().unwrap_err();

    assert_eq!(errors.kind_of("rating"), Some(ValidationErrorKind::Invalid));
    assert_eq!(errors.kind_of("password"), Some(ValidationErrorKind::Invalid));
    assert_eq!(errors.kind_of("id"), Some(ValidationErrorKind::Immutable));
    assert_eq!(errors.kind_of("color"), Some(ValidationErrorKind::UnknownField));
    assert_eq!(errors.kind_of("id_team"), Some(ValidationErrorKind::Invalid));
    assert_eq!(
        errors.get("id_team").unwrap().message,
        "Entity for this value doesn't exist"
    );

    assert!(!player.exists());
    assert_eq!(player.get("name").unwrap(), Value::Null);
    assert_eq!(f.players.search().count_max_results().unwrap(), 0);
}

#[test]
fn unlisted_keys_are_ignored() {
    let f = fixture();
    let id_team = team(&f, "green");
    let input = Row::new()
        .with("name", "Cy")
        .with("id_team", id_team)
        .with("password", "longenough")
        .with("rating", 2500);

    let mut player = f.players.new_instance();
    let created = player
        .api_create(&input, &["name", "id_team", "password"], READABLE)
        .unwrap()
        .unwrap();
    assert_eq!(created.get("rating").and_then(Value::to_i64), Some(1000));
}

#[test]
fn update_rejects_immutable_fields_atomically() {
    let f = fixture();
    let id_team = team(&f, "gold");
    let mut player = f.players.new_instance();
    player
        .api_create(
            &Row::new()
                .with("name", "Di")
                .with("nickname", "dee")
                .with("id_team", id_team)
                .with("password", "longenough"),
            WRITABLE,
            READABLE,
        )
        .unwrap()
        .unwrap();

    let errors = player
        .api_update(
            &Row::new().with("name", "Dee").with("nickname", "other"),
            WRITABLE,
            READABLE,
        )
        .unwrap()
        .unwrap_err();
    assert_eq!(errors.kind_of("nickname"), Some(ValidationErrorKind::Immutable));
    assert_eq!(player.get("name").unwrap(), Value::from("Di"));

    let updated = player
        .api_update(&Row::new().with("rating", 1200), WRITABLE, READABLE)
        .unwrap()
        .unwrap();
    assert_eq!(updated.get("rating").and_then(Value::to_i64), Some(1200));

    let mut loaded = f.players.new_instance();
    let row = loaded.api_read(player.id().unwrap(), READABLE).unwrap().unwrap();
    assert_eq!(row.get("rating").and_then(Value::to_i64), Some(1200));
    assert_eq!(row.get_str("nickname"), Some("dee"));
}

#[test]
fn update_without_row_is_an_error() {
    let f = fixture();
    let mut player = f.players.new_instance();
    let err = player
        .api_update(&Row::new().with("name", "x"), WRITABLE, READABLE)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[test]
fn read_of_missing_row_is_a_field_error() {
    let f = fixture();
    let errors = f
        .players
        .new_instance()
        .api_read(42, READABLE)
        .unwrap()
        .unwrap_err();
    assert_eq!(errors.kind_of("id"), Some(ValidationErrorKind::NotFound));
}
