//! Deferred searches, pagination and soft-delete filtering on SQLite.

use std::sync::Arc;

use activerecord::bundles::SoftDelete;
use activerecord::prelude::*;
use activerecord_sqlite::SqliteConnection;

struct Post;

impl Model for Post {
    const TABLE_NAME: &'static str = "posts";

    fn define(t: &mut TableBuilder) -> Result<()> {
        t.column(ColumnDef::new("title").sql_type("VARCHAR").length(255).not_null())?;
        t.column(ColumnDef::new("views").sql_type("INT").default(0).not_null())?;
        t.bundle(&SoftDelete)?;
        Ok(())
    }
}

fn posts(titles: &[(&str, i64)]) -> Record<Post> {
    let conn: Arc<dyn Connection> =
        Arc::new(SqliteConnection::open_memory().expect("open sqlite"));
    let template = Record::<Post>::new(conn).expect("schema");
    template.create_table().expect("create table");
    for (title, views) in titles {
        let mut post = template.new_instance();
        post.set("title", *title).unwrap();
        post.set("views", *views).unwrap();
        post.create().unwrap();
    }
    template
}

#[test]
fn pages_follow_limit_and_offset() {
    let template = posts(&[("a", 1), ("b", 2), ("c", 3)]);

    let mut first = template.search().limit(1);
    assert_eq!(first.count_max_results().unwrap(), 3);
    assert_eq!(first.number_of_pages().unwrap(), 3);
    assert_eq!(first.current_page(), 1);

    let mut second = template.search().limit(1).offset(1);
    assert_eq!(second.current_page(), 2);
    let row = second.fetch_as_array(&["title"]).unwrap();
    assert_eq!(row.get_str("title"), Some("b"));

    let mut unlimited = template.search();
    assert_eq!(unlimited.number_of_pages().unwrap(), 1);
    assert_eq!(unlimited.current_page(), 1);
}

#[test]
fn filters_and_ordering_apply() {
    let template = posts(&[("a", 10), ("b", 30), ("c", 20)]);

    let titles: Vec<String> = template
        .search()
        .filter(Expr::not_equal("title", "a"))
        .order_by("views", OrderDirection::Desc)
        .fetch_all_as_array(&["title"])
        .unwrap()
        .iter()
        .filter_map(|row| row.get_str("title").map(String::from))
        .collect();
    assert_eq!(titles, vec!["b", "c"]);
}

#[test]
fn fetch_walks_rows_then_reports_not_found() {
    let template = posts(&[("a", 1), ("b", 2)]);
    let mut query = template.search().order_by("title", OrderDirection::Asc);

    assert_eq!(query.fetch().unwrap().get("title").unwrap(), Value::from("a"));
    assert_eq!(query.fetch().unwrap().get("title").unwrap(), Value::from("b"));
    assert!(query.fetch().unwrap_err().is_not_found());

    let records: Vec<_> = template
        .search()
        .into_iter()
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(Record::exists));
}

#[test]
fn soft_deleted_rows_are_hidden_from_reads_and_searches() {
    let template = posts(&[("keep", 1), ("hide", 2)]);
    let mut hidden = template
        .search()
        .filter(Expr::equal("title", "hide"))
        .fetch()
        .unwrap();
    let id = hidden.id().unwrap();

    hidden.soft_delete().unwrap();
    assert!(hidden.is_soft_deleted().unwrap());

    assert!(template.new_instance().read(id).unwrap_err().is_not_found());
    assert_eq!(template.search().count_max_results().unwrap(), 1);

    // An explicit filter on the flag replaces the hook's default.
    let mut deleted = template.search().filter(Expr::equal("soft_delete", 1));
    assert_eq!(deleted.count_max_results().unwrap(), 1);

    hidden.soft_restore().unwrap();
    assert_eq!(template.search().count_max_results().unwrap(), 2);
}

#[test]
fn api_search_clamps_limit_and_ignores_unreadable_order() {
    let template = posts(&[("a", 3), ("b", 1), ("c", 2)]);

    let params = SearchParams {
        order_by: Some("views".to_string()),
        order_direction: Some(OrderDirection::Asc),
        limit: Some(50),
        offset: Some(1),
    };
    let page = template
        .api_search(&params, &["id", "title", "views"], None, 2)
        .unwrap();
    assert_eq!(page.limit, 2);
    assert_eq!(page.offset, 1);
    assert_eq!(page.pages, 2);
    assert_eq!(page.current_page, 1);
    let titles: Vec<_> = page.data.iter().filter_map(|r| r.get_str("title")).collect();
    assert_eq!(titles, vec!["c", "a"]);

    let params = SearchParams {
        order_by: Some("views".to_string()),
        ..SearchParams::default()
    };
    let page = template
        .api_search(&params, &["title"], Some(Expr::not_equal("title", "b")), 100)
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pages, 1);
    assert!(page.data.iter().all(|r| r.len() == 1));
}
