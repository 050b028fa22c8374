use std::io::Write;

use litescope::engine::{Database, ObjectKind, Session};
use litescope::result::Value;
use litescope::tui::app::{App, Focus};

fn fixture_file() -> tempfile::NamedTempFile {
    let db = Database::empty().expect("Failed to create database");
    db.execute_script(
        "CREATE TABLE track (id INTEGER PRIMARY KEY, name TEXT, rating INTEGER);
         INSERT INTO track VALUES (1, 'Overture', 3);
         INSERT INTO track VALUES (2, 'Interlude', 1);
         INSERT INTO track VALUES (3, 'Finale', 2);
         CREATE TABLE genre (id INTEGER PRIMARY KEY, label TEXT);
         INSERT INTO genre VALUES (1, 'Rock'), (2, 'Jazz');
         CREATE VIEW track_names AS SELECT name FROM track;",
    )
    .expect("Failed to seed fixture");

    let image = db.to_bytes().expect("Failed to serialize fixture");
    let mut file = tempfile::Builder::new()
        .suffix(".sqlite")
        .tempfile()
        .expect("Failed to create fixture file");
    file.write_all(&image).expect("Failed to write fixture");
    file.flush().unwrap();
    file
}

fn loaded_app(file: &tempfile::NamedTempFile) -> App {
    let mut session = Session::new().expect("Failed to create session");
    session
        .load_from_path(file.path())
        .expect("Failed to load fixture");
    App::new(session)
}

#[test]
fn test_catalog_lists_tables_and_views_by_name() {
    let file = fixture_file();
    let app = loaded_app(&file);

    let catalog = app.session.catalog();
    let names: Vec<&str> = catalog.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["genre", "track", "track_names"]);
    assert_eq!(catalog[2].kind, ObjectKind::View);
}

#[test]
fn test_selecting_each_catalog_entry_issues_bare_select() {
    let file = fixture_file();
    let mut app = loaded_app(&file);

    for i in 0..app.session.catalog().len() {
        let name = app.session.catalog()[i].name.clone();
        app.select_catalog_index(i);
        assert_eq!(app.last_sql, format!("SELECT * FROM {};", name));
        assert!(app.error.is_none(), "query failed for {}", name);
    }
}

#[test]
fn test_filter_then_switch_table_resets_everything() {
    let file = fixture_file();
    let mut app = loaded_app(&file);

    app.select_table("track");
    app.set_term("name", "lude");
    assert_eq!(app.current_result().unwrap().row_count(), 1);

    app.select_table("genre");
    assert!(app.terms.is_empty());
    assert_eq!(app.last_sql, "SELECT * FROM genre;");
    assert_eq!(app.current_result().unwrap().row_count(), 2);
}

#[test]
fn test_filters_match_case_insensitive_substrings() {
    let file = fixture_file();
    let mut app = loaded_app(&file);

    app.select_table("genre");
    app.set_term("label", "ROCK");
    let set = app.current_result().unwrap();
    assert_eq!(set.row_count(), 1);
    assert_eq!(set.values[0][1], Value::Text("Rock".into()));
}

#[test]
fn test_like_wildcards_in_terms_are_literal() {
    let file = fixture_file();
    let mut app = loaded_app(&file);

    app.select_table("track");
    app.set_term("name", "%");
    assert!(app.error.is_none());
    assert_eq!(app.current_result().unwrap().row_count(), 0);
}

#[test]
fn test_sorting_selected_results_through_the_grid() {
    let file = fixture_file();
    let mut app = loaded_app(&file);

    app.select_table("track");
    let ratings: Vec<Value> = {
        let set = app.current_result().unwrap();
        set.values.iter().map(|row| row[2].clone()).collect()
    };
    assert_eq!(
        ratings,
        vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)]
    );

    let rating_column = 2;
    app.current_grid_mut().unwrap().toggle_sort(rating_column);
    let set = app.current_result().unwrap();
    let order = app.current_grid().unwrap().sorted_indices(&set.values);
    assert_eq!(order, vec![1, 2, 0]);

    app.current_grid_mut().unwrap().toggle_sort(rating_column);
    let set = app.current_result().unwrap();
    let order = app.current_grid().unwrap().sorted_indices(&set.values);
    assert_eq!(order, vec![0, 2, 1]);
}

#[test]
fn test_sort_state_does_not_survive_a_new_query() {
    let file = fixture_file();
    let mut app = loaded_app(&file);

    app.select_table("track");
    app.current_grid_mut().unwrap().toggle_sort(0);
    app.set_term("name", "e");
    assert_eq!(app.current_grid().unwrap().sort(), None);
}

#[test]
fn test_open_command_switches_databases() {
    let first = fixture_file();
    let mut app = loaded_app(&first);
    app.select_table("track");

    let db = Database::empty().unwrap();
    db.execute_script("CREATE TABLE other (x);").unwrap();
    let mut second = tempfile::Builder::new().suffix(".db").tempfile().unwrap();
    second.write_all(&db.to_bytes().unwrap()).unwrap();
    second.flush().unwrap();

    app.command_buffer = format!("open {}", second.path().display());
    app.execute_command();

    assert!(app.error.is_none());
    assert_eq!(app.session.catalog().len(), 1);
    assert_eq!(app.session.catalog()[0].name, "other");
    assert!(app.table.is_none());
    assert!(app.results.is_empty());
    assert_eq!(app.focus, Focus::Catalog);
}
