use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use lib::storage_layer::{
    page::{PAGE_SIZE, Page},
    utils::save,
};
use lib::table_layer::{
    node::{LeafCell, LeafNode, Node},
    row::{self, Row},
};
use tempfile::TempDir;

fn run_script(path: &Path, args: &[&str], lines: &[String]) -> String {
    let mut input = lines.join("\n");
    input.push('\n');

    let output = cargo_bin_cmd!("leafdb")
        .args(args)
        .arg(path)
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    String::from_utf8(output).expect("utf-8 output")
}

fn lines(script: &[&str]) -> Vec<String> {
    script.iter().map(|line| line.to_string()).collect()
}

fn output_lines(output: &str) -> Vec<&str> {
    output.split("db > ").filter(|s| !s.is_empty()).collect()
}

#[test]
fn insert_and_select() {
    let dir = TempDir::new().unwrap();
    let output = run_script(
        &dir.path().join("test.db"),
        &[],
        &lines(&["insert 1 user1 person1@example.com", "select", ".exit"]),
    );

    assert_eq!(
        output,
        "db > Executed.\ndb > (1, user1, person1@example.com)\nExecuted.\ndb > "
    );
}

#[test]
fn end_of_input_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");

    let output = run_script(&path, &[], &lines(&["insert 1 a b"]));
    assert_eq!(output, "db > Executed.\ndb > ");

    //rows written before EOF are still on disk
    let output = run_script(&path, &[], &lines(&["select"]));
    assert_eq!(output, "db > (1, a, b)\nExecuted.\ndb > ");
}

#[test]
fn duplicate_key() {
    let dir = TempDir::new().unwrap();
    let output = run_script(
        &dir.path().join("test.db"),
        &[],
        &lines(&["insert 1 a b", "insert 1 c d", "select", ".exit"]),
    );

    assert_eq!(
        output_lines(&output),
        vec!["Executed.\n", "Error: Duplicate key.\n", "(1, a, b)\nExecuted.\n"]
    );
}

#[test]
fn table_full() {
    let dir = TempDir::new().unwrap();
    let mut script: Vec<String> = (1..=14)
        .map(|id| format!("insert {id} user{id} person{id}@example.com"))
        .collect();
    script.push(".exit".to_owned());

    let output = run_script(&dir.path().join("test.db"), &["--max-pages", "1"], &script);
    let results = output_lines(&output);

    assert_eq!(results.len(), 14);
    assert!(results[..13].iter().all(|r| *r == "Executed.\n"));
    assert_eq!(results[13], "Error: Table full.\n");
}

#[test]
fn max_pages_from_environment() {
    let dir = TempDir::new().unwrap();
    let mut input: String = (1..=14).map(|id| format!("insert {id} a b\n")).collect();
    input.push_str(".exit\n");

    let output = cargo_bin_cmd!("leafdb")
        .env("LEAFDB_MAX_PAGES", "1")
        .arg(dir.path().join("test.db"))
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output = String::from_utf8(output).unwrap();
    assert_eq!(output_lines(&output).last(), Some(&"Error: Table full.\n"));
}

#[test]
fn maximum_length_strings() {
    let dir = TempDir::new().unwrap();
    let username = "a".repeat(32);
    let email = "a".repeat(255);
    let script = vec![
        format!("insert 1 {username} {email}"),
        "select".to_owned(),
        ".exit".to_owned(),
    ];

    let output = run_script(&dir.path().join("test.db"), &[], &script);
    assert_eq!(
        output_lines(&output),
        vec![
            "Executed.\n".to_owned(),
            format!("(1, {username}, {email})\nExecuted.\n"),
        ]
    );
}

#[test]
fn strings_too_long() {
    let dir = TempDir::new().unwrap();
    let username = "a".repeat(33);
    let email = "a".repeat(256);
    let script = vec![
        format!("insert 1 {username} {email}"),
        "select".to_owned(),
        ".exit".to_owned(),
    ];

    let output = run_script(&dir.path().join("test.db"), &[], &script);
    assert_eq!(
        output_lines(&output),
        vec!["String is too long.\n", "Executed.\n"]
    );
}

#[test]
fn negative_id() {
    let dir = TempDir::new().unwrap();
    let output = run_script(
        &dir.path().join("test.db"),
        &[],
        &lines(&["insert -1 cstack foo@bar.com", "select", ".exit"]),
    );

    assert_eq!(
        output_lines(&output),
        vec!["ID must be positive.\n", "Executed.\n"]
    );
}

#[test]
fn syntax_error() {
    let dir = TempDir::new().unwrap();
    let output = run_script(
        &dir.path().join("test.db"),
        &[],
        &lines(&["insert 1 only_two", ".exit"]),
    );

    assert_eq!(
        output_lines(&output),
        vec!["Syntax error. Could not parse statement.\n"]
    );
}

#[test]
fn persistence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");

    let output = run_script(&path, &[], &lines(&["insert 1 user1 person1@example.com", ".exit"]));
    assert_eq!(output, "db > Executed.\ndb > ");

    let output = run_script(&path, &[], &lines(&["select", ".exit"]));
    assert_eq!(output, "db > (1, user1, person1@example.com)\nExecuted.\ndb > ");
}

#[test]
fn persistence_after_splits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");

    let mut script: Vec<String> = (1..=30).rev().map(|id| format!("insert {id} u{id} e{id}")).collect();
    script.push(".exit".to_owned());
    run_script(&path, &[], &script);

    let output = run_script(&path, &[], &lines(&["select", ".exit"]));
    let mut expected = String::from("db > ");
    for id in 1..=30 {
        expected.push_str(&format!("({id}, u{id}, e{id})\n"));
    }
    expected.push_str("Executed.\ndb > ");
    assert_eq!(output, expected);
}

#[test]
fn print_one_leaf_tree() {
    let dir = TempDir::new().unwrap();
    let output = run_script(
        &dir.path().join("test.db"),
        &[],
        &lines(&["insert 3 user3 person3@example.com", "insert 1 user1 person1@example.com", "insert 2 user2 person2@example.com", ".btree", ".exit"]),
    );

    assert_eq!(
        output,
        "db > Executed.\ndb > Executed.\ndb > Executed.\n\
         db > Tree:\n- leaf (size 3)\n  - 1\n  - 2\n  - 3\ndb > "
    );
}

#[test]
fn print_split_tree() {
    let dir = TempDir::new().unwrap();
    let mut script: Vec<String> = (1..=14)
        .map(|id| format!("insert {id} user{id} person{id}@example.com"))
        .collect();
    script.push(".btree".to_owned());
    script.push(".exit".to_owned());

    let output = run_script(&dir.path().join("test.db"), &[], &script);
    let tree = output_lines(&output)[14];

    let mut expected = String::from("Tree:\n- internal (size 1)\n  - leaf (size 7)\n");
    for id in 1..=7 {
        expected.push_str(&format!("    - {id}\n"));
    }
    expected.push_str("  - key 7\n  - leaf (size 7)\n");
    for id in 8..=14 {
        expected.push_str(&format!("    - {id}\n"));
    }
    assert_eq!(tree, expected);
}

#[test]
fn print_constants() {
    let dir = TempDir::new().unwrap();
    let output = run_script(&dir.path().join("test.db"), &[], &lines(&[".constants", ".exit"]));

    assert_eq!(
        output,
        "db > Constants:\n\
         ROW_SIZE: 291\n\
         COMMON_NODE_HEADER_SIZE: 9\n\
         LEAF_NODE_HEADER_SIZE: 21\n\
         LEAF_NODE_CELL_SIZE: 295\n\
         LEAF_NODE_SPACE_FOR_CELLS: 4075\n\
         LEAF_NODE_MAX_CELLS: 13\n\
         INTERNAL_NODE_MAX_CELLS: 509\n\
         TABLE_MAX_PAGES: 100\n\
         db > "
    );
}

#[test]
fn unrecognized_input() {
    let dir = TempDir::new().unwrap();
    let output = run_script(
        &dir.path().join("test.db"),
        &[],
        &lines(&[".foo", "update 1 a b", ".exit"]),
    );

    assert_eq!(
        output_lines(&output),
        vec![
            "Unrecognized command '.foo'\n",
            "Unrecognized keyword at start of 'update 1 a b'.\n",
        ]
    );
}

#[test]
fn invalid_config_fails_to_start() {
    let dir = TempDir::new().unwrap();

    cargo_bin_cmd!("leafdb")
        .args(["--leaf-max-cells", "1"])
        .arg(dir.path().join("test.db"))
        .write_stdin(".exit\n")
        .assert()
        .failure();
}

#[test]
fn invalid_utf8_line_does_not_end_session() {
    let dir = TempDir::new().unwrap();
    let input = b"insert 1 a b\n\xff\xfe\ninsert 2 c d\nselect\n".to_vec();

    let output = cargo_bin_cmd!("leafdb")
        .arg(dir.path().join("test.db"))
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output = String::from_utf8(output).unwrap();
    assert_eq!(
        output_lines(&output),
        vec![
            "Executed.\n",
            "Unrecognized keyword at start of '\u{fffd}\u{fffd}'.\n",
            "Executed.\n",
            "(1, a, b)\n(2, c, d)\nExecuted.\n",
        ]
    );
}

#[test]
fn storage_error_keeps_session_alive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");

    //a root leaf whose right sibling lies past the page limit
    let leaf = Node::Leaf(LeafNode {
        is_root: true,
        parent: 0,
        next_leaf: 500,
        cells: vec![LeafCell {
            key: 1,
            value: row::encode(&Row::new(1, "a", "b")).unwrap(),
        }],
    });
    let mut page = Page::zeroed(0);
    save(&leaf, &mut page).unwrap();
    assert_eq!(page.data.len(), PAGE_SIZE);
    std::fs::write(&path, &page.data).unwrap();

    let output = run_script(
        &path,
        &[],
        &lines(&["select", "insert 2 c d", ".constants", ".exit"]),
    );
    let results = output_lines(&output);

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0],
        "(1, a, b)\n\
         Error: Underlying error: Page 500 is out of bounds, the table holds at most 100 pages\n"
    );
    assert_eq!(results[1], "Executed.\n");
    assert!(results[2].starts_with("Constants:\nROW_SIZE: 291\n"));
}
