use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

const USER: &str = "7d1f4b6e-3c2a-4f0e-9a51-2b8c6d0e4f13";

/// A store file inside a scratch directory that also stands in for the
/// user's config directory.
struct Workspace {
    dir: TempDir,
    store: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let store = dir.path().join("taskboard.json");
        Self { dir, store }
    }

    fn home(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskboard").unwrap();
        for var in [
            "TASKBOARD_STORE",
            "TASKBOARD_BACKEND",
            "TASKBOARD_CONFIG",
            "TASKBOARD_USER",
            "TASKBOARD_LOG",
            "TASKBOARD_DEBUG_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.home())
            .env("XDG_CONFIG_HOME", self.home())
            .args(["--store", self.store.to_str().unwrap(), "--backend", "json"]);
        cmd
    }

    /// Run as the default user and return the parsed success envelope.
    fn run(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(["--user", USER])
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&String::from_utf8_lossy(&output));
        assert!(json["success"].as_bool().unwrap());
        json
    }

    /// Run as the default user, expect exit code 1, return the error envelope.
    fn fail(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(["--user", USER])
            .args(args)
            .assert()
            .failure()
            .code(1)
            .get_output()
            .stderr
            .clone();
        let json = parse_json_output(&String::from_utf8_lossy(&output));
        assert!(!json["success"].as_bool().unwrap());
        json
    }

    fn create_board(&self, title: &str) -> String {
        let json = self.run(&[
            "board",
            "create",
            "--title",
            title,
            "--description",
            "Work in progress",
        ]);
        extract_id(&json)
    }

    fn create_column(&self, board_id: &str, title: &str) -> String {
        let json = self.run(&["column", "create", "--board-id", board_id, "--title", title]);
        extract_id(&json)
    }

    fn create_card(&self, board_id: &str, column_id: &str, title: &str) -> String {
        let json = self.run(&[
            "card",
            "create",
            "--board-id",
            board_id,
            "--column-id",
            column_id,
            "--title",
            title,
        ]);
        extract_id(&json)
    }

    fn details(&self, board_id: &str) -> Value {
        self.run(&["board", "get", "--id", board_id])["data"].clone()
    }
}

fn parse_json_output(output: &str) -> Value {
    serde_json::from_str(output).expect("Failed to parse JSON output")
}

fn extract_id(json: &Value) -> String {
    json["data"]["_id"].as_str().unwrap().to_string()
}

fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

fn column_in<'a>(details: &'a Value, column_id: &str) -> &'a Value {
    details["columns"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["_id"] == column_id)
        .unwrap()
}

mod board_tests {
    use super::*;

    #[test]
    fn test_board_create() {
        let ws = Workspace::new();
        let json = ws.run(&[
            "board",
            "create",
            "--title",
            "Product Roadmap",
            "--description",
            "Quarterly goals",
            "--type",
            "private",
        ]);

        let board = &json["data"];
        assert_eq!(board["title"], "Product Roadmap");
        assert_eq!(board["slug"], "product-roadmap");
        assert_eq!(board["type"], "private");
        assert_eq!(board["ownerIds"], serde_json::json!([USER]));
        assert_eq!(board["columnOrderIds"], serde_json::json!([]));
        assert!(ws.store.exists());
    }

    #[test]
    fn test_board_create_validation_error() {
        let ws = Workspace::new();
        let json = ws.fail(&["board", "create", "--title", "ab", "--type", "secret"]);

        assert_eq!(json["kind"], "validation");
        let fields: Vec<&str> = json["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"description"));
        assert!(fields.contains(&"type"));
    }

    #[test]
    fn test_board_create_requires_user() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["board", "create", "--title", "Roadmap", "--description", "Goals"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("\"kind\":\"validation\""))
            .stderr(predicate::str::contains("user"));
    }

    #[test]
    fn test_board_list_sorted_with_total() {
        let ws = Workspace::new();
        for title in ["banana", "Apple", "cherry"] {
            ws.create_board(title);
        }

        let json = ws.run(&["board", "list", "--page", "1", "--items-per-page", "2"]);
        let page = &json["data"];
        assert_eq!(page["total"], 3);
        let titles: Vec<&str> = page["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Apple", "banana"]);

        let json = ws.run(&["board", "list", "--page", "2", "--items-per-page", "2"]);
        assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["items"][0]["title"], "cherry");
    }

    #[test]
    fn test_board_list_only_participant_boards() {
        let ws = Workspace::new();
        ws.create_board("Mine");

        let stranger = Uuid::new_v4().to_string();
        let output = ws
            .cmd()
            .args(["--user", &stranger, "board", "list"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&String::from_utf8_lossy(&output));
        assert_eq!(json["data"]["total"], 0);
        assert!(json["data"]["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_board_get_missing() {
        let ws = Workspace::new();
        let missing = Uuid::new_v4().to_string();
        let json = ws.fail(&["board", "get", "--id", &missing]);
        assert_eq!(json["kind"], "not_found");
    }

    #[test]
    fn test_board_update_json_ignores_immutable_keys() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let forged = Uuid::new_v4().to_string();
        let body = format!(r#"{{"_id":"{forged}","title":"Renamed Board","slug":"hijack"}}"#);

        let json = ws.run(&["board", "update", "--id", &board_id, "--json", &body]);
        assert_eq!(json["data"]["_id"], board_id.as_str());
        assert_eq!(json["data"]["title"], "Renamed Board");
        assert_eq!(json["data"]["slug"], "renamed-board");
    }

    #[test]
    fn test_board_update_column_order() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let done = ws.create_column(&board_id, "Done");

        let order = format!("{done},{todo}");
        let json = ws.run(&["board", "update", "--id", &board_id, "--column-order", &order]);
        assert_eq!(ids(&json["data"]["columnOrderIds"]), vec![done, todo]);
    }

    #[test]
    fn test_board_add_member_and_delete() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Shared");
        let member = Uuid::new_v4().to_string();

        let json = ws.run(&["board", "add-member", "--id", &board_id, "--member", &member]);
        assert_eq!(ids(&json["data"]["memberIds"]), vec![member.clone()]);

        let json = ws.run(&["board", "delete", "--id", &board_id]);
        assert_eq!(json["data"]["deleted"], board_id.as_str());

        let json = ws.fail(&["board", "get", "--id", &board_id]);
        assert_eq!(json["kind"], "not_found");
    }
}

mod column_tests {
    use super::*;

    #[test]
    fn test_columns_appended_in_creation_order() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let doing = ws.create_column(&board_id, "Doing");

        let details = ws.details(&board_id);
        assert_eq!(ids(&details["columnOrderIds"]), vec![todo, doing]);
    }

    #[test]
    fn test_column_create_unknown_board() {
        let ws = Workspace::new();
        let missing = Uuid::new_v4().to_string();
        let json = ws.fail(&["column", "create", "--board-id", &missing, "--title", "Todo"]);
        assert_eq!(json["kind"], "not_found");
    }

    #[test]
    fn test_column_create_malformed_board_id() {
        let ws = Workspace::new();
        let json = ws.fail(&["column", "create", "--board-id", "not-an-id", "--title", "Todo"]);
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["fields"][0]["field"], "boardId");
    }

    #[test]
    fn test_column_delete_cascades_to_cards() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let done = ws.create_column(&board_id, "Done");
        ws.create_card(&board_id, &todo, "Write tests");
        ws.create_card(&board_id, &todo, "Fix bugs");
        let kept = ws.create_card(&board_id, &done, "Ship it");

        let json = ws.run(&["column", "delete", "--id", &todo]);
        assert_eq!(json["data"]["destroyedCards"], 2);
        assert_eq!(ids(&json["data"]["board"]["columnOrderIds"]), vec![done.clone()]);

        let details = ws.details(&board_id);
        assert_eq!(details["columns"].as_array().unwrap().len(), 1);
        let cards = details["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["_id"], kept.as_str());
    }

    #[test]
    fn test_column_update_rejects_duplicate_order() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let card = ws.create_card(&board_id, &todo, "Write tests");

        let order = format!("{card},{card}");
        let json = ws.fail(&["column", "update", "--id", &todo, "--card-order", &order]);
        assert_eq!(json["kind"], "conflict");
    }
}

mod card_tests {
    use super::*;

    #[test]
    fn test_card_create_appends_to_column() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let first = ws.create_card(&board_id, &todo, "First card");
        let second = ws.create_card(&board_id, &todo, "Second card");

        let details = ws.details(&board_id);
        assert_eq!(ids(&column_in(&details, &todo)["cardOrderIds"]), vec![first, second]);
    }

    #[test]
    fn test_card_create_column_on_other_board() {
        let ws = Workspace::new();
        let board_a = ws.create_board("Board A");
        let board_b = ws.create_board("Board B");
        let column_b = ws.create_column(&board_b, "Todo");

        let json = ws.fail(&[
            "card",
            "create",
            "--board-id",
            &board_a,
            "--column-id",
            &column_b,
            "--title",
            "Misplaced",
        ]);
        assert_eq!(json["kind"], "validation");
    }

    #[test]
    fn test_card_update_and_clear_description() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let card = ws.create_card(&board_id, &todo, "Write tests");

        let json = ws.run(&["card", "update", "--id", &card, "--description", "Cover moves"]);
        assert_eq!(json["data"]["description"], "Cover moves");

        let json = ws.run(&["card", "update", "--id", &card, "--clear-description"]);
        assert!(json["data"]["description"].is_null());
    }

    #[test]
    fn test_card_delete_removes_from_order() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let gone = ws.create_card(&board_id, &todo, "Obsolete");
        let kept = ws.create_card(&board_id, &todo, "Still here");

        ws.run(&["card", "delete", "--id", &gone]);

        let details = ws.details(&board_id);
        assert_eq!(ids(&column_in(&details, &todo)["cardOrderIds"]), vec![kept]);
    }

    #[test]
    fn test_card_move_between_columns() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let done = ws.create_column(&board_id, "Done");
        let a = ws.create_card(&board_id, &todo, "Card A");
        let b = ws.create_card(&board_id, &todo, "Card B");
        let c = ws.create_card(&board_id, &done, "Card C");

        let next_order = format!("{c},{a}");
        let json = ws.run(&[
            "card",
            "move",
            "--card-id",
            &a,
            "--prev-column-id",
            &todo,
            "--prev-order",
            &b,
            "--next-column-id",
            &done,
            "--next-order",
            &next_order,
        ]);
        let outcome = &json["data"];
        assert_eq!(outcome["card"]["columnId"], done.as_str());
        assert_eq!(ids(&outcome["prevColumn"]["cardOrderIds"]), vec![b.clone()]);
        assert_eq!(
            ids(&outcome["nextColumn"]["cardOrderIds"]),
            vec![c.clone(), a.clone()]
        );

        let details = ws.details(&board_id);
        assert_eq!(ids(&column_in(&details, &todo)["cardOrderIds"]), vec![b]);
        assert_eq!(ids(&column_in(&details, &done)["cardOrderIds"]), vec![c, a]);
    }

    #[test]
    fn test_card_move_emptying_source_column() {
        let ws = Workspace::new();
        let board_id = ws.create_board("Roadmap");
        let todo = ws.create_column(&board_id, "Todo");
        let done = ws.create_column(&board_id, "Done");
        let a = ws.create_card(&board_id, &todo, "Card A");

        let json = ws.run(&[
            "card",
            "move",
            "--card-id",
            &a,
            "--prev-column-id",
            &todo,
            "--prev-order",
            "",
            "--next-column-id",
            &done,
            "--next-order",
            &a,
        ]);
        assert!(json["data"]["prevColumn"]["cardOrderIds"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_card_move_missing_fields() {
        let ws = Workspace::new();
        let json = ws.fail(&["card", "move"]);
        assert_eq!(json["kind"], "validation");
        let fields: Vec<&str> = json["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"currentCardId"));
        assert!(fields.contains(&"nextColumnId"));
    }
}

mod cli_tests {
    use super::*;

    #[test]
    fn test_completions() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("taskboard"));
    }

    #[test]
    fn test_memory_backend_starts_empty() {
        let ws = Workspace::new();
        ws.create_board("Persisted");

        let output = ws
            .cmd()
            .args(["--backend", "memory", "--user", USER, "board", "list"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&String::from_utf8_lossy(&output));
        assert_eq!(json["data"]["total"], 0);
    }

    #[test]
    fn test_explicit_config_file() {
        let ws = Workspace::new();
        let config = ws.home().join("taskboard.toml");
        std::fs::write(&config, "[listing]\nitems_per_page = 1\n").unwrap();
        ws.create_board("First");
        ws.create_board("Second");

        let output = ws
            .cmd()
            .args(["--config", config.to_str().unwrap(), "--user", USER])
            .args(["board", "list"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&String::from_utf8_lossy(&output));
        assert_eq!(json["data"]["total"], 2);
        assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["itemsPerPage"], 1);
    }
}
