mod common;

use common::{error_code, open_workspace, request, request_ok, spawn_sidecar};
use serde_json::json;

fn row_ids(view: &serde_json::Value) -> Vec<String> {
    view["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .filter_map(|r| r["id"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn student_create_edit_search_delete() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_workspace(&mut stdin, &mut reader, "college-students-crud");

    let missing = request(
        &mut stdin,
        &mut reader,
        "1",
        "students.save",
        json!({ "firstName": "Anu", "lastName": "", "email": "anu@college.com", "course": "CS101" }),
    );
    assert_eq!(error_code(&missing), "validation_failed");
    assert_eq!(missing["error"]["message"], "Please fill in all fields");

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.save",
        json!({
            "firstName": "Anu",
            "lastName": "Menon",
            "email": "anu@college.com",
            "phone": "9000000000",
            "course": "ENG301"
        }),
    );
    let new_id = created["student"]["id"].as_str().expect("new id").to_string();
    assert!(new_id.starts_with("STU"));
    let enrolled = created["student"]["enrollmentDate"].clone();
    assert_eq!(row_ids(&created["view"]).len(), 6);
    assert!(row_ids(&created["view"]).contains(&new_id));

    let edited = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.save",
        json!({
            "studentId": new_id,
            "firstName": "Anu",
            "lastName": "Menon-Iyer",
            "email": "anu@college.com",
            "phone": "9000000000",
            "course": "CS101"
        }),
    );
    assert_eq!(edited["student"]["id"], new_id.as_str());
    assert_eq!(edited["student"]["enrollmentDate"], enrolled);
    assert_eq!(row_ids(&edited["view"]).len(), 6);

    let draft = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.get",
        json!({ "studentId": new_id }),
    );
    assert_eq!(draft["draft"]["lastName"], "Menon-Iyer");
    assert_eq!(draft["draft"]["course"], "CS101");

    let blank = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.get",
        json!({ "studentId": "STU999" }),
    );
    assert_eq!(blank["draft"]["firstName"], "");

    let search = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.list",
        json!({ "search": "  MENON " }),
    );
    assert_eq!(row_ids(&search["view"]), vec![new_id.clone()]);

    let unconfirmed = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.delete",
        json!({ "studentId": new_id }),
    );
    assert_eq!(unconfirmed["deleted"], false);
    assert_eq!(row_ids(&unconfirmed["view"]).len(), 6);

    let gone = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.delete",
        json!({ "studentId": new_id, "confirm": true }),
    );
    assert_eq!(gone["deleted"], true);
    assert!(!row_ids(&gone["view"]).contains(&new_id));

    let again = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "students.delete",
        json!({ "studentId": new_id, "confirm": true }),
    );
    assert_eq!(again["deleted"], false);
    assert_eq!(row_ids(&again["view"]).len(), 5);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn teacher_save_and_delete_round_through_the_table() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_workspace(&mut stdin, &mut reader, "college-teachers-crud");

    let listed = request_ok(&mut stdin, &mut reader, "1", "teachers.list", json!({}));
    assert_eq!(
        listed["view"]["columns"],
        json!(["ID", "Name", "Email", "Subject", "Department", "Qualification"])
    );
    assert_eq!(row_ids(&listed["view"]).len(), 4);

    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.save",
        json!({
            "teacherId": "TEACH002",
            "firstName": "Prof.",
            "lastName": "Gupta",
            "email": "gupta@college.com",
            "subject": "Quantum Physics",
            "department": "ENGG",
            "qualification": "PhD"
        }),
    );
    let row = saved["view"]["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .find(|r| r["id"] == "TEACH002")
        .cloned()
        .expect("edited row");
    assert_eq!(row["cells"][3], "Quantum Physics");
    assert_eq!(row["cells"][5], "PhD");

    for id in ["TEACH001", "TEACH002", "TEACH003", "TEACH004"] {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            id,
            "teachers.delete",
            json!({ "teacherId": id, "confirm": true }),
        );
    }
    let empty = request_ok(&mut stdin, &mut reader, "3", "teachers.list", json!({}));
    assert_eq!(
        empty["view"]["emptyMessage"],
        "No teachers found. Add a new teacher to get started."
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
