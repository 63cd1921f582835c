use super::*;

fn course() -> Course {
    Course {
        id: 7,
        course_code: "CS101".to_owned(),
        course_name: "Programming".to_owned(),
        description: None,
        department: "CSE".to_owned(),
        semester: Some(3),
        batch_year: Some("2024".to_owned()),
    }
}

#[test]
fn draft_from_course_copies_editable_fields() {
    let draft = draft_from_course(&course());
    assert_eq!(draft.course_code, "CS101");
    assert_eq!(draft.semester, 3);
    assert_eq!(draft.batch_year, "2024");
    assert_eq!(draft.description, "");
    assert!(draft.validate().is_ok());
}

#[test]
fn draft_from_course_fills_missing_semester_and_batch() {
    let draft = draft_from_course(&Course { semester: None, batch_year: None, ..course() });
    assert_eq!(draft.semester, 1);
    assert!(draft.validate().is_err());
}
