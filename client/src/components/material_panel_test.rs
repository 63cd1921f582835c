use super::*;

fn material() -> Material {
    Material {
        id: 3,
        title: "Week 1 Notes".to_owned(),
        description: Some("Intro".to_owned()),
        course_id: Some("7".to_owned()),
        file_name: None,
        file_type: None,
    }
}

#[test]
fn download_name_prefers_server_file_name() {
    let named = Material { file_name: Some("notes.pdf".to_owned()), ..material() };
    assert_eq!(download_name(&named), "notes.pdf");
}

#[test]
fn download_name_falls_back_to_title() {
    assert_eq!(download_name(&material()), "Week_1_Notes.bin");
}

#[test]
fn update_for_sends_only_changed_fields() {
    let update = update_for(&material(), "Week 1 Notes", "Intro and setup");
    assert_eq!(update.title, None);
    assert_eq!(update.description.as_deref(), Some("Intro and setup"));
}

#[test]
fn update_for_ignores_blank_title() {
    let update = update_for(&material(), "  ", "Intro");
    assert!(update.to_query().is_empty());
}
