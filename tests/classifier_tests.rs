use review_monitor::{Category, ModuleSet, Submission, SubmissionClassifier, TaskType, base_module};

fn classifier() -> SubmissionClassifier {
    SubmissionClassifier::new(
        ModuleSet::new(["diplom-da", "Diplom-DS"]),
        ModuleSet::new(["fonecmid"]),
    )
}

#[test]
fn base_module_strips_numeric_variant_only() {
    assert_eq!(base_module("fcpp-12"), "fcpp");
    assert_eq!(base_module("fcpp-1-2"), "fcpp-1");
    assert_eq!(base_module("fcpp-ab"), "fcpp-ab");
    assert_eq!(base_module("fcpp"), "fcpp");
    assert_eq!(base_module(""), "");
}

#[test]
fn diploma_tag_in_diploma_module_is_diploma() {
    let record = Submission::new("diplom-da-3", TaskType::Diploma);
    assert_eq!(classifier().classify(&record), Some(Category::Diploma));
}

#[test]
fn diploma_module_lookup_ignores_case() {
    let record = Submission::new("DIPLOM-DS-1", TaskType::from_tag("Диплом"));
    assert_eq!(classifier().classify(&record), Some(Category::Diploma));
}

#[test]
fn diploma_tag_elsewhere_is_coursework() {
    let record = Submission::new("fcpp-12", TaskType::Diploma);
    assert_eq!(classifier().classify(&record), Some(Category::Coursework));
}

#[test]
fn homework_tag_wins_regardless_of_module() {
    let record = Submission::new("diplom-da-3", TaskType::from_tag("ДЗ"));
    assert_eq!(classifier().classify(&record), Some(Category::Homework));
}

#[test]
fn unknown_tag_is_unclassified() {
    let record = Submission::new("fcpp-12", TaskType::from_tag("quiz"));
    assert_eq!(classifier().classify(&record), None);
}

#[test]
fn self_assignment_uses_base_module() {
    let c = classifier();
    assert!(c.is_self_assignment(&Submission::new("fonecmid-4", TaskType::Diploma)));
    assert!(c.is_self_assignment(&Submission::new("FoneCmid", TaskType::Homework)));
    assert!(!c.is_self_assignment(&Submission::new("fonecmid-prod", TaskType::Diploma)));
}

#[test]
fn empty_sets_make_every_diploma_tag_coursework() {
    let c = SubmissionClassifier::default();
    assert!(c.diploma_modules().is_empty());
    let record = Submission::new("diplom-da-3", TaskType::Diploma);
    assert_eq!(c.classify(&record), Some(Category::Coursework));
}
