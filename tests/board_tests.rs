use tasktiles::board::{parse_tags, Board, Dialog};
use tasktiles::models::{ColorToken, IconToken, Priority, User, ViewType};

fn signed_in() -> Board {
    let mut board = Board::new();
    board.set_user(Some(User { id: "u1".into(), email: Some("dev@example.com".into()) }));
    board
}

#[test]
fn starts_on_work_type_with_sample_data() {
    let board = Board::new();
    assert_eq!(board.view(), ViewType::WorkType);
    let titles: Vec<&str> = board.categories().iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Work Projects", "Learning"]);
    assert_eq!(board.category("work").unwrap().count(), 5);
    assert!(board.user().is_none());
}

#[test]
fn switching_grouping_keeps_other_lists() {
    let mut board = signed_in();
    board.add_category("Ops", ColorToken::Teal, IconToken::Clock).unwrap();
    assert_eq!(board.categories().len(), 3);

    board.switch_grouping(ViewType::Timeline);
    assert!(board.categories().is_empty());
    board.switch_grouping(ViewType::Technology);
    assert_eq!(board.categories()[0].title, "Frontend");

    board.switch_grouping(ViewType::WorkType);
    assert_eq!(board.categories().len(), 3);
    assert_eq!(board.categories_of(ViewType::Priority).len(), 0);
}

#[test]
fn add_task_appends_with_fresh_id() {
    let mut board = signed_in();
    board.open_add_task("learning");
    let existing: Vec<String> = board.category("learning").unwrap().tasks.iter().map(|t| t.id.clone()).collect();

    let task = board
        .add_task("learning", "Read the axum docs", Priority::Low, vec!["rust".into()])
        .unwrap();
    assert_eq!(task.title, "Read the axum docs");
    assert!(task.due_date.is_none());
    assert!(!existing.contains(&task.id));

    let learning = board.category("learning").unwrap();
    assert_eq!(learning.count(), 4);
    assert_eq!(learning.tasks.last().unwrap().priority, Priority::Low);
    assert_eq!(board.dialog(), &Dialog::None);
}

#[test]
fn add_task_to_unknown_category_changes_nothing() {
    let mut board = signed_in();
    board.open_add_task("missing");
    assert!(board.add_task("missing", "Lost", Priority::High, Vec::new()).is_none());
    assert_eq!(board.dialog(), &Dialog::None);
    assert_eq!(board.category("work").unwrap().count(), 5);
}

#[test]
fn add_task_only_targets_active_grouping() {
    let mut board = signed_in();
    board.switch_grouping(ViewType::Technology);
    assert!(board.add_task("work", "Wrong view", Priority::Medium, Vec::new()).is_none());
    assert_eq!(board.categories_of(ViewType::WorkType)[0].count(), 5);
}

#[test]
fn blank_category_title_is_refused() {
    let mut board = signed_in();
    board.open_create_category();
    assert!(board.add_category("", ColorToken::Pink, IconToken::Palette).is_none());
    assert!(board.add_category("   ", ColorToken::Pink, IconToken::Palette).is_none());
    assert_eq!(board.dialog(), &Dialog::CreatingCategory);
    assert_eq!(board.categories().len(), 2);
}

#[test]
fn new_category_is_empty_and_closes_dialog() {
    let mut board = signed_in();
    board.open_create_category();
    board.draft.title = "  Research ".into();
    board.draft.color = ColorToken::Indigo;
    assert!(board.submit_draft());

    let created = board.categories().last().unwrap();
    assert_eq!(created.title, "Research");
    assert_eq!(created.color, ColorToken::Indigo);
    assert_eq!(created.icon, IconToken::Briefcase);
    assert_eq!(created.count(), 0);
    assert_eq!(board.dialog(), &Dialog::None);
    assert_eq!(board.draft.title, "");
}

#[test]
fn only_one_tile_is_expanded() {
    let mut board = signed_in();
    board.expand_tile("work");
    assert_eq!(board.expanded(), Some("work"));
    board.expand_tile("learning");
    assert_eq!(board.expanded(), Some("learning"));
    board.expand_tile("learning");
    assert_eq!(board.expanded(), None);
}

#[test]
fn tag_field_parsing() {
    assert_eq!(parse_tags("urgent, management"), vec!["urgent", "management"]);
    assert_eq!(parse_tags(" ,react,, react "), vec!["react"]);
    assert!(parse_tags("").is_empty());
}

#[test]
fn view_names_parse() {
    assert_eq!("work-type".parse::<ViewType>().unwrap(), ViewType::WorkType);
    assert_eq!("tech".parse::<ViewType>().unwrap(), ViewType::Technology);
    assert!("weekly".parse::<ViewType>().is_err());
}
