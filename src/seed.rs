use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Category, ColorToken, IconToken, Priority, Task, ViewType};

fn task(id: &str, title: &str, priority: Priority, due: Option<(i32, u32, u32)>, tags: &[&str]) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        priority,
        due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// The sample board every session starts from.
///
/// Timeline and priority groupings start empty.
pub fn initial_categories() -> BTreeMap<ViewType, Vec<Category>> {
    let mut board = BTreeMap::new();

    board.insert(
        ViewType::WorkType,
        vec![
            Category {
                id: "work".into(),
                title: "Work Projects".into(),
                color: ColorToken::Blue,
                icon: IconToken::Briefcase,
                tasks: vec![
                    task("1", "Complete quarterly report", Priority::High, Some((2024, 1, 15)), &["urgent", "management"]),
                    task("2", "Review team performance", Priority::Medium, Some((2024, 1, 20)), &["hr", "review"]),
                    task("3", "Plan Q2 roadmap", Priority::Medium, None, &["planning", "strategy"]),
                    task("4", "Update project documentation", Priority::Low, None, &["docs", "maintenance"]),
                    task("5", "Prepare client presentation", Priority::High, None, &["client", "presentation"]),
                ],
            },
            Category {
                id: "learning".into(),
                title: "Learning".into(),
                color: ColorToken::Green,
                icon: IconToken::Code,
                tasks: vec![
                    task("6", "Complete React course", Priority::Medium, None, &["react", "frontend"]),
                    task("7", "Read \"Clean Code\"", Priority::Low, None, &["books", "best-practices"]),
                    task("8", "Practice TypeScript", Priority::Medium, None, &["typescript", "coding"]),
                ],
            },
        ],
    );

    board.insert(
        ViewType::Technology,
        vec![Category {
            id: "frontend".into(),
            title: "Frontend".into(),
            color: ColorToken::Cyan,
            icon: IconToken::Code,
            tasks: vec![
                task("1", "Complete React course", Priority::Medium, None, &["react", "frontend"]),
                task("2", "Build component library", Priority::Low, None, &["components", "reusable"]),
                task("3", "Update portfolio site", Priority::Medium, None, &["portfolio", "showcase"]),
                task("4", "Learn Next.js 15", Priority::High, None, &["nextjs", "framework"]),
            ],
        }],
    );

    board.insert(ViewType::Timeline, Vec::new());
    board.insert(ViewType::Priority, Vec::new());
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_grouping_is_present() {
        let board = initial_categories();
        for view in ViewType::ALL {
            assert!(board.contains_key(&view), "missing {:?}", view);
        }
        assert!(board[&ViewType::Timeline].is_empty());
    }

    #[test]
    fn seed_counts_follow_task_lists() {
        let board = initial_categories();
        let work = &board[&ViewType::WorkType][0];
        assert_eq!(work.count(), 5);
        assert_eq!(work.tasks[0].due_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(board[&ViewType::Technology][0].count(), 4);
    }
}
