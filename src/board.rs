//! Board state: which grouping is shown, which tile is open, which dialog is
//! up, and the in-memory categories themselves.
//!
//! Everything here is synchronous and local. Nothing survives a restart.

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use crate::models::{Category, ColorToken, IconToken, Priority, Task, User, ViewType};
use crate::seed::initial_categories;

/// The single dialog that can be open at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Dialog {
    #[default]
    None,
    CreatingCategory,
    /// Add-task form for the category with this id.
    AddingTask(String),
}

/// Fields of the "create category" dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryDraft {
    pub title: String,
    pub color: ColorToken,
    pub icon: IconToken,
}

pub struct Board {
    view: ViewType,
    expanded: Option<String>,
    hovered: Option<String>,
    categories: BTreeMap<ViewType, Vec<Category>>,
    dialog: Dialog,
    pub draft: CategoryDraft,
    user: Option<User>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board loaded with the sample categories, nobody signed in.
    pub fn new() -> Board {
        Board::with_categories(initial_categories())
    }

    pub fn with_categories(mut categories: BTreeMap<ViewType, Vec<Category>>) -> Board {
        for view in ViewType::ALL {
            categories.entry(view).or_default();
        }
        Board {
            view: ViewType::WorkType,
            expanded: None,
            hovered: None,
            categories,
            dialog: Dialog::None,
            draft: CategoryDraft::default(),
            user: None,
        }
    }

    pub fn view(&self) -> ViewType {
        self.view
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Categories of the active grouping.
    pub fn categories(&self) -> &[Category] {
        self.categories_of(self.view)
    }

    pub fn categories_of(&self, view: ViewType) -> &[Category] {
        self.categories.get(&view).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories().iter().find(|c| c.id == id)
    }

    /// Makes `view` the active grouping. Category lists are left untouched.
    pub fn switch_grouping(&mut self, view: ViewType) {
        debug!(from = ?self.view, to = ?view, "switching grouping");
        self.view = view;
    }

    /// Toggles a tile open. Opening one tile closes whichever was open.
    pub fn expand_tile(&mut self, category_id: &str) {
        if self.expanded.as_deref() == Some(category_id) {
            self.expanded = None;
        } else {
            self.expanded = Some(category_id.to_string());
        }
    }

    pub fn hover_tile(&mut self, category_id: Option<&str>) {
        self.hovered = category_id.map(str::to_string);
    }

    pub fn open_create_category(&mut self) {
        self.dialog = Dialog::CreatingCategory;
    }

    pub fn open_add_task(&mut self, category_id: &str) {
        self.dialog = Dialog::AddingTask(category_id.to_string());
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::None;
    }

    /// Appends an empty category to the active grouping.
    ///
    /// A blank title is refused: nothing changes and the dialog stays open.
    /// On success the dialog closes and the draft goes back to defaults.
    pub fn add_category(&mut self, title: &str, color: ColorToken, icon: IconToken) -> Option<&Category> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let category = Category {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            color,
            icon,
            tasks: Vec::new(),
        };
        debug!(id = %category.id, view = ?self.view, "category created");

        self.draft = CategoryDraft::default();
        self.dialog = Dialog::None;

        let list = self.categories.entry(self.view).or_default();
        list.push(category);
        list.last()
    }

    /// Submits the create-category dialog with the current draft.
    pub fn submit_draft(&mut self) -> bool {
        let CategoryDraft { title, color, icon } = self.draft.clone();
        self.add_category(&title, color, icon).is_some()
    }

    /// Appends a task to a category of the active grouping and closes the
    /// add-task dialog.
    ///
    /// The title is validated by the form; this layer takes it as given.
    /// Returns `None` if no such category is shown.
    pub fn add_task(&mut self, category_id: &str, title: &str, priority: Priority, tags: Vec<String>) -> Option<&Task> {
        self.dialog = Dialog::None;

        let category = self
            .categories
            .get_mut(&self.view)?
            .iter_mut()
            .find(|c| c.id == category_id)?;

        let mut id = Uuid::new_v4().to_string();
        while category.tasks.iter().any(|t| t.id == id) {
            id = Uuid::new_v4().to_string();
        }

        category.tasks.push(Task {
            id,
            title: title.to_string(),
            priority,
            due_date: None,
            tags,
        });
        debug!(category = %category_id, count = category.count(), "task added");
        category.tasks.last()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Forgets the local identity. Provider session teardown is the
    /// caller's job.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.dialog = Dialog::None;
        self.expanded = None;
    }
}

/// Splits a comma-separated tag field into trimmed, non-empty, distinct tags.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags_drops_blanks() {
        assert_eq!(parse_tags("urgent, , management,"), vec!["urgent", "management"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn parse_tags_keeps_first_of_duplicates() {
        assert_eq!(parse_tags("a, b, a"), vec!["a", "b"]);
    }

    #[test]
    fn sign_out_closes_everything() {
        let mut board = Board::new();
        board.set_user(Some(User { id: "u1".into(), email: Some("a@b.c".into()) }));
        board.expand_tile("work");
        board.open_add_task("work");

        board.sign_out();

        assert!(board.user().is_none());
        assert_eq!(board.dialog(), &Dialog::None);
        assert!(board.expanded().is_none());
    }
}
