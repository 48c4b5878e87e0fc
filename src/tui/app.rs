use crate::board::{parse_tags, Board, Dialog};
use crate::models::{ColorToken, IconToken, Priority, ViewType};

/// Steps of the "Create Category" form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryStep {
    #[default]
    Title,
    Color,
    Icon,
}

/// Steps of the "Add Task" form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStep {
    #[default]
    Title,
    Priority,
    Tags,
}

/// Partial data for the multi-step "Add Task" form.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub step: TaskStep,
    pub title: String,
    pub priority_idx: usize,
}

impl TaskForm {
    pub fn priority(&self) -> Priority {
        Priority::ALL[self.priority_idx % Priority::ALL.len()]
    }
}

pub struct App {
    pub board: Board,
    /// Cursor over the tiles; the last position is the "Add Category" tile.
    pub selected: usize,
    pub input_buffer: String,
    pub category_step: CategoryStep,
    pub task_form: TaskForm,
    /// One-line message under the board.
    pub status: Option<String>,
}

fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if forward {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

impl App {
    pub fn new(board: Board) -> App {
        let mut app = App {
            board,
            selected: 0,
            input_buffer: String::new(),
            category_step: CategoryStep::default(),
            task_form: TaskForm::default(),
            status: None,
        };
        app.sync_hover();
        app
    }

    /// Number of cursor positions: every category plus the add tile.
    pub fn tile_count(&self) -> usize {
        self.board.categories().len() + 1
    }

    pub fn on_add_tile(&self) -> bool {
        self.selected >= self.board.categories().len()
    }

    /// Id of the category under the cursor.
    pub fn selected_category_id(&self) -> Option<String> {
        self.board.categories().get(self.selected).map(|c| c.id.clone())
    }

    fn sync_hover(&mut self) {
        let id = self.selected_category_id();
        self.board.hover_tile(id.as_deref());
    }

    /// Moves the cursor to the next tile.
    pub fn next(&mut self) {
        self.selected = cycle(self.selected, self.tile_count(), true);
        self.sync_hover();
    }

    /// Moves the cursor to the previous tile.
    pub fn previous(&mut self) {
        self.selected = cycle(self.selected, self.tile_count(), false);
        self.sync_hover();
    }

    pub fn select_view(&mut self, view: ViewType) {
        self.board.switch_grouping(view);
        self.selected = 0;
        self.sync_hover();
    }

    pub fn next_view(&mut self) {
        let i = cycle(self.board.view().index(), ViewType::ALL.len(), true);
        self.select_view(ViewType::ALL[i]);
    }

    pub fn previous_view(&mut self) {
        let i = cycle(self.board.view().index(), ViewType::ALL.len(), false);
        self.select_view(ViewType::ALL[i]);
    }

    /// Enter on a tile: expand or collapse it, or open the create dialog on
    /// the add tile.
    pub fn activate(&mut self) {
        match self.selected_category_id() {
            Some(id) => self.board.expand_tile(&id),
            None => self.start_create_category(),
        }
    }

    pub fn start_create_category(&mut self) {
        self.board.open_create_category();
        self.category_step = CategoryStep::Title;
        self.input_buffer = self.board.draft.title.clone();
    }

    /// Opens the add-task form for the expanded tile, or the one under the
    /// cursor. An expanded tile from another grouping does not count.
    pub fn start_add_task(&mut self) {
        let target = self
            .board
            .expanded()
            .filter(|id| self.board.category(id).is_some())
            .map(str::to_string)
            .or_else(|| self.selected_category_id());
        if let Some(id) = target {
            self.board.open_add_task(&id);
            self.task_form = TaskForm::default();
            self.input_buffer.clear();
        }
    }

    /// Whether the focused form field takes typed text.
    pub fn is_text_step(&self) -> bool {
        match self.board.dialog() {
            Dialog::None => false,
            Dialog::CreatingCategory => self.category_step == CategoryStep::Title,
            Dialog::AddingTask(_) => self.task_form.step != TaskStep::Priority,
        }
    }

    /// Left/Right on a choice field.
    pub fn cycle_choice(&mut self, forward: bool) {
        let dialog = self.board.dialog().clone();
        match dialog {
            Dialog::CreatingCategory => match self.category_step {
                CategoryStep::Color => {
                    let current = ColorToken::ALL.iter().position(|c| *c == self.board.draft.color).unwrap_or(0);
                    self.board.draft.color = ColorToken::ALL[cycle(current, ColorToken::ALL.len(), forward)];
                }
                CategoryStep::Icon => {
                    let current = IconToken::ALL.iter().position(|i| *i == self.board.draft.icon).unwrap_or(0);
                    self.board.draft.icon = IconToken::ALL[cycle(current, IconToken::ALL.len(), forward)];
                }
                CategoryStep::Title => {}
            },
            Dialog::AddingTask(_) if self.task_form.step == TaskStep::Priority => {
                self.task_form.priority_idx = cycle(self.task_form.priority_idx, Priority::ALL.len(), forward);
            }
            _ => {}
        }
    }

    /// Esc: closes the dialog. A half-typed category name is kept in the draft.
    pub fn cancel(&mut self) {
        if *self.board.dialog() == Dialog::CreatingCategory && self.category_step == CategoryStep::Title {
            self.board.draft.title = self.input_buffer.clone();
        }
        self.board.close_dialog();
        self.input_buffer.clear();
    }

    /// Enter inside a dialog: advance a step or submit.
    pub fn handle_input(&mut self) {
        match self.board.dialog().clone() {
            Dialog::None => {}
            Dialog::CreatingCategory => self.handle_category_input(),
            Dialog::AddingTask(id) => self.handle_task_input(&id),
        }
    }

    fn handle_category_input(&mut self) {
        match self.category_step {
            CategoryStep::Title => {
                self.board.draft.title = self.input_buffer.clone();
                self.category_step = CategoryStep::Color;
                self.input_buffer.clear();
            }
            CategoryStep::Color => self.category_step = CategoryStep::Icon,
            CategoryStep::Icon => {
                let title = self.board.draft.title.trim().to_string();
                if self.board.submit_draft() {
                    self.status = Some(format!("Category '{}' created.", title));
                    // Land on the new tile.
                    self.selected = self.board.categories().len() - 1;
                    self.sync_hover();
                } else {
                    self.status = Some("Category name is required.".to_string());
                    self.category_step = CategoryStep::Title;
                    self.input_buffer = self.board.draft.title.clone();
                }
            }
        }
    }

    fn handle_task_input(&mut self, category_id: &str) {
        match self.task_form.step {
            TaskStep::Title => {
                // Required field.
                if !self.input_buffer.trim().is_empty() {
                    self.task_form.title = self.input_buffer.trim().to_string();
                    self.task_form.step = TaskStep::Priority;
                    self.input_buffer.clear();
                }
            }
            TaskStep::Priority => self.task_form.step = TaskStep::Tags,
            TaskStep::Tags => {
                let tags = parse_tags(&self.input_buffer);
                let title = self.task_form.title.clone();
                let priority = self.task_form.priority();
                self.status = match self.board.add_task(category_id, &title, priority, tags) {
                    Some(_) => Some(format!("Task '{}' added.", title)),
                    None => Some("That category is no longer on the board.".to_string()),
                };
                self.input_buffer.clear();
                self.task_form = TaskForm::default();
            }
        }
    }

    /// Local part of signing out; the session itself is torn down by the caller.
    pub fn signed_out(&mut self) {
        self.board.sign_out();
        self.input_buffer.clear();
        self.selected = 0;
        self.sync_hover();
    }
}
