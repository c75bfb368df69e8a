//! Action toolbar below the scene: layout, hit testing and menu state.
//!
//! Kept free of drawing calls so it can be tested without a window.

use macroquad::math::{vec2, Rect, Vec2};
use shared::actions::{CHAT_CATEGORIES, GESTURE_CATEGORY};
use shared::{Gesture, GAME_HEIGHT, GAME_WIDTH};

pub const TOOLBAR_HEIGHT: f32 = 44.0;
pub const MENU_ROW_HEIGHT: f32 = 24.0;
pub const MENU_WIDTH: f32 = 240.0;

/// Something the participant picked from the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    Chat(String),
    Gesture(Gesture),
}

/// Outcome of a click, as seen by the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarClick {
    /// The click landed in the scene and the toolbar did not use it.
    Ignored,
    /// The toolbar used the click to open or close a menu.
    Handled,
    Selected(ToolbarAction),
}

/// One button of the toolbar and the entries of its menu.
#[derive(Debug, Clone)]
pub struct Category {
    pub label: &'static str,
    pub options: Vec<ToolbarAction>,
}

impl Category {
    pub fn option_label(option: &ToolbarAction) -> &str {
        match option {
            ToolbarAction::Chat(message) => message,
            ToolbarAction::Gesture(gesture) => gesture.label(),
        }
    }
}

pub struct Toolbar {
    categories: Vec<Category>,
    open: Option<usize>,
}

impl Toolbar {
    pub fn new() -> Self {
        let mut categories: Vec<Category> = CHAT_CATEGORIES
            .iter()
            .map(|category| Category {
                label: category.name,
                options: category
                    .phrases
                    .iter()
                    .map(|phrase| ToolbarAction::Chat(phrase.to_string()))
                    .collect(),
            })
            .collect();
        categories.push(Category {
            label: GESTURE_CATEGORY,
            options: Gesture::SELECTABLE
                .into_iter()
                .map(ToolbarAction::Gesture)
                .collect(),
        });

        Self {
            categories,
            open: None,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn open_category(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    /// Area of the whole bar.
    pub fn bar_rect() -> Rect {
        Rect::new(0.0, GAME_HEIGHT, GAME_WIDTH, TOOLBAR_HEIGHT)
    }

    pub fn button_rect(&self, index: usize) -> Rect {
        let width = GAME_WIDTH / self.categories.len() as f32;
        Rect::new(
            index as f32 * width + 4.0,
            GAME_HEIGHT + 6.0,
            width - 8.0,
            TOOLBAR_HEIGHT - 12.0,
        )
    }

    /// Row `row` of the open menu for `category`. The row after the last
    /// option is the cancel row.
    pub fn menu_row_rect(&self, category: usize, row: usize) -> Rect {
        let rows = self.categories[category].options.len() + 1;
        let button = self.button_rect(category);
        let x = button.x.min(GAME_WIDTH - MENU_WIDTH);
        let top = GAME_HEIGHT - rows as f32 * MENU_ROW_HEIGHT;
        Rect::new(
            x,
            top + row as f32 * MENU_ROW_HEIGHT,
            MENU_WIDTH,
            MENU_ROW_HEIGHT,
        )
    }

    /// Handles a left click at `point` in window coordinates.
    pub fn click(&mut self, point: Vec2) -> ToolbarClick {
        if let Some(open) = self.open {
            let options = self.categories[open].options.len();
            for row in 0..=options {
                if self.menu_row_rect(open, row).contains(point) {
                    self.open = None;
                    return match self.categories[open].options.get(row) {
                        Some(option) => ToolbarClick::Selected(option.clone()),
                        None => ToolbarClick::Handled,
                    };
                }
            }
        }

        if let Some(index) =
            (0..self.categories.len()).find(|i| self.button_rect(*i).contains(point))
        {
            self.open = if self.open == Some(index) {
                None
            } else {
                Some(index)
            };
            return ToolbarClick::Handled;
        }

        if self.open.is_some() {
            self.open = None;
            return ToolbarClick::Handled;
        }

        if Self::bar_rect().contains(point) {
            ToolbarClick::Handled
        } else {
            ToolbarClick::Ignored
        }
    }
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new()
    }
}

/// Centre of a rectangle, handy for tests and text placement.
pub fn rect_center(rect: &Rect) -> Vec2 {
    vec2(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0)
}
