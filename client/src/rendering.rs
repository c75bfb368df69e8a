use crate::network::Session;
use crate::toolbar::{rect_center, Category, Toolbar, MENU_ROW_HEIGHT, TOOLBAR_HEIGHT};
use log::{info, warn};
use macroquad::prelude::*;
use shared::{
    Direction, Gesture, Player, DSP_SPRITE_SIZE, GAME_HEIGHT, GAME_WIDTH, SRC_SPRITE_SIZE,
};

const SPRITE_SHEET_PATH: &str = "assets/spritesheet.png";
const FONT_SIZE: f32 = 18.0;
const BUBBLE_CHARS_PER_LINE: usize = 22;
const BUBBLE_LINE_HEIGHT: f32 = 18.0;

#[derive(Debug, Clone)]
pub struct RenderConfig<'a> {
    pub local_name: Option<&'a str>,
    pub session: &'a Session,
    pub synced: bool,
}

pub struct Renderer {
    sprite_sheet: Option<Texture2D>,
}

impl Renderer {
    /// Loads the sprite sheet if one is shipped next to the binary; avatars
    /// fall back to plain shapes without it.
    pub async fn new() -> Self {
        let sprite_sheet = match load_texture(SPRITE_SHEET_PATH).await {
            Ok(texture) => {
                texture.set_filter(FilterMode::Nearest);
                info!("Loaded sprite sheet from {}", SPRITE_SHEET_PATH);
                Some(texture)
            }
            Err(e) => {
                warn!("No sprite sheet ({}), drawing placeholder avatars", e);
                None
            }
        };

        Renderer { sprite_sheet }
    }

    pub fn render(&mut self, players: &[Player], toolbar: &Toolbar, config: RenderConfig) {
        clear_background(Color::from_rgba(124, 178, 96, 255));

        self.draw_scenery();

        // Lower avatars are closer to the viewer and drawn last.
        let mut ordered: Vec<&Player> = players.iter().collect();
        ordered.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));

        for player in &ordered {
            let is_local_player = Some(player.name.as_str()) == config.local_name;
            self.draw_player(player, is_local_player);
        }
        for player in &ordered {
            if let Some(message) = &player.chat_message {
                self.draw_chat_bubble(player, message);
            }
        }

        self.draw_toolbar(toolbar);
        self.draw_ui(&config, players.len());
    }

    fn draw_scenery(&self) {
        draw_rectangle(
            0.0,
            GAME_HEIGHT - 90.0,
            GAME_WIDTH,
            90.0,
            Color::from_rgba(104, 158, 80, 255),
        );
        for (x, y) in [(60.0, 70.0), (690.0, 120.0), (120.0, 430.0), (640.0, 460.0)] {
            draw_rectangle(x - 6.0, y, 12.0, 36.0, Color::from_rgba(110, 78, 48, 255));
            draw_circle(x, y, 30.0, Color::from_rgba(58, 120, 64, 255));
        }
    }

    fn draw_player(&self, player: &Player, is_local_player: bool) {
        let (x, y) = (player.position.x, player.position.y);
        let (column, row) = player.sprite_cell();

        match &self.sprite_sheet {
            Some(texture) => {
                draw_texture_ex(
                    texture,
                    x,
                    y,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(DSP_SPRITE_SIZE, DSP_SPRITE_SIZE)),
                        source: Some(Rect::new(
                            column as f32 * SRC_SPRITE_SIZE,
                            row as f32 * SRC_SPRITE_SIZE,
                            SRC_SPRITE_SIZE,
                            SRC_SPRITE_SIZE,
                        )),
                        ..Default::default()
                    },
                );
            }
            None => self.draw_placeholder(player, row == 1),
        }

        if is_local_player {
            draw_rectangle_lines(x, y, DSP_SPRITE_SIZE, DSP_SPRITE_SIZE, 2.0, WHITE);
        }

        let label = player.name.as_str();
        let size = measure_text(label, None, FONT_SIZE as u16, 1.0);
        let label_x = x + (DSP_SPRITE_SIZE - size.width) / 2.0;
        let label_y = y + DSP_SPRITE_SIZE + size.height + 4.0;
        draw_rectangle(
            label_x - 4.0,
            label_y - size.height - 2.0,
            size.width + 8.0,
            size.height + 6.0,
            Color::from_rgba(0, 0, 0, 120),
        );
        draw_text(label, label_x, label_y, FONT_SIZE, WHITE);
    }

    /// Grey koala: round head, two ears, a face turned toward the walking
    /// direction and a small bob on the alternate frame.
    fn draw_placeholder(&self, player: &Player, alternate: bool) {
        let bob = if alternate { -4.0 } else { 0.0 };
        let cx = player.position.x + DSP_SPRITE_SIZE / 2.0;
        let cy = player.position.y + DSP_SPRITE_SIZE / 2.0 + bob;
        let fur = name_color(&player.name);

        draw_circle(cx - 34.0, cy - 30.0, 20.0, fur);
        draw_circle(cx + 34.0, cy - 30.0, 20.0, fur);
        draw_circle(cx, cy, 44.0, fur);

        let (dx, dy) = face_offset(player.walk_direction);
        if player.walk_direction != Direction::Backward {
            let eye_y = cy - 8.0 + dy;
            let closed = player.gesture == Gesture::Sleep;
            for side in [-1.0, 1.0] {
                let eye_x = cx + dx + side * 14.0;
                if closed {
                    draw_line(eye_x - 5.0, eye_y, eye_x + 5.0, eye_y, 2.0, BLACK);
                } else {
                    draw_circle(eye_x, eye_y, 4.0, BLACK);
                }
            }
            draw_ellipse(cx + dx, cy + 10.0 + dy, 10.0, 14.0, 0.0, DARKGRAY);
        }

        if player.gesture != Gesture::None {
            let label = player.gesture.label();
            let size = measure_text(label, None, 14, 1.0);
            draw_text(
                label,
                cx - size.width / 2.0,
                player.position.y + bob - 4.0,
                14.0,
                YELLOW,
            );
        }
    }

    fn draw_chat_bubble(&self, player: &Player, message: &str) {
        let lines = bubble_lines(message, BUBBLE_CHARS_PER_LINE);
        let width = lines
            .iter()
            .map(|line| measure_text(line, None, FONT_SIZE as u16, 1.0).width)
            .fold(0.0, f32::max)
            + 16.0;
        let height = lines.len() as f32 * BUBBLE_LINE_HEIGHT + 10.0;

        let center_x = player.position.x + DSP_SPRITE_SIZE / 2.0;
        let x = (center_x - width / 2.0).clamp(0.0, (GAME_WIDTH - width).max(0.0));
        let y = (player.position.y - height - 12.0).max(0.0);

        draw_rectangle(x, y, width, height, WHITE);
        draw_rectangle_lines(x, y, width, height, 2.0, DARKGRAY);
        draw_triangle(
            vec2(center_x - 6.0, y + height),
            vec2(center_x + 6.0, y + height),
            vec2(center_x, y + height + 10.0),
            WHITE,
        );

        for (i, line) in lines.iter().enumerate() {
            draw_text(
                line,
                x + 8.0,
                y + 5.0 + (i as f32 + 1.0) * BUBBLE_LINE_HEIGHT - 4.0,
                FONT_SIZE,
                BLACK,
            );
        }
    }

    fn draw_toolbar(&self, toolbar: &Toolbar) {
        let bar = Toolbar::bar_rect();
        draw_rectangle(
            bar.x,
            bar.y,
            bar.w,
            TOOLBAR_HEIGHT,
            Color::from_rgba(40, 44, 52, 255),
        );

        for (i, category) in toolbar.categories().iter().enumerate() {
            let rect = toolbar.button_rect(i);
            let color = if toolbar.open_category() == Some(i) {
                Color::from_rgba(97, 175, 239, 255)
            } else {
                Color::from_rgba(70, 76, 88, 255)
            };
            draw_rectangle(rect.x, rect.y, rect.w, rect.h, color);
            draw_centered_text(category.label, &rect, WHITE);
        }

        if let Some(open) = toolbar.open_category() {
            let category = &toolbar.categories()[open];
            for (row, option) in category.options.iter().enumerate() {
                let rect = toolbar.menu_row_rect(open, row);
                draw_rectangle(
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    Color::from_rgba(250, 250, 250, 240),
                );
                draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, LIGHTGRAY);
                draw_text(
                    Category::option_label(option),
                    rect.x + 8.0,
                    rect.y + MENU_ROW_HEIGHT - 7.0,
                    FONT_SIZE,
                    BLACK,
                );
            }
            let cancel = toolbar.menu_row_rect(open, category.options.len());
            draw_rectangle(
                cancel.x,
                cancel.y,
                cancel.w,
                cancel.h,
                Color::from_rgba(224, 108, 117, 240),
            );
            draw_centered_text("Cancel", &cancel, WHITE);
        }
    }

    fn draw_ui(&self, config: &RenderConfig, player_count: usize) {
        let (status, color) = match config.session {
            Session::Joining => ("Joining...".to_string(), YELLOW),
            Session::Joined if !config.synced => ("Waiting for snapshot...".to_string(), YELLOW),
            Session::Joined => (
                format!(
                    "{} | {} in town",
                    config.local_name.unwrap_or_default(),
                    player_count
                ),
                GREEN,
            ),
            Session::Rejected(reason) => (format!("Rejected: {}", reason), RED),
        };

        draw_rectangle(8.0, 8.0, 10.0, 10.0, color);
        draw_text(&status, 24.0, 18.0, FONT_SIZE, WHITE);
    }
}

fn draw_centered_text(text: &str, rect: &Rect, color: Color) {
    let size = measure_text(text, None, FONT_SIZE as u16, 1.0);
    let center = rect_center(rect);
    draw_text(
        text,
        center.x - size.width / 2.0,
        center.y + size.height / 2.0,
        FONT_SIZE,
        color,
    );
}

/// Where the face sits relative to the head centre for a facing.
fn face_offset(direction: Direction) -> (f32, f32) {
    match direction {
        Direction::Left => (-12.0, 0.0),
        Direction::Right => (12.0, 0.0),
        Direction::Forward => (0.0, 6.0),
        Direction::Backward | Direction::None => (0.0, 0.0),
    }
}

/// Stable fur tint derived from the participant's name.
pub fn name_color(name: &str) -> Color {
    let hash = name
        .bytes()
        .fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let shade = 140 + (hash % 60) as u8;
    let tint = ((hash >> 8) % 30) as u8;
    Color::from_rgba(shade, shade, shade.saturating_add(tint), 255)
}

/// Word-wraps a chat message for its bubble. Words longer than a line are
/// split.
pub fn bubble_lines(message: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in message.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.len();
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
