#![forbid(unsafe_code)]

//! Terminal rendering backend.
//!
//! Keeps a retained model of every panel and repaints the whole screen on
//! [`Backend::present`]. Panels are painted in creation order, so modal
//! panels opened later sit on top of the base panels. Negative or
//! oversized bounds are clipped to the screen.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use gitdash_core::geometry::{Bounds, ScreenSize};
use gitdash_panels::{
    Backend, BackendError, BackendResult, CursorPosition, PanelName, PanelStyle, PanelView,
};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Default)]
struct DrawnPanel {
    bounds: Bounds,
    title: String,
    content: String,
    style: PanelStyle,
    cursor: Option<CursorPosition>,
}

/// Crossterm-backed [`Backend`].
#[derive(Debug)]
pub struct CrosstermBackend<W: Write> {
    out: W,
    size: ScreenSize,
    panels: Vec<(PanelName, DrawnPanel)>,
    focus: Option<PanelName>,
    status: String,
}

impl CrosstermBackend<io::Stdout> {
    /// Backend writing to stdout, sized from the terminal.
    pub fn stdout() -> io::Result<Self> {
        let (width, height) = crossterm::terminal::size()?;
        Ok(Self::new(io::stdout(), ScreenSize::new(width, height)))
    }
}

impl<W: Write> CrosstermBackend<W> {
    pub fn new(out: W, size: ScreenSize) -> Self {
        Self {
            out,
            size,
            panels: Vec::new(),
            focus: None,
            status: String::new(),
        }
    }

    /// Record a new terminal size. Takes effect on the next present.
    pub fn set_size(&mut self, size: ScreenSize) {
        self.size = size;
    }

    /// The underlying writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn find_mut(&mut self, name: &PanelName) -> BackendResult<&mut DrawnPanel> {
        self.panels
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .ok_or_else(|| BackendError::UnknownPanel(name.clone()))
    }

    fn paint_panel(&mut self, panel: &DrawnPanel, focused: bool) -> io::Result<()> {
        let b = panel.bounds;
        if b.is_degenerate() {
            return Ok(());
        }
        let inner = usize::try_from(b.inner_cols()).unwrap_or(0);
        let frame_color = if focused { Color::Green } else { Color::Reset };

        // Top edge with title.
        let mut top = String::from("┌");
        let title = clip_to_width(&panel.title, inner.saturating_sub(2));
        if title.is_empty() {
            top.push_str(&"─".repeat(inner));
        } else {
            top.push(' ');
            top.push_str(&title);
            top.push(' ');
            let used = str_width(&title) + 2;
            top.push_str(&"─".repeat(inner.saturating_sub(used)));
        }
        top.push('┐');
        self.paint_row(b.x0, b.y0, &top, frame_color)?;

        let rows = wrap_lines(&panel.content, inner);
        let text_color = match panel.style {
            PanelStyle::Error => Color::Red,
            PanelStyle::Normal => Color::Reset,
        };
        for (i, y) in (b.y0 + 1..b.y1).enumerate() {
            let text = rows.get(i).map_or("", String::as_str);
            let pad = inner.saturating_sub(str_width(text));
            self.paint_row(b.x0, y, "│", frame_color)?;
            self.paint_row(b.x0 + 1, y, &format!("{text}{}", " ".repeat(pad)), text_color)?;
            self.paint_row(b.x1, y, "│", frame_color)?;
        }

        let bottom = format!("└{}┘", "─".repeat(inner));
        self.paint_row(b.x0, b.y1, &bottom, frame_color)
    }

    /// Paint `text` starting at `(x, y)`, clipped to the screen.
    fn paint_row(&mut self, x: i32, y: i32, text: &str, color: Color) -> io::Result<()> {
        let height = i32::from(self.size.height);
        let width = i32::from(self.size.width);
        if y < 0 || y >= height || x >= width {
            return Ok(());
        }
        let skip = usize::try_from(-x.min(0)).unwrap_or(0);
        let start = x.max(0);
        let room = usize::try_from(width - start).unwrap_or(0);
        let visible: String = text.chars().skip(skip).collect();
        let visible = clip_to_width(&visible, room);
        let (col, row) = (u16::try_from(start).unwrap_or(0), u16::try_from(y).unwrap_or(0));
        queue!(
            self.out,
            MoveTo(col, row),
            SetForegroundColor(color),
            Print(visible),
            ResetColor
        )
    }

    fn paint_status(&mut self) -> io::Result<()> {
        if self.size.height == 0 {
            return Ok(());
        }
        let row = self.size.height - 1;
        let text = clip_to_width(&self.status, usize::from(self.size.width));
        queue!(
            self.out,
            MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            SetAttribute(Attribute::Dim),
            Print(text),
            SetAttribute(Attribute::Reset)
        )
    }

    fn place_cursor(&mut self) -> io::Result<()> {
        let target = self.focus.as_ref().and_then(|name| {
            self.panels
                .iter()
                .find(|(n, _)| n == name)
                .and_then(|(_, p)| p.cursor.map(|c| cursor_cell(p, c)))
        });
        match target.flatten() {
            Some((x, y)) => queue!(self.out, MoveTo(x, y), Show),
            None => queue!(self.out, Hide),
        }
    }
}

impl<W: Write> Backend for CrosstermBackend<W> {
    fn size(&self) -> ScreenSize {
        self.size
    }

    fn create_panel(&mut self, name: &PanelName, bounds: Bounds) -> BackendResult<()> {
        if self.panels.iter().any(|(n, _)| n == name) {
            return Err(BackendError::AlreadyExists(name.clone()));
        }
        self.panels.push((
            name.clone(),
            DrawnPanel {
                bounds,
                ..DrawnPanel::default()
            },
        ));
        Ok(())
    }

    fn update_panel(&mut self, view: PanelView<'_>) -> BackendResult<()> {
        let panel = self.find_mut(view.name)?;
        view.title.clone_into(&mut panel.title);
        view.content.clone_into(&mut panel.content);
        panel.style = view.style;
        panel.cursor = view.cursor;
        Ok(())
    }

    fn resize_panel(&mut self, name: &PanelName, bounds: Bounds) -> BackendResult<()> {
        self.find_mut(name)?.bounds = bounds;
        Ok(())
    }

    fn destroy_panel(&mut self, name: &PanelName) -> BackendResult<()> {
        let before = self.panels.len();
        self.panels.retain(|(n, _)| n != name);
        if self.panels.len() == before {
            return Err(BackendError::UnknownPanel(name.clone()));
        }
        Ok(())
    }

    fn set_focus(&mut self, name: Option<&PanelName>) -> BackendResult<()> {
        self.focus = name.cloned();
        Ok(())
    }

    fn set_status(&mut self, text: &str) -> BackendResult<()> {
        text.clone_into(&mut self.status);
        Ok(())
    }

    fn present(&mut self) -> BackendResult<()> {
        queue!(self.out, Hide, Clear(ClearType::All))?;
        let panels = std::mem::take(&mut self.panels);
        let mut result = Ok(());
        for (name, panel) in &panels {
            let focused = self.focus.as_ref() == Some(name);
            result = self.paint_panel(panel, focused);
            if result.is_err() {
                break;
            }
        }
        self.panels = panels;
        result?;
        self.paint_status()?;
        self.place_cursor()?;
        self.out.flush()?;
        Ok(())
    }
}

fn str_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Longest prefix of `s` that fits in `width` cells.
fn clip_to_width(s: &str, width: usize) -> String {
    let mut used = 0;
    s.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

/// Hard-wrap each line of `content` at `width` cells.
fn wrap_lines(content: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for line in content.split('\n') {
        if width == 0 {
            rows.push(String::new());
            continue;
        }
        let mut row = String::new();
        let mut used = 0;
        for ch in line.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            row.push(ch);
            used += w;
        }
        rows.push(row);
    }
    rows
}

/// Screen cell of a text cursor inside `panel`, if it is visible.
fn cursor_cell(panel: &DrawnPanel, cursor: CursorPosition) -> Option<(u16, u16)> {
    let inner = usize::try_from(panel.bounds.inner_cols()).ok().filter(|w| *w > 0)?;
    let rows_before: usize = panel
        .content
        .split('\n')
        .take(cursor.line)
        .map(|line| str_width(line) / inner + 1)
        .sum();
    let row = rows_before + cursor.column / inner;
    let col = cursor.column % inner;
    let x = panel.bounds.x0 + 1 + i32::try_from(col).ok()?;
    let y = panel.bounds.y0 + 1 + i32::try_from(row).ok()?;
    if y >= panel.bounds.y1 {
        return None;
    }
    Some((u16::try_from(x).ok()?, u16::try_from(y).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> CrosstermBackend<Vec<u8>> {
        CrosstermBackend::new(Vec::new(), ScreenSize::new(40, 12))
    }

    #[test]
    fn wrap_splits_at_width() {
        assert_eq!(wrap_lines("abcdef\ngh", 4), ["abcd", "ef", "gh"]);
        assert_eq!(wrap_lines("", 4), [""]);
    }

    #[test]
    fn clip_respects_wide_chars() {
        assert_eq!(clip_to_width("漢字漢", 5), "漢字");
        assert_eq!(clip_to_width("abc", 10), "abc");
    }

    #[test]
    fn present_paints_title_content_and_status() {
        let mut b = backend();
        let name = PanelName::new("confirmation");
        b.create_panel(&name, Bounds::new(10, 3, 30, 6)).unwrap();
        let view = PanelView {
            name: &name,
            title: "Discard",
            content: "Discard all changes?",
            style: PanelStyle::Normal,
            cursor: None,
        };
        b.update_panel(view).unwrap();
        b.set_status("esc: close, enter: confirm").unwrap();
        b.present().unwrap();
        let out = String::from_utf8_lossy(b.writer()).into_owned();
        assert!(out.contains("Discard all change"));
        assert!(out.contains(" Discard "));
        assert!(out.contains("esc: close, enter: confirm"));
    }

    #[test]
    fn offscreen_rows_are_clipped() {
        let mut b = backend();
        let name = PanelName::new("tall");
        b.create_panel(&name, Bounds::new(0, -5, 10, 20)).unwrap();
        b.present().unwrap();
    }

    #[test]
    fn destroy_unknown_panel_errors() {
        let mut b = backend();
        assert!(matches!(
            b.destroy_panel(&PanelName::new("ghost")),
            Err(BackendError::UnknownPanel(_))
        ));
    }

    #[test]
    fn cursor_cell_accounts_for_wrapped_lines() {
        let panel = DrawnPanel {
            bounds: Bounds::new(0, 0, 5, 6),
            content: "abcdefg\nxy".into(),
            cursor: None,
            ..DrawnPanel::default()
        };
        // inner width 4: "abcdefg" takes two rows
        let cell = cursor_cell(&panel, CursorPosition { line: 1, column: 2 });
        assert_eq!(cell, Some((3, 3)));
    }
}
