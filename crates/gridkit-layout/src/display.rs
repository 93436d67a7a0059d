//! Paint commands issued by containers.

use crate::{Color, Rect, Size};

/// A paint command.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    /// Reset the drawing target to transparent.
    Clear,
    /// Fill a rectangle with a solid color.
    SolidColor(Color, Rect),
}

/// A display list of paint commands.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<DisplayCommand>,
}

impl DisplayList {
    /// Create an empty display list.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Display list for a flat container background.
    pub fn background(size: Size, color: Color) -> Self {
        let mut list = Self::new();
        list.clear();
        list.fill_rect(Rect::from_size(size), color);
        list
    }

    pub fn clear(&mut self) {
        self.commands.push(DisplayCommand::Clear);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DisplayCommand::SolidColor(color, rect));
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
