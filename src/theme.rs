//! Colors for REPL syntax highlighting.

use nu_ansi_term::{Color, Style};

use crate::Instruction;

/// Catppuccin Mocha accents.
pub mod mocha {
    use nu_ansi_term::Color;

    pub const OVERLAY0: Color = Color::Rgb(108, 112, 134);
    pub const RED: Color = Color::Rgb(243, 139, 168);
    pub const GREEN: Color = Color::Rgb(166, 227, 161);
    pub const YELLOW: Color = Color::Rgb(249, 226, 175);
    pub const MAUVE: Color = Color::Rgb(203, 166, 247);
    pub const PEACH: Color = Color::Rgb(250, 179, 135);
    pub const TEAL: Color = Color::Rgb(148, 226, 213);
    pub const SKY: Color = Color::Rgb(137, 220, 235);
}

/// Style for one source character; `None` means a comment.
///
/// > <  movement       SKY / TEAL
/// + -  cell arithmetic GREEN / RED
/// . ,  I/O            YELLOW / PEACH
/// [ ]  flow control   MAUVE
pub fn style_for(instr: Option<Instruction>) -> Style {
    let color = match instr {
        Some(Instruction::MoveRight) => mocha::SKY,
        Some(Instruction::MoveLeft) => mocha::TEAL,
        Some(Instruction::Increment) => mocha::GREEN,
        Some(Instruction::Decrement) => mocha::RED,
        Some(Instruction::Output) => mocha::YELLOW,
        Some(Instruction::Input) => mocha::PEACH,
        Some(Instruction::LoopOpen | Instruction::LoopClose) => mocha::MAUVE,
        None => return Style::new().fg(mocha::OVERLAY0).italic(),
    };
    Style::new().fg(color).bold()
}

/// Header color for error messages on a TTY.
pub const ERROR: Color = mocha::RED;
