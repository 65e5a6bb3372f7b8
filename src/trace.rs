//! Read-only execution snapshots for human inspection.

use std::fmt::Write as _;

use crate::program::Instruction;

/// Header matching [`Snapshot::table_row`].
pub const TABLE_HEADER: &str = "STEP | IP  | PTR | CELL | INSTR | ACTION\n\
-----+-----+-----+------+-------+------------------------------------------------";

/// State of the engine right after one instruction executed.
///
/// Borrowed from the engine for the duration of the observer call only.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// 0-based count of executed instructions.
    pub step: usize,
    /// Position of the instruction that just ran.
    pub ip: usize,
    pub instruction: Instruction,
    /// Program counter after the instruction.
    pub pc: usize,
    /// Normalized program text.
    pub code: &'a str,
    pub tape: &'a [u8],
    /// Data pointer after the instruction.
    pub ptr: usize,
    /// Data pointer and cell value before the instruction.
    pub ptr_before: usize,
    pub cell_before: u8,
    pub action: &'a str,
}

impl<'a> Snapshot<'a> {
    /// Tape cut after the highest non-zero cell, but always reaching the pointer.
    pub fn trimmed_tape(&self) -> &'a [u8] {
        let used = self.tape.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
        let end = used.max(self.ptr + 1).min(self.tape.len());
        &self.tape[..end]
    }

    /// Two-line picture of program and tape with position markers:
    ///
    /// ```text
    /// ++>+++<[->+<] │ 02 03
    ///   ↑           │    ↑↑
    /// ```
    pub fn diagram(&self) -> String {
        let cells = self.trimmed_tape();
        let code_len = self.code.chars().count();
        let mut out = String::new();

        out.push_str(self.code);
        out.push_str(" │");
        for cell in cells {
            let _ = write!(out, " {cell:02x}");
        }
        out.push('\n');

        out.push_str(&" ".repeat(self.pc));
        out.push('↑');
        out.push_str(&" ".repeat(code_len.saturating_sub(self.pc)));
        out.push('│');
        out.push_str(&"   ".repeat(self.ptr));
        out.push_str(" ↑↑");
        out
    }

    pub fn table_row(&self) -> String {
        format!(
            "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
            self.step, self.ip, self.ptr_before, self.cell_before, self.instruction, self.action
        )
    }
}

/// How the CLI prints snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFormat {
    #[default]
    Diagram,
    Table,
}

impl std::str::FromStr for TraceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diagram" | "tape" => Ok(TraceFormat::Diagram),
            "table" => Ok(TraceFormat::Table),
            other => Err(format!("invalid trace format: {other} (expected 'diagram' or 'table')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot<'a>(code: &'a str, tape: &'a [u8], pc: usize, ptr: usize) -> Snapshot<'a> {
        Snapshot {
            step: 0,
            ip: pc.saturating_sub(1),
            instruction: Instruction::Increment,
            pc,
            code,
            tape,
            ptr,
            ptr_before: ptr,
            cell_before: 0,
            action: "Increment cell[0] from 0 to 1",
        }
    }

    #[test]
    fn trims_to_highest_nonzero_cell() {
        let tape = [2, 3, 0, 0, 0];
        assert_eq!(snapshot("", &tape, 0, 0).trimmed_tape(), &[2, 3]);
        assert_eq!(snapshot("", &tape, 0, 3).trimmed_tape(), &[2, 3, 0, 0]);
        assert_eq!(snapshot("", &[0, 0], 0, 0).trimmed_tape(), &[0]);
    }

    #[test]
    fn diagram_marks_counter_and_pointer() {
        let tape = [2, 3, 0];
        let text = snapshot("++>+++<[->+<]", &tape, 2, 1).diagram();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "++>+++<[->+<] │ 02 03");
        assert_eq!(lines[1], "  ↑           │    ↑↑");
    }

    #[test]
    fn table_row_lists_action() {
        let tape = [1];
        let row = snapshot("+", &tape, 1, 0).table_row();
        assert!(row.starts_with("0    | 0   | 0   | 0    |  +"), "{row}");
        assert!(row.ends_with("Increment cell[0] from 0 to 1"));
    }
}
