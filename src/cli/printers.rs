// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information.

use std::{borrow::Cow, sync::Mutex};

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Blocks> = Mutex::new(Blocks::default());
}

/// Lines of text, grouped into blocks. Each block is drawn as a branch of a
/// tree below a title.
#[derive(Default)]
struct Blocks(Vec<Vec<Cow<'static, str>>>);

impl Blocks {
    fn draw(&self, mut log_line: impl FnMut(char, &str)) {
        let num_blocks = self.0.len();
        for (i_block, block) in self.0.iter().enumerate() {
            let num_lines = block.len();
            for (i_line, line) in block.iter().enumerate() {
                let symbol = match (i_line, i_line + 1 == num_lines, i_block + 1 == num_blocks) {
                    (0, false, _) | (0, _, false) => VERTICAL_AND_RIGHT,
                    (0, true, true) => UP_AND_RIGHT,
                    _ => VERTICAL,
                };
                log_line(symbol, line);
            }
        }
    }
}

/// Collects information about a part of the simulation, then logs it all at
/// once.
pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Blocks,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: Blocks::default(),
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.0.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Vec<Cow<'static, str>>) {
        self.blocks.0.push(block);
    }

    pub(crate) fn display(self) {
        log::info!("{}", console::style(self.title).bold());
        self.blocks
            .draw(|symbol, line| log::info!("{symbol} {line}"));
        log::info!("");
    }
}

pub(crate) trait Warn {
    fn warn(self);
}

fn push_warning(block: Vec<Cow<'static, str>>) {
    // A poisoned lock still holds usable warnings.
    let mut warnings = WARNINGS.lock().unwrap_or_else(|e| e.into_inner());
    warnings.0.push(block);
}

impl Warn for &'static str {
    fn warn(self) {
        push_warning(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        push_warning(vec![self.into()]);
    }
}

impl Warn for Cow<'static, str> {
    fn warn(self) {
        push_warning(vec![self]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        push_warning(self);
    }
}

/// Print out any warnings that have been collected while settings were
/// parsed. This should only be called once, after all settings have been
/// parsed.
pub(crate) fn display_warnings() {
    log::debug!("Displaying warnings");
    let mut warnings = WARNINGS.lock().unwrap_or_else(|e| e.into_inner());
    if warnings.0.is_empty() {
        return;
    }

    log::warn!("{}", console::style("Warnings").bold());
    warnings.draw(|symbol, line| log::warn!("{symbol} {line}"));
    log::warn!("");
    warnings.0.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_symbols() {
        let blocks = Blocks(vec![
            vec!["a".into()],
            vec!["b".into(), "c".into()],
            vec!["d".into()],
        ]);
        let mut drawn = vec![];
        blocks.draw(|symbol, line| drawn.push(format!("{symbol} {line}")));
        assert_eq!(drawn, vec!["├ a", "├ b", "│ c", "└ d"]);
    }
}
