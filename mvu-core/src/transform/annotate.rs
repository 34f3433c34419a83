//! Conversion comment and dimension disabling.

use crate::config::{EXPORT_ANCHOR, KILL_FILE_PATH, METROLOGY_PICTURE, NAME_NODE};
use crate::error::Result;
use crate::model::MicroVuProgram;
use chrono::NaiveDate;

/// Comment text recording who converted the program and when.
///
/// Starts with a literal `\r\n`, the separator InSpec shows as a line break
/// inside a comment.
pub fn conversion_comment(initials: &str, date: NaiveDate) -> String {
    format!(
        "\\r\\nConverted program to work with 1Factory. {} {}.",
        initials,
        date.format("%m/%d/%Y")
    )
}

/// Append the conversion comment to the `Edited By` comment.
pub fn update_comments(program: &mut MicroVuProgram, initials: &str, date: NaiveDate) -> Result<()> {
    let comment = format!("{}{}", program.comment(), conversion_comment(initials, date));
    program.set_comment(&comment)
}

/// Turn off automatic reporting and mark every named instruction
/// `DontMeasure`, except the kill-file call and the metrology picture.
pub fn disable_dimensions(program: &mut MicroVuProgram) -> usize {
    let mut disabled = 0;
    program.document_mut().for_each_line_mut(|_, line| {
        if line.contains(EXPORT_ANCHOR) {
            *line = line
                .replace("(AutoRpt 1)", "(AutoRpt 0)")
                .replace("(AutoConf 1)", "(AutoConf 0)");
            return;
        }
        if !line.contains(NAME_NODE)
            || line.contains(KILL_FILE_PATH)
            || line.contains(METROLOGY_PICTURE)
            || line.contains("(DontMeasure)")
        {
            return;
        }
        line.push_str(" (DontMeasure)");
        disabled += 1;
    });
    disabled
}
