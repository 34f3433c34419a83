//! Operator prompt section replacement.

use crate::config::{templates, Site, LEGACY_PROMPT_NAMES, PROMPT_NAMES};
use crate::error::{ConvertError, Result};
use crate::model::{line_tag, MicroVuProgram};
use crate::parser::BoilerplateSource;
use tracing::{debug, info};

/// Prompt template for the program's mode.
pub fn prompt_template_name(program: &MicroVuProgram) -> &'static str {
    if program.is_smartprofile() {
        templates::SMARTPROFILE_PROMPTS
    } else {
        templates::PROMPTS
    }
}

fn declares(line: &str, name: &str) -> bool {
    line.find(&format!("(Name \"{}\")", name)).is_some_and(|col| col > 0)
}

/// The template line filled in for this program, or `None` when the line is
/// not one of the known prompts.
pub fn fill_prompt(line: &str, program: &MicroVuProgram) -> Option<String> {
    let name = PROMPT_NAMES.iter().find(|name| declares(line, name))?;
    let filled = match *name {
        "OPERATION" => line.replace("<O>", program.op_number()),
        "REV LETTER" => line.replace("<R>", program.rev_number()),
        "PT" => line.replace("<P>", &program.part_number()),
        "SPFILENAME" => line.replace("<SPF>", program.smartprofile_projectname()),
        _ => line.to_string(),
    };
    Some(filled)
}

/// Insert every known prompt line at `index`.
///
/// Each line goes in at the same index, so the template's prompts end up in
/// reverse order.
pub fn insert_prompts(program: &mut MicroVuProgram, index: usize, prompt_lines: &[String]) -> usize {
    let mut inserted = 0;
    for line in prompt_lines {
        if let Some(filled) = fill_prompt(line, program) {
            program.document_mut().insert_line(index, filled);
            inserted += 1;
        }
    }
    inserted
}

/// Delete the first line declaring each legacy prompt.
pub fn delete_legacy_prompts(program: &mut MicroVuProgram) -> usize {
    LEGACY_PROMPT_NAMES
        .iter()
        .filter(|name| {
            program
                .document_mut()
                .delete_first_line_containing(&format!("Name \"{}\"", name))
                .is_some()
        })
        .count()
}

/// Replace the prompt section after the Created/Edited comment lines.
///
/// At sites that allow it, a program without those lines gets its prompts in
/// front of the `START` instruction instead.
pub fn replace_prompt_section<B: BoilerplateSource + ?Sized>(
    program: &mut MicroVuProgram,
    templates: &B,
    site: Site,
) -> Result<()> {
    match replace_after_comments(program, templates) {
        Err(ConvertError::AnchorNotFound { .. }) if site.falls_back_to_start_anchor() => {
            debug!("{}: no Created/Edited lines, using START", program.filename());
            replace_before_start(program, templates)
        }
        other => other,
    }
}

fn replace_after_comments<B: BoilerplateSource + ?Sized>(program: &mut MicroVuProgram, templates: &B) -> Result<()> {
    let Some(anchor) = program.prompt_insertion_index() else {
        return Err(ConvertError::anchor(
            "Created/Edited",
            "There is either no 'Edited By' or 'Created By' line. Cannot process file.",
        ));
    };
    let prompt_lines = templates.lines(prompt_template_name(program))?;

    let deleted = delete_legacy_prompts(program);
    // Deleted prompts may have sat above the comment lines
    let index = program.prompt_insertion_index().unwrap_or(anchor) + 1;
    let inserted = insert_prompts(program, index, &prompt_lines);
    info!(
        "{}: replaced {} prompts with {}",
        program.filename(),
        deleted,
        inserted
    );
    Ok(())
}

fn replace_before_start<B: BoilerplateSource + ?Sized>(program: &mut MicroVuProgram, templates: &B) -> Result<()> {
    let Some(start) = program.start_anchor_index() else {
        return Err(ConvertError::anchor(
            "(Name \"START",
            format!(
                "Can't determine where to put the prompts. Cannot process file {}.",
                program.filename()
            ),
        ));
    };

    // Prompt lines between the export line and START are dropped; START stays
    let first = program.export_line_index().map_or(0, |i| i + 1);
    let mut deleted = 0;
    for idx in (first..start).rev() {
        let is_prompt = program.document().line(idx).is_some_and(|l| line_tag(l) == "Prmt");
        if is_prompt {
            program.document_mut().delete_line(idx);
            deleted += 1;
        }
    }

    let prompt_lines = templates.lines(prompt_template_name(program))?;
    let index = start - deleted;
    let inserted = insert_prompts(program, index, &prompt_lines);
    info!(
        "{}: replaced {} prompts with {} before START",
        program.filename(),
        deleted,
        inserted
    );
    Ok(())
}

/// Whether prompts have somewhere to go in this program.
pub fn has_prompt_anchor(program: &MicroVuProgram, site: Site) -> bool {
    program.prompt_insertion_index().is_some()
        || (site.falls_back_to_start_anchor() && program.start_anchor_index().is_some())
}
