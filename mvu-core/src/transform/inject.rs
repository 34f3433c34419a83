//! Boilerplate instruction blocks added to converted programs.

use crate::config::{templates, INSTRUCTIONS_TAG, KILL_FILE_NAME, KILL_FILE_PATH};
use crate::error::{ConvertError, Result};
use crate::model::{get_node, MicroVuProgram};
use crate::parser::BoilerplateSource;
use tracing::debug;

/// Add the kill-file call right after the `Instructions` header, or point an
/// existing call at the standard kill file.
pub fn inject_kill_file_call<B: BoilerplateSource + ?Sized>(program: &mut MicroVuProgram, templates: &B) -> Result<()> {
    let Some(header) = program.instructions_index() else {
        return Err(ConvertError::anchor(
            INSTRUCTIONS_TAG,
            "program has no instruction count line",
        ));
    };

    if program.kill_file_call_index().is_some() {
        return replace_kill_file_call(program);
    }

    let block = templates.block(templates::KILL_FILE)?;
    program.document_mut().insert_lines(header + 1, &block);
    debug!("{}: added kill-file call", program.filename());
    Ok(())
}

/// Rewrite the `CmdText` node of the existing kill-file call.
pub fn replace_kill_file_call(program: &mut MicroVuProgram) -> Result<()> {
    let Some(idx) = program.kill_file_call_index() else {
        return Ok(());
    };
    let line = &program.lines()[idx];
    let node = get_node(line, "CmdText")?;
    let updated = line.replacen(node, &format!("(CmdText \"\"\"{}\"\"\")", KILL_FILE_PATH), 1);
    program.document_mut().replace_line(idx, updated);
    Ok(())
}

/// Add the "bring part to metrology" picture step after the kill-file call.
/// Programs without a kill-file call are left alone.
pub fn inject_metrology_picture<B: BoilerplateSource + ?Sized>(program: &mut MicroVuProgram, templates: &B) -> Result<()> {
    if program.kill_file_call_index().is_none() {
        debug!("{}: no {} call, skipping picture", program.filename(), KILL_FILE_NAME);
        return Ok(());
    }
    let Some(index) = program.bring_part_to_metrology_index() else {
        return Ok(());
    };

    let block = templates.block(templates::METROLOGY_PICTURE)?;
    program.document_mut().insert_lines(index, &block);
    Ok(())
}

/// Append the SmartProfile hand-off to a SmartProfile program, or switch an
/// existing call to the factory script.
pub fn inject_smartprofile_call<B: BoilerplateSource + ?Sized>(
    program: &mut MicroVuProgram,
    templates: &B,
    script_path: &str,
    exe_path: &str,
) -> Result<()> {
    if !program.is_smartprofile() {
        return Ok(());
    }

    if let Some(idx) = program.smartprofile_call_index() {
        let updated = program.lines()[idx].replace("UniversalSmartProfile.py", "OneFactorySP.py");
        program.document_mut().replace_line(idx, updated);
        return Ok(());
    }

    let Some(system_id) = program.last_system_id() else {
        debug!("{}: no coordinate system, skipping SmartProfile call", program.filename());
        return Ok(());
    };

    let block = templates.block(templates::SMARTPROFILE_CALL)?;
    let call = block[0]
        .replace("<?SYS>", &system_id)
        .replace("<?EXE>", exe_path)
        .replace("<?SCR>", script_path);

    let document = program.document_mut();
    document.push_line(call);
    document.push_line(block[1].clone());
    document.push_line(block[2].clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProgramOptions, TextEncoding};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn program(text: &str) -> MicroVuProgram {
        MicroVuProgram::from_lines(
            "cell/1000.iwp",
            text.lines().map(str::to_string).collect(),
            TextEncoding::default(),
            &ProgramOptions::new("10", "A"),
        )
    }

    fn block(header: &str, lines: [&str; 3]) -> Vec<String> {
        std::iter::once(header)
            .chain(lines)
            .map(str::to_string)
            .collect()
    }

    fn templates() -> HashMap<String, Vec<String>> {
        let mut map = HashMap::new();
        map.insert(
            templates::KILL_FILE.to_string(),
            block("kill", ["Cmd (Name \"KILL\") (CmdText \"\"\"C:\\killFile.bat\"\"\")", "Wait (Name \"W\")", "Txt (Name \"K\")"]),
        );
        map.insert(
            templates::METROLOGY_PICTURE.to_string(),
            block("pic", ["Pic (Name \"P1\")", "Img (Name \"Bring part to Metrology.JPG\")", "Pause (Name \"P3\")"]),
        );
        map.insert(
            templates::SMARTPROFILE_CALL.to_string(),
            block("sp", ["Cmd (Name \"SP\") (Sys <?SYS>) (CmdText \"<?EXE> <?SCR>\")", "Wait (Name \"SPW\")", "End (Name \"SPE\")"]),
        );
        map
    }

    const BASE: &str = "Header
Instructions 2
Prog (AutoExpFile \"a.csv\")
Crcl 1 (Name \"1A\") (Sys 4)";

    // ==================== kill file tests ====================

    #[test]
    fn test_inject_kill_file_after_header() {
        let mut p = program(BASE);
        inject_kill_file_call(&mut p, &templates()).unwrap();
        assert_eq!(p.lines()[2], "Cmd (Name \"KILL\") (CmdText \"\"\"C:\\killFile.bat\"\"\")");
        assert_eq!(p.lines()[4], "Txt (Name \"K\")");
        assert_eq!(p.lines()[5], "Prog (AutoExpFile \"a.csv\")");
        assert!(p.has_text_kill());
    }

    #[test]
    fn test_inject_kill_file_needs_header() {
        let mut p = program("Header\nProg (AutoExpFile \"a.csv\")");
        assert!(matches!(
            inject_kill_file_call(&mut p, &templates()),
            Err(ConvertError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn test_existing_kill_file_call_normalized() {
        let text = BASE.replace(
            "Instructions 2",
            "Instructions 2\nCmd (Name \"KILL\") (CmdText \"\"\"D:\\tools\\killFile.bat\"\"\") (Wait 1)",
        );
        let mut p = program(&text);
        inject_kill_file_call(&mut p, &templates()).unwrap();
        assert_eq!(p.lines().len(), 5);
        assert_eq!(
            p.lines()[2],
            "Cmd (Name \"KILL\") (CmdText \"\"\"C:\\killFile.bat\"\"\") (Wait 1)"
        );
    }

    // ==================== metrology picture tests ====================

    #[test]
    fn test_metrology_picture_after_kill_block() {
        let mut p = program(BASE);
        let templates = templates();
        inject_kill_file_call(&mut p, &templates).unwrap();
        inject_metrology_picture(&mut p, &templates).unwrap();
        assert_eq!(p.lines()[5], "Pic (Name \"P1\")");
        assert_eq!(p.lines()[7], "Pause (Name \"P3\")");
        assert_eq!(p.lines()[8], "Prog (AutoExpFile \"a.csv\")");
        assert!(p.has_metrology_picture());
    }

    #[test]
    fn test_metrology_picture_needs_kill_file() {
        let mut p = program(BASE);
        inject_metrology_picture(&mut p, &templates()).unwrap();
        assert_eq!(p.lines().len(), 4);
    }

    // ==================== SmartProfile tests ====================

    const SMARTPROFILE: &str = "Header
Instructions 2
Prog (AutoExpFile \"C:\\TEXT\\OUTPUT.txt\")
Crcl 1 (Name \"1A\") (Sys 4)";

    #[test]
    fn test_smartprofile_call_appended() {
        let mut p = program(SMARTPROFILE);
        inject_smartprofile_call(&mut p, &templates(), "C:\\sp\\OneFactorySP.py", "C:\\sp\\SmartProfile.exe").unwrap();
        assert_eq!(p.lines().len(), 7);
        assert_eq!(
            p.lines()[4],
            "Cmd (Name \"SP\") (Sys 4) (CmdText \"C:\\sp\\SmartProfile.exe C:\\sp\\OneFactorySP.py\")"
        );
        assert_eq!(p.lines()[6], "End (Name \"SPE\")");
    }

    #[test]
    fn test_existing_smartprofile_call_switched() {
        let text = format!("{}\nCmd (CmdText \"SmartProfile.exe UniversalSmartProfile.py\")", SMARTPROFILE);
        let mut p = program(&text);
        inject_smartprofile_call(&mut p, &templates(), "x", "y").unwrap();
        assert_eq!(p.lines().len(), 5);
        assert_eq!(p.lines()[4], "Cmd (CmdText \"SmartProfile.exe OneFactorySP.py\")");
    }

    #[test]
    fn test_smartprofile_call_skipped_for_regular_program() {
        let mut p = program(BASE);
        inject_smartprofile_call(&mut p, &templates(), "x", "y").unwrap();
        assert_eq!(p.lines().len(), 4);
    }
}
