//! Export (CSV) and report (PDF) file naming.

use crate::config::CURL_EXPORT_ROOT;
use crate::error::Result;
use crate::model::MicroVuProgram;

/// `{part}_OP{op}[_{view}]_REV{rev}_` shared by the export and report names.
fn job_stem(program: &MicroVuProgram) -> String {
    let mut stem = format!("{}_OP{}", program.part_number(), program.op_number());
    let view = program.view_name();
    if !view.is_empty() {
        stem.push('_');
        stem.push_str(&view);
    }
    stem.push_str(&format!("_REV{}_", program.rev_number()));
    stem
}

/// CSV export path picked up by the factory data collector.
pub fn export_filepath_for(program: &MicroVuProgram) -> String {
    format!("{}{}.csv", CURL_EXPORT_ROOT, job_stem(program))
}

/// PDF report path under the configured reporting root.
pub fn report_filepath_for(program: &MicroVuProgram, reporting_root: &str) -> String {
    format!("{}{}.pdf", reporting_root, job_stem(program))
}

pub fn replace_export_filepath(program: &mut MicroVuProgram) -> Result<()> {
    let path = export_filepath_for(program);
    program.set_export_filepath(&path)
}

pub fn replace_report_filepath(program: &mut MicroVuProgram, reporting_root: &str) -> Result<()> {
    let path = report_filepath_for(program, reporting_root);
    program.set_report_filepath(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SMARTPROFILE_EXPORT_FILE;
    use crate::model::{ProgramOptions, TextEncoding};
    use pretty_assertions::assert_eq;

    fn program(path: &str, export: &str) -> MicroVuProgram {
        let lines = vec![
            "Header".to_string(),
            "Instructions 1".to_string(),
            format!("Prog (ExpFile \"{0}\") (AutoExpFile \"{0}\") (FldDlm Tab)", export),
        ];
        MicroVuProgram::from_lines(path, lines, TextEncoding::default(), &ProgramOptions::new("20", "b"))
    }

    #[test]
    fn test_paths_with_view() {
        let p = program("cell/4455_SIDE_REVB.iwp", "C:\\a.csv");
        assert_eq!(export_filepath_for(&p), "C:\\Users\\Public\\CURL\\in\\4455_OP20_SIDE_REVB_.csv");
        assert_eq!(report_filepath_for(&p, "R:\\QC\\"), "R:\\QC\\4455_OP20_SIDE_REVB_.pdf");
    }

    #[test]
    fn test_paths_without_view() {
        let p = program("cell/4455.iwp", "C:\\a.csv");
        assert_eq!(export_filepath_for(&p), "C:\\Users\\Public\\CURL\\in\\4455_OP20_REVB_.csv");
        assert_eq!(report_filepath_for(&p, ""), "4455_OP20_REVB_.pdf");
    }

    #[test]
    fn test_replace_paths() {
        let mut p = program("cell/4455.iwp", "C:\\a.csv");
        replace_export_filepath(&mut p).unwrap();
        replace_report_filepath(&mut p, "R:\\").unwrap();
        assert_eq!(p.export_filepath(), "C:\\Users\\Public\\CURL\\in\\4455_OP20_REVB_.csv");
        assert_eq!(p.report_filepath(), "R:\\4455_OP20_REVB_.pdf");
    }

    #[test]
    fn test_replace_paths_smartprofile() {
        let mut p = program("cell/4455.iwp", "C:\\TEXT\\OUTPUT.txt");
        replace_export_filepath(&mut p).unwrap();
        replace_report_filepath(&mut p, "R:\\").unwrap();
        assert_eq!(p.export_filepath(), SMARTPROFILE_EXPORT_FILE);
        assert_eq!(p.report_filepath(), "");
        assert!(p.document().line(2).unwrap().contains("(AutoRptFileName \"\")"));
    }
}
