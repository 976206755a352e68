use crate::classify::{present, ClassifiedMetadata};
use crate::error::MetasiftError;
use crate::file_info::FileInfo;
use chrono::{DateTime, Local};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `<absolute_path>_metadata_<YYYYmmdd_HHMMSS>.txt`, next to the input file.
pub fn report_path(absolute_path: &Path, at: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "{}_metadata_{}.txt",
        absolute_path.display(),
        at.format(TIMESTAMP_FORMAT)
    ))
}

/// Writes the plain-text report: header, critical fields, then the raw tool output.
pub fn write_report(
    out: &mut impl Write,
    info: &FileInfo,
    classified: &ClassifiedMetadata,
    raw_output: &str,
    at: DateTime<Local>,
) -> io::Result<()> {
    let rule = "=".repeat(60);
    writeln!(out, "Metadata Extraction Report")?;
    writeln!(out, "File: {}", info.path.display())?;
    writeln!(out, "Extracted: {}", at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Size: {} bytes", info.size)?;
    writeln!(out, "SHA-256: {}", info.sha256)?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;

    let critical = classified.critical();
    let summary = [
        ("GPS Latitude", present(&critical.gps.latitude)),
        ("GPS Longitude", present(&critical.gps.longitude)),
        ("GPS Altitude", present(&critical.gps.altitude)),
        ("GPS Position", present(&critical.gps.position)),
        ("Camera Make", present(&critical.camera.make)),
        ("Camera Model", present(&critical.camera.model)),
        ("Lens", present(&critical.camera.lens)),
        ("Serial Number", present(&critical.camera.serial_number)),
        ("Date/Time Original", present(&critical.datetime.original)),
        ("Create Date", present(&critical.datetime.created)),
        ("Modify Date", present(&critical.datetime.modified)),
        ("Software", present(&critical.software)),
        ("Owner", present(&critical.owner.owner)),
        ("Copyright", present(&critical.owner.copyright)),
    ];
    let mut any = false;
    for (label, value) in summary {
        if let Some(value) = value {
            writeln!(out, "{}: {}", label, value)?;
            any = true;
        }
    }
    if let Some(link) = critical.gps.map_link() {
        writeln!(out, "Maps Link: {}", link)?;
    }
    if any {
        writeln!(out)?;
    }
    writeln!(out, "Total metadata fields: {}", classified.total_lines())?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;

    out.write_all(raw_output.as_bytes())?;
    if !raw_output.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Saves the report next to the input file and returns its path.
///
/// Any I/O failure becomes [`MetasiftError::ReportWriteFailed`]; callers treat
/// it as non-fatal.
pub fn save_report(
    info: &FileInfo,
    classified: &ClassifiedMetadata,
    raw_output: &str,
) -> Result<PathBuf, MetasiftError> {
    let at = Local::now();
    let path = report_path(&info.path, at);

    let written = File::create(&path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write_report(&mut writer, info, classified, raw_output, at)?;
        writer.flush()
    });

    match written {
        Ok(()) => {
            info!("Report written to {}", path.display());
            Ok(path)
        }
        Err(source) => Err(MetasiftError::ReportWriteFailed { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::SAMPLE_OUTPUT;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn info_for(path: PathBuf) -> FileInfo {
        FileInfo {
            path,
            size: 42,
            extension: ".jpg".to_string(),
            modified: None,
            created: None,
            sha256: "00".repeat(32),
        }
    }

    #[test]
    fn test_report_path() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(
            report_path(Path::new("/photos/a.jpg"), at),
            PathBuf::from("/photos/a.jpg_metadata_20240301_090507.txt")
        );
    }

    #[test]
    fn test_write_report_contents() -> Result<(), MetasiftError> {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        let classified = ClassifiedMetadata::from_output(SAMPLE_OUTPUT);
        let mut buffer = Vec::new();
        write_report(
            &mut buffer,
            &info_for(PathBuf::from("/photos/a.jpg")),
            &classified,
            SAMPLE_OUTPUT,
            at,
        )?;
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("Metadata Extraction Report\nFile: /photos/a.jpg\n"));
        assert!(text.contains("Extracted: 2024-03-01 09:05:07"));
        assert!(text.contains("Camera Model: Nexus 6P"));
        assert!(text.contains("GPS Altitude: 12 m"));
        assert!(text.contains("Total metadata fields: 33"));
        assert!(text.ends_with(SAMPLE_OUTPUT));
        assert!(!text.contains('\x1b'));
        Ok(())
    }

    #[test]
    fn test_save_report_next_to_file() -> Result<(), MetasiftError> {
        let dir = tempfile::tempdir()?;
        let image = dir.path().join("a.jpg");
        std::fs::write(&image, b"x")?;

        let classified = ClassifiedMetadata::from_output("[File] FileType : JPEG");
        let path = save_report(&info_for(image.clone()), &classified, "[File] FileType : JPEG")?;

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("a.jpg_metadata_"));
        assert!(name.ends_with(".txt"));
        let written = std::fs::read_to_string(&path)?;
        assert!(written.ends_with("[File] FileType : JPEG\n"));
        Ok(())
    }

    #[test]
    fn test_save_report_failure_is_reported() {
        let info = info_for(PathBuf::from("/nonexistent_dir_for_metasift/a.jpg"));
        let classified = ClassifiedMetadata::default();
        assert_matches!(
            save_report(&info, &classified, ""),
            Err(MetasiftError::ReportWriteFailed { path, .. })
                if path.starts_with("/nonexistent_dir_for_metasift")
        );
    }
}
