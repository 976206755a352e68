//! Terminal rendering of classified metadata.

use crate::classify::{present, ClassifiedMetadata, CriticalFields, MetadataLine};
use crate::error::MetasiftError;
use crate::file_info::FileInfo;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

const RULE_WIDTH: usize = 60;
const SUMMARY_LINES_PER_BUCKET: usize = 10;

/// ANSI escape sequences used by the [`Presenter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub red: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub blue: &'static str,
    pub magenta: &'static str,
    pub cyan: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub const ANSI: Palette = Palette {
        red: "\x1b[91m",
        green: "\x1b[92m",
        yellow: "\x1b[93m",
        blue: "\x1b[94m",
        magenta: "\x1b[95m",
        cyan: "\x1b[96m",
        bold: "\x1b[1m",
        reset: "\x1b[0m",
    };

    pub const PLAIN: Palette = Palette {
        red: "",
        green: "",
        yellow: "",
        blue: "",
        magenta: "",
        cyan: "",
        bold: "",
        reset: "",
    };

    pub fn for_color(color: bool) -> Self {
        if color {
            Self::ANSI
        } else {
            Self::PLAIN
        }
    }
}

/// What follows the critical-field blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Categorized dump, capped per bucket.
    #[default]
    Summary,
    /// Categorized dump, every line.
    Detailed,
    /// The tool output verbatim.
    Raw,
}

impl DisplayMode {
    /// Raw wins over detailed.
    pub fn from_flags(raw: bool, detailed: bool) -> Self {
        match (raw, detailed) {
            (true, _) => DisplayMode::Raw,
            (false, true) => DisplayMode::Detailed,
            (false, false) => DisplayMode::Summary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Presenter {
    palette: Palette,
    mode: DisplayMode,
}

impl Presenter {
    pub fn new(palette: Palette, mode: DisplayMode) -> Self {
        Self { palette, mode }
    }

    pub fn banner(&self, out: &mut impl Write) -> io::Result<()> {
        let p = &self.palette;
        writeln!(out)?;
        writeln!(out, "{}{}  metasift{}", p.red, p.bold, p.reset)?;
        writeln!(out, "{}  Metadata extraction for images & videos{}", p.cyan, p.reset)?;
        writeln!(out, "{}{}{}", p.magenta, "═".repeat(RULE_WIDTH), p.reset)
    }

    pub fn status(&self, out: &mut impl Write, message: &str) -> io::Result<()> {
        writeln!(out, "{}[*] {}{}", self.palette.blue, message, self.palette.reset)
    }

    pub fn success(&self, out: &mut impl Write, message: &str) -> io::Result<()> {
        writeln!(out, "{}[+] {}{}", self.palette.green, message, self.palette.reset)
    }

    pub fn failure(&self, out: &mut impl Write, message: &str) -> io::Result<()> {
        writeln!(out, "{}[!] {}{}", self.palette.red, message, self.palette.reset)
    }

    pub fn report_saved(&self, out: &mut impl Write, path: &Path) -> io::Result<()> {
        self.success(out, &format!("Metadata saved to: {}", path.display()))
    }

    /// Renders everything for one file.
    pub fn render(
        &self,
        out: &mut impl Write,
        info: &FileInfo,
        classified: &ClassifiedMetadata,
        raw_output: &str,
    ) -> io::Result<()> {
        let p = &self.palette;
        self.rule(out)?;
        writeln!(out, "{}{}File:{} {}", p.bold, p.cyan, p.reset, info.path.display())?;
        self.rule(out)?;

        self.file_block(out, info)?;
        let critical = classified.critical();
        self.gps_block(out, critical)?;
        self.camera_block(out, critical)?;
        self.datetime_block(out, critical)?;
        self.software_block(out, critical)?;
        self.owner_block(out, critical)?;

        match self.mode {
            DisplayMode::Raw => self.raw_dump(out, raw_output)?,
            DisplayMode::Summary | DisplayMode::Detailed => {
                self.categorized_dump(out, classified)?
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "{}[*] Total metadata fields:{} {}",
            p.yellow,
            p.reset,
            classified.total_lines()
        )?;
        self.rule(out)
    }

    fn rule(&self, out: &mut impl Write) -> io::Result<()> {
        let p = &self.palette;
        writeln!(out, "{}{}{}", p.green, "=".repeat(RULE_WIDTH), p.reset)
    }

    fn heading(&self, out: &mut impl Write, color: &str, title: &str) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}{}{}", color, title, self.palette.reset)
    }

    fn field(
        &self,
        out: &mut impl Write,
        color: &str,
        label: &str,
        value: Option<&str>,
    ) -> io::Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let label = format!("{}:", label);
        writeln!(out, "    {}{:<11}{} {}", color, label, self.palette.reset, value)
    }

    fn file_block(&self, out: &mut impl Write, info: &FileInfo) -> io::Result<()> {
        let y = self.palette.yellow;
        self.heading(out, y, "[*] File Information:")?;
        let size = format!("{} bytes ({:.2} KB)", info.size, info.size_kb());
        self.field(out, y, "Size", Some(size.as_str()))?;
        let extension = if info.extension.is_empty() {
            "(none)"
        } else {
            info.extension.as_str()
        };
        self.field(out, y, "Extension", Some(extension))?;
        self.field(out, y, "SHA-256", Some(info.sha256.as_str()))?;
        self.field(out, y, "Modified", format_time(info.modified).as_deref())?;
        self.field(out, y, "Created", format_time(info.created).as_deref())
    }

    fn gps_block(&self, out: &mut impl Write, critical: &CriticalFields) -> io::Result<()> {
        let gps = &critical.gps;
        if gps.is_empty() {
            return Ok(());
        }
        let r = self.palette.red;
        self.heading(out, &format!("{}{}", r, self.palette.bold), "[!] GPS LOCATION FOUND:")?;
        self.field(out, r, "Latitude", present(&gps.latitude))?;
        self.field(out, r, "Longitude", present(&gps.longitude))?;
        self.field(out, r, "Position", present(&gps.position))?;
        self.field(out, r, "Altitude", present(&gps.altitude))?;
        self.field(out, r, "Maps Link", gps.map_link().as_deref())
    }

    fn camera_block(&self, out: &mut impl Write, critical: &CriticalFields) -> io::Result<()> {
        let camera = &critical.camera;
        if camera.is_empty() {
            return Ok(());
        }
        let c = self.palette.cyan;
        self.heading(out, self.palette.yellow, "[*] Camera:")?;
        self.field(out, c, "Make", present(&camera.make))?;
        self.field(out, c, "Model", present(&camera.model))?;
        self.field(out, c, "Lens", present(&camera.lens))?;
        self.field(out, c, "Serial", present(&camera.serial_number))
    }

    fn datetime_block(&self, out: &mut impl Write, critical: &CriticalFields) -> io::Result<()> {
        let datetime = &critical.datetime;
        if datetime.is_empty() {
            return Ok(());
        }
        let c = self.palette.cyan;
        self.heading(out, self.palette.yellow, "[*] Date / Time:")?;
        self.field(out, c, "Original", present(&datetime.original))?;
        self.field(out, c, "Created", present(&datetime.created))?;
        self.field(out, c, "Modified", present(&datetime.modified))
    }

    fn software_block(&self, out: &mut impl Write, critical: &CriticalFields) -> io::Result<()> {
        let Some(software) = present(&critical.software) else {
            return Ok(());
        };
        self.heading(out, self.palette.yellow, "[*] Software:")?;
        self.field(out, self.palette.cyan, "Software", Some(software))
    }

    fn owner_block(&self, out: &mut impl Write, critical: &CriticalFields) -> io::Result<()> {
        let owner = &critical.owner;
        if owner.is_empty() {
            return Ok(());
        }
        let m = self.palette.magenta;
        self.heading(out, self.palette.yellow, "[*] Owner:")?;
        self.field(out, m, "Owner", present(&owner.owner))?;
        self.field(out, m, "Copyright", present(&owner.copyright))
    }

    fn categorized_dump(
        &self,
        out: &mut impl Write,
        classified: &ClassifiedMetadata,
    ) -> io::Result<()> {
        let p = &self.palette;
        self.heading(out, p.yellow, "[*] Complete Metadata:")?;
        for (category, lines) in classified.non_empty_buckets() {
            writeln!(out)?;
            writeln!(
                out,
                "  {}{}{} ({}){}",
                p.bold,
                p.green,
                category.label(),
                lines.len(),
                p.reset
            )?;
            let shown = match self.mode {
                DisplayMode::Detailed => lines.len(),
                _ => lines.len().min(SUMMARY_LINES_PER_BUCKET),
            };
            for line in &lines[..shown] {
                self.metadata_line(out, line)?;
            }
            if shown < lines.len() {
                writeln!(
                    out,
                    "    {}... {} more (use --detailed to show all){}",
                    p.yellow,
                    lines.len() - shown,
                    p.reset
                )?;
            }
        }
        Ok(())
    }

    fn metadata_line(&self, out: &mut impl Write, line: &MetadataLine) -> io::Result<()> {
        let p = &self.palette;
        writeln!(out, "    {}{}{}: {}", p.cyan, line.key, p.reset, line.value)
    }

    fn raw_dump(&self, out: &mut impl Write, raw_output: &str) -> io::Result<()> {
        self.heading(out, self.palette.yellow, "[*] Raw Metadata:")?;
        writeln!(out)?;
        out.write_all(raw_output.as_bytes())?;
        if !raw_output.is_empty() && !raw_output.ends_with('\n') {
            writeln!(out)?;
        }
        Ok(())
    }
}

fn format_time(time: Option<DateTime<Local>>) -> Option<String> {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[derive(Serialize)]
struct JsonBucket<'a> {
    category: &'static str,
    lines: &'a [MetadataLine],
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a FileInfo,
    critical: &'a CriticalFields,
    map_link: Option<String>,
    categories: Vec<JsonBucket<'a>>,
    total_lines: usize,
}

/// Machine-readable variant of [`Presenter::render`].
pub fn render_json(
    out: &mut impl Write,
    info: &FileInfo,
    classified: &ClassifiedMetadata,
) -> Result<(), MetasiftError> {
    let critical = classified.critical();
    let report = JsonReport {
        file: info,
        critical,
        map_link: critical.gps.map_link(),
        categories: classified
            .non_empty_buckets()
            .map(|(category, lines)| JsonBucket {
                category: category.label(),
                lines,
            })
            .collect(),
        total_lines: classified.total_lines(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::SAMPLE_OUTPUT;
    use serde_json::Value;
    use std::path::PathBuf;

    fn info() -> FileInfo {
        FileInfo {
            path: PathBuf::from("/photos/IMG_20170801_162043.jpg"),
            size: 3_565_158,
            extension: ".jpg".to_string(),
            modified: None,
            created: None,
            sha256: "ab".repeat(32),
        }
    }

    fn render(mode: DisplayMode, output: &str) -> String {
        let classified = ClassifiedMetadata::from_output(output);
        let mut buffer = Vec::new();
        Presenter::new(Palette::PLAIN, mode)
            .render(&mut buffer, &info(), &classified, output)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_display_mode_from_flags() {
        assert_eq!(DisplayMode::from_flags(false, false), DisplayMode::Summary);
        assert_eq!(DisplayMode::from_flags(false, true), DisplayMode::Detailed);
        assert_eq!(DisplayMode::from_flags(true, true), DisplayMode::Raw);
    }

    #[test]
    fn test_render_blocks() {
        let text = render(DisplayMode::Summary, SAMPLE_OUTPUT);
        assert!(text.contains("File: /photos/IMG_20170801_162043.jpg"));
        assert!(text.contains("Size:       3565158 bytes (3481.60 KB)"));
        assert!(text.contains(&format!("SHA-256:    {}", "ab".repeat(32))));
        assert!(text.contains("[!] GPS LOCATION FOUND:"));
        assert!(text.contains("Latitude:   37 deg 48' 0.00\" N"));
        assert!(text.contains(
            "Maps Link:  https://www.google.com/maps?q=37deg48'0.00\"N,122deg24'0.00\"W"
        ));
        assert!(text.contains("Make:       Huawei"));
        assert!(text.contains("Original:   2017:08:01 16:20:43"));
        assert!(text.contains("Software:   HDR+ 1.0.159611864z"));
        assert!(text.contains("Copyright:  (c) Jane Doe"));
        assert!(text.contains("  GPS (7)"));
        assert!(text.contains("    [IFD0]          Make: Huawei"));
        assert!(text.contains("[*] Total metadata fields: 33"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_render_map_link_from_position() {
        let text = render(DisplayMode::Summary, "GPSPosition: 37.8,-122.4");
        assert!(text.contains("https://www.google.com/maps?q=37.8,-122.4"));
    }

    #[test]
    fn test_empty_blocks_are_omitted() {
        let text = render(DisplayMode::Summary, "[File] FileType : PNG");
        assert!(!text.contains("GPS LOCATION"));
        assert!(!text.contains("[*] Camera:"));
        assert!(!text.contains("[*] Owner:"));
        assert!(text.contains("  File (1)"));
        assert!(text.contains("[*] Total metadata fields: 1"));
    }

    #[test]
    fn test_summary_caps_buckets_and_detailed_does_not() {
        let output: String = (0..15)
            .map(|i| format!("[Other] Tag{} : value {}\n", i, i))
            .collect();

        let summary = render(DisplayMode::Summary, &output);
        assert!(summary.contains("[Other] Tag9: value 9"));
        assert!(!summary.contains("Tag14"));
        assert!(summary.contains("... 5 more (use --detailed to show all)"));

        let detailed = render(DisplayMode::Detailed, &output);
        assert!(detailed.contains("[Other] Tag14: value 14"));
        assert!(!detailed.contains("more (use --detailed"));
    }

    #[test]
    fn test_raw_mode_prints_output_verbatim() {
        let text = render(DisplayMode::Raw, SAMPLE_OUTPUT);
        assert!(text.contains("[*] Raw Metadata:"));
        assert!(text
            .contains("[GPS]           GPSLatitude                     : 37 deg 48' 0.00\" N"));
        assert!(!text.contains("[*] Complete Metadata:"));
        assert!(text.contains("[*] Total metadata fields: 33"));
    }

    #[test]
    fn test_ansi_palette_is_used() {
        let classified = ClassifiedMetadata::from_output("[GPS] GPSAltitude : 3 m");
        let mut buffer = Vec::new();
        Presenter::new(Palette::for_color(true), DisplayMode::Summary)
            .render(&mut buffer, &info(), &classified, "")
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("\x1b[91m"));
        assert!(text.contains("\x1b[0m"));
    }

    #[test]
    fn test_render_json() -> Result<(), MetasiftError> {
        let classified = ClassifiedMetadata::from_output(SAMPLE_OUTPUT);
        let mut buffer = Vec::new();
        render_json(&mut buffer, &info(), &classified)?;

        let value: Value = serde_json::from_slice(&buffer)?;
        assert_eq!(value["total_lines"], 33);
        assert_eq!(value["file"]["extension"], ".jpg");
        assert_eq!(value["critical"]["camera"]["model"], "Nexus 6P");
        assert_eq!(value["critical"]["gps"]["altitude"], "12 m");
        assert_eq!(value["categories"][0]["category"], "GPS");
        assert_eq!(
            value["categories"][0]["lines"][0]["key"],
            "[GPS]           GPSLatitudeRef"
        );
        assert!(value["map_link"]
            .as_str()
            .unwrap()
            .starts_with("https://www.google.com/maps?q="));
        Ok(())
    }
}
