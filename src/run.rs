use crate::classify::ClassifiedMetadata;
use crate::config::Config;
use crate::error::MetasiftError;
use crate::exiftool::ExifTool;
use crate::file_info::FileInfo;
use crate::present::{render_json, Palette, Presenter};
use crate::report::save_report;
use log::{debug, info, warn};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_lines: usize,
    /// Set when `--save` was requested and the report was written.
    pub report: Option<PathBuf>,
}

/// Processes one file end to end and renders the result to `out`.
///
/// `interrupt` is polled while ExifTool runs and between stages; once set the
/// run stops with [`MetasiftError::Interrupted`]. A failed report write is
/// reported on `out` but does not fail the run.
pub fn run(
    config: &Config,
    interrupt: Option<Arc<AtomicBool>>,
    out: &mut impl Write,
) -> Result<Summary, MetasiftError> {
    let mut exiftool = ExifTool::with_executable(&config.exiftool).with_timeout(config.timeout);
    if let Some(flag) = &interrupt {
        exiftool = exiftool.with_interrupt(Arc::clone(flag));
    }
    let check_interrupt = || match &interrupt {
        Some(flag) if flag.load(Ordering::SeqCst) => Err(MetasiftError::Interrupted),
        _ => Ok(()),
    };

    let located = exiftool.locate()?;
    debug!("Using {}", located.display());

    let presenter = Presenter::new(Palette::for_color(config.color), config.mode);
    if !config.json {
        presenter.banner(out)?;
        presenter.status(
            out,
            &format!("Extracting metadata from: {}", config.file_path.display()),
        )?;
    }

    let raw_output = exiftool.extract(&config.file_path)?;
    let classified = ClassifiedMetadata::from_output(&raw_output);
    info!(
        "Classified {} metadata lines from {}",
        classified.total_lines(),
        config.file_path.display()
    );
    check_interrupt()?;

    let file_info = FileInfo::collect(&config.file_path)?;
    check_interrupt()?;

    if config.json {
        render_json(out, &file_info, &classified)?;
    } else {
        presenter.render(out, &file_info, &classified, &raw_output)?;
    }

    let report = if config.save {
        match save_report(&file_info, &classified, &raw_output) {
            Ok(path) => {
                if !config.json {
                    presenter.report_saved(out, &path)?;
                }
                Some(path)
            }
            Err(e) => {
                warn!("{}", e);
                if !config.json {
                    presenter.failure(out, &e.to_string())?;
                }
                None
            }
        }
    } else {
        None
    };

    if !config.json {
        presenter.success(out, "Extraction complete!")?;
    }

    Ok(Summary {
        total_lines: classified.total_lines(),
        report,
    })
}

/// Prints the message for a failed run.
///
/// With `--json` stdout carries nothing but the document, so the message goes
/// to `err_out` instead, uncolored.
pub fn report_failure(
    config: &Config,
    err: &MetasiftError,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> io::Result<()> {
    if config.json {
        Presenter::new(Palette::PLAIN, config.mode).failure(err_out, &err.to_string())
    } else {
        writeln!(out)?;
        Presenter::new(Palette::for_color(config.color), config.mode)
            .failure(out, &err.to_string())
    }
}
