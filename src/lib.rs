//! # metasift
//!
//! Extracts metadata (EXIF, IPTC, XMP, GPS) from images and videos by running
//! Phil Harvey's ExifTool, then categorizes and presents it.
//!
//! The pipeline is sequential and handles one file per run:
//!
//! 1. [`ExifTool::extract`] runs `exiftool -a -G1 -s <file>` and returns its text output.
//! 2. [`ClassifiedMetadata::from_output`] splits every `Key: Value` line, puts it in
//!    exactly one [`Category`] and picks out [`CriticalFields`] such as GPS position,
//!    camera make/model, capture date, software and owner.
//! 3. [`Presenter`] renders the result to any writer; [`save_report`] persists it.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use metasift::{ClassifiedMetadata, ExifTool, MetasiftError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), MetasiftError> {
//!     let exiftool = ExifTool::new();
//!     exiftool.locate()?; // MissingDependency if exiftool is not installed
//!
//!     let output = exiftool.extract(Path::new("path/to/your/image.jpg"))?;
//!     let classified = ClassifiedMetadata::from_output(&output);
//!
//!     if let Some(link) = classified.critical().gps.map_link() {
//!         println!("Taken at: {}", link);
//!     }
//!     for (category, lines) in classified.non_empty_buckets() {
//!         println!("{}: {} fields", category.label(), lines.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Classification works on any text in ExifTool's `-G1 -s` layout, no process needed:
//!
//! ```
//! use metasift::{Category, ClassifiedMetadata};
//!
//! let classified = ClassifiedMetadata::from_output("[GPS] GPSPosition : 37.8, -122.4");
//! assert_eq!(classified.bucket(Category::Gps).len(), 1);
//! assert_eq!(
//!     classified.critical().gps.map_link().as_deref(),
//!     Some("https://www.google.com/maps?q=37.8,-122.4")
//! );
//! ```

mod error;
mod exiftool;

pub mod classify;
pub mod config;
pub mod file_info;
pub mod present;
pub mod report;
mod run;

pub use classify::{Category, ClassifiedMetadata, CriticalField, CriticalFields, MetadataLine};
pub use config::{Cli, Config};
pub use error::MetasiftError;
pub use exiftool::{ExifTool, EXTRACT_ARGS};
pub use file_info::FileInfo;
pub use present::{DisplayMode, Palette, Presenter};
pub use report::save_report;
pub use run::{report_failure, run, Summary};

mod utils;
