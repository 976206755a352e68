//! Line classification of ExifTool text output.
//!
//! Every `Key: Value` line lands in exactly one [`Category`] (first matching
//! rule wins) and may additionally fill one slot of [`CriticalFields`].
//! Matching is done on the key only, lowercased and with whitespace removed,
//! so `GPS Latitude` and `GPSLatitude` behave the same.

use crate::utils::strip_whitespace;
use serde::Serialize;

/// Splits a key from its value. Only the first occurrence counts.
pub const SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Gps,
    Camera,
    Exif,
    Iptc,
    Xmp,
    Composite,
    MakerNotes,
    Image,
    File,
    Other,
}

impl Category {
    /// Order in which buckets are displayed.
    pub const DISPLAY_ORDER: [Category; 10] = [
        Category::Gps,
        Category::Camera,
        Category::Image,
        Category::File,
        Category::Exif,
        Category::Iptc,
        Category::Xmp,
        Category::Composite,
        Category::MakerNotes,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Gps => "GPS",
            Category::Camera => "Camera",
            Category::Exif => "EXIF",
            Category::Iptc => "IPTC",
            Category::Xmp => "XMP",
            Category::Composite => "Composite",
            Category::MakerNotes => "MakerNotes",
            Category::Image => "Image",
            Category::File => "File",
            Category::Other => "Other",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Category rules in priority order. `Other` is the fallback and has no rule.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::Gps, &["gps"]),
    (
        Category::Camera,
        &["make", "model", "lens", "camera", "serialnumber"],
    ),
    (
        Category::Exif,
        &[
            "exif",
            "exposure",
            "aperture",
            "fnumber",
            "iso",
            "shutter",
            "flash",
            "focal",
            "whitebalance",
            "metering",
        ],
    ),
    (Category::Iptc, &["iptc"]),
    (Category::Xmp, &["xmp"]),
    (Category::Composite, &["composite"]),
    (
        Category::MakerNotes,
        &[
            "makernote",
            "[canon",
            "[nikon",
            "[sony",
            "[olympus",
            "[panasonic",
            "[fujifilm",
            "[pentax",
            "[samsung",
            "[apple",
            "[huawei",
        ],
    ),
    (
        Category::Image,
        &[
            "image",
            "width",
            "height",
            "resolution",
            "color",
            "orientation",
            "compression",
            "bitspersample",
            "megapixels",
            "ycbcr",
        ],
    ),
    (
        Category::File,
        &["file", "directory", "mime", "permissions", "[system]"],
    ),
];

/// Lowercases `key` and drops all whitespace.
pub fn normalize_key(key: &str) -> String {
    strip_whitespace(key).to_lowercase()
}

/// Returns the bucket for an already normalized key.
pub fn classify_key(normalized_key: &str) -> Category {
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| normalized_key.contains(k)))
        .map_or(Category::Other, |(category, _)| *category)
}

/// A single `Key: Value` line of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataLine {
    /// Key including its `[Group]` prefix, trimmed.
    pub key: String,
    /// Everything after the first separator, trimmed. Never interpreted.
    pub value: String,
    #[serde(skip)]
    pub raw: String,
}

impl MetadataLine {
    /// Parses one line. Blank lines and lines without a separator yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }
        let (key, value) = line.split_once(SEPARATOR)?;
        Some(Self {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
            raw: line.to_string(),
        })
    }

    /// The `[Group]` prefix without brackets, if present.
    pub fn group(&self) -> Option<&str> {
        let rest = self.key.strip_prefix('[')?;
        rest.split_once(']').map(|(group, _)| group)
    }

    /// The key without its group prefix.
    pub fn tag(&self) -> &str {
        match self.key.strip_prefix('[').and_then(|r| r.split_once(']')) {
            Some((_, tag)) => tag.trim(),
            None => &self.key,
        }
    }

    pub fn normalized_key(&self) -> String {
        normalize_key(&self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticalField {
    Latitude,
    Longitude,
    Altitude,
    Position,
    Lens,
    Make,
    Model,
    SerialNumber,
    DateTimeOriginal,
    CreateDate,
    ModifyDate,
    Software,
    Owner,
    Copyright,
}

struct CriticalRule {
    field: CriticalField,
    include: &'static [&'static str],
    exclude: &'static [&'static str],
}

impl CriticalRule {
    fn matches(&self, normalized_key: &str) -> bool {
        self.include.iter().any(|k| normalized_key.contains(k))
            && !self.exclude.iter().any(|k| normalized_key.contains(k))
    }
}

// Exclusions keep reference/unit tags (GPSLatitudeRef, LensMake, ...) from
// shadowing the value tag. ICC profile tags (DeviceModel, ProfileCreator,
// ProfileCopyright) describe the colour profile, not the capture.
const CRITICAL_RULES: &[CriticalRule] = &[
    CriticalRule {
        field: CriticalField::Latitude,
        include: &["gpslatitude"],
        exclude: &["ref"],
    },
    CriticalRule {
        field: CriticalField::Longitude,
        include: &["gpslongitude"],
        exclude: &["ref"],
    },
    CriticalRule {
        field: CriticalField::Altitude,
        include: &["gpsaltitude"],
        exclude: &["ref"],
    },
    CriticalRule {
        field: CriticalField::Position,
        include: &["gpsposition"],
        exclude: &[],
    },
    CriticalRule {
        field: CriticalField::Lens,
        include: &["lensmodel", "lensid"],
        exclude: &[],
    },
    CriticalRule {
        field: CriticalField::Make,
        include: &["make"],
        exclude: &["makernote", "lensmake", "[icc"],
    },
    CriticalRule {
        field: CriticalField::Model,
        include: &["model"],
        exclude: &["lens", "[icc", "profile", "device", "modelid"],
    },
    CriticalRule {
        field: CriticalField::SerialNumber,
        include: &["serialnumber"],
        exclude: &["lens"],
    },
    CriticalRule {
        field: CriticalField::DateTimeOriginal,
        include: &["datetimeoriginal"],
        exclude: &[],
    },
    CriticalRule {
        field: CriticalField::CreateDate,
        include: &["createdate"],
        exclude: &["file"],
    },
    CriticalRule {
        field: CriticalField::ModifyDate,
        include: &["modifydate"],
        exclude: &["file"],
    },
    CriticalRule {
        field: CriticalField::Software,
        include: &["software"],
        exclude: &[],
    },
    CriticalRule {
        field: CriticalField::Owner,
        include: &["ownername", "artist", "author", "creator"],
        exclude: &["creatortool", "[icc", "profile"],
    },
    CriticalRule {
        field: CriticalField::Copyright,
        include: &["copyright"],
        exclude: &["flag", "[icc", "profile"],
    },
];

/// Returns the critical field an already normalized key feeds, if any.
pub fn critical_field_for(normalized_key: &str) -> Option<CriticalField> {
    CRITICAL_RULES
        .iter()
        .find(|rule| rule.matches(normalized_key))
        .map(|rule| rule.field)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GpsFields {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub altitude: Option<String>,
    pub position: Option<String>,
}

impl GpsFields {
    pub fn is_empty(&self) -> bool {
        [&self.latitude, &self.longitude, &self.altitude, &self.position]
            .iter()
            .all(|v| present(v).is_none())
    }

    /// Google Maps link for the position string, or for `latitude,longitude`
    /// when no position is known. Coordinates are passed through unparsed.
    pub fn map_link(&self) -> Option<String> {
        let query = match (
            present(&self.position),
            present(&self.latitude),
            present(&self.longitude),
        ) {
            (Some(position), _, _) => strip_whitespace(position),
            (None, Some(lat), Some(lon)) => {
                format!("{},{}", strip_whitespace(lat), strip_whitespace(lon))
            }
            _ => return None,
        };
        Some(format!("https://www.google.com/maps?q={}", query))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CameraFields {
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens: Option<String>,
    pub serial_number: Option<String>,
}

impl CameraFields {
    pub fn is_empty(&self) -> bool {
        [&self.make, &self.model, &self.lens, &self.serial_number]
            .iter()
            .all(|v| present(v).is_none())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateTimeFields {
    pub original: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl DateTimeFields {
    pub fn is_empty(&self) -> bool {
        [&self.original, &self.created, &self.modified]
            .iter()
            .all(|v| present(v).is_none())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnerFields {
    pub owner: Option<String>,
    pub copyright: Option<String>,
}

impl OwnerFields {
    pub fn is_empty(&self) -> bool {
        present(&self.owner).is_none() && present(&self.copyright).is_none()
    }
}

/// Curated fields surfaced regardless of category.
///
/// Setting a field that already holds a value overwrites it, so with
/// duplicate tags the last line in tool output order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CriticalFields {
    pub gps: GpsFields,
    pub camera: CameraFields,
    pub datetime: DateTimeFields,
    pub software: Option<String>,
    pub owner: OwnerFields,
}

impl CriticalFields {
    pub fn set(&mut self, field: CriticalField, value: String) {
        *self.slot(field) = Some(value);
    }

    pub fn get(&self, field: CriticalField) -> Option<&str> {
        let value = match field {
            CriticalField::Latitude => &self.gps.latitude,
            CriticalField::Longitude => &self.gps.longitude,
            CriticalField::Altitude => &self.gps.altitude,
            CriticalField::Position => &self.gps.position,
            CriticalField::Lens => &self.camera.lens,
            CriticalField::Make => &self.camera.make,
            CriticalField::Model => &self.camera.model,
            CriticalField::SerialNumber => &self.camera.serial_number,
            CriticalField::DateTimeOriginal => &self.datetime.original,
            CriticalField::CreateDate => &self.datetime.created,
            CriticalField::ModifyDate => &self.datetime.modified,
            CriticalField::Software => &self.software,
            CriticalField::Owner => &self.owner.owner,
            CriticalField::Copyright => &self.owner.copyright,
        };
        value.as_deref()
    }

    fn slot(&mut self, field: CriticalField) -> &mut Option<String> {
        match field {
            CriticalField::Latitude => &mut self.gps.latitude,
            CriticalField::Longitude => &mut self.gps.longitude,
            CriticalField::Altitude => &mut self.gps.altitude,
            CriticalField::Position => &mut self.gps.position,
            CriticalField::Lens => &mut self.camera.lens,
            CriticalField::Make => &mut self.camera.make,
            CriticalField::Model => &mut self.camera.model,
            CriticalField::SerialNumber => &mut self.camera.serial_number,
            CriticalField::DateTimeOriginal => &mut self.datetime.original,
            CriticalField::CreateDate => &mut self.datetime.created,
            CriticalField::ModifyDate => &mut self.datetime.modified,
            CriticalField::Software => &mut self.software,
            CriticalField::Owner => &mut self.owner.owner,
            CriticalField::Copyright => &mut self.owner.copyright,
        }
    }
}

/// Treats empty values as absent.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Classified tool output: buckets plus critical fields.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedMetadata {
    buckets: [Vec<MetadataLine>; 10],
    critical: CriticalFields,
}

impl ClassifiedMetadata {
    pub fn from_output(output: &str) -> Self {
        let mut classified = Self::default();
        for line in output.lines().filter_map(MetadataLine::parse) {
            classified.push(line);
        }
        classified
    }

    pub fn push(&mut self, line: MetadataLine) {
        let key = line.normalized_key();
        if let Some(field) = critical_field_for(&key) {
            self.critical.set(field, line.value.clone());
        }
        self.buckets[classify_key(&key).index()].push(line);
    }

    pub fn bucket(&self, category: Category) -> &[MetadataLine] {
        &self.buckets[category.index()]
    }

    /// Non-empty buckets in [`Category::DISPLAY_ORDER`].
    pub fn non_empty_buckets(&self) -> impl Iterator<Item = (Category, &[MetadataLine])> {
        Category::DISPLAY_ORDER
            .into_iter()
            .map(move |c| (c, self.bucket(c)))
            .filter(|(_, lines)| !lines.is_empty())
    }

    pub fn critical(&self) -> &CriticalFields {
        &self.critical
    }

    /// Number of lines that made it into a bucket.
    pub fn total_lines(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}
