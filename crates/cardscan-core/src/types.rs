// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Cardscan: image-space geometry, detection results,
// encoded output, and extracted card records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest width or height a crop region may shrink to, in image pixels.
pub const MIN_CROP_SIZE: f32 = 50.0;

// -- Geometry -----------------------------------------------------------------

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f32 {
        self.width as f32 * self.height as f32
    }

    /// Half the diagonal length, used to normalise distances from the centre.
    pub fn half_diagonal(&self) -> f32 {
        (self.width as f32).hypot(self.height as f32) / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// A floating-point position in image-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Clamp into `[0, width] x [0, height]`.
    pub fn clamped(&self, size: ImageSize) -> Self {
        Self {
            x: self.x.clamp(0.0, size.width as f32),
            y: self.y.clamp(0.0, size.height as f32),
        }
    }

    /// Linear interpolation towards `other` by `t` (0 = self, 1 = other).
    pub fn lerp(&self, other: Point, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Named corners of a [`Quadrilateral`] / [`CropRegion`], in winding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Position in the `[TL, TR, BR, BL]` winding order.
    pub fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 3,
        }
    }
}

/// Four corner points in fixed `[top-left, top-right, bottom-right,
/// bottom-left]` order.
///
/// The order is never permuted: editing moves individual points, nothing
/// re-sorts them. A user may therefore drag the shape into a non-convex or
/// self-intersecting configuration; see [`Quadrilateral::is_convex`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    points: [Point; 4],
}

impl Quadrilateral {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle with its top-left corner at `(x, y)`.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new([
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    pub fn point(&self, corner: Corner) -> Point {
        self.points[corner.index()]
    }

    /// Move a single corner. The winding order is unaffected.
    pub fn set_point(&mut self, corner: Corner, point: Point) {
        self.points[corner.index()] = point;
    }

    /// `(min_x, min_y, max_x, max_y)` over the four points.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        self.points.iter().fold(
            (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        )
    }

    /// The longer of the top and bottom edge lengths.
    pub fn horizontal_extent(&self) -> f32 {
        let [tl, tr, br, bl] = self.points;
        tl.distance_to(tr).max(bl.distance_to(br))
    }

    /// The longer of the left and right edge lengths.
    pub fn vertical_extent(&self) -> f32 {
        let [tl, tr, br, bl] = self.points;
        tl.distance_to(bl).max(tr.distance_to(br))
    }

    /// Whether the four points form a strictly convex polygon.
    ///
    /// Collinear or coincident points, crossed edges, and reflex corners all
    /// report `false`.
    pub fn is_convex(&self) -> bool {
        let mut sign = 0.0f32;
        for i in 0..4 {
            let a = self.points[i];
            let b = self.points[(i + 1) % 4];
            let c = self.points[(i + 2) % 4];
            let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
            if cross.abs() < f32::EPSILON {
                return false;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        // With four points, one turn direction throughout means simple and convex.
        true
    }
}

/// An axis-aligned crop rectangle in image-pixel space.
///
/// Always fully inside the owning image and at least [`MIN_CROP_SIZE`] on each
/// side (or the full image dimension, for images smaller than that). The only
/// way to build one is through the clamping constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl CropRegion {
    /// Build a region, clamping size and position into `image`.
    ///
    /// A NaN size collapses to the minimum and a NaN position to the image
    /// origin.
    pub fn clamped(x: f32, y: f32, width: f32, height: f32, image: ImageSize, min_size: f32) -> Self {
        let (img_w, img_h) = (image.width as f32, image.height as f32);
        let min_size = min_size.max(0.0);
        let min_w = min_size.min(img_w);
        let min_h = min_size.min(img_h);

        let width = if width.is_nan() { min_w } else { width.clamp(min_w, img_w) };
        let height = if height.is_nan() { min_h } else { height.clamp(min_h, img_h) };
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, img_w - width) };
        let y = if y.is_nan() { 0.0 } else { y.clamp(0.0, img_h - height) };

        Self { x, y, width, height }
    }

    /// Build a region from its four edges, clamping into `image`.
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32, image: ImageSize, min_size: f32) -> Self {
        Self::clamped(left, top, right - left, bottom - top, image, min_size)
    }

    /// The whole image.
    pub fn full(image: ImageSize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: image.width as f32,
            height: image.height as f32,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.x, self.y),
            Corner::TopRight => Point::new(self.right(), self.y),
            Corner::BottomRight => Point::new(self.right(), self.bottom()),
            Corner::BottomLeft => Point::new(self.x, self.bottom()),
        }
    }

    pub fn to_quad(&self) -> Quadrilateral {
        Quadrilateral::from_rect(self.x, self.y, self.width, self.height)
    }

    /// Integer pixel rectangle `(x, y, width, height)` covering this region.
    pub fn pixel_rect(&self) -> (u32, u32, u32, u32) {
        (
            self.x.round() as u32,
            self.y.round() as u32,
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// How a [`DetectionCandidate`] came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateSource {
    /// Built from detected edge lines.
    Detected,
    /// Synthesised because nothing usable was detected.
    Fallback,
}

/// A document hypothesis: its outline, score, and bounding crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionCandidate {
    pub quad: Quadrilateral,
    /// Nominally in `[0, 1]`; a perfect score may overshoot slightly.
    pub confidence: f32,
    pub region: CropRegion,
    pub source: CandidateSource,
}

impl DetectionCandidate {
    pub fn is_fallback(&self) -> bool {
        self.source == CandidateSource::Fallback
    }
}

// -- Encoded output -----------------------------------------------------------

/// Output encodings for a finished card image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Infer format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Encoded image bytes together with their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

// -- Card records -------------------------------------------------------------

/// Unique identifier for a stored card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The text fields a business card may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardField {
    Name,
    Title,
    Company,
    Email,
    Phone,
    Website,
    Address,
}

impl CardField {
    pub const ALL: [CardField; 7] = [
        CardField::Name,
        CardField::Title,
        CardField::Company,
        CardField::Email,
        CardField::Phone,
        CardField::Website,
        CardField::Address,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Title => "Title",
            Self::Company => "Company",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Website => "Website",
            Self::Address => "Address",
        }
    }
}

/// Fields extracted from a card. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFields {
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
}

impl CardFields {
    pub fn get(&self, field: CardField) -> Option<&str> {
        let value = match field {
            CardField::Name => &self.name,
            CardField::Title => &self.title,
            CardField::Company => &self.company,
            CardField::Email => &self.email,
            CardField::Phone => &self.phone,
            CardField::Website => &self.website,
            CardField::Address => &self.address,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: CardField, value: Option<String>) {
        let slot = match field {
            CardField::Name => &mut self.name,
            CardField::Title => &mut self.title,
            CardField::Company => &mut self.company,
            CardField::Email => &mut self.email,
            CardField::Phone => &mut self.phone,
            CardField::Website => &mut self.website,
            CardField::Address => &mut self.address,
        };
        // Blank strings from the extractor count as missing.
        *slot = value.filter(|v| !v.trim().is_empty());
    }

    /// Fields that were present, in display order.
    pub fn present(&self) -> Vec<(CardField, &str)> {
        CardField::ALL
            .iter()
            .filter_map(|&f| self.get(f).map(|v| (f, v)))
            .collect()
    }

    pub fn missing(&self) -> Vec<CardField> {
        CardField::ALL
            .iter()
            .copied()
            .filter(|&f| self.get(f).is_none())
            .collect()
    }
}

/// A captured card: extracted fields plus where its image lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: CardId,
    pub fields: CardFields,
    pub mime_type: String,
    pub captured_at: DateTime<Utc>,
}

impl CardRecord {
    pub fn new(fields: CardFields, format: ImageFormat) -> Self {
        Self {
            id: CardId::new(),
            fields,
            mime_type: format.mime_type().to_owned(),
            captured_at: Utc::now(),
        }
    }
}
