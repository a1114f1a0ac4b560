//! Interactive mapping state
//!
//! A [`MappingSession`] holds everything a presentation layer needs while the
//! user pins fields onto a template: the page being viewed, its display
//! scale, the selected column and the mapping registry. The session is owned
//! by the caller; nothing here is global.

use crate::coords::{DocPoint, RasterScale, to_document, to_raster};
use crate::mapping::{FieldMapping, MappingSet};
use crate::rows::ColumnSet;
use crate::template::PageSize;
use crate::types::StaleMapping;
use thiserror::Error;

/// Rasterizer for template pages, supplied by the presentation layer
pub trait PageRenderer {
    type Error;

    fn page_count(&self) -> usize;

    /// Render a 1-based page scaled to `target_width` pixels
    fn render_page(&mut self, page: u32, target_width: u32) -> Result<RenderedPage, Self::Error>;
}

/// RGBA pixels of one rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Whether a click can become a mapping right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    Ready,
    NoTemplate,
    NoRows,
    NoFieldSelected,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("Load a template before placing fields")]
    NoTemplate,
    #[error("Load a spreadsheet with at least one row before placing fields")]
    NoRows,
    #[error("Select a field before placing it")]
    NoFieldSelected,
    #[error("'{0}' is not a column of the loaded spreadsheet")]
    UnknownField(String),
    #[error("Page {page} is out of range (template has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: usize },
}

/// A mapping drawn on the current page, in raster pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Position in the mapping set
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub field: String,
}

#[derive(Debug, Clone, Default)]
pub struct MappingSession {
    page_sizes: Vec<PageSize>,
    columns: ColumnSet,
    mappings: MappingSet,
    current_page: u32,
    selected_field: Option<String>,
    scale: RasterScale,
}

impl MappingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over with a new template; all mappings are dropped
    pub fn load_template(&mut self, page_sizes: Vec<PageSize>) {
        self.current_page = if page_sizes.is_empty() { 0 } else { 1 };
        self.page_sizes = page_sizes;
        self.mappings.clear();
        self.scale = RasterScale::default();
    }

    /// Replace the column set. Mappings are kept; those that no longer name
    /// a column are returned so the caller can surface them.
    pub fn load_columns(&mut self, columns: ColumnSet) -> Vec<StaleMapping> {
        if let Some(selected) = &self.selected_field
            && !columns.contains(selected)
        {
            self.selected_field = None;
        }
        self.columns = columns;
        self.mappings.stale_against(&self.columns)
    }

    pub fn select_field(&mut self, field: impl Into<String>) -> Result<(), PlacementError> {
        let field = field.into();
        if !self.columns.contains(&field) {
            return Err(PlacementError::UnknownField(field));
        }
        self.selected_field = Some(field);
        Ok(())
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), PlacementError> {
        if page == 0 || page as usize > self.page_sizes.len() {
            return Err(PlacementError::PageOutOfRange {
                page,
                page_count: self.page_sizes.len(),
            });
        }
        self.current_page = page;
        Ok(())
    }

    /// Move to the next page; stays put on the last one
    pub fn next_page(&mut self) -> u32 {
        if (self.current_page as usize) < self.page_sizes.len() {
            self.current_page += 1;
        }
        self.current_page
    }

    /// Move to the previous page; stays put on the first one
    pub fn prev_page(&mut self) -> u32 {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
        self.current_page
    }

    pub fn set_scale(&mut self, scale: RasterScale) {
        self.scale = scale;
    }

    /// Derive the display scale from the width the current page was drawn at
    pub fn fit_rendered_width(&mut self, raster_width_px: f32) -> crate::types::Result<RasterScale> {
        let page_width = self
            .current_page_size()
            .map(|size| size.width)
            .unwrap_or_default();
        let scale = RasterScale::fit_width(raster_width_px, page_width)?;
        self.scale = scale;
        Ok(scale)
    }

    /// Render the current page and adopt the scale it was drawn at.
    /// `None` when no template is loaded.
    pub fn render_current<R: PageRenderer>(
        &mut self,
        renderer: &mut R,
        target_width: u32,
    ) -> Result<Option<RenderedPage>, R::Error> {
        if self.current_page == 0 {
            return Ok(None);
        }
        let rendered = renderer.render_page(self.current_page, target_width)?;
        if let Err(e) = self.fit_rendered_width(rendered.width as f32) {
            log::warn!("Keeping previous display scale: {}", e);
        }
        Ok(Some(rendered))
    }

    pub fn placement_state(&self) -> PlacementState {
        if self.page_sizes.is_empty() {
            PlacementState::NoTemplate
        } else if self.columns.is_empty() {
            PlacementState::NoRows
        } else if self.selected_field.is_none() {
            PlacementState::NoFieldSelected
        } else {
            PlacementState::Ready
        }
    }

    /// Pin the selected field at a pointer position on the current page
    pub fn place(&mut self, px: f32, py: f32) -> Result<FieldMapping, PlacementError> {
        match self.placement_state() {
            PlacementState::NoTemplate => return Err(PlacementError::NoTemplate),
            PlacementState::NoRows => return Err(PlacementError::NoRows),
            PlacementState::NoFieldSelected => return Err(PlacementError::NoFieldSelected),
            PlacementState::Ready => {}
        }

        let field = self
            .selected_field
            .clone()
            .ok_or(PlacementError::NoFieldSelected)?;
        if !self.columns.contains(&field) {
            return Err(PlacementError::UnknownField(field));
        }
        if self.current_page as usize > self.page_sizes.len() {
            return Err(PlacementError::PageOutOfRange {
                page: self.current_page,
                page_count: self.page_sizes.len(),
            });
        }

        let point = self.pointer_position(px, py);
        let mapping = FieldMapping::new(self.current_page, point.x, point.y, field);
        self.mappings.add(mapping.clone());
        Ok(mapping)
    }

    /// Document position under the pointer on the current page
    pub fn pointer_position(&self, px: f32, py: f32) -> DocPoint {
        to_document(px, py, self.scale)
    }

    /// Remove the most recent mapping
    pub fn undo(&mut self) -> Option<FieldMapping> {
        self.mappings.remove_last()
    }

    /// Markers for the current page at the current scale
    pub fn overlay(&self) -> Vec<Marker> {
        self.mappings
            .for_page(self.current_page)
            .map(|(index, m)| {
                let (x, y) = to_raster(DocPoint::new(m.x, m.y), self.scale);
                Marker {
                    index,
                    x,
                    y,
                    field: m.field.clone(),
                }
            })
            .collect()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn current_page_size(&self) -> Option<PageSize> {
        let index = (self.current_page as usize).checked_sub(1)?;
        self.page_sizes.get(index).copied()
    }

    pub fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    pub fn selected_field(&self) -> Option<&str> {
        self.selected_field.as_deref()
    }

    pub fn scale(&self) -> RasterScale {
        self.scale
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn mappings(&self) -> &MappingSet {
        &self.mappings
    }

    /// Hand the mappings over for generation
    pub fn into_mappings(self) -> MappingSet {
        self.mappings
    }
}
