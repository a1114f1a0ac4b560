use pdf_fieldmap::*;

fn letter_pages(count: usize) -> Vec<PageSize> {
    vec![
        PageSize {
            width: 612.0,
            height: 792.0
        };
        count
    ]
}

fn columns(names: &[&str]) -> ColumnSet {
    ColumnSet::new(names.iter().map(|s| s.to_string()).collect())
}

/// Renders blank pages at the requested width, letter aspect ratio
struct BlankRenderer {
    pages: usize,
    calls: Vec<(u32, u32)>,
}

impl PageRenderer for BlankRenderer {
    type Error = String;

    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&mut self, page: u32, target_width: u32) -> std::result::Result<RenderedPage, String> {
        if page as usize > self.pages {
            return Err(format!("no page {}", page));
        }
        self.calls.push((page, target_width));
        let height = target_width * 792 / 612;
        Ok(RenderedPage {
            width: target_width,
            height,
            rgba: vec![255; (target_width * height * 4) as usize],
        })
    }
}

fn ready_session() -> MappingSession {
    let mut session = MappingSession::new();
    session.load_template(letter_pages(2));
    session.load_columns(columns(&["Name", "Amount"]));
    session.select_field("Amount").unwrap();
    session
}

#[test]
fn test_placement_states() {
    let mut session = MappingSession::new();
    assert_eq!(session.placement_state(), PlacementState::NoTemplate);
    assert_eq!(session.place(10.0, 10.0), Err(PlacementError::NoTemplate));

    session.load_template(letter_pages(1));
    assert_eq!(session.placement_state(), PlacementState::NoRows);
    assert_eq!(session.place(10.0, 10.0), Err(PlacementError::NoRows));

    session.load_columns(columns(&["Name"]));
    assert_eq!(session.placement_state(), PlacementState::NoFieldSelected);
    assert_eq!(session.place(10.0, 10.0), Err(PlacementError::NoFieldSelected));

    session.select_field("Name").unwrap();
    assert_eq!(session.placement_state(), PlacementState::Ready);
    assert!(session.place(10.0, 10.0).is_ok());
}

#[test]
fn test_select_unknown_field() {
    let mut session = ready_session();
    assert_eq!(
        session.select_field("Email"),
        Err(PlacementError::UnknownField("Email".to_string()))
    );
    assert_eq!(session.selected_field(), Some("Amount"));
}

#[test]
fn test_place_divides_out_scale() {
    let mut session = ready_session();
    session.set_scale(RasterScale::new(2.0).unwrap());

    let mapping = session.place(200.0, 100.0).unwrap();
    assert_eq!(mapping, FieldMapping::new(1, 100.0, 50.0, "Amount"));
    assert_eq!(session.mappings().len(), 1);
}

#[test]
fn test_place_on_second_page() {
    let mut session = ready_session();
    session.next_page();
    let mapping = session.place(5.0, 6.0).unwrap();
    assert_eq!(mapping.page, 2);

    // Cannot move past the last page
    assert_eq!(session.next_page(), 2);
    assert_eq!(session.prev_page(), 1);
    assert_eq!(session.prev_page(), 1);
    assert!(session.set_page(3).is_err());
    assert!(session.set_page(0).is_err());
}

#[test]
fn test_undo() {
    let mut session = ready_session();
    session.place(1.0, 1.0).unwrap();
    session.place(2.0, 2.0).unwrap();

    let removed = session.undo().unwrap();
    assert_eq!(removed.x, 2.0);
    assert_eq!(session.mappings().len(), 1);

    session.undo();
    assert!(session.undo().is_none());
    assert!(session.mappings().is_empty());
}

#[test]
fn test_overlay_uses_current_scale_and_page() {
    let mut session = ready_session();
    session.place(100.0, 50.0).unwrap();
    session.next_page();
    session.place(30.0, 30.0).unwrap();
    session.prev_page();

    session.set_scale(RasterScale::new(1.5).unwrap());
    let markers = session.overlay();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].index, 0);
    assert_eq!((markers[0].x, markers[0].y), (150.0, 75.0));
    assert_eq!(markers[0].field, "Amount");
}

#[test]
fn test_overlay_markers_keep_registry_index() {
    let mut session = ready_session();
    session.place(10.0, 10.0).unwrap();
    session.next_page();
    session.place(20.0, 20.0).unwrap();
    session.prev_page();
    session.select_field("Name").unwrap();
    session.place(30.0, 30.0).unwrap();

    let markers = session.overlay();
    let indices: Vec<usize> = markers.iter().map(|m| m.index).collect();
    assert_eq!(indices, vec![0, 2]);
    assert_eq!(markers[1].field, "Name");

    let mappings = session.into_mappings();
    assert_eq!(mappings.len(), 3);
    assert_eq!(mappings.as_slice()[1], FieldMapping::new(2, 20.0, 20.0, "Amount"));
}

#[test]
fn test_load_template_clears_mappings() {
    let mut session = ready_session();
    session.place(1.0, 1.0).unwrap();
    session.load_template(letter_pages(3));
    assert!(session.mappings().is_empty());
    assert_eq!(session.page_count(), 3);
    assert_eq!(session.current_page(), 1);
}

#[test]
fn test_load_columns_reports_stale_mappings() {
    let mut session = ready_session();
    session.place(1.0, 1.0).unwrap();

    let stale = session.load_columns(columns(&["Name"]));
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].field, "Amount");
    // Stale mappings are kept until the user removes them
    assert_eq!(session.mappings().len(), 1);
    assert_eq!(session.selected_field(), None);
}

#[test]
fn test_render_current_fits_scale() {
    let mut session = ready_session();
    let mut renderer = BlankRenderer {
        pages: 2,
        calls: Vec::new(),
    };

    let rendered = session.render_current(&mut renderer, 1224).unwrap().unwrap();
    assert_eq!(rendered.width, 1224);
    assert_eq!(session.scale().factor(), 2.0);
    assert_eq!(renderer.calls, vec![(1, 1224)]);

    // Pointer at raster (300, 400) is document (150, 200)
    assert_eq!(session.pointer_position(300.0, 400.0), DocPoint::new(150.0, 200.0));
}

#[test]
fn test_render_without_template() {
    let mut session = MappingSession::new();
    let mut renderer = BlankRenderer {
        pages: 0,
        calls: Vec::new(),
    };
    assert_eq!(session.render_current(&mut renderer, 800), Ok(None));
    assert!(renderer.calls.is_empty());
}
