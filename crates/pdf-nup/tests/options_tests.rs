use pdf_nup::*;

#[test]
fn test_default_parameters_are_valid() {
    let params = ProcessingParameters::default();
    assert!(params.validate().is_ok());
    assert_eq!(params.num_copies, 1);
    assert_eq!(params.page.width, 612.0);
    assert_eq!(params.page.height, 792.0);
    assert!(params.nup.is_single());
}

#[test]
fn test_validation_copies() {
    let mut params = ProcessingParameters::default();
    params.num_copies = 0;
    match params.validate() {
        Err(ImposeError::Config(msg)) => {
            assert!(msg.contains("copy"));
        }
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_validation_nup_grid() {
    let mut params = ProcessingParameters::default();

    // Valid: 2x2
    params.nup.nup_x = 2;
    params.nup.nup_y = 2;
    assert!(params.validate().is_ok());

    // Valid: 5x3
    params.nup.nup_x = 5;
    params.nup.nup_y = 3;
    assert!(params.validate().is_ok());

    // Invalid: 7 cells
    params.nup.nup_x = 7;
    params.nup.nup_y = 1;
    assert!(params.validate().is_err());

    // Invalid: empty grid
    params.nup.nup_x = 0;
    assert!(params.validate().is_err());
}

#[test]
fn test_validation_booklet_signature() {
    let mut params = ProcessingParameters::default();
    params.booklet = BookletMode::On;

    params.book_signature = Some(4);
    assert!(params.validate().is_ok());

    params.book_signature = Some(16);
    assert!(params.validate().is_ok());

    // Invalid: 0 pages
    params.book_signature = Some(0);
    assert!(params.validate().is_err());

    // Invalid: not multiple of 4
    params.book_signature = Some(6);
    assert!(params.validate().is_err());

    params.book_signature = None;
    assert!(params.validate().is_ok());
}

#[test]
fn test_validation_page_selection_and_size() {
    let mut params = ProcessingParameters::default();
    params.even_pages = false;
    params.odd_pages = false;
    assert!(params.validate().is_err());

    let mut params = ProcessingParameters::default();
    params.set_page_size(0.0, 792.0, 0.0);
    assert!(params.validate().is_err());

    // margins larger than half the paper leave no printable area
    let mut params = ProcessingParameters::default();
    params.set_page_size(100.0, 100.0, 60.0);
    assert!(params.validate().is_err());
}

#[test]
fn test_page_selection() {
    let mut params = ProcessingParameters::default();
    params.page_ranges = IntervalSet::parse_ranges("2-5").unwrap();
    params.even_pages = false;

    assert!(!params.with_page(1));
    assert!(!params.with_page(2));
    assert!(params.with_page(3));
    assert!(params.with_page(5));
    assert!(!params.with_page(7));

    params.input_page_ranges = IntervalSet::parse_ranges("-3,8").unwrap();
    assert!(params.have_page(1));
    assert!(params.have_page(3));
    assert!(!params.have_page(4));
    assert!(params.have_page(8));
}

#[test]
fn test_pads_to_even() {
    let mut params = ProcessingParameters::default();
    assert!(!params.pads_to_even());

    params.even_duplex = true;
    assert!(params.pads_to_even());

    // printing only the backs keeps the sides paired
    let mut params = ProcessingParameters::default();
    params.odd_pages = false;
    assert!(params.pads_to_even());
}

#[test]
fn test_print_scaling_sets_one_flag() {
    let mut params = ProcessingParameters::default();
    params.fitplot = true;
    params.cropfit = true;

    params.set_print_scaling(PrintScaling::Fill);
    assert!(params.fillprint);
    assert!(!params.fitplot && !params.cropfit && !params.autoprint && !params.autofit);

    params.set_print_scaling(PrintScaling::AutoFit);
    assert!(params.autofit && !params.fillprint);
}

#[test]
fn test_set_page_size() {
    let mut params = ProcessingParameters::default();
    params.set_page_size(595.0, 842.0, 10.0);

    assert!(params.pagesize_requested);
    assert_eq!(params.page.width, 595.0);
    assert_eq!(params.page.height, 842.0);
    assert_eq!(
        (params.page.left, params.page.bottom, params.page.right, params.page.top),
        (10.0, 10.0, 585.0, 832.0)
    );
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_parameters() {
    use tempfile::NamedTempFile;

    let mut params = ProcessingParameters::default();
    params.num_copies = 3;
    params.collate = true;
    params.nup.apply_preset(6).unwrap();
    params.nup.parse_layout("tblr").unwrap();
    params.booklet = BookletMode::ShuffleOnly;
    params.book_signature = Some(8);
    params.border = BorderType::OneThick;
    params.page_label = Some("Confidential".to_string());
    params.orientation = Rotation::Rot90;
    params.page_ranges = IntervalSet::parse_ranges("1-4,9-").unwrap();
    params.set_page_size(595.0, 842.0, 14.0);

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    // Save
    params.save(path).await.unwrap();

    // Load
    let loaded = ProcessingParameters::load(path).await.unwrap();
    assert_eq!(loaded, params);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_partial_parameters() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    tokio::fs::write(temp_file.path(), r#"{ "num_copies": 2, "reverse": true }"#)
        .await
        .unwrap();

    let loaded = ProcessingParameters::load(temp_file.path()).await.unwrap();
    assert_eq!(loaded.num_copies, 2);
    assert!(loaded.reverse);
    assert_eq!(loaded.page, ProcessingParameters::default().page);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_invalid_parameters() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    tokio::fs::write(temp_file.path(), "not json").await.unwrap();

    match ProcessingParameters::load(temp_file.path()).await {
        Err(ImposeError::Config(msg)) => assert!(msg.contains("parse")),
        _ => panic!("Expected Config error"),
    }
}
