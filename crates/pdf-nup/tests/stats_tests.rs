use pdf_nup::*;

#[test]
fn test_stats_no_pages() {
    let result = calculate_statistics(0, &ProcessingParameters::default());
    assert!(result.is_err());
    match result {
        Err(ImposeError::NoPages) => {}
        _ => panic!("Expected NoPages error"),
    }
}

#[test]
fn test_stats_invalid_parameters() {
    let mut params = ProcessingParameters::default();
    params.num_copies = 0;
    assert!(matches!(
        calculate_statistics(4, &params),
        Err(ImposeError::Config(_))
    ));
}

#[test]
fn test_stats_one_up() {
    let stats = calculate_statistics(7, &ProcessingParameters::default()).unwrap();

    assert_eq!(stats.source_pages, 7);
    assert_eq!(stats.selected_pages, 7);
    assert_eq!(stats.pages_per_sheet, 1);
    assert_eq!(stats.signatures, None);
    assert_eq!(stats.output_sheets, 7);
    assert_eq!(stats.skipped_sheets, 0);
    assert_eq!(stats.blank_pages_added, 0);
    assert_eq!(stats.output_pages, 7);
    assert_eq!(stats.total_output_pages, 7);
}

#[test]
fn test_stats_nup() {
    let mut params = ProcessingParameters::default();
    params.nup.apply_preset(4).unwrap();

    let stats = calculate_statistics(9, &params).unwrap();
    assert_eq!(stats.pages_per_sheet, 4);
    assert_eq!(stats.output_sheets, 3);
    assert_eq!(stats.output_pages, 3);
}

#[test]
fn test_stats_booklet() {
    let mut params = ProcessingParameters::default();
    params.booklet = BookletMode::On;

    // 6 pages pad to one 8-page signature, two pages per side
    let stats = calculate_statistics(6, &params).unwrap();
    assert_eq!(stats.pages_per_sheet, 2);
    assert_eq!(stats.signatures, Some(1));
    assert_eq!(stats.blank_pages_added, 2);
    assert_eq!(stats.output_sheets, 4);

    // 20 pages in signatures of 8: three signatures, 4 blanks
    params.book_signature = Some(8);
    let stats = calculate_statistics(20, &params).unwrap();
    assert_eq!(stats.signatures, Some(3));
    assert_eq!(stats.blank_pages_added, 4);
    assert_eq!(stats.output_sheets, 12);
}

#[test]
fn test_stats_booklet_shuffle_only() {
    let mut params = ProcessingParameters::default();
    params.booklet = BookletMode::ShuffleOnly;

    let stats = calculate_statistics(5, &params).unwrap();
    assert_eq!(stats.pages_per_sheet, 1);
    assert_eq!(stats.output_sheets, 8);
}

#[test]
fn test_stats_page_selection() {
    let mut params = ProcessingParameters::default();
    params.input_page_ranges = IntervalSet::parse_ranges("3-").unwrap();
    params.odd_pages = false;

    // pages 3..=10 give 8 output pages, 4 of them even
    let stats = calculate_statistics(10, &params).unwrap();
    assert_eq!(stats.selected_pages, 8);
    assert_eq!(stats.output_sheets, 8);
    assert_eq!(stats.skipped_sheets, 4);
    assert_eq!(stats.output_pages, 4);

    // an odd count of back sides is padded
    let stats = calculate_statistics(8, &params).unwrap();
    assert_eq!(stats.output_sheets, 6);
    assert_eq!(stats.skipped_sheets, 3);
    assert_eq!(stats.blank_pages_added, 1);
    assert_eq!(stats.output_pages, 4);
}

#[test]
fn test_stats_copies() {
    let mut params = ProcessingParameters::default();
    params.num_copies = 3;
    params.even_duplex = true;

    let stats = calculate_statistics(5, &params).unwrap();
    assert_eq!(stats.output_pages, 6);
    assert_eq!(stats.total_output_pages, 18);
}

#[tokio::test]
async fn test_stats_match_imposition() {
    use lopdf::{Dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for _ in 0..11 {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(11)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut params = ProcessingParameters::default();
    params.booklet = BookletMode::On;
    params.book_signature = Some(8);
    params.num_copies = 2;
    params.collate = true;

    let stats = calculate_statistics(11, &params).unwrap();
    let imposed = impose(&doc, &params).await.unwrap();
    assert_eq!(imposed.get_pages().len(), stats.total_output_pages);
    assert_eq!(stats.total_output_pages, 16);
}
