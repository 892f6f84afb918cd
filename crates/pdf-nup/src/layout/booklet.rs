//! Page order for saddle-stitched booklets

/// Reorder `num_pages` pages for booklet printing.
///
/// Pages are taken in blocks of `signature` pages (four per folded sheet);
/// `None` puts the whole document into one block; other sizes are rounded up
/// to a multiple of four. Each block is emitted as
/// `last, first, first+1, last-1, ...` so that printing two pages per side
/// and folding the stack gives reading order.
///
/// The result length is `num_pages` rounded up to a whole block. Indices
/// `>= num_pages` are blank padding.
pub fn booklet_shuffle(num_pages: usize, signature: Option<usize>) -> Vec<usize> {
    // each folded sheet carries four pages
    let signature = match signature {
        Some(sig) if sig > 0 => sig.next_multiple_of(4),
        _ => num_pages.next_multiple_of(4),
    };
    if num_pages == 0 {
        return Vec::new();
    }

    let blocks = num_pages.div_ceil(signature);
    let mut order = Vec::with_capacity(blocks * signature);

    for block in 0..blocks {
        let mut first = block * signature;
        let mut last = first + signature - 1;
        while first < last {
            order.push(last);
            order.push(first);
            order.push(first + 1);
            order.push(last - 1);
            first += 2;
            last -= 2;
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sheet() {
        assert_eq!(booklet_shuffle(4, None), vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_auto_signature_pads_to_four() {
        let order = booklet_shuffle(5, None);
        assert_eq!(order, vec![7, 0, 1, 6, 5, 2, 3, 4]);
    }

    #[test]
    fn test_explicit_signature_blocks() {
        let order = booklet_shuffle(5, Some(4));
        assert_eq!(order, vec![3, 0, 1, 2, 7, 4, 5, 6]);

        let mut real: Vec<usize> = order.iter().copied().filter(|&i| i < 5).collect();
        real.sort_unstable();
        assert_eq!(real, vec![0, 1, 2, 3, 4]);
        assert_eq!(order.iter().filter(|&&i| i >= 5).count(), 3);
    }

    #[test]
    fn test_every_index_once() {
        for pages in 1..40 {
            for sig in [None, Some(4), Some(8), Some(16)] {
                let mut order = booklet_shuffle(pages, sig);
                let len = order.len();
                let block = sig.unwrap_or((pages + 3) & !3);
                assert_eq!(len % block, 0);
                assert!(len >= pages && len < pages + block);
                order.sort_unstable();
                assert_eq!(order, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_signature_rounds_to_sheet() {
        let mut order = booklet_shuffle(5, Some(6));
        assert_eq!(order.len(), 8);
        order.sort_unstable();
        assert_eq!(order, (0..8).collect::<Vec<_>>());

        assert_eq!(booklet_shuffle(3, Some(1)), vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_empty_document() {
        assert!(booklet_shuffle(0, None).is_empty());
        assert!(booklet_shuffle(0, Some(4)).is_empty());
    }
}
