//! Row-partitioned work distribution.
//!
//! Every pixel pass in the engine reads from an immutable snapshot and writes
//! each output row exactly once, so rows can be handed to independent workers
//! without synchronisation. With the `parallel` feature the rows are spread
//! over the rayon pool; without it they run in order on the calling thread.
//! Output is identical either way.

/// Run `f(y, row)` over consecutive rows of `data`.
///
/// `data` is split into chunks of `row_len` bytes; the first chunk is row
/// `first_row`. `row_len` must be non-zero.
pub(crate) fn for_each_row<F>(data: &mut [u8], row_len: usize, first_row: usize, f: F)
where
    F: Fn(usize, &mut [u8]) + Send + Sync,
{
    map_rows(data, row_len, first_row, f);
}

/// Like [`for_each_row`], collecting each row's return value in row order.
pub(crate) fn map_rows<T, F>(data: &mut [u8], row_len: usize, first_row: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, &mut [u8]) -> T + Send + Sync,
{
    debug_assert!(row_len > 0);

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        data.par_chunks_mut(row_len)
            .enumerate()
            .map(|(i, row)| f(first_row + i, row))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(row_len)
            .enumerate()
            .map(|(i, row)| f(first_row + i, row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_receive_their_absolute_index() {
        let mut data = vec![0u8; 5 * 3];
        for_each_row(&mut data, 3, 10, |y, row| {
            for b in row.iter_mut() {
                *b = u8::try_from(y).unwrap();
            }
        });
        assert_eq!(
            data,
            vec![10, 10, 10, 11, 11, 11, 12, 12, 12, 13, 13, 13, 14, 14, 14]
        );
    }

    #[test]
    fn map_rows_preserves_row_order() {
        let mut data = vec![0u8; 64 * 2];
        let ys = map_rows(&mut data, 2, 3, |y, row| {
            row[0] = 1;
            y * 10
        });
        assert_eq!(ys.len(), 64);
        assert!(ys.iter().enumerate().all(|(i, &v)| v == (i + 3) * 10));
        assert!(data.chunks(2).all(|r| r == [1, 0]));
    }

    #[test]
    fn rows_match_in_order_computation() {
        let row_len = 37;
        let input: Vec<u8> = (0..row_len * 211).map(|i| (i * 31 % 251) as u8).collect();
        let step = |y: usize, row: &mut [u8]| {
            let sum = row.iter().map(|&b| usize::from(b)).sum::<usize>();
            for (x, b) in row.iter_mut().enumerate() {
                *b = b.wrapping_mul(3).wrapping_add((x + y) as u8);
            }
            sum
        };

        let mut expected = input.clone();
        let expected_sums: Vec<usize> = expected
            .chunks_mut(row_len)
            .enumerate()
            .map(|(i, row)| step(i + 5, row))
            .collect();

        let mut actual = input;
        let sums = map_rows(&mut actual, row_len, 5, step);
        assert_eq!(actual, expected);
        assert_eq!(sums, expected_sums);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut data: Vec<u8> = Vec::new();
        for_each_row(&mut data, 4, 0, |_, _| panic!("no rows expected"));
    }
}
