use ndarray::{Array1, Array2, ArrayView1, ArrayView3, Axis};

/// Reweight applied to the decoder's IoU scores before picking a candidate.
/// Only the first candidate is touched, and the factor flips sign at 2.5
/// prompt points, so the two-point click prompt docks candidate 0 by 500.
const SCORE_REWEIGHT: [f32; 3] = [1000.0, 0.0, 0.0];

/// Pick one mask out of the decoder's candidates. Returns the winning mask
/// plane and its original (unadjusted) score.
///
/// The reweight vector stays length 3 to match the three-candidate decoders
/// this is run against; other candidate counts misalign with it and panic in
/// the array arithmetic rather than being silently padded.
pub fn select_masks(
    masks: ArrayView3<'_, f32>,
    scores: ArrayView1<'_, f32>,
    num_points: usize,
) -> (Array2<f32>, f32) {
    assert!(!scores.is_empty());
    assert_eq!(masks.shape()[0], scores.len());

    let reweight = Array1::from_iter(SCORE_REWEIGHT);
    let adjusted = &scores + &(reweight * (num_points as f32 - 2.5));

    let mut best = 0;
    for (idx, score) in adjusted.iter().enumerate() {
        if *score > adjusted[best] {
            best = idx;
        }
    }

    (masks.index_axis(Axis(0), best).to_owned(), scores[best])
}
