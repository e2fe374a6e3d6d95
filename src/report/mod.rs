//! Boom/bust segmentation and annotation of the analysed series.

pub mod format;

use crate::domain::{AnnotatedRow, Classification, Extremum, Segment, Series, SmoothedSeries};
use crate::error::CycleError;

pub use format::*;

/// Merge peaks and troughs into one index-ordered sequence.
///
/// A peak and a trough sharing an index is an invariant violation.
pub fn merge_extrema(peaks: &[Extremum], troughs: &[Extremum]) -> Result<Vec<Extremum>, CycleError> {
    let mut merged: Vec<Extremum> = peaks.iter().chain(troughs).copied().collect();
    merged.sort_by_key(|e| e.index);

    if let Some(pair) = merged.windows(2).find(|pair| pair[0].index == pair[1].index) {
        return Err(CycleError::ExtremumCollision { index: pair[0].index });
    }
    Ok(merged)
}

/// Build one segment per consecutive pair of merged extrema.
///
/// Consecutive extrema of the same kind (e.g. two peaks) form an ordinary segment.
pub fn segment(merged: &[Extremum]) -> Result<Vec<Segment>, CycleError> {
    merged
        .windows(2)
        .map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            let percent_change = percent_change(&start, &end)?;
            Ok(Segment {
                start,
                end,
                percent_change,
                classification: Classification::from_change(percent_change),
            })
        })
        .collect()
}

/// Merge and segment in one step.
pub fn segment_extrema(peaks: &[Extremum], troughs: &[Extremum]) -> Result<Vec<Segment>, CycleError> {
    segment(&merge_extrema(peaks, troughs)?)
}

fn percent_change(start: &Extremum, end: &Extremum) -> Result<f64, CycleError> {
    if start.value == 0.0 {
        return Err(CycleError::UndefinedChange {
            index: start.index,
            date: start.date,
        });
    }
    Ok((end.value - start.value) / start.value * 100.0)
}

/// Attach smoothed values and turning point labels to every observation.
pub fn annotate(series: &Series, smoothed: &SmoothedSeries, extrema: &[Extremum]) -> Vec<AnnotatedRow> {
    let mut labels = vec![0i8; series.len()];
    for e in extrema {
        if let Some(label) = labels.get_mut(e.index) {
            *label = e.kind.label();
        }
    }

    series
        .points()
        .iter()
        .zip(smoothed.values())
        .zip(labels)
        .map(|((p, &smoothed), turning_point)| AnnotatedRow {
            date: p.date,
            value: p.raw_value,
            smoothed,
            turning_point,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{ExtremumKind, SeriesPoint};

    fn ext(index: usize, value: f64, kind: ExtremumKind) -> Extremum {
        Extremum {
            index,
            date: NaiveDate::from_ymd_opt(2000 + index as i32, 1, 1).unwrap(),
            value,
            kind,
            prominence: 1.0,
        }
    }

    #[test]
    fn merge_orders_by_index() {
        let peaks = [ext(10, 200.0, ExtremumKind::Peak), ext(40, 180.0, ExtremumKind::Peak)];
        let troughs = [ext(25, 100.0, ExtremumKind::Trough)];
        let merged = merge_extrema(&peaks, &troughs).unwrap();
        let idx: Vec<usize> = merged.iter().map(|e| e.index).collect();
        assert_eq!(idx, vec![10, 25, 40]);
    }

    #[test]
    fn merge_rejects_index_collision() {
        let peaks = [ext(5, 2.0, ExtremumKind::Peak)];
        let troughs = [ext(5, 1.0, ExtremumKind::Trough)];
        assert_eq!(
            merge_extrema(&peaks, &troughs).unwrap_err(),
            CycleError::ExtremumCollision { index: 5 }
        );
    }

    #[test]
    fn segments_classify_by_sign() {
        let merged = [
            ext(0, 100.0, ExtremumKind::Trough),
            ext(1, 150.0, ExtremumKind::Peak),
            ext(2, 60.0, ExtremumKind::Trough),
        ];
        let segments = segment(&merged).unwrap();
        assert_eq!(segments.len(), 2);

        assert_eq!(segments[0].classification, Classification::Boom);
        assert!((segments[0].percent_change - 50.0).abs() < 1e-12);
        assert_eq!(segments[1].classification, Classification::Bust);
        assert!((segments[1].percent_change + 60.0).abs() < 1e-12);
    }

    #[test]
    fn same_kind_neighbours_form_a_segment() {
        let merged = [ext(3, 120.0, ExtremumKind::Peak), ext(30, 90.0, ExtremumKind::Peak)];
        let segments = segment(&merged).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].classification, Classification::Bust);
        assert!((segments[0].percent_change + 25.0).abs() < 1e-12);
    }

    #[test]
    fn fewer_than_two_extrema_yield_no_segments() {
        assert!(segment(&[]).unwrap().is_empty());
        assert!(segment(&[ext(4, 10.0, ExtremumKind::Peak)]).unwrap().is_empty());
    }

    #[test]
    fn zero_start_value_is_undefined() {
        let merged = [ext(2, 0.0, ExtremumKind::Trough), ext(9, 10.0, ExtremumKind::Peak)];
        assert_eq!(
            segment(&merged).unwrap_err(),
            CycleError::UndefinedChange {
                index: 2,
                date: NaiveDate::from_ymd_opt(2002, 1, 1).unwrap(),
            }
        );
    }

    #[test]
    fn annotate_labels_only_extrema() {
        let series = Series::new(
            (0..5)
                .map(|i| SeriesPoint {
                    date: NaiveDate::from_ymd_opt(2000 + i, 1, 1).unwrap(),
                    raw_value: i as f64,
                })
                .collect(),
        )
        .unwrap();
        let smoothed = SmoothedSeries::new(vec![0.5, 1.5, 2.5, 3.5, 4.5]);
        let rows = annotate(
            &series,
            &smoothed,
            &[ext(1, 1.5, ExtremumKind::Peak), ext(3, 3.5, ExtremumKind::Trough)],
        );

        let labels: Vec<i8> = rows.iter().map(|r| r.turning_point).collect();
        assert_eq!(labels, vec![0, 1, 0, -1, 0]);
        assert_eq!(rows[2].value, 2.0);
        assert_eq!(rows[2].smoothed, 2.5);
    }
}
