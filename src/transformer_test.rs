//! # Transformer Test Suite
//!
//! Behavioural tests for the stock transformers, driven directly through
//! [`Transformer::transform`] with hand-made queues.
//!
//! ## Test Coverage
//!
//! - **Skip / Limit**: counts, order, zero, and early release of the input
//! - **Column selection**: by index and by name, repeated columns, schema
//!   errors, empty input
//! - **Predicate**: matching, unknown columns, custom filters
//! - **Identity**: pass-through of the very same row handles
//! - **Closing**: every stage closes its output once its input closes

use crate::config::{PipelineConfig, DEFAULT_BUFFER_SIZE};
use crate::error::ConfigError;
use crate::row::{Row, RowRef};
use crate::transformer::{pending_queue, Transformer};
use crate::transformers::{
  ColumnIntSelector, ColumnStringSelector, IdentityTransformer, Predicator, RowLimiter, RowSkipper,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn numbered(n: usize) -> Vec<RowRef> {
  (0..n)
    .map(|i| {
      Arc::new(Row::from_pairs([
        ("n", i.to_string()),
        ("double", (i * 2).to_string()),
        ("label", format!("row-{i}")),
      ]))
    })
    .collect()
}

fn ab_rows() -> Vec<RowRef> {
  vec![
    Arc::new(Row::from_pairs([("a", "1"), ("b", "2")])),
    Arc::new(Row::from_pairs([("a", "3"), ("b", "4")])),
  ]
}

/// Feeds `input` to `stage` and drains its output, all concurrently so that
/// small queues never deadlock.
async fn run<T: Transformer>(
  stage: &mut T,
  input: Vec<RowRef>,
) -> (Result<(), ConfigError>, Vec<RowRef>) {
  let (in_tx, in_rx) = pending_queue(2);
  let (out_tx, mut out_rx) = pending_queue(2);

  let feed = async move {
    for row in input {
      if in_tx.send(row).await.is_err() {
        break;
      }
    }
  };
  let drain = async move {
    let mut rows = Vec::new();
    while let Some(row) = out_rx.recv().await {
      rows.push(row);
    }
    rows
  };

  let ((), result, rows) = tokio::join!(feed, stage.transform(in_rx, out_tx), drain);
  (result, rows)
}

fn values(rows: &[RowRef]) -> Vec<Vec<String>> {
  rows.iter().map(|r| r.values().to_vec()).collect()
}

fn same_handles(a: &[RowRef], b: &[RowRef]) -> bool {
  a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

// ============================================================================
// RowSkipper
// ============================================================================

#[tokio::test]
async fn test_skip_forwards_tail_in_order() {
  let input = numbered(5);
  let (result, out) = run(&mut RowSkipper::new(2), input.clone()).await;
  assert!(result.is_ok());
  assert!(same_handles(&out, &input[2..]));
}

#[tokio::test]
async fn test_skip_zero_forwards_everything() {
  let input = numbered(3);
  let (_, out) = run(&mut RowSkipper::new(0), input.clone()).await;
  assert!(same_handles(&out, &input));
}

#[tokio::test]
async fn test_skip_more_than_input_yields_nothing() {
  let (result, out) = run(&mut RowSkipper::new(10), numbered(3)).await;
  assert!(result.is_ok());
  assert!(out.is_empty());
}

#[tokio::test]
async fn test_skip_restarts_on_each_run() {
  let mut skipper = RowSkipper::new(1);
  let (_, first) = run(&mut skipper, numbered(3)).await;
  let (_, second) = run(&mut skipper, numbered(3)).await;
  assert_eq!(first.len(), 2);
  assert_eq!(second.len(), 2);
}

// ============================================================================
// RowLimiter
// ============================================================================

#[tokio::test]
async fn test_limit_forwards_head() {
  let input = numbered(5);
  let (result, out) = run(&mut RowLimiter::new(3), input.clone()).await;
  assert!(result.is_ok());
  assert!(same_handles(&out, &input[..3]));
}

#[tokio::test]
async fn test_limit_larger_than_input() {
  let input = numbered(2);
  let (_, out) = run(&mut RowLimiter::new(10), input.clone()).await;
  assert!(same_handles(&out, &input));
}

#[tokio::test]
async fn test_limit_zero_reads_nothing() {
  let (in_tx, in_rx) = pending_queue(1);
  let (out_tx, mut out_rx) = pending_queue(1);
  RowLimiter::new(0).transform(in_rx, out_tx).await.unwrap();
  assert!(out_rx.recv().await.is_none());
  // The input receiver is gone, so the upstream writer sees a closed queue.
  assert!(in_tx.send(numbered(1).remove(0)).await.is_err());
}

#[tokio::test]
async fn test_limit_returns_without_waiting_for_input_close() {
  let (in_tx, in_rx) = pending_queue(4);
  let (out_tx, mut out_rx) = pending_queue(4);
  for row in numbered(3) {
    in_tx.send(row).await.unwrap();
  }
  // in_tx stays open: the limiter must still return after two rows.
  tokio::time::timeout(
    Duration::from_secs(5),
    RowLimiter::new(2).transform(in_rx, out_tx),
  )
  .await
  .expect("limiter returned")
  .unwrap();

  assert_eq!(out_rx.recv().await.unwrap().get("n"), Some("0"));
  assert_eq!(out_rx.recv().await.unwrap().get("n"), Some("1"));
  assert!(out_rx.recv().await.is_none());
  assert!(in_tx.is_closed());
}

// ============================================================================
// ColumnIntSelector
// ============================================================================

#[tokio::test]
async fn test_int_selector_reorders_and_repeats() {
  let (result, out) = run(&mut ColumnIntSelector::new(vec![2, 0, 0]), numbered(2)).await;
  assert!(result.is_ok());
  assert_eq!(
    values(&out),
    vec![
      vec!["row-0".to_string(), "0".to_string(), "0".to_string()],
      vec!["row-1".to_string(), "1".to_string(), "1".to_string()],
    ]
  );
  let names: Vec<&str> = out[0].column_names().iter().map(String::as_str).collect();
  assert_eq!(names, ["label", "n", "n"]);
  assert!(Arc::ptr_eq(out[0].column_names(), out[1].column_names()));
}

#[tokio::test]
async fn test_int_selector_empty_index_list() {
  let (result, out) = run(&mut ColumnIntSelector::new(vec![]), numbered(2)).await;
  assert!(result.is_ok());
  assert_eq!(out.len(), 2);
  assert!(out.iter().all(|r| r.is_empty()));
}

#[tokio::test]
async fn test_int_selector_index_equal_to_len_fails() {
  let (result, out) = run(&mut ColumnIntSelector::new(vec![0, 3]), numbered(2)).await;
  assert_eq!(result, Err(ConfigError::IndexOutOfRange { index: 3, len: 3 }));
  assert!(out.is_empty());
}

#[tokio::test]
async fn test_int_selector_empty_input() {
  let (result, out) = run(&mut ColumnIntSelector::new(vec![5]), vec![]).await;
  assert!(result.is_ok());
  assert!(out.is_empty());
}

// ============================================================================
// ColumnStringSelector
// ============================================================================

#[tokio::test]
async fn test_string_selector_swaps_columns() {
  let mut selector = ColumnStringSelector::new(vec!["b".to_string(), "a".to_string()]);
  let (result, out) = run(&mut selector, ab_rows()).await;
  assert!(result.is_ok());
  let names: Vec<&str> = out[0].column_names().iter().map(String::as_str).collect();
  assert_eq!(names, ["b", "a"]);
  assert_eq!(values(&out), vec![vec!["2", "1"], vec!["4", "3"]]);
}

#[tokio::test]
async fn test_string_selector_unknown_column() {
  let mut selector = ColumnStringSelector::new(vec!["a".to_string(), "zzz".to_string()]);
  let (result, out) = run(&mut selector, ab_rows()).await;
  assert_eq!(
    result,
    Err(ConfigError::UnknownColumn {
      column: "zzz".to_string()
    })
  );
  assert!(out.is_empty());
}

#[tokio::test]
async fn test_string_selector_empty_input_closes_output() {
  let mut selector = ColumnStringSelector::new(vec!["a".to_string()]);
  let (result, out) = run(&mut selector, vec![]).await;
  assert!(result.is_ok());
  assert!(out.is_empty());
}

#[tokio::test]
async fn test_string_selector_small_inner_queue() {
  let mut selector = ColumnStringSelector::new(vec!["label".to_string()]).with_buffer_size(1);
  let (result, out) = run(&mut selector, numbered(50)).await;
  assert!(result.is_ok());
  assert_eq!(out.len(), 50);
  assert_eq!(out[49].get("label"), Some("row-49"));
}

#[test]
fn test_string_selector_takes_pipeline_buffer_size() {
  let mut selector = ColumnStringSelector::new(vec!["a".to_string()]);
  assert_eq!(selector.buffer_size, DEFAULT_BUFFER_SIZE);
  selector.configure(&PipelineConfig::default().with_buffer_size(3));
  assert_eq!(selector.buffer_size, 3);
}

#[test]
fn test_string_selector_resolve_first_match() {
  let selector = ColumnStringSelector::new(vec!["a".to_string()]);
  let row = Row::from_pairs([("b", "0"), ("a", "1"), ("a", "2")]);
  assert_eq!(selector.resolve(&row), Ok(vec![1]));
}

// ============================================================================
// Predicator
// ============================================================================

#[tokio::test]
async fn test_predicator_keeps_matching_rows() {
  let input = ab_rows();
  let (result, out) = run(&mut Predicator::new("a = 1").unwrap(), input.clone()).await;
  assert!(result.is_ok());
  assert!(same_handles(&out, &input[..1]));
}

#[tokio::test]
async fn test_predicator_unknown_column_stops_stage() {
  let (result, out) = run(&mut Predicator::new("c = 1").unwrap(), ab_rows()).await;
  assert_eq!(
    result,
    Err(ConfigError::UnknownColumn {
      column: "c".to_string()
    })
  );
  assert!(out.is_empty());
}

#[tokio::test]
async fn test_predicator_custom_filter() {
  let mut stage = Predicator::from_filter(|row: &Row| {
    Ok(row.get("n").is_some_and(|n| n.parse::<usize>().is_ok_and(|n| n % 2 == 1)))
  });
  let (_, out) = run(&mut stage, numbered(6)).await;
  assert_eq!(
    out.iter().map(|r| r.get("n").unwrap()).collect::<Vec<_>>(),
    ["1", "3", "5"]
  );
}

// ============================================================================
// IdentityTransformer
// ============================================================================

#[tokio::test]
async fn test_identity_passes_same_handles() {
  let input = numbered(4);
  let (result, out) = run(&mut IdentityTransformer::new(), input.clone()).await;
  assert!(result.is_ok());
  assert!(same_handles(&out, &input));
}

#[tokio::test]
async fn test_identity_twice_equals_once() {
  let input = numbered(7);
  let (_, once) = run(&mut IdentityTransformer::new(), input.clone()).await;
  let (_, twice_a) = run(&mut IdentityTransformer::new(), input).await;
  let (_, twice) = run(&mut IdentityTransformer::new(), twice_a).await;
  assert!(same_handles(&once, &twice));
}

// ============================================================================
// Closing
// ============================================================================

#[tokio::test]
async fn test_every_stage_closes_output_after_input_closes() {
  let stages: Vec<Box<dyn Transformer>> = vec![
    Box::new(RowSkipper::new(1)),
    Box::new(RowLimiter::new(100)),
    Box::new(ColumnIntSelector::new(vec![1])),
    Box::new(ColumnStringSelector::new(vec!["n".to_string()])),
    Box::new(Predicator::new("n = 1").unwrap()),
    Box::new(IdentityTransformer::new()),
  ];
  for mut stage in stages {
    let name = stage.component_info().type_name;
    let (result, _) = tokio::time::timeout(Duration::from_secs(5), run(&mut stage, numbered(3)))
      .await
      .unwrap_or_else(|_| panic!("{name} left its output open"));
    assert!(result.is_ok(), "{name} failed");
  }
}

#[test]
fn test_component_info_uses_configured_name() {
  let stage = RowLimiter::new(1).with_name("head".to_string());
  let info = stage.component_info();
  assert_eq!(info.name, "head");
  assert!(info.type_name.contains("RowLimiter"));
  assert_eq!(RowSkipper::new(1).component_info().name, "transformer");
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
  #[test]
  fn prop_skip_forwards_suffix(len in 0usize..40, skip in 0usize..50) {
    let input = numbered(len);
    let (result, out) = tokio_test::block_on(run(&mut RowSkipper::new(skip), input.clone()));
    prop_assert!(result.is_ok());
    prop_assert_eq!(out.len(), len.saturating_sub(skip));
    prop_assert!(same_handles(&out, &input[skip.min(len)..]));
  }

  #[test]
  fn prop_limit_forwards_prefix(len in 0usize..40, limit in 0usize..50) {
    let input = numbered(len);
    let (result, out) = tokio_test::block_on(run(&mut RowLimiter::new(limit), input.clone()));
    prop_assert!(result.is_ok());
    prop_assert_eq!(out.len(), limit.min(len));
    prop_assert!(same_handles(&out, &input[..limit.min(len)]));
  }

  #[test]
  fn prop_int_selector_projects_each_row(
    len in 1usize..20,
    indices in proptest::collection::vec(0usize..3, 0..6),
  ) {
    let input = numbered(len);
    let (result, out) = tokio_test::block_on(run(&mut ColumnIntSelector::new(indices.clone()), input.clone()));
    prop_assert!(result.is_ok());
    prop_assert_eq!(out.len(), len);

    let expected_names: Vec<String> =
      indices.iter().map(|&j| input[0].column_names()[j].clone()).collect();
    for (row_in, row_out) in input.iter().zip(&out) {
      let expected: Vec<String> = indices.iter().map(|&j| row_in.values()[j].clone()).collect();
      prop_assert_eq!(row_out.values(), expected.as_slice());
      prop_assert_eq!(&row_out.column_names()[..], expected_names.as_slice());
    }
  }
}
